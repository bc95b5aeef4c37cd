// crates/sp_io/src/drivers/mod.rs

//! 数据驱动模块

pub mod netcdf;

// 重导出
pub use self::netcdf::{split_path, NetCdfError, NetCdfReader, NetCdfWriter, RawVariable, NODE_DIMENSION};
