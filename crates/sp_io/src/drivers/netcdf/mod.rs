// crates/sp_io/src/drivers/netcdf/mod.rs

//! NetCDF 驱动模块
//!
//! 读取 SWOT 观测和 SoS 流量估计，向 SoS 文件追加先验参数。
//!
//! # 功能
//!
//! - 按 `group/variable` 路径读取变量
//! - `_FillValue` 与 NaN 解码为缺测
//! - 追加模式写出标量、逐节点变量与全局属性
//!
//! # 依赖
//!
//! 需要启用 `netcdf` feature 并安装 NetCDF 库。

mod driver;
mod error;

pub use driver::*;
pub use error::*;
