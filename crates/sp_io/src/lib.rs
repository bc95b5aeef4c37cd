// crates/sp_io/src/lib.rs

//! SOS Priors IO 模块
//!
//! 提供河段数据的发现、读取与写出功能。
//!
//! # 模块
//!
//! - [`discovery`]: 扫描数据目录得到河段 ID
//! - [`drivers`]: NetCDF 读写驱动
//! - [`storage`]: 河段存储后端 (内存 / NetCDF)
//! - [`error`]: IO 错误类型
//!
//! # 可选依赖
//!
//! - `netcdf`: 启用 NetCDF 驱动
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use sp_io::storage::{NetCdfStore, ReachStore};
//!
//! let store = NetCdfStore::new("/data", layout, variables)?;
//! for reach in store.reach_ids()? {
//!     let observations = store.load(&reach)?;
//! }
//! ```

#![warn(missing_docs)]

pub mod discovery;
pub mod drivers;
pub mod error;
pub mod storage;

// 重导出常用类型
pub use discovery::{reach_id_from_file_name, scan_reach_ids};
pub use drivers::{NetCdfError, NetCdfReader, NetCdfWriter, RawVariable};
pub use error::{IoError, IoResult};
pub use storage::{MemoryStore, NetCdfStore, ReachStore};
