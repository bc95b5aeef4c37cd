// crates/sp_foundation/src/lib.rs

//! SOS Priors Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型和填充值约定。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `SpError`
//! - [`fill`]: 项目哨兵值 (fill value) 与外部引擎缺测标记
//!
//! # 示例
//!
//! ```
//! use sp_foundation::{fill, SpError, SpResult};
//!
//! fn first(values: &[f64]) -> SpResult<f64> {
//!     values
//!         .first()
//!         .copied()
//!         .ok_or_else(|| SpError::invalid_input("empty sequence"))
//! }
//!
//! assert_eq!(first(&[fill::FILL_VALUE]).unwrap(), -9999.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fill;

// 重导出常用类型
pub use error::{SpError, SpResult};
pub use fill::{engine_missing, is_engine_missing, FILL_VALUE};
