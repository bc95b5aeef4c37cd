// crates/sp_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 基础层的 SpError 通过 `?` 转换为 `IoError::Foundation`。

use crate::drivers::NetCdfError;
use sp_foundation::SpError;
use std::path::PathBuf;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 河段不存在
    #[error("reach not found: {reach}")]
    ReachNotFound {
        /// 河段 ID
        reach: String,
    },

    /// 目录扫描失败
    #[error("failed to scan {path}: {source}")]
    ScanFailed {
        /// 目录
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// NetCDF 读写失败
    #[error("{path}: {source}")]
    NetCdf {
        /// 文件
        path: PathBuf,
        /// 底层错误
        #[source]
        source: NetCdfError,
    },

    /// 变量形状不符合约定
    #[error("unexpected shape for {variable}: {message}")]
    DataShape {
        /// 变量路径
        variable: String,
        /// 说明
        message: String,
    },

    /// 基础层错误转换
    #[error(transparent)]
    Foundation(#[from] SpError),
}

impl IoError {
    /// 河段不存在
    pub fn reach_not_found(reach: impl Into<String>) -> Self {
        Self::ReachNotFound {
            reach: reach.into(),
        }
    }

    /// NetCDF 错误
    pub fn netcdf(path: impl Into<PathBuf>, source: NetCdfError) -> Self {
        Self::NetCdf {
            path: path.into(),
            source,
        }
    }

    /// 形状错误
    pub fn data_shape(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataShape {
            variable: variable.into(),
            message: message.into(),
        }
    }
}
