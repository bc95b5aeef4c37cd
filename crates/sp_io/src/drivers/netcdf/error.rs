// crates/sp_io/src/drivers/netcdf/error.rs

//! NetCDF 错误类型

use thiserror::Error;

/// NetCDF 错误
#[derive(Debug, Error)]
pub enum NetCdfError {
    /// 文件不存在
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// 打开失败
    #[error("Failed to open file: {0}")]
    OpenFailed(String),
    /// 组不存在
    #[error("Group not found: {0}")]
    GroupNotFound(String),
    /// 维度不匹配
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// 变量不存在
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
    /// 读取失败
    #[error("Failed to read data: {0}")]
    ReadFailed(String),
    /// 写入失败
    #[error("Failed to write data: {0}")]
    WriteFailed(String),
    /// NetCDF 不可用
    #[error("NetCDF is not available")]
    NotAvailable,
    /// 其他错误
    #[error("NetCDF error: {0}")]
    Other(String),
}

#[cfg(feature = "netcdf")]
impl From<netcdf::error::Error> for NetCdfError {
    fn from(e: netcdf::error::Error) -> Self {
        NetCdfError::Other(e.to_string())
    }
}
