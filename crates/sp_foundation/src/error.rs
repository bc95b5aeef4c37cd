// crates/sp_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `SpError` 枚举和 `SpResult` 类型别名。
//! 数据无效 (观测不足) 不是错误，由验证器返回的报告表达；
//! 这里只描述真正的失败：无效输入、形状不一致、索引越界、没有河段。
//!
//! # 示例
//!
//! ```
//! use sp_foundation::error::{SpError, SpResult};
//!
//! fn check_workers(n: usize) -> SpResult<()> {
//!     sp_foundation::ensure!(n > 0, SpError::invalid_input("worker count must be positive"));
//!     Ok(())
//! }
//!
//! assert!(check_workers(0).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type SpResult<T> = Result<T, SpError>;

/// SOS Priors 错误类型
#[derive(Error, Debug)]
pub enum SpError {
    // ========================================================================
    // 数据相关错误
    // ========================================================================

    /// 无效输入
    #[error("invalid input: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("size mismatch: {name} expected {expected}, got {actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("index out of bounds: {index_type} index {index} outside 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 没有可处理的河段
    #[error("no reaches found in {path}")]
    NoReaches {
        /// 扫描的目录
        path: PathBuf,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl SpError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 目录中没有河段
    pub fn no_reaches(path: impl Into<PathBuf>) -> Self {
        Self::NoReaches { path: path.into() }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl SpError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> SpResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> SpResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
