// crates/sp_config/src/lib.rs

//! SOS Priors Config Layer
//!
//! 运行配置层：哨兵值、最小有效观测数、文件命名约定、变量路径、
//! 工作者数量与外部引擎命令。配置以 JSON 存储，所有字段均有默认值。
//!
//! # 模块概览
//!
//! - [`run_config`]: `RunConfig` 及其子配置
//! - [`error`]: 配置错误类型

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod run_config;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "SOS_PRIORS_CONFIG";

// 重导出核心类型
pub use error::ConfigError;
pub use run_config::{EngineConfig, FileLayout, RunConfig, VariableNames};
