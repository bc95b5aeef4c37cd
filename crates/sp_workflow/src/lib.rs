// crates/sp_workflow/src/lib.rs

//! SOS Priors 工作流模块
//!
//! 把核心算法和存储组合成一次完整的运行。
//!
//! # 模块结构
//!
//! - [`collective`]: 工作者组（单成员 / 进程内线程组）
//! - [`orchestrator`]: 单河段流水线与结果汇总
//! - [`runner`]: 引导、分配、运行与运行报告
//!
//! # 示例
//!
//! ```rust,ignore
//! use sp_workflow::{run_local, PipelineSettings};
//!
//! let reports = run_local(&store, &engine, PipelineSettings::from(&config), 4)?;
//! for report in &reports {
//!     report.write_log(&config.log_dir)?;
//! }
//! ```

#![warn(missing_docs)]

pub mod collective;
pub mod orchestrator;
pub mod runner;

// 重导出核心类型
pub use collective::{Collective, SoloGroup, ThreadGroup, ROOT};
pub use orchestrator::{
    PipelineError, PipelineOrchestrator, PipelineSettings, ReachOutcome, ReachState, RunSummary,
};
pub use runner::{bootstrap, run_local, run_member, RunReport, RunnerError};
