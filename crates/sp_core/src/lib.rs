// crates/sp_core/src/lib.rs

//! SOS Priors Core Layer
//!
//! 核心算法层：观测矩阵、数据充分性验证、索引还原、河段分配、
//! 先验字段目录、外部引擎接口与写出记录构建。
//!
//! 本层不做文件 IO，所有输入都以内存结构传入。
//!
//! # 模块概览
//!
//! - [`observation`]: 观测矩阵与流量估计
//! - [`validator`]: 负值清洗、充分性检查、删除集合计算
//! - [`reconcile`]: 裁剪序列还原到原始索引空间
//! - [`partition`]: 河段 → 工作者分配
//! - [`priors`]: 先验字段目录与先验记录
//! - [`engine`]: 外部统计引擎接口
//! - [`output`]: 写出记录构建

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod observation;
pub mod output;
pub mod partition;
pub mod priors;
pub mod reconcile;
pub mod validator;

pub use engine::{CommandEngine, EngineError, EngineInput, PriorEngine};
pub use observation::{FlowEstimate, ObservationKind, ObservationMatrix, ReachObservations};
pub use output::{OutputWriter, PersistedOutput};
pub use partition::{partition, ReachAssignment};
pub use priors::{PriorField, PriorRecord, RIVER_TYPE, SCALAR_FIELDS};
pub use reconcile::IndexReconciler;
pub use validator::{
    ObservationValidator, Screening, UnusableReason, ValidatedInput, ValidatorConfig,
    ValidityReport,
};
