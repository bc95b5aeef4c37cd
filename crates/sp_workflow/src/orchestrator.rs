// crates/sp_workflow/src/orchestrator.rs

//! 河段处理流水线
//!
//! 单个河段的状态转换：
//!
//! ```text
//! Loaded → Validated ─┬─→ Unusable ──────────────────→ Persisted
//!                     └─→ Computed → Reconciled ─────→ Persisted
//! ```
//!
//! 数据不足不是错误，写出全哨兵记录并计为无效；
//! 读写失败和引擎失败使河段进入失败列表，运行继续。

use sp_config::RunConfig;
use sp_core::engine::{EngineError, EngineInput, PriorEngine};
use sp_core::output::{OutputWriter, PersistedOutput};
use sp_core::validator::{ObservationValidator, Screening, UnusableReason, ValidatorConfig};
use sp_foundation::SpError;
use sp_io::{IoError, ReachStore};
use std::fmt;
use thiserror::Error;

/// 河段处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachState {
    /// 已读取
    Loaded,
    /// 已验证
    Validated,
    /// 数据不足
    Unusable,
    /// 引擎已计算
    Computed,
    /// 已还原索引
    Reconciled,
    /// 已写出
    Persisted,
}

impl fmt::Display for ReachState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReachState::Loaded => "loaded",
            ReachState::Validated => "validated",
            ReachState::Unusable => "unusable",
            ReachState::Computed => "computed",
            ReachState::Reconciled => "reconciled",
            ReachState::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// 河段处理错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 读写失败
    #[error("IO error for reach {reach}: {source}")]
    Io {
        /// 河段 ID
        reach: String,
        /// 底层错误
        #[source]
        source: IoError,
    },

    /// 引擎失败
    #[error("engine error for reach {reach}: {source}")]
    Engine {
        /// 河段 ID
        reach: String,
        /// 底层错误
        #[source]
        source: EngineError,
    },

    /// 索引还原失败
    #[error("reconcile error for reach {reach}: {source}")]
    Reconcile {
        /// 河段 ID
        reach: String,
        /// 底层错误
        #[source]
        source: SpError,
    },
}

impl PipelineError {
    /// 出错的河段
    pub fn reach(&self) -> &str {
        match self {
            PipelineError::Io { reach, .. }
            | PipelineError::Engine { reach, .. }
            | PipelineError::Reconcile { reach, .. } => reach,
        }
    }
}

/// 单个河段的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachOutcome {
    /// 计算并写出了先验
    Valid,
    /// 数据不足，写出了哨兵记录
    Invalid(UnusableReason),
}

/// 一次运行的汇总
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 有效河段
    pub valid: Vec<String>,
    /// 无效河段
    pub invalid: Vec<String>,
    /// 失败河段
    pub failed: Vec<PipelineError>,
}

impl RunSummary {
    /// 记录一个河段的结果
    pub fn record(mut self, reach: &str, result: Result<ReachOutcome, PipelineError>) -> Self {
        match result {
            Ok(ReachOutcome::Valid) => self.valid.push(reach.to_string()),
            Ok(ReachOutcome::Invalid(_)) => self.invalid.push(reach.to_string()),
            Err(err) => self.failed.push(err),
        }
        self
    }

    /// 已处理的河段总数
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len() + self.failed.len()
    }

    /// 是否有失败河段
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// 流水线参数
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSettings {
    /// 验证器
    pub validator: ObservationValidator,
    /// 写出记录构建器
    pub writer: OutputWriter,
}

impl From<&RunConfig> for PipelineSettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            validator: ObservationValidator::new(ValidatorConfig {
                min_valid: config.min_valid,
            }),
            writer: OutputWriter::new(config.sentinel),
        }
    }
}

/// 河段流水线
pub struct PipelineOrchestrator<'a> {
    store: &'a dyn ReachStore,
    engine: &'a dyn PriorEngine,
    settings: PipelineSettings,
}

impl<'a> PipelineOrchestrator<'a> {
    /// 创建流水线
    pub fn new(store: &'a dyn ReachStore, engine: &'a dyn PriorEngine, settings: PipelineSettings) -> Self {
        Self {
            store,
            engine,
            settings,
        }
    }

    /// 按顺序处理河段
    pub fn run<I, S>(&self, reaches: I) -> RunSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        reaches.into_iter().fold(RunSummary::default(), |summary, reach| {
            let reach = reach.as_ref();
            let result = self.process_reach(reach);
            if let Err(err) = &result {
                tracing::warn!("{}", err);
            }
            summary.record(reach, result)
        })
    }

    /// 处理单个河段
    pub fn process_reach(&self, reach: &str) -> Result<ReachOutcome, PipelineError> {
        let observations = self.store.load(reach).map_err(|source| PipelineError::Io {
            reach: reach.to_string(),
            source,
        })?;
        tracing::debug!(
            reach,
            state = %ReachState::Loaded,
            nodes = observations.n_nodes(),
            times = observations.n_times()
        );

        let input = match self.settings.validator.screen(observations) {
            Screening::Unusable {
                reason,
                original_nodes,
            } => {
                tracing::debug!(reach, state = %ReachState::Unusable, %reason);
                let output = self.settings.writer.abandoned(original_nodes);
                self.persist(reach, &output)?;
                return Ok(ReachOutcome::Invalid(reason));
            }
            Screening::Usable(input) => input,
        };
        tracing::debug!(
            reach,
            state = %ReachState::Validated,
            dropped_nodes = input.invalid_nodes.len(),
            dropped_times = input.invalid_times.len()
        );

        let record = self
            .engine
            .estimate_priors(&EngineInput::from(&input))
            .map_err(|source| PipelineError::Engine {
                reach: reach.to_string(),
                source,
            })?;
        tracing::debug!(reach, state = %ReachState::Computed, engine = self.engine.name());

        let output = self
            .settings
            .writer
            .computed(&record, &input.invalid_nodes, input.original_nodes)
            .map_err(|source| PipelineError::Reconcile {
                reach: reach.to_string(),
                source,
            })?;
        tracing::debug!(reach, state = %ReachState::Reconciled);

        self.persist(reach, &output)?;
        Ok(ReachOutcome::Valid)
    }

    fn persist(&self, reach: &str, output: &PersistedOutput) -> Result<(), PipelineError> {
        self.store
            .persist(reach, output)
            .map_err(|source| PipelineError::Io {
                reach: reach.to_string(),
                source,
            })?;
        tracing::debug!(reach, state = %ReachState::Persisted, valid = output.valid_flag());
        Ok(())
    }
}
