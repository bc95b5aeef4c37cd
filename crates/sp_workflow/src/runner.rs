// crates/sp_workflow/src/runner.rs

//! 运行器模块
//!
//! 协调者扫描河段并分配，所有成员处理自己的河段，
//! 屏障同步后各自生成 `<rank>.log` 运行报告。

use crate::collective::{Collective, SoloGroup, ThreadGroup};
use crate::orchestrator::{PipelineOrchestrator, PipelineSettings, RunSummary};
use sp_core::engine::PriorEngine;
use sp_core::partition::{partition, ReachAssignment};
use sp_foundation::SpError;
use sp_io::{IoError, ReachStore};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// 运行器错误
#[derive(Debug, Error)]
pub enum RunnerError {
    /// 扫描失败
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// 引导失败（无河段、工作者数为零）
    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] SpError),

    /// 协调者未广播分配
    #[error("Coordinator did not broadcast a reach assignment")]
    NoAssignment,

    /// 运行日志写入失败
    #[error("Failed to write run log {path}: {source}")]
    Log {
        /// 日志路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },
}

/// 单个成员的运行报告
#[derive(Debug)]
pub struct RunReport {
    /// 成员编号
    pub rank: usize,
    /// 每个成员分得的河段数（仅协调者）
    pub distribution: Option<Vec<usize>>,
    /// 处理结果
    pub summary: RunSummary,
    /// 运行时长
    pub elapsed: Duration,
}

impl RunReport {
    /// 报告文本
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(counts) = &self.distribution {
            for (worker, count) in counts.iter().enumerate() {
                let _ = writeln!(out, "{}", reach_count_line(worker, *count));
            }
            let _ = writeln!(out, "{}", total_count_line(counts.iter().sum()));
        }

        // 河段列表以逗号连接写在一行，空列表为空行
        out.push_str("valid reaches:\n");
        let _ = writeln!(out, "{}", self.summary.valid.join(", "));
        let _ = writeln!(out, "total valid: {}", self.summary.valid.len());

        out.push_str("invalid reaches:\n");
        let _ = writeln!(out, "{}", self.summary.invalid.join(", "));
        let _ = writeln!(out, "total invalid: {}", self.summary.invalid.len());

        if self.summary.has_failures() {
            out.push_str("failed reaches:\n");
            for err in &self.summary.failed {
                let _ = writeln!(out, "{}: {err}", err.reach());
            }
            let _ = writeln!(out, "total failed: {}", self.summary.failed.len());
        }

        let _ = writeln!(out, "Run time: {:.3}", self.elapsed.as_secs_f64());
        out
    }

    /// 日志文件路径
    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.log", self.rank))
    }

    /// 写出 `<rank>.log`
    pub fn write_log(&self, dir: &Path) -> Result<PathBuf, RunnerError> {
        let path = self.log_path(dir);
        std::fs::write(&path, self.render()).map_err(|source| RunnerError::Log {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn reach_count_line(worker: usize, count: usize) -> String {
    format!("{worker}   Reach count:    {count}")
}

fn total_count_line(total: usize) -> String {
    format!("Total reach count: {total}")
}

/// 扫描并分配河段
pub fn bootstrap(store: &dyn ReachStore, worker_count: usize) -> Result<ReachAssignment, RunnerError> {
    let ids = store.reach_ids()?;
    if ids.is_empty() {
        return Err(SpError::no_reaches("reach store").into());
    }
    let assignment = partition(ids, worker_count)?;

    for (worker, reaches) in assignment.iter() {
        tracing::info!("{}", reach_count_line(worker, reaches.len()));
    }
    tracing::info!("{}", total_count_line(assignment.total()));
    Ok(assignment)
}

/// 运行一个成员
pub fn run_member(
    group: &dyn Collective,
    store: &dyn ReachStore,
    engine: &dyn PriorEngine,
    settings: PipelineSettings,
) -> Result<RunReport, RunnerError> {
    let start = Instant::now();

    let local = group.is_root().then(|| bootstrap(store, group.size()));
    let offered = match &local {
        Some(Ok(assignment)) => Some(assignment.clone()),
        _ => None,
    };
    let received = group.broadcast_assignment(offered);
    if let Some(Err(err)) = local {
        return Err(err);
    }
    let assignment = received.ok_or(RunnerError::NoAssignment)?;

    let reaches = assignment.for_worker(group.rank());
    tracing::info!(rank = group.rank(), "processing {} reaches", reaches.len());

    let summary = PipelineOrchestrator::new(store, engine, settings).run(reaches);
    group.barrier();

    let report = RunReport {
        rank: group.rank(),
        distribution: group
            .is_root()
            .then(|| assignment.iter().map(|(_, r)| r.len()).collect()),
        summary,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        rank = report.rank,
        valid = report.summary.valid.len(),
        invalid = report.summary.invalid.len(),
        failed = report.summary.failed.len(),
        "finished in {:.3}s",
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

/// 在本进程内以 `workers` 个成员运行，按编号返回报告
pub fn run_local(
    store: &dyn ReachStore,
    engine: &dyn PriorEngine,
    settings: PipelineSettings,
    workers: usize,
) -> Result<Vec<RunReport>, RunnerError> {
    if workers <= 1 {
        return Ok(vec![run_member(&SoloGroup, store, engine, settings)?]);
    }

    ThreadGroup::run(workers, |group| run_member(&group, store, engine, settings))
        .into_iter()
        .collect()
}
