// crates/sp_core/src/engine.rs

//! 外部统计引擎接口
//!
//! 引擎是一个纯函数：裁剪后的观测 → 先验记录（或失败）。
//! 核心逻辑只依赖 [`PriorEngine`] trait，测试中可以用假引擎替换。
//!
//! [`CommandEngine`] 通过子进程调用外部程序：输入以 JSON 写入 stdin，
//! 先验记录以 JSON 从 stdout 读回。响应中的 `null` 解码为引擎缺测标记，
//! 由 [`crate::reconcile`] 在写出前统一替换。

use crate::observation::ObservationMatrix;
use crate::priors::PriorRecord;
use crate::validator::ValidatedInput;
use serde::{Deserialize, Serialize};
use sp_foundation::engine_missing;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// 引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    /// 无法启动引擎进程
    #[error("failed to launch engine {program}: {source}")]
    Launch {
        /// 程序路径
        program: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 引擎异常退出
    #[error("engine exited with {status}: {stderr}")]
    Failed {
        /// 退出状态
        status: String,
        /// 标准错误输出
        stderr: String,
    },

    /// 输入 / 输出编码错误
    #[error("engine protocol error: {0}")]
    Protocol(String),

    /// 响应缺少字段
    #[error("engine response is missing field '{0}'")]
    MissingField(&'static str),

    /// 响应中的逐节点序列长度不符
    #[error("engine returned {actual} river types for {expected} nodes")]
    Shape {
        /// 期望长度（保留节点数）
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 计算错误
    #[error("computation error: {0}")]
    Computation(String),
}

/// 引擎输入（行主序，缺测为 NaN）
#[derive(Debug, Clone, Serialize)]
pub struct EngineInput {
    /// 节点数
    pub n_nodes: usize,
    /// 时间步数
    pub n_times: usize,
    /// 宽度
    pub width: Vec<f64>,
    /// 坡度
    pub slope: Vec<f64>,
    /// 过水断面面积变化
    pub d_x_area: Vec<f64>,
    /// 流量估计（每个时间步一个值）
    pub qhat: Vec<f64>,
    /// 流量估计复制到每个节点（行主序 `n_nodes × n_times`，每行等于 `qhat`）
    pub qhat_nodes: Vec<f64>,
}

impl From<&ValidatedInput> for EngineInput {
    fn from(input: &ValidatedInput) -> Self {
        let n_nodes = input.retained_nodes();
        let qhat = input.flow.to_vec();
        Self {
            n_nodes,
            n_times: input.retained_times(),
            width: input.width.to_row_major(),
            slope: input.slope.to_row_major(),
            d_x_area: input.d_x_area.to_row_major(),
            qhat_nodes: replicate_per_node(&qhat, n_nodes),
            qhat,
        }
    }
}

impl EngineInput {
    /// 行主序数据转为列主序
    pub fn column_major(&self, row_major: &[f64]) -> Vec<f64> {
        match ObservationMatrix::from_values(self.n_nodes, self.n_times, row_major) {
            Ok(matrix) => matrix.to_column_major(),
            Err(_) => Vec::new(),
        }
    }
}

/// 将逐时间步流量复制到每个节点
pub fn replicate_per_node(qhat: &[f64], n_nodes: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(qhat.len() * n_nodes);
    for _ in 0..n_nodes {
        out.extend_from_slice(qhat);
    }
    out
}

/// 先验估计引擎
pub trait PriorEngine: Send + Sync {
    /// 引擎名称
    fn name(&self) -> &str;

    /// 估计先验参数
    fn estimate_priors(&self, input: &EngineInput) -> Result<PriorRecord, EngineError>;
}

/// 引擎响应
#[derive(Debug, Deserialize)]
struct EngineResponse {
    river_type: Vec<Option<f64>>,
    priors: BTreeMap<String, Option<f64>>,
}

/// 解析引擎 JSON 响应
pub fn parse_response(json: &str, expected_nodes: usize) -> Result<PriorRecord, EngineError> {
    let response: EngineResponse =
        serde_json::from_str(json).map_err(|e| EngineError::Protocol(e.to_string()))?;

    if response.river_type.len() != expected_nodes {
        return Err(EngineError::Shape {
            expected: expected_nodes,
            actual: response.river_type.len(),
        });
    }

    let river_type = response
        .river_type
        .into_iter()
        .map(|v| v.unwrap_or_else(engine_missing))
        .collect();
    let scalars = response
        .priors
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_else(engine_missing)))
        .collect();

    PriorRecord::new(scalars, river_type).map_err(EngineError::MissingField)
}

/// 外部程序引擎
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    /// 创建
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl PriorEngine for CommandEngine {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("engine")
    }

    fn estimate_priors(&self, input: &EngineInput) -> Result<PriorRecord, EngineError> {
        let request =
            serde_json::to_vec(input).map_err(|e| EngineError::Protocol(e.to_string()))?;

        let launch_error = |source: std::io::Error| EngineError::Launch {
            program: self.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_error)?;

        // stdin 在独立线程写入，同时排空 stdout / stderr，避免管道写满互相等待
        let stdin = child.stdin.take();
        let request = request.as_slice();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(request),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let output = output.map_err(launch_error)?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(launch_error)?;

        log::debug!(
            "engine {} answered with {} bytes",
            self.program.display(),
            output.stdout.len()
        );
        parse_response(&String::from_utf8_lossy(&output.stdout), input.n_nodes)
    }
}
