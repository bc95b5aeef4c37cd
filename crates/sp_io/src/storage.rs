// crates/sp_io/src/storage.rs

//! 河段存储后端
//!
//! 提供河段观测读取与先验写出的抽象和实现。

use crate::discovery::scan_reach_ids;
use crate::drivers::{NetCdfError, NetCdfReader, NetCdfWriter};
use crate::error::{IoError, IoResult};
use parking_lot::RwLock;
use sp_config::{FileLayout, VariableNames};
use sp_core::observation::{FlowEstimate, ObservationMatrix, ReachObservations};
use sp_core::output::PersistedOutput;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// 存储后端trait
pub trait ReachStore: Send + Sync {
    /// 列出所有河段
    fn reach_ids(&self) -> IoResult<BTreeSet<String>>;

    /// 读取河段观测
    fn load(&self, reach: &str) -> IoResult<ReachObservations>;

    /// 写出先验记录
    fn persist(&self, reach: &str, output: &PersistedOutput) -> IoResult<()>;
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    inputs: RwLock<HashMap<String, ReachObservations>>,
    outputs: RwLock<HashMap<String, PersistedOutput>>,
}

impl MemoryStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加河段观测
    pub fn insert_reach(&self, reach: impl Into<String>, observations: ReachObservations) {
        self.inputs.write().insert(reach.into(), observations);
    }

    /// 已写出的记录
    pub fn output(&self, reach: &str) -> Option<PersistedOutput> {
        self.outputs.read().get(reach).cloned()
    }

    /// 已写出记录数量
    pub fn output_count(&self) -> usize {
        self.outputs.read().len()
    }
}

impl ReachStore for MemoryStore {
    fn reach_ids(&self) -> IoResult<BTreeSet<String>> {
        Ok(self.inputs.read().keys().cloned().collect())
    }

    fn load(&self, reach: &str) -> IoResult<ReachObservations> {
        self.inputs
            .read()
            .get(reach)
            .cloned()
            .ok_or_else(|| IoError::reach_not_found(reach))
    }

    fn persist(&self, reach: &str, output: &PersistedOutput) -> IoResult<()> {
        if !self.inputs.read().contains_key(reach) {
            return Err(IoError::reach_not_found(reach));
        }
        self.outputs.write().insert(reach.to_string(), output.clone());
        Ok(())
    }
}

/// NetCDF 文件存储
///
/// 每个河段对应一对文件：观测文件（只读）与参考文件（追加写出）。
#[derive(Debug, Clone)]
pub struct NetCdfStore {
    dir: PathBuf,
    layout: FileLayout,
    variables: VariableNames,
}

impl NetCdfStore {
    /// 创建存储（未启用 `netcdf` feature 时返回 NotAvailable）
    pub fn new(dir: impl Into<PathBuf>, layout: FileLayout, variables: VariableNames) -> IoResult<Self> {
        let dir = dir.into();
        if !cfg!(feature = "netcdf") {
            return Err(IoError::netcdf(dir, NetCdfError::NotAvailable));
        }
        Ok(Self {
            dir,
            layout,
            variables,
        })
    }

    /// 数据目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_matrix(&self, reader: &NetCdfReader, path: &Path, variable: &str) -> IoResult<ObservationMatrix> {
        let raw = reader.read(variable).map_err(|e| IoError::netcdf(path, e))?;
        match raw.dims.as_slice() {
            &[n_nodes, n_times] => Ok(ObservationMatrix::new(n_nodes, n_times, raw.decoded())?),
            dims => Err(IoError::data_shape(
                variable,
                format!("expected (nodes, times), found {:?}", dims),
            )),
        }
    }
}

impl ReachStore for NetCdfStore {
    fn reach_ids(&self) -> IoResult<BTreeSet<String>> {
        scan_reach_ids(&self.dir, &self.layout)
    }

    fn load(&self, reach: &str) -> IoResult<ReachObservations> {
        let swot_path = self.layout.swot_path(&self.dir, reach);
        let sos_path = self.layout.sos_path(&self.dir, reach);
        if !swot_path.exists() || !sos_path.exists() {
            return Err(IoError::reach_not_found(reach));
        }

        let swot = NetCdfReader::open(&swot_path).map_err(|e| IoError::netcdf(&swot_path, e))?;
        let width = self.read_matrix(&swot, &swot_path, &self.variables.width)?;
        let d_x_area = self.read_matrix(&swot, &swot_path, &self.variables.d_x_area)?;
        let slope = self.read_matrix(&swot, &swot_path, &self.variables.slope)?;

        let sos = NetCdfReader::open(&sos_path).map_err(|e| IoError::netcdf(&sos_path, e))?;
        let qhat = sos
            .read(&self.variables.qhat)
            .map_err(|e| IoError::netcdf(&sos_path, e))?;
        let flow = FlowEstimate::from_stored(qhat.decoded(), width.n_times())?;

        log::debug!(
            "loaded {reach}: {} nodes x {} times",
            width.n_nodes(),
            width.n_times()
        );
        Ok(ReachObservations::new(width, d_x_area, slope, flow)?)
    }

    fn persist(&self, reach: &str, output: &PersistedOutput) -> IoResult<()> {
        let sos_path = self.layout.sos_path(&self.dir, reach);
        let mut writer = NetCdfWriter::append(&sos_path).map_err(|e| IoError::netcdf(&sos_path, e))?;
        writer
            .write_output(
                output,
                &self.variables.output_group,
                &[self.variables.qhat.as_str(), self.variables.qsd.as_str()],
            )
            .map_err(|e| IoError::netcdf(&sos_path, e))?;

        log::debug!("wrote priors for {reach} (valid = {})", output.valid_flag());
        Ok(())
    }
}
