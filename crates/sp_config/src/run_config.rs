// crates/sp_config/src/run_config.rs

//! RunConfig - 批处理运行配置
//!
//! 描述一次先验参数追加运行所需的全部参数。字段全部带默认值，
//! 一个空 JSON 对象 `{}` 即为合法配置。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// 哨兵值（持久化中唯一的"未知"表示）
    #[serde(default = "default_sentinel")]
    pub sentinel: f64,

    /// 有效观测数阈值：时间步 / 节点至少需要的有效值个数
    #[serde(default = "default_min_valid")]
    pub min_valid: usize,

    /// 工作者数量 (0 = 自动)
    #[serde(default)]
    pub workers: usize,

    /// 每个工作者日志的输出目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// 文件命名约定
    #[serde(default)]
    pub files: FileLayout,

    /// 变量路径
    #[serde(default)]
    pub variables: VariableNames,

    /// 外部统计引擎
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_sentinel() -> f64 { -9999.0 }
fn default_min_valid() -> usize { 5 }
fn default_log_dir() -> PathBuf { PathBuf::from(".") }

/// 文件命名约定
///
/// 文件名形如 `74230900181_1_SWOT.nc`，前 `id_fields` 个以 `_` 分隔的
/// 字段组成河段 ID。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLayout {
    /// 卫星观测文件后缀
    #[serde(default = "default_swot_suffix")]
    pub swot_suffix: String,

    /// 参考 (SoS) 文件后缀，同时也是输出文件
    #[serde(default = "default_sos_suffix")]
    pub sos_suffix: String,

    /// 组成河段 ID 的字段数
    #[serde(default = "default_id_fields")]
    pub id_fields: usize,
}

fn default_swot_suffix() -> String { "_SWOT.nc".to_string() }
fn default_sos_suffix() -> String { "_SOS.nc".to_string() }
fn default_id_fields() -> usize { 2 }

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            swot_suffix: default_swot_suffix(),
            sos_suffix: default_sos_suffix(),
            id_fields: default_id_fields(),
        }
    }
}

impl FileLayout {
    /// 河段的卫星观测文件路径
    pub fn swot_path(&self, dir: &Path, reach: &str) -> PathBuf {
        dir.join(format!("{reach}{}", self.swot_suffix))
    }

    /// 河段的参考 / 输出文件路径
    pub fn sos_path(&self, dir: &Path, reach: &str) -> PathBuf {
        dir.join(format!("{reach}{}", self.sos_suffix))
    }
}

/// 变量路径（`组/变量`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableNames {
    /// 节点宽度
    #[serde(default = "default_width")]
    pub width: String,
    /// 节点过水断面面积变化
    #[serde(default = "default_d_x_area")]
    pub d_x_area: String,
    /// 节点坡度
    #[serde(default = "default_slope")]
    pub slope: String,
    /// 河段流量估计
    #[serde(default = "default_qhat")]
    pub qhat: String,
    /// 河段流量估计不确定度
    #[serde(default = "default_qsd")]
    pub qsd: String,
    /// 写入先验参数的组
    #[serde(default = "default_output_group")]
    pub output_group: String,
}

fn default_width() -> String { "node/width".to_string() }
fn default_d_x_area() -> String { "node/d_x_area".to_string() }
fn default_slope() -> String { "node/slope2".to_string() }
fn default_qhat() -> String { "reach/Qhat".to_string() }
fn default_qsd() -> String { "reach/Qsd".to_string() }
fn default_output_group() -> String { "reach".to_string() }

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            width: default_width(),
            d_x_area: default_d_x_area(),
            slope: default_slope(),
            qhat: default_qhat(),
            qsd: default_qsd(),
            output_group: default_output_group(),
        }
    }
}

/// 外部统计引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 引擎可执行程序
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// 附加参数
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            min_valid: default_min_valid(),
            workers: 0,
            log_dir: default_log_dir(),
            files: FileLayout::default(),
            variables: VariableNames::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl RunConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: RunConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sentinel.is_finite() {
            return Err(ConfigError::invalid(
                "sentinel",
                self.sentinel,
                "sentinel must be a finite number",
            ));
        }

        if self.sentinel >= 0.0 {
            return Err(ConfigError::invalid(
                "sentinel",
                self.sentinel,
                "sentinel must lie outside the physical (non-negative) range",
            ));
        }

        if self.min_valid == 0 {
            return Err(ConfigError::invalid("min_valid", self.min_valid, "must be positive"));
        }

        if self.files.id_fields == 0 {
            return Err(ConfigError::invalid(
                "files.id_fields",
                self.files.id_fields,
                "must be positive",
            ));
        }

        if self.files.swot_suffix == self.files.sos_suffix {
            return Err(ConfigError::invalid(
                "files.sos_suffix",
                &self.files.sos_suffix,
                "must differ from files.swot_suffix",
            ));
        }

        Ok(())
    }

    /// 实际使用的工作者数量
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sentinel, -9999.0);
        assert_eq!(config.min_valid, 5);
        assert_eq!(config.variables.slope, "node/slope2");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.files.swot_suffix, "_SWOT.nc");
        assert_eq!(config.files.id_fields, 2);
        assert!(config.engine.command.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = RunConfig::default();
        config.min_valid = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.sentinel = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.files.sos_suffix = config.files.swot_suffix.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths() {
        let layout = FileLayout::default();
        let dir = Path::new("/data");
        assert_eq!(layout.swot_path(dir, "001_1"), PathBuf::from("/data/001_1_SWOT.nc"));
        assert_eq!(layout.sos_path(dir, "001_1"), PathBuf::from("/data/001_1_SOS.nc"));
    }

    #[test]
    fn test_resolved_workers() {
        let mut config = RunConfig::default();
        config.workers = 3;
        assert_eq!(config.resolved_workers(), 3);
        config.workers = 0;
        assert!(config.resolved_workers() >= 1);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let mut config = RunConfig::default();
        config.workers = 4;
        config.engine.command = Some(PathBuf::from("/usr/bin/geobam-priors"));
        config.save_to_file(&path).unwrap();

        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded.workers, 4);
        assert_eq!(loaded.engine.command, config.engine.command);
    }
}
