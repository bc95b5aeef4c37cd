// apps/sp_cli/src/commands/run.rs

//! 运行命令
//!
//! 扫描数据目录，分配河段，逐河段估计先验并写出，最后写出 `<rank>.log`。

use anyhow::{bail, Context, Result};
use sp_config::{RunConfig, CONFIG_ENV};
use sp_core::engine::CommandEngine;
use sp_io::NetCdfStore;
use sp_workflow::{run_local, PipelineSettings};
use std::path::PathBuf;
use tracing::info;

/// 执行运行命令
pub fn execute(data_dir: PathBuf) -> Result<()> {
    let config = load_config()?;

    let program = config
        .engine
        .command
        .clone()
        .with_context(|| format!("no engine command configured (set engine.command in ${CONFIG_ENV})"))?;
    let engine = CommandEngine::new(program, config.engine.args.clone());

    let store = NetCdfStore::new(&data_dir, config.files.clone(), config.variables.clone())
        .context("cannot open reach store")?;

    let workers = config.resolved_workers();
    info!("processing {} with {} workers", data_dir.display(), workers);

    let reports = run_local(&store, &engine, PipelineSettings::from(&config), workers)
        .with_context(|| format!("run over {} failed", data_dir.display()))?;

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("cannot create log directory {}", config.log_dir.display()))?;

    let mut failed = 0;
    for report in &reports {
        let path = report.write_log(&config.log_dir)?;
        info!("rank {} log written to {}", report.rank, path.display());
        failed += report.summary.failed.len();
    }

    if failed > 0 {
        bail!("{failed} reaches failed, see the run logs in {}", config.log_dir.display());
    }
    Ok(())
}

fn load_config() -> Result<RunConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = RunConfig::from_file(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            info!("config loaded from {}", path.display());
            Ok(config)
        }
        None => Ok(RunConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(not(feature = "netcdf"), ignore = "built without the netcdf feature")]
    fn test_default_build_opens_reach_store() {
        let config = RunConfig::default();
        assert!(NetCdfStore::new(".", config.files, config.variables).is_ok());
    }
}
