// apps/sp_cli/src/main.rs

//! SOS Priors 命令行界面
//!
//! 对数据目录中的每个河段估计地貌先验参数，结果追加写入河段的 SoS 文件。
//!
//! 日志级别由 `RUST_LOG` 控制（默认 `info`），
//! 运行配置由 `SOS_PRIORS_CONFIG` 指定的 JSON 文件提供（可选）。
//!
//! 默认启用 `netcdf` feature；以 `--no-default-features` 构建时
//! 无法打开河段文件，运行会以 NetCDF 不可用的错误退出。

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// SOS Priors 命令行工具
#[derive(Parser)]
#[command(name = "sp_cli")]
#[command(author = "SOS Priors Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Estimate geomorphic priors for SWOT river reaches", long_about = None)]
struct Cli {
    /// 数据目录（包含 `<reach>_SWOT.nc` 与 `<reach>_SOS.nc`）
    data_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()?;

    commands::run::execute(cli.data_dir)
}
