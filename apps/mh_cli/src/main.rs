// apps/mh_cli/src/main.rs

//! MariHydro 命令行界面
//!
//! 由 JSON 算例文件构造盒子网格、体积分数场与 `transportProperties`，
//! 计算界面曲率并报告统计信息。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：
//! - 只依赖 `CaseConfig` 与 `InterfaceProperties` 的公开接口
//! - 模型通过 `ModelSelectors` 按名称选择

mod case;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MariHydro 界面曲率命令行工具
#[derive(Parser)]
#[command(name = "mh_cli")]
#[command(author = "MariHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MariHydro VOF interface curvature driver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 计算界面曲率
    Run(commands::run::RunArgs),
    /// 显示可选模型与缺省算例
    Info(commands::info::InfoArgs),
    /// 验证算例文件
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志（同时接收库 crate 的 log 记录）
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("初始化日志失败: {e}"))?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
