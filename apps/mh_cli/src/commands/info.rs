// apps/mh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示可按名称选择的模型类型、缺省算例与网格统计。

use anyhow::Result;
use clap::Args;
use mh_config::CaseConfig;
use mh_multiphase::ModelSelectors;
use std::path::PathBuf;
use tracing::info;

use crate::case;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 算例文件路径（显示其网格统计）
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 显示可选模型
    #[arg(long)]
    pub models: bool,

    /// 显示缺省算例
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== MariHydro 信息 ===");

    if args.models {
        print_models();
    }

    if args.defaults {
        print_default_case()?;
    }

    if let Some(path) = &args.case {
        let config = case::load_config(Some(path.as_path()))?;
        let mesh = case::build_mesh(&config.mesh)?;
        println!("{}", mesh.statistics());
    }

    if args.case.is_none() && !args.models && !args.defaults {
        // 默认显示所有信息
        print_models();
        println!();
        print_default_case()?;
    }

    Ok(())
}

fn print_models() {
    println!("=== 可选模型 ===");
    println!("MariHydro CLI 版本: {}", env!("CARGO_PKG_VERSION"));

    let selectors = ModelSelectors::standard();
    println!("curvatureModel:  {}", selectors.curvature_models().names().join(", "));
    println!("smootherKernel:  {}", selectors.scalar_smoothers().names().join(", "));
    println!("weightFactor:    {}", selectors.weights().names().join(", "));
    println!("diracDeltaModel: {}", selectors.delta_models().names().join(", "));
}

fn print_default_case() -> Result<()> {
    println!("=== 缺省算例 ===");
    println!("{}", serde_json::to_string_pretty(&CaseConfig::default())?);
    Ok(())
}
