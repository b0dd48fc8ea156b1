// apps/mh_cli/src/commands/validate.rs

//! 算例验证命令
//!
//! 检查算例文件能否解析、网格能否生成、界面属性能否构造，并汇总配置诊断。

use anyhow::{bail, Result};
use clap::Args;
use mh_config::{CaseConfig, Severity};
use mh_multiphase::{InterfaceProperties, ModelSelectors};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::case;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MariHydro 算例验证 ===");

    let Some(path) = &args.case else {
        println!("用法: mh_cli validate --case <算例文件> [--strict]");
        return Ok(());
    };
    println!("\n检查算例文件: {}", path.display());

    let mut result = ValidationResult::default();
    if !path.exists() {
        result.add_error(format!("算例文件不存在: {}", path.display()));
    } else {
        match CaseConfig::from_file(path) {
            Ok(config) => {
                println!("  ✓ 算例文件格式有效");
                validate_case(&config, &mut result);
            }
            Err(e) => result.add_error(format!("算例文件无效: {e}")),
        }
    }

    print_validation_result(&result, args.strict)
}

fn validate_case(config: &CaseConfig, result: &mut ValidationResult) {
    let mut db = match case::build_fields(config) {
        Ok(db) => db,
        Err(e) => {
            result.add_error(format!("{e:#}"));
            return;
        }
    };
    println!("  ✓ 网格与字段有效 ({} 单元)", db.mesh().n_cells());

    let transport = match config.transport_dictionary() {
        Ok(dict) => dict,
        Err(e) => {
            result.add_error(format!("transportProperties 无效: {e}"));
            return;
        }
    };

    match InterfaceProperties::new(
        transport.clone(),
        &mut db,
        config.alpha_name.clone(),
        config.velocity_name.clone(),
        ModelSelectors::standard(),
    ) {
        Ok(props) => println!("  ✓ 曲率模型 {} 可用", props.curvature_model().type_name()),
        Err(e) => result.add_error(e.to_string()),
    }

    for diagnostic in transport.diagnostics() {
        if diagnostic.severity == Severity::Warning {
            result.add_warning(format!("{}: {}", diagnostic.dict, diagnostic.message));
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
