// apps/mh_cli/src/commands/run.rs

//! 曲率计算命令
//!
//! 构造算例，调用 `InterfaceProperties::correct()` 若干次，报告曲率统计。
//! 对圆与球初始化同时报告界面带内平均曲率相对精确值的误差。

use anyhow::{Context, Result};
use clap::Args;
use mh_multiphase::{FieldRegistry, InterfaceProperties, ModelSelectors};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::case;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 输出目录（覆盖算例文件）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 曲率计算总次数，含构造时的一次（覆盖算例文件，至少为 1）
    #[arg(long)]
    pub corrections: Option<usize>,

    /// 写出单元场 CSV
    #[arg(long)]
    pub write_fields: bool,
}

/// 曲率统计
struct CurvatureSummary {
    k_min: f64,
    k_max: f64,
    band_cells: usize,
    band_mean: f64,
}

impl CurvatureSummary {
    fn compute(props: &InterfaceProperties, db: &FieldRegistry) -> Result<Self> {
        let near = props.near_interface(db)?;
        let k = props.k();
        let (mut sum, mut count) = (0.0, 0);
        for (&ki, &flag) in k.internal().iter().zip(near.internal()) {
            if flag > 0.0 {
                sum += ki;
                count += 1;
            }
        }
        Ok(Self {
            k_min: k.min(),
            k_max: k.max(),
            band_cells: count,
            band_mean: if count > 0 { sum / count as f64 } else { 0.0 },
        })
    }
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MariHydro 界面曲率计算 ===");

    let mut config = case::load_config(args.case.as_deref())?;
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    if let Some(n) = args.corrections {
        config.corrections = n;
    }
    config.output.write_fields |= args.write_fields;
    config.validate().context("算例参数无效")?;

    let mut db = case::build_fields(&config)?;
    let transport = config.transport_dictionary()?;

    let start = Instant::now();
    let mut props = InterfaceProperties::new(
        transport,
        &mut db,
        config.alpha_name.clone(),
        config.velocity_name.clone(),
        ModelSelectors::standard(),
    )
    .context("构造界面属性失败")?;
    info!(
        "曲率模型: {}, deltaN = {:.3e}, cAlpha = {}",
        props.curvature_model().type_name(),
        props.delta_n(),
        props.c_alpha()
    );

    // 构造时已完成第一次计算
    for i in 1..config.corrections {
        props.correct(&mut db).with_context(|| format!("第 {} 次曲率计算失败", i + 1))?;
    }
    let elapsed = start.elapsed();

    let alpha_mean = db.scalar(props.alpha_name())?.weighted_mean(db.mesh());
    info!("{} 体积平均 = {alpha_mean:.6}", props.alpha_name());

    let summary = CurvatureSummary::compute(&props, &db)?;
    info!("K: min = {:.6e}, max = {:.6e}", summary.k_min, summary.k_max);
    info!(
        "界面带: {} 单元, 平均 K = {:.6e}",
        summary.band_cells, summary.band_mean
    );
    if let Some(exact) = case::exact_curvature(&config.alpha) {
        let error = (summary.band_mean - exact).abs() / exact;
        info!("精确曲率 = {exact:.6e}, 相对误差 = {:.3}%", error * 100.0);
    }

    let force = props.surface_tension_force(&db)?;
    let f_max = force.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    info!("表面张力面通量 max|f| = {f_max:.6e}");

    let warnings = props.transport().warnings();
    if !warnings.is_empty() {
        warn!("transportProperties 产生 {} 条警告", warnings.len());
    }

    if config.output.write_fields {
        std::fs::create_dir_all(&config.output.directory)?;
        let path = config.output.directory.join("fields.csv");
        write_fields(&path, &props, &db)?;
        info!("单元场已写出: {}", path.display());
    }

    info!("=== 计算完成 ({:.3} s) ===", elapsed.as_secs_f64());
    Ok(())
}

/// 写出单元中心、体积分数、曲率与界面指示场
fn write_fields(path: &Path, props: &InterfaceProperties, db: &FieldRegistry) -> Result<()> {
    let mesh = db.mesh();
    let alpha = db.scalar(props.alpha_name())?;
    let near = props.near_interface(db)?;
    let file = File::create(path).with_context(|| format!("无法创建 {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "x,y,z,alpha,K,nearInterface")?;
    for (c, centre) in mesh.cell_centres().iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            centre.x,
            centre.y,
            centre.z,
            alpha.internal()[c],
            props.k().internal()[c],
            near.internal()[c]
        )?;
    }
    out.flush()?;
    Ok(())
}
