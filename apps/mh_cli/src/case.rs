// apps/mh_cli/src/case.rs

//! 由算例配置构造网格与字段

use anyhow::{Context, Result};
use glam::DVec3;
use mh_config::{AlphaInit, CaseConfig, MeshConfig};
use mh_mesh::generation::Side;
use mh_mesh::{BoxMeshBuilder, FvMesh, PatchKind};
use mh_multiphase::boundary::scalar_condition_from_dict;
use mh_multiphase::{FieldRegistry, VolField};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 读取算例文件；未给出路径时使用缺省算例
pub fn load_config(path: Option<&Path>) -> Result<CaseConfig> {
    match path {
        Some(path) => CaseConfig::from_file(path)
            .with_context(|| format!("无法加载算例文件 {}", path.display())),
        None => {
            info!("未指定算例文件，使用缺省算例");
            Ok(CaseConfig::default())
        }
    }
}

/// 构造盒子网格
pub fn build_mesh(config: &MeshConfig) -> Result<FvMesh> {
    let min = config.origin;
    let max = [
        min[0] + config.lengths[0],
        min[1] + config.lengths[1],
        min[2] + config.lengths[2],
    ];
    let [nx, ny, nz] = config.cells;
    let mut builder = BoxMeshBuilder::new(nx, ny, nz).extent(min, max);

    for wall in &config.walls {
        let side = Side::from_name(wall).with_context(|| format!("未知的壁面补丁 {wall}"))?;
        builder = builder.kind(side, PatchKind::Wall);
    }
    if config.two_dimensional {
        if config.walls.iter().any(|w| w == "zmin" || w == "zmax") {
            warn!("二维算例的 zmin/zmax 为空补丁，忽略其壁面设置");
        }
        builder = builder.empty_z();
    }

    let mesh = builder.build().context("网格生成失败")?;
    mesh.validate().context("网格检查失败")?;
    Ok(mesh)
}

/// 单元中心处的初始体积分数
pub fn initial_alpha(init: &AlphaInit, centres: &[DVec3]) -> Vec<f64> {
    let indicator = |inside: bool| if inside { 1.0 } else { 0.0 };
    match *init {
        AlphaInit::Uniform { value } => vec![value; centres.len()],
        AlphaInit::Step { axis, position } => centres
            .iter()
            .map(|c| indicator(c.to_array()[axis] < position))
            .collect(),
        AlphaInit::Circle { center, radius } => {
            let center = DVec3::from_array(center);
            centres
                .iter()
                .map(|c| indicator((*c - center).truncate().length() < radius))
                .collect()
        }
        AlphaInit::Sphere { center, radius } => {
            let center = DVec3::from_array(center);
            centres
                .iter()
                .map(|c| indicator((*c - center).length() < radius))
                .collect()
        }
    }
}

/// 构造网格并注册体积分数与速度场
pub fn build_fields(config: &CaseConfig) -> Result<FieldRegistry> {
    let mesh = Arc::new(build_mesh(&config.mesh)?);
    info!(
        "网格: {} 单元, {} 面, {} 补丁",
        mesh.n_cells(),
        mesh.n_faces(),
        mesh.patches().len()
    );

    let values = initial_alpha(&config.alpha, mesh.cell_centres());
    let mut alpha = VolField::extrapolated(config.alpha_name.clone(), &mesh, values);
    for (pi, patch) in mesh.patches().iter().enumerate() {
        if let Some(dict) = config.alpha_boundary_dictionary(&patch.name)? {
            let condition = scalar_condition_from_dict(&dict, patch)?;
            alpha.set_condition(&mesh, pi, condition)?;
        }
    }
    for name in config.alpha_boundary.keys() {
        if mesh.patch_index(name).is_none() {
            warn!("alpha_boundary 中的补丁 {name} 不存在，已忽略");
        }
    }

    let velocity = VolField::uniform(
        config.velocity_name.clone(),
        &mesh,
        DVec3::from_array(config.velocity),
    );

    let mut db = FieldRegistry::new(mesh);
    db.insert_scalar(alpha)?;
    db.insert_vector(velocity)?;
    Ok(db)
}

/// 精确曲率（仅圆与球）
pub fn exact_curvature(init: &AlphaInit) -> Option<f64> {
    match *init {
        AlphaInit::Circle { radius, .. } => Some(1.0 / radius),
        AlphaInit::Sphere { radius, .. } => Some(2.0 / radius),
        AlphaInit::Uniform { .. } | AlphaInit::Step { .. } => None,
    }
}
