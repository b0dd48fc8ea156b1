// crates/mh_multiphase/src/interface.rs

//! 界面属性
//!
//! [`InterfaceProperties`] 持有两相密度、界面压缩系数、表面张力系数、曲率模型以及
//! 曲率场 K 和面法向通量场 n̂_f，对外提供表面张力与界面指示场。
//!
//! # transport 字典
//!
//! ```json
//! {
//!     "phases": ["water", "air"],
//!     "water": { "rho": 1000.0 },
//!     "air":   { "rho": 1.0 },
//!     "sigma": 0.07,
//!     "cAlpha": 1.0,
//!     "curvatureModel": "normal",
//!     "surfaceTensionForceModel": { "densityWeighted": false },
//!     "deltaModel": { "type": "snGrad" }
//! }
//! ```
//!
//! # 表面张力
//!
//! ```text
//! 不加权:   f = interpolate(σK)·δ(α)
//! 密度加权: f = interpolate(σK·ρ)·δ(α)·2/(ρ1 + ρ2),   ρ = α̃ρ1 + (1 − α̃)ρ2,  α̃ = clamp(α, 0, 1)
//! ```

use mh_config::Dictionary;
use mh_foundation::{ensure, MhError, MhResult};
use mh_mesh::FvMesh;

use crate::curvature::{self, CurvatureContext, CurvatureModel, CurvatureModelRegistry};
use crate::dirac_delta::{DiracDeltaModel, SnGradDelta};
use crate::fields::{FieldRegistry, SurfaceField, VolField};
use crate::fvc;
use crate::selectors::ModelSelectors;
use crate::surface_tension::SurfaceTensionModel;

/// 界面指示场下限
pub const NEAR_INTERFACE_MIN: f64 = 0.01;
/// 界面指示场上限
pub const NEAR_INTERFACE_MAX: f64 = 0.99;

/// 曲率场名
pub const K_NAME: &str = "interfaceProperties:K";

/// 界面属性
#[derive(Debug)]
pub struct InterfaceProperties {
    transport: Dictionary,
    selectors: ModelSelectors,
    alpha_name: String,
    velocity_name: String,

    phases: [String; 2],
    rho1: f64,
    rho2: f64,
    c_alpha: f64,
    sigma: SurfaceTensionModel,
    density_weighted: bool,
    delta_model: Box<dyn DiracDeltaModel>,

    curvature_type: String,
    curvature_model: Box<dyn CurvatureModel>,

    delta_n: f64,
    k: VolField<f64>,
    n_hat_f: SurfaceField<f64>,
}

impl InterfaceProperties {
    /// 由 transport 字典构造，并立即计算一次曲率
    ///
    /// `alpha_name` 必须已在注册表中；`velocity_name` 仅在存在动态接触角时需要。
    pub fn new(
        transport: Dictionary,
        db: &mut FieldRegistry,
        alpha_name: impl Into<String>,
        velocity_name: impl Into<String>,
        selectors: ModelSelectors,
    ) -> MhResult<Self> {
        let alpha_name = alpha_name.into();
        db.scalar(&alpha_name)?;
        let mesh = db.mesh();

        let (phases, rho1, rho2) = read_phases(&transport)?;
        let c_alpha = transport.lookup_or_default("cAlpha", 1.0);
        let sigma = SurfaceTensionModel::from_transport(&transport)?;
        let density_weighted = read_density_weighted(&transport);
        let delta_model = read_delta_model(&transport, &selectors)?;

        let curvature_type = CurvatureModelRegistry::selected_type(&transport);
        let curvature_model = selectors
            .curvature_models()
            .create_type(&curvature_type, &transport, &selectors)?;

        let delta_n = curvature::delta_n(mesh.mean_cell_volume());
        log::debug!("界面厚度尺度 deltaN = {delta_n:e}");

        let mut props = Self {
            k: VolField::calculated(K_NAME, mesh, vec![0.0; mesh.n_cells()], vec![0.0; mesh.n_boundary_faces()]),
            n_hat_f: SurfaceField::zeros("nHatf", mesh),
            transport,
            selectors,
            alpha_name,
            velocity_name: velocity_name.into(),
            phases,
            rho1,
            rho2,
            c_alpha,
            sigma,
            density_weighted,
            delta_model,
            curvature_type,
            curvature_model,
            delta_n,
        };
        props.correct(db)?;
        Ok(props)
    }

    // =========================================================================
    // 计算
    // =========================================================================

    /// 重新计算曲率
    ///
    /// 接触角补丁的新梯度写回体积分数场；平滑模型的 `smooth(<alpha>)` 同步到注册表。
    pub fn correct(&mut self, db: &mut FieldRegistry) -> MhResult<()> {
        let updates = {
            let ctx = CurvatureContext {
                db: &*db,
                alpha_name: &self.alpha_name,
                velocity_name: &self.velocity_name,
                delta_n: self.delta_n,
            };
            self.curvature_model
                .calculate_k(&ctx, &mut self.k, &mut self.n_hat_f)?
        };

        if !updates.is_empty() {
            let mesh = db.mesh_arc().clone();
            let alpha = db.scalar_mut(&self.alpha_name)?;
            for update in &updates {
                update.apply(&mesh, alpha)?;
            }
        }

        if let Some(smoothed) = self.curvature_model.smoothed_alpha() {
            db.insert_scalar(smoothed.clone())?;
        }

        log::debug!(
            "曲率 ({}): min = {:.6e}, max = {:.6e}",
            self.curvature_model.type_name(),
            self.k.min(),
            self.k.max()
        );
        Ok(())
    }

    /// 重新读取当前 transport 字典
    ///
    /// 可选项缺失只产生警告；`curvatureModel` 改变时重建曲率模型。
    /// 读取失败时所有系数与模型保持原状。
    pub fn read(&mut self) -> MhResult<bool> {
        let transport = self.transport.clone();
        self.reload(&transport)
    }

    /// 替换 transport 字典并重新读取
    ///
    /// 新字典读取失败时保留原字典。
    pub fn read_from(&mut self, transport: Dictionary) -> MhResult<bool> {
        let changed = self.reload(&transport)?;
        self.transport = transport;
        Ok(changed)
    }

    /// 先把全部配置读入局部变量，曲率模型就绪后再一次性提交
    fn reload(&mut self, transport: &Dictionary) -> MhResult<bool> {
        let (phases, rho1, rho2) = read_phases(transport)?;
        let c_alpha = transport.lookup_or_default("cAlpha", self.c_alpha);
        let sigma = SurfaceTensionModel::from_transport(transport)?;
        let density_weighted = read_density_weighted(transport);
        let delta_model = read_delta_model(transport, &self.selectors)?;

        let curvature_type = CurvatureModelRegistry::selected_type(transport);
        let changed = if curvature_type != self.curvature_type {
            let model = self
                .selectors
                .curvature_models()
                .create_type(&curvature_type, transport, &self.selectors)?;
            log::info!(
                "curvatureModel 由 {} 改为 {}",
                self.curvature_type,
                curvature_type
            );
            self.curvature_model = model;
            self.curvature_type = curvature_type;
            true
        } else {
            // 模型的 read 失败时不修改自身
            self.curvature_model.read(transport, &self.selectors)?
        };

        self.phases = phases;
        self.rho1 = rho1;
        self.rho2 = rho2;
        self.c_alpha = c_alpha;
        self.sigma = sigma;
        self.density_weighted = density_weighted;
        self.delta_model = delta_model;
        Ok(changed)
    }

    /// 表面张力面通量
    pub fn surface_tension_force(&self, db: &FieldRegistry) -> MhResult<SurfaceField<f64>> {
        let mesh = db.mesh();
        let alpha = db.scalar(&self.alpha_name)?;
        let delta = self.delta_model.delta(mesh, alpha);
        let sigma_k = self.sigma_k(mesh);

        let force = if self.density_weighted {
            let (rho1, rho2) = (self.rho1, self.rho2);
            let rho = alpha.map(mesh, "rho", |a| {
                let a = a.clamp(0.0, 1.0);
                a * rho1 + (1.0 - a) * rho2
            });
            let scale = 2.0 / (rho1 + rho2);
            fvc::interpolate(mesh, &sigma_k.scaled_by(mesh, &rho))
                .scaled_by(&delta)
                .map("surfaceTensionForce", |v| v * scale)
        } else {
            fvc::interpolate(mesh, &sigma_k)
                .scaled_by(&delta)
                .map("surfaceTensionForce", |v| v)
        };
        Ok(force)
    }

    /// 界面指示场：0.01 < α < 0.99 处为 1，否则为 0
    pub fn near_interface(&self, db: &FieldRegistry) -> MhResult<VolField<f64>> {
        let alpha = db.scalar(&self.alpha_name)?;
        Ok(alpha.map(db.mesh(), "nearInterface", |a| {
            if a > NEAR_INTERFACE_MIN && a < NEAR_INTERFACE_MAX {
                1.0
            } else {
                0.0
            }
        }))
    }

    /// σK
    pub fn sigma_k(&self, mesh: &FvMesh) -> VolField<f64> {
        self.k.scaled_by(mesh, &self.sigma.sigma(mesh))
    }

    // =========================================================================
    // 访问
    // =========================================================================

    /// 曲率场
    pub fn k(&self) -> &VolField<f64> {
        &self.k
    }

    /// 面法向通量 n̂·Sf
    pub fn n_hat_f(&self) -> &SurfaceField<f64> {
        &self.n_hat_f
    }

    /// 界面厚度尺度 ε
    pub fn delta_n(&self) -> f64 {
        self.delta_n
    }

    /// 界面压缩系数
    pub fn c_alpha(&self) -> f64 {
        self.c_alpha
    }

    /// 两相名称
    pub fn phases(&self) -> &[String; 2] {
        &self.phases
    }

    /// 两相密度
    pub fn densities(&self) -> (f64, f64) {
        (self.rho1, self.rho2)
    }

    /// 表面张力系数模型
    pub fn sigma_model(&self) -> &SurfaceTensionModel {
        &self.sigma
    }

    /// 是否密度加权
    pub fn density_weighted(&self) -> bool {
        self.density_weighted
    }

    /// 曲率模型
    pub fn curvature_model(&self) -> &dyn CurvatureModel {
        self.curvature_model.as_ref()
    }

    /// Dirac δ 模型
    pub fn delta_model(&self) -> &dyn DiracDeltaModel {
        self.delta_model.as_ref()
    }

    /// 平滑模型持有的 `smooth(<alpha>)`
    pub fn smoothed_alpha(&self) -> Option<&VolField<f64>> {
        self.curvature_model.smoothed_alpha()
    }

    /// 体积分数字段名
    pub fn alpha_name(&self) -> &str {
        &self.alpha_name
    }

    /// transport 字典
    pub fn transport(&self) -> &Dictionary {
        &self.transport
    }
}

// ============================================================
// 读取辅助
// ============================================================

/// `phases` 与各相子字典中的 `rho`
fn read_phases(transport: &Dictionary) -> MhResult<([String; 2], f64, f64)> {
    let phases: Vec<String> = transport.lookup("phases")?;
    let [phase1, phase2]: [String; 2] = phases.try_into().map_err(|p: Vec<String>| {
        MhError::config(format!(
            "{}.phases 必须恰好包含两相, 实际为 {p:?}",
            transport.name()
        ))
    })?;
    let rho1: f64 = transport.sub_dict(&phase1)?.lookup("rho")?;
    let rho2: f64 = transport.sub_dict(&phase2)?.lookup("rho")?;
    ensure!(
        rho1 > 0.0 && rho2 > 0.0,
        MhError::config(format!("密度必须为正: {phase1} = {rho1}, {phase2} = {rho2}"))
    );
    Ok(([phase1, phase2], rho1, rho2))
}

/// `surfaceTensionForceModel.densityWeighted`，缺失时为 false 并警告
fn read_density_weighted(transport: &Dictionary) -> bool {
    let density_weighted = if transport.found("surfaceTensionForceModel") {
        transport
            .sub_dict_or_empty("surfaceTensionForceModel")
            .lookup_or_default("densityWeighted", false)
    } else {
        transport.warn(
            "surfaceTensionForceModel",
            format!(
                "Sub-dictionary surfaceTensionForceModel not found in {}. Using densityWeighted = false.",
                transport.name()
            ),
        );
        false
    };
    log::info!("Selecting surfaceTensionModel CSF(densityWeighted={density_weighted})");
    density_weighted
}

/// `deltaModel`，缺失时为 `snGrad`
fn read_delta_model(transport: &Dictionary, selectors: &ModelSelectors) -> MhResult<Box<dyn DiracDeltaModel>> {
    if transport.found("deltaModel") {
        selectors.delta_models().create(&transport.sub_dict("deltaModel")?)
    } else {
        Ok(Box::new(SnGradDelta))
    }
}
