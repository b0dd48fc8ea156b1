// crates/mh_multiphase/src/curvature/mod.rs

//! 界面曲率模型
//!
//! 一次曲率计算的步骤：
//!
//! 1. （可选）平滑体积分数 α
//! 2. 计算 α 的单元梯度并插值到面
//! 3. 面单位法向 n̂ = ∇α_f / (|∇α_f| + ε)，ε = 1e-8 / V̄^(1/3)
//! 4. 在接触角补丁上修正 n̂
//! 5. 面法向通量 n̂_f = n̂·Sf，曲率 K = −∇·n̂_f
//! 6. （可选）平滑 K
//!
//! # 模型类型
//!
//! | 类型名 | 实现 | 系数字典 |
//! |--------|------|----------|
//! | `normal` | [`NormalCurvature`] | 无 |
//! | `smoothed`, `vofsmooth` | [`SmoothedCurvature`] | `<type>Coeffs { smoothAlpha, smoothCurvature }` |

mod contact_angle;
mod normal;
mod smoothed;

pub use contact_angle::{correct_contact_angle, correct_normal, PatchGradientUpdate};
pub use normal::NormalCurvature;
pub use smoothed::SmoothedCurvature;

use glam::DVec3;
use mh_config::Dictionary;
use mh_foundation::{require, MhError, MhResult};
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::{FieldRegistry, SurfaceField, VolField};
use crate::fvc;
use crate::selectors::ModelSelectors;

// ============================================================
// 计算上下文
// ============================================================

/// 一次曲率计算所需的外部数据
#[derive(Debug, Clone, Copy)]
pub struct CurvatureContext<'a> {
    /// 字段注册表
    pub db: &'a FieldRegistry,
    /// 体积分数字段名
    pub alpha_name: &'a str,
    /// 速度字段名（仅动态接触角使用）
    pub velocity_name: &'a str,
    /// 界面厚度尺度 ε
    pub delta_n: f64,
}

impl<'a> CurvatureContext<'a> {
    /// 体积分数场
    pub fn alpha(&self) -> MhResult<&'a VolField<f64>> {
        self.db.scalar(self.alpha_name)
    }

    /// 若体积分数场带有动态接触角条件，返回速度场
    pub fn velocity_for(&self, alpha: &VolField<f64>) -> MhResult<Option<&'a VolField<DVec3>>> {
        let dynamic = alpha.conditions().iter().any(|c| match c {
            crate::fields::PatchCondition::ContactAngle { model, .. } => model.is_dynamic(),
            _ => false,
        });
        if dynamic {
            self.db.vector(self.velocity_name).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// 界面厚度尺度 ε = 1e-8 / V̄^(1/3)
pub fn delta_n(mean_cell_volume: f64) -> f64 {
    1e-8 / mean_cell_volume.cbrt()
}

// ============================================================
// 模型接口
// ============================================================

/// 曲率模型
pub trait CurvatureModel: Send + Sync + fmt::Debug {
    /// 类型名
    fn type_name(&self) -> &'static str;

    /// 计算曲率并就地覆盖 `k` 与 `n_hat_f`
    ///
    /// 返回接触角补丁上的体积分数新边界梯度，由调用方写回体积分数场。
    fn calculate_k(
        &mut self,
        ctx: &CurvatureContext<'_>,
        k: &mut VolField<f64>,
        n_hat_f: &mut SurfaceField<f64>,
    ) -> MhResult<Vec<PatchGradientUpdate>>;

    /// 重新读取系数
    fn read(&mut self, transport: &Dictionary, selectors: &ModelSelectors) -> MhResult<bool>;

    /// 持久的平滑体积分数场（若有）
    fn smoothed_alpha(&self) -> Option<&VolField<f64>> {
        None
    }
}

/// 由（可能已平滑的）体积分数计算未平滑的曲率
///
/// `alpha` 用于求梯度，接触角条件取自 `alpha` 的补丁条件。
/// 返回 `(K, n̂_f, 梯度更新)`。
pub fn interface_curvature(
    ctx: &CurvatureContext<'_>,
    alpha: &VolField<f64>,
) -> MhResult<(VolField<f64>, SurfaceField<f64>, Vec<PatchGradientUpdate>)> {
    let mesh = ctx.db.mesh();
    let delta_n = ctx.delta_n;

    let grad_alpha = fvc::grad(mesh, alpha);
    let grad_alpha_f = fvc::interpolate(mesh, &grad_alpha);
    let mut n_hat = grad_alpha_f.map("nHatfv", |g| g / (g.length() + delta_n));

    let velocity = ctx.velocity_for(alpha)?;
    let updates = correct_contact_angle(mesh, alpha, velocity, &mut n_hat, &grad_alpha_f, delta_n)?;

    let n_hat_f = fvc::dot_sf(mesh, &n_hat);
    let k = fvc::div(mesh, &n_hat_f).map(mesh, "K", |v| -v);
    Ok((k, n_hat_f, updates))
}

// ============================================================
// 选择
// ============================================================

/// 曲率模型构造函数：`(transport 字典, 类型名, 选择器)`
pub type CurvatureModelFactory = fn(&Dictionary, &str, &ModelSelectors) -> MhResult<Box<dyn CurvatureModel>>;

/// 曲率模型注册表
#[derive(Clone)]
pub struct CurvatureModelRegistry {
    factories: BTreeMap<&'static str, CurvatureModelFactory>,
}

impl CurvatureModelRegistry {
    /// 模型族名称
    pub const FAMILY: &'static str = "curvatureModel";

    /// 缺省类型
    pub const DEFAULT_TYPE: &'static str = "normal";

    /// 空注册表
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 标准注册表
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("normal", |_, _, _| Ok(Box::new(NormalCurvature)));
        registry.register("smoothed", |transport, kind, selectors| {
            Ok(Box::new(SmoothedCurvature::from_dict(transport, kind, selectors)?))
        });
        registry.register("vofsmooth", |transport, kind, selectors| {
            Ok(Box::new(SmoothedCurvature::from_dict(transport, kind, selectors)?))
        });
        registry
    }

    /// 注册构造函数
    pub fn register(&mut self, name: &'static str, factory: CurvatureModelFactory) {
        self.factories.insert(name, factory);
    }

    /// 已注册类型名（已排序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().map(|s| s.to_string()).collect()
    }

    /// 读取 transport 字典中的 `curvatureModel`（缺失时为 `normal` 并警告）
    pub fn selected_type(transport: &Dictionary) -> String {
        transport.lookup_or_default("curvatureModel", Self::DEFAULT_TYPE.to_string())
    }

    /// 按 `curvatureModel` 构造
    pub fn create(&self, transport: &Dictionary, selectors: &ModelSelectors) -> MhResult<Box<dyn CurvatureModel>> {
        let kind = Self::selected_type(transport);
        self.create_type(&kind, transport, selectors)
    }

    /// 按给定类型名构造
    pub fn create_type(
        &self,
        kind: &str,
        transport: &Dictionary,
        selectors: &ModelSelectors,
    ) -> MhResult<Box<dyn CurvatureModel>> {
        let factory = require!(
            self.factories.get(kind),
            MhError::unknown_type(Self::FAMILY, kind, self.names())
        );
        log::info!("Selecting {} {}", Self::FAMILY, kind);
        factory(transport, kind, selectors)
    }
}

impl fmt::Debug for CurvatureModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurvatureModelRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl Default for CurvatureModelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
