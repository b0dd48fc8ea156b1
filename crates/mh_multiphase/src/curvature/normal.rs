// crates/mh_multiphase/src/curvature/normal.rs

//! 不平滑的曲率模型（`normal`）

use mh_config::Dictionary;
use mh_foundation::MhResult;

use super::{interface_curvature, CurvatureContext, CurvatureModel, PatchGradientUpdate};
use crate::fields::{SurfaceField, VolField};
use crate::selectors::ModelSelectors;

/// 直接由体积分数梯度计算曲率
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalCurvature;

impl CurvatureModel for NormalCurvature {
    fn type_name(&self) -> &'static str {
        "normal"
    }

    fn calculate_k(
        &mut self,
        ctx: &CurvatureContext<'_>,
        k: &mut VolField<f64>,
        n_hat_f: &mut SurfaceField<f64>,
    ) -> MhResult<Vec<PatchGradientUpdate>> {
        let alpha = ctx.alpha()?;
        let (k_new, n_hat_f_new, updates) = interface_curvature(ctx, alpha)?;
        k.assign(&k_new)?;
        n_hat_f.assign(&n_hat_f_new)?;
        Ok(updates)
    }

    fn read(&mut self, _transport: &Dictionary, _selectors: &ModelSelectors) -> MhResult<bool> {
        Ok(true)
    }
}
