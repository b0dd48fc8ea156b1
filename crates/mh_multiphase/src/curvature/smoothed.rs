// crates/mh_multiphase/src/curvature/smoothed.rs

//! 平滑曲率模型（`smoothed`，旧名 `vofsmooth`）
//!
//! 持有两个独立的平滑核：求梯度前平滑体积分数，求得曲率后再平滑曲率。
//! 平滑后的体积分数作为持久场 `smooth(<alpha>)` 保留，供其他模块读取。
//!
//! ```json
//! "curvatureModel": "smoothed",
//! "smoothedCoeffs": {
//!     "smoothAlpha":     { "type": "cfcInterpolation", "numIts": 2,
//!                          "weightFactor": { "type": "unweighted" } },
//!     "smoothCurvature": { "type": "none" }
//! }
//! ```

use mh_config::Dictionary;
use mh_foundation::MhResult;

use super::{interface_curvature, CurvatureContext, CurvatureModel, PatchGradientUpdate};
use crate::fields::{SurfaceField, VolField};
use crate::selectors::ModelSelectors;
use crate::smoother::SmootherKernel;

/// 平滑曲率模型
#[derive(Debug)]
pub struct SmoothedCurvature {
    kind: &'static str,
    alpha_smoother: Box<dyn SmootherKernel<f64>>,
    curvature_smoother: Box<dyn SmootherKernel<f64>>,
    alpha_smooth: Option<VolField<f64>>,
}

impl SmoothedCurvature {
    /// 以给定平滑核创建
    pub fn new(alpha_smoother: Box<dyn SmootherKernel<f64>>, curvature_smoother: Box<dyn SmootherKernel<f64>>) -> Self {
        Self {
            kind: "smoothed",
            alpha_smoother,
            curvature_smoother,
            alpha_smooth: None,
        }
    }

    /// 从 `<kind>Coeffs` 读取，`smoothAlpha` 与 `smoothCurvature` 子字典均为必需
    pub fn from_dict(transport: &Dictionary, kind: &str, selectors: &ModelSelectors) -> MhResult<Self> {
        let coeffs = transport.sub_dict(&format!("{kind}Coeffs"))?;
        let smoothers = selectors.scalar_smoothers();
        let alpha_smoother = smoothers.create(&coeffs.sub_dict("smoothAlpha")?, selectors.weights())?;
        let curvature_smoother = smoothers.create(&coeffs.sub_dict("smoothCurvature")?, selectors.weights())?;
        let mut model = Self::new(alpha_smoother, curvature_smoother);
        model.kind = if kind == "vofsmooth" { "vofsmooth" } else { "smoothed" };
        Ok(model)
    }

    /// 体积分数平滑核
    pub fn alpha_smoother(&self) -> &dyn SmootherKernel<f64> {
        self.alpha_smoother.as_ref()
    }

    /// 曲率平滑核
    pub fn curvature_smoother(&self) -> &dyn SmootherKernel<f64> {
        self.curvature_smoother.as_ref()
    }

    /// 重新计算持久的平滑体积分数
    pub fn update_alpha_smooth(&mut self, ctx: &CurvatureContext<'_>) -> MhResult<&VolField<f64>> {
        let alpha = ctx.alpha()?;
        let smoothed = self
            .alpha_smoother
            .smoothen(ctx.db, alpha)?
            .into_owned()
            .named(format!("smooth({})", alpha.name()));
        Ok(self.alpha_smooth.insert(smoothed))
    }
}

impl CurvatureModel for SmoothedCurvature {
    fn type_name(&self) -> &'static str {
        self.kind
    }

    fn calculate_k(
        &mut self,
        ctx: &CurvatureContext<'_>,
        k: &mut VolField<f64>,
        n_hat_f: &mut SurfaceField<f64>,
    ) -> MhResult<Vec<PatchGradientUpdate>> {
        let alpha_smooth = self.update_alpha_smooth(ctx)?;
        let (k_raw, n_hat_f_new, updates) = interface_curvature(ctx, alpha_smooth)?;

        let k_smooth = self.curvature_smoother.smoothen(ctx.db, &k_raw)?;
        k.assign(&k_smooth)?;
        n_hat_f.assign(&n_hat_f_new)?;
        Ok(updates)
    }

    fn read(&mut self, transport: &Dictionary, selectors: &ModelSelectors) -> MhResult<bool> {
        let fresh = Self::from_dict(transport, self.kind, selectors)?;
        self.alpha_smoother = fresh.alpha_smoother;
        self.curvature_smoother = fresh.curvature_smoother;
        Ok(true)
    }

    fn smoothed_alpha(&self) -> Option<&VolField<f64>> {
        self.alpha_smooth.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curvature::NormalCurvature;
    use crate::fields::FieldRegistry;
    use mh_foundation::MhError;
    use mh_mesh::BoxMeshBuilder;
    use std::sync::Arc;

    fn transport(kind: &str, alpha: &str, curvature: &str) -> Dictionary {
        Dictionary::from_json_str(
            "transportProperties",
            &format!(
                r#"{{ "curvatureModel": "{kind}",
                      "{kind}Coeffs": {{
                          "smoothAlpha": {{ "type": "{alpha}", "numIts": 2,
                                            "weightFactor": {{ "type": "unweighted" }} }},
                          "smoothCurvature": {{ "type": "{curvature}", "numIts": 1,
                                                "weightFactor": {{ "type": "unweighted" }} }} }} }}"#
            ),
        )
        .unwrap()
    }

    fn circle_db() -> FieldRegistry {
        let mesh = Arc::new(
            BoxMeshBuilder::new(20, 20, 1)
                .extent([0.0; 3], [1.0, 1.0, 0.05])
                .empty_z()
                .build()
                .unwrap(),
        );
        let alpha = mesh
            .cell_centres()
            .iter()
            .map(|c| {
                let r = ((c.x - 0.5).powi(2) + (c.y - 0.5).powi(2)).sqrt();
                if r < 0.3 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        let mut db = FieldRegistry::new(mesh.clone());
        db.insert_scalar(VolField::extrapolated("alpha.water", &mesh, alpha)).unwrap();
        db
    }

    #[test]
    fn test_coefficient_sub_dicts_are_mandatory() {
        let selectors = ModelSelectors::standard();
        let t = Dictionary::new("transportProperties").with("curvatureModel", "smoothed");
        assert!(matches!(
            SmoothedCurvature::from_dict(&t, "smoothed", &selectors),
            Err(MhError::MissingConfig { .. })
        ));

        let t = Dictionary::new("transportProperties")
            .with_dict("smoothedCoeffs", Dictionary::new("c").with_dict("smoothAlpha", Dictionary::new("a")));
        match SmoothedCurvature::from_dict(&t, "smoothed", &selectors) {
            Err(MhError::MissingConfig { key, .. }) => assert_eq!(key, "smoothCurvature"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_vofsmooth_alias() {
        let selectors = ModelSelectors::standard();
        let t = transport("vofsmooth", "cfcInterpolation", "none");
        let model = selectors.curvature_models().create(&t, &selectors).unwrap();
        assert_eq!(model.type_name(), "vofsmooth");
    }

    #[test]
    fn test_smoothed_alpha_is_published() {
        let selectors = ModelSelectors::standard();
        let t = transport("smoothed", "cfcInterpolation", "Csk");
        // Csk 需要 smoother 子字典
        assert!(SmoothedCurvature::from_dict(&t, "smoothed", &selectors).is_err());

        let t = transport("smoothed", "cfcInterpolation", "cfcInterpolation");
        let mut model = SmoothedCurvature::from_dict(&t, "smoothed", &selectors).unwrap();
        assert!(model.smoothed_alpha().is_none());

        let db = circle_db();
        let mesh = db.mesh_arc().clone();
        let ctx = CurvatureContext {
            db: &db,
            alpha_name: "alpha.water",
            velocity_name: "U",
            delta_n: crate::curvature::delta_n(mesh.mean_cell_volume()),
        };
        let mut k = VolField::uniform("K", &mesh, 0.0);
        let mut n_hat_f = SurfaceField::zeros("nHatf", &mesh);
        model.calculate_k(&ctx, &mut k, &mut n_hat_f).unwrap();

        let smooth = model.smoothed_alpha().unwrap();
        assert_eq!(smooth.name(), "smooth(alpha.water)");
        assert!(smooth.internal().iter().any(|&a| a > 0.0 && a < 1.0));
        assert!(k.internal().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_none_smoothers_match_normal_model() {
        let selectors = ModelSelectors::standard();
        let t = transport("smoothed", "none", "none");
        let mut smoothed = SmoothedCurvature::from_dict(&t, "smoothed", &selectors).unwrap();

        let db = circle_db();
        let mesh = db.mesh_arc().clone();
        let ctx = CurvatureContext {
            db: &db,
            alpha_name: "alpha.water",
            velocity_name: "U",
            delta_n: crate::curvature::delta_n(mesh.mean_cell_volume()),
        };
        let mut k1 = VolField::uniform("K", &mesh, 0.0);
        let mut k2 = k1.clone();
        let mut f1 = SurfaceField::zeros("nHatf", &mesh);
        let mut f2 = f1.clone();
        smoothed.calculate_k(&ctx, &mut k1, &mut f1).unwrap();
        NormalCurvature.calculate_k(&ctx, &mut k2, &mut f2).unwrap();
        assert_eq!(k1.internal(), k2.internal());
        assert_eq!(f1.values(), f2.values());
    }

    #[test]
    fn test_read_rebuilds_smoothers() {
        let selectors = ModelSelectors::standard();
        let mut model =
            SmoothedCurvature::from_dict(&transport("smoothed", "none", "none"), "smoothed", &selectors).unwrap();
        assert_eq!(model.alpha_smoother().type_name(), "none");

        let updated = transport("smoothed", "cfcInterpolation", "none");
        assert!(model.read(&updated, &selectors).unwrap());
        assert_eq!(model.alpha_smoother().type_name(), "cfcInterpolation");
        assert_eq!(model.curvature_smoother().num_iterations(), 0);
    }
}
