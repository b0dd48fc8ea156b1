// crates/mh_multiphase/src/curvature/contact_angle.rs

//! 壁面接触角修正
//!
//! 对带接触角条件的补丁逐面修正界面法向 n̂，使其与壁面法向 n_f 的夹角等于给定接触角 θ，
//! 然后据此重算体积分数的边界法向梯度。
//!
//! 修正后的法向取为 n_f 与原 n̂ 的线性组合 `a·n_f + b·n̂`，由二元线性方程组
//!
//! ```text
//! a + a12·b = cos θ
//! a12·a + b = cos(acos(a12) − θ)
//! ```
//!
//! 求得，其中 a12 = n̂·n_f。行列式 1 − a12² 在 n̂ 接近壁面法向时趋于零，取下限 max(ε, 1e-12)。

use glam::DVec3;
use mh_foundation::float::DEG_TO_RAD;
use mh_foundation::MhResult;
use mh_mesh::FvMesh;

use crate::fields::{PatchCondition, SurfaceField, VolField};

/// 行列式的绝对下限
const MIN_DET: f64 = 1e-12;

/// 补丁上的体积分数边界梯度更新
#[derive(Debug, Clone, PartialEq)]
pub struct PatchGradientUpdate {
    /// 补丁索引
    pub patch: usize,
    /// 新的法向梯度
    pub gradient: Vec<f64>,
}

impl PatchGradientUpdate {
    /// 写入体积分数场并重新求值该补丁
    pub fn apply(&self, mesh: &FvMesh, alpha: &mut VolField<f64>) -> MhResult<()> {
        alpha.set_patch_gradient(self.patch, self.gradient.clone())?;
        alpha.evaluate_patch(mesh, self.patch);
        Ok(())
    }
}

/// 单个面的法向修正，返回修正后的法向
#[inline]
pub fn correct_normal(n_hat: DVec3, nf: DVec3, theta_deg: f64, delta_n: f64) -> DVec3 {
    let theta = theta_deg * DEG_TO_RAD;
    let a12 = n_hat.dot(nf).clamp(-1.0, 1.0);
    let b1 = theta.cos();
    let b2 = (a12.acos() - theta).cos();
    let det = (1.0 - a12 * a12).max(delta_n.max(MIN_DET));

    let a = (b1 - a12 * b2) / det;
    let b = (b2 - a12 * b1) / det;

    let n = a * nf + b * n_hat;
    n / (n.length() + delta_n)
}

/// 修正所有接触角补丁上的面法向
///
/// - `alpha`: 持有接触角条件的体积分数场
/// - `velocity`: 速度场，仅动态接触角使用
/// - `n_hat`: 面单位法向，补丁面值被就地修正
/// - `grad_alpha_f`: 插值到面的体积分数梯度
///
/// 返回每个接触角补丁的新边界梯度，由调用方写回体积分数场。
pub fn correct_contact_angle(
    mesh: &FvMesh,
    alpha: &VolField<f64>,
    velocity: Option<&VolField<DVec3>>,
    n_hat: &mut SurfaceField<DVec3>,
    grad_alpha_f: &SurfaceField<DVec3>,
    delta_n: f64,
) -> MhResult<Vec<PatchGradientUpdate>> {
    let mut updates = Vec::new();

    for (pi, condition) in alpha.conditions().iter().enumerate() {
        let PatchCondition::ContactAngle { model, .. } = condition else {
            continue;
        };
        let patch = &mesh.patches()[pi];

        let theta = model.theta(mesh, pi, velocity, n_hat.patch_values(mesh, pi))?;
        let grad_b = grad_alpha_f.patch_values(mesh, pi);
        let n_hat_p = n_hat.patch_values_mut(mesh, pi);

        let gradient = patch
            .faces()
            .enumerate()
            .map(|(i, f)| {
                let nf = mesh.face_normal(f);
                n_hat_p[i] = correct_normal(n_hat_p[i], nf, theta[i], delta_n);
                nf.dot(n_hat_p[i]) * grad_b[i].length()
            })
            .collect();

        log::debug!(
            "接触角修正: 补丁 {} ({}), {} 面",
            patch.name,
            model.type_name(),
            patch.size
        );
        updates.push(PatchGradientUpdate { patch: pi, gradient });
    }

    Ok(updates)
}
