// crates/mh_multiphase/src/boundary/contact_angle.rs

//! 壁面接触角模型
//!
//! 体积分数在壁面补丁上的接触角条件。接触角以角度给出：
//!
//! - 常接触角：θ = θ0
//! - 动态接触角：θ = θ0 + (θA − θR)·tanh(u_wall / uTheta)
//!
//! 其中 u_wall 为壁面平行的相对速度在界面壁面方向上的分量。

use glam::DVec3;
use mh_config::Dictionary;
use mh_foundation::float::SMALL;
use mh_foundation::{MhError, MhResult};
use mh_mesh::FvMesh;

use crate::fields::VolField;

/// 接触角模型
#[derive(Debug, Clone, PartialEq)]
pub enum ContactAngleModel {
    /// 常接触角
    Constant {
        /// 平衡接触角 [°]
        theta0: f64,
    },
    /// 速度相关的动态接触角
    Dynamic {
        /// 平衡接触角 [°]
        theta0: f64,
        /// 速度尺度 [m/s]
        u_theta: f64,
        /// 前进角 [°]
        theta_a: f64,
        /// 后退角 [°]
        theta_r: f64,
    },
}

impl ContactAngleModel {
    /// 从边界条件字典读取
    pub fn from_dict(dict: &Dictionary) -> MhResult<Self> {
        let kind: String = dict.lookup("type")?;
        match kind.as_str() {
            "constantAlphaContactAngle" => Ok(Self::Constant {
                theta0: dict.lookup("theta0")?,
            }),
            "dynamicAlphaContactAngle" => Ok(Self::Dynamic {
                theta0: dict.lookup("theta0")?,
                u_theta: dict.lookup("uTheta")?,
                theta_a: dict.lookup("thetaA")?,
                theta_r: dict.lookup("thetaR")?,
            }),
            other => Err(MhError::unknown_type(
                "alphaContactAngle",
                other,
                vec![
                    "constantAlphaContactAngle".to_string(),
                    "dynamicAlphaContactAngle".to_string(),
                ],
            )),
        }
    }

    /// 类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constantAlphaContactAngle",
            Self::Dynamic { .. } => "dynamicAlphaContactAngle",
        }
    }

    /// 是否依赖速度
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { u_theta, .. } if *u_theta >= SMALL)
    }

    /// 补丁上各面的接触角 [°]
    ///
    /// `velocity` 仅在动态模型下使用；`n_hat` 为补丁面上的界面单位法向。
    pub fn theta(
        &self,
        mesh: &FvMesh,
        patch: usize,
        velocity: Option<&VolField<DVec3>>,
        n_hat: &[DVec3],
    ) -> MhResult<Vec<f64>> {
        let size = mesh.patches()[patch].size;
        MhError::check_size("nHat", size, n_hat.len())?;

        match *self {
            Self::Constant { theta0 } => Ok(vec![theta0; size]),
            Self::Dynamic { theta0, u_theta, .. } if u_theta < SMALL => Ok(vec![theta0; size]),
            Self::Dynamic {
                theta0,
                u_theta,
                theta_a,
                theta_r,
            } => {
                let u = velocity.ok_or_else(|| {
                    MhError::invalid_input(format!(
                        "补丁 {} 的动态接触角需要速度场",
                        mesh.patches()[patch].name
                    ))
                })?;
                let up = u.patch_values(mesh, patch);
                let up_internal = u.patch_internal_values(mesh, patch);
                let start = mesh.patches()[patch].start;

                Ok((0..size)
                    .map(|i| {
                        let nf = mesh.face_normal(start + i);

                        // 壁面平行的相对速度
                        let mut u_wall = up_internal[i] - up[i];
                        u_wall -= nf.dot(u_wall) * nf;

                        // 界面在壁面内的方向
                        let mut n_wall = n_hat[i] - nf.dot(n_hat[i]) * nf;
                        n_wall /= n_wall.length() + SMALL;

                        let uwall = n_wall.dot(u_wall);
                        theta0 + (theta_a - theta_r) * (uwall / u_theta).tanh()
                    })
                    .collect())
            }
        }
    }
}
