// crates/mh_multiphase/src/surface_tension.rs

//! 表面张力系数
//!
//! 两种写法：
//!
//! ```json
//! "sigma": 0.07
//! ```
//!
//! ```json
//! "sigmaModel": { "type": "constant", "sigma": 0.07 }
//! ```
//!
//! 两者同时出现时 `sigmaModel` 优先。

use mh_config::Dictionary;
use mh_foundation::{MhError, MhResult};
use mh_mesh::FvMesh;
use serde::{Deserialize, Serialize};

use crate::fields::VolField;

/// 表面张力系数模型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SurfaceTensionModel {
    /// 常系数 [N/m]
    Constant {
        /// 表面张力系数
        sigma: f64,
    },
}

impl SurfaceTensionModel {
    /// 从 transport 字典读取
    pub fn from_transport(transport: &Dictionary) -> MhResult<Self> {
        let model = if transport.found("sigmaModel") {
            transport.lookup::<SurfaceTensionModel>("sigmaModel")?
        } else if transport.found("sigma") {
            SurfaceTensionModel::Constant {
                sigma: transport.lookup("sigma")?,
            }
        } else {
            return Err(MhError::missing_config("sigma", transport.name()));
        };
        model.validate()?;
        log::info!("Selecting surfaceTensionModel {}", model.type_name());
        Ok(model)
    }

    /// 检查系数
    pub fn validate(&self) -> MhResult<()> {
        match *self {
            Self::Constant { sigma } if !sigma.is_finite() || sigma < 0.0 => {
                Err(MhError::config(format!("表面张力系数必须为非负有限值: {sigma}")))
            }
            Self::Constant { .. } => Ok(()),
        }
    }

    /// 类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
        }
    }

    /// 单元上的表面张力系数场
    pub fn sigma(&self, mesh: &FvMesh) -> VolField<f64> {
        match *self {
            Self::Constant { sigma } => VolField::uniform("sigma", mesh, sigma),
        }
    }
}
