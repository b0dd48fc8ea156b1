// crates/mh_multiphase/src/boundary/mod.rs

//! 边界条件模块
//!
//! # 子模块
//!
//! - [`contact_angle`]: 壁面接触角模型（常接触角、动态接触角）
//!
//! # 主要功能
//!
//! - [`scalar_condition_from_dict`]: 由配置字典构造体积分数的补丁条件
//!
//! ## 配置示例
//!
//! ```json
//! "alpha_boundary": {
//!     "ymin": { "type": "dynamicAlphaContactAngle",
//!               "theta0": 90.0, "uTheta": 1.0, "thetaA": 110.0, "thetaR": 70.0 },
//!     "ymax": { "type": "fixedValue", "value": 0.0 }
//! }
//! ```

pub mod contact_angle;

pub use contact_angle::ContactAngleModel;

use mh_config::Dictionary;
use mh_foundation::{MhError, MhResult};
use mh_mesh::Patch;

use crate::fields::PatchCondition;

/// 合法的标量补丁条件名
pub const SCALAR_CONDITION_TYPES: [&str; 6] = [
    "calculated",
    "zeroGradient",
    "fixedValue",
    "fixedGradient",
    "constantAlphaContactAngle",
    "dynamicAlphaContactAngle",
];

/// 由配置字典构造标量补丁条件
///
/// `type` 为必需项；`fixedValue` 读取 `value`，`fixedGradient` 读取 `gradient`（缺省 0），
/// 接触角条件的初始梯度为零。
pub fn scalar_condition_from_dict(dict: &Dictionary, patch: &Patch) -> MhResult<PatchCondition<f64>> {
    if patch.is_empty_kind() {
        return Ok(PatchCondition::Empty);
    }
    let kind: String = dict.lookup("type")?;
    let condition = match kind.as_str() {
        "calculated" => PatchCondition::Calculated,
        "zeroGradient" => PatchCondition::ZeroGradient,
        "fixedValue" => {
            let value: f64 = dict.lookup("value")?;
            PatchCondition::FixedValue(vec![value; patch.size])
        }
        "fixedGradient" => {
            let gradient: f64 = dict.lookup_or_default("gradient", 0.0);
            PatchCondition::FixedGradient(vec![gradient; patch.size])
        }
        "constantAlphaContactAngle" | "dynamicAlphaContactAngle" => {
            let model = ContactAngleModel::from_dict(dict)?;
            if !patch.is_wall() {
                log::warn!(
                    "补丁 {} ({}) 使用接触角条件 {}",
                    patch.name,
                    patch.kind.name(),
                    model.type_name()
                );
            }
            PatchCondition::ContactAngle {
                model,
                gradient: vec![0.0; patch.size],
            }
        }
        other => {
            return Err(MhError::unknown_type(
                "patchField",
                other,
                SCALAR_CONDITION_TYPES.iter().map(|s| s.to_string()).collect(),
            ))
        }
    };
    log::debug!("补丁 {} 使用 {} 条件", patch.name, condition.type_name());
    Ok(condition)
}
