// crates/mh_multiphase/src/dirac_delta.rs

//! 界面 Dirac δ 函数模型
//!
//! 表面张力 `f = σK·δ` 中的 δ 由体积分数的面法向梯度近似。
//!
//! | 类型名 | δ |
//! |--------|---|
//! | `snGrad` | ∂α/∂n |
//! | `snGradPC` | ∂α/∂n（保留系数 `Csk`） |

use mh_config::Dictionary;
use mh_foundation::{MhError, MhResult};
use mh_mesh::FvMesh;
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::{SurfaceField, VolField};
use crate::fvc;

/// Dirac δ 模型
pub trait DiracDeltaModel: Send + Sync + fmt::Debug {
    /// 类型名
    fn type_name(&self) -> &'static str;

    /// 面上的 δ(α)
    fn delta(&self, mesh: &FvMesh, alpha: &VolField<f64>) -> SurfaceField<f64>;
}

/// δ = ∂α/∂n
#[derive(Debug, Clone, Copy, Default)]
pub struct SnGradDelta;

impl DiracDeltaModel for SnGradDelta {
    fn type_name(&self) -> &'static str {
        "snGrad"
    }

    fn delta(&self, mesh: &FvMesh, alpha: &VolField<f64>) -> SurfaceField<f64> {
        fvc::sn_grad(mesh, alpha)
    }
}

/// 带修正系数的面法向梯度 δ
///
/// 系数目前只被读取保存，δ 与 [`SnGradDelta`] 相同。
#[derive(Debug, Clone, Copy)]
pub struct SnGradPcDelta {
    cpc: f64,
}

impl SnGradPcDelta {
    /// 缺省系数
    pub const DEFAULT_CPC: f64 = 0.5;

    /// 从字典读取 `Csk`（缺失时静默使用缺省值）
    pub fn from_dict(dict: &Dictionary) -> Self {
        Self {
            cpc: dict.lookup_or_default_quiet("Csk", Self::DEFAULT_CPC),
        }
    }

    /// 修正系数
    pub fn cpc(&self) -> f64 {
        self.cpc
    }
}

impl DiracDeltaModel for SnGradPcDelta {
    fn type_name(&self) -> &'static str {
        "snGradPC"
    }

    fn delta(&self, mesh: &FvMesh, alpha: &VolField<f64>) -> SurfaceField<f64> {
        fvc::sn_grad(mesh, alpha)
    }
}

// ============================================================
// 选择
// ============================================================

/// δ 模型构造函数
pub type DiracDeltaFactory = fn(&Dictionary) -> MhResult<Box<dyn DiracDeltaModel>>;

/// δ 模型注册表
#[derive(Clone)]
pub struct DiracDeltaRegistry {
    factories: BTreeMap<&'static str, DiracDeltaFactory>,
}

impl DiracDeltaRegistry {
    /// 模型族名称
    pub const FAMILY: &'static str = "diracDeltaModel";

    /// 缺省类型
    pub const DEFAULT_TYPE: &'static str = "snGrad";

    /// 标准注册表
    pub fn standard() -> Self {
        let mut factories: BTreeMap<&'static str, DiracDeltaFactory> = BTreeMap::new();
        factories.insert("snGrad", |_| Ok(Box::new(SnGradDelta)));
        factories.insert("snGradPC", |dict| Ok(Box::new(SnGradPcDelta::from_dict(dict))));
        Self { factories }
    }

    /// 已注册类型名（已排序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().map(|s| s.to_string()).collect()
    }

    /// 按 `type` 构造；缺失时使用 `snGrad` 并警告
    pub fn create(&self, dict: &Dictionary) -> MhResult<Box<dyn DiracDeltaModel>> {
        let kind: String = dict.lookup_or_default("type", Self::DEFAULT_TYPE.to_string());
        let factory = self
            .factories
            .get(kind.as_str())
            .ok_or_else(|| MhError::unknown_type(Self::FAMILY, &kind, self.names()))?;
        log::info!("Selecting {} {} for {}", Self::FAMILY, kind, dict.name());
        factory(dict)
    }
}

impl fmt::Debug for DiracDeltaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiracDeltaRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl Default for DiracDeltaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_mesh::BoxMeshBuilder;

    #[test]
    fn test_sn_grad_delta() {
        let mesh = BoxMeshBuilder::new(4, 1, 1).build().unwrap();
        let alpha = VolField::extrapolated("alpha", &mesh, vec![1.0, 1.0, 0.0, 0.0]);
        let delta = SnGradDelta.delta(&mesh, &alpha);
        // 第 2 个内部面跨越界面：(0 − 1)·4
        assert_eq!(delta.values()[1], -4.0);
        assert_eq!(delta.values()[0], 0.0);

        let pc = SnGradPcDelta::from_dict(&Dictionary::new("deltaModel"));
        assert_eq!(pc.delta(&mesh, &alpha), delta);
        assert_eq!(pc.cpc(), 0.5);
    }

    #[test]
    fn test_registry() {
        let registry = DiracDeltaRegistry::standard();
        let dict = Dictionary::new("deltaModel");
        assert_eq!(registry.create(&dict).unwrap().type_name(), "snGrad");
        assert_eq!(dict.warnings().len(), 1);

        let dict = Dictionary::new("deltaModel").with("type", "snGradPC").with("Csk", 0.3);
        assert_eq!(registry.create(&dict).unwrap().type_name(), "snGradPC");

        let dict = Dictionary::new("deltaModel").with("type", "heaviside");
        assert!(matches!(registry.create(&dict), Err(MhError::UnknownType { .. })));
    }
}
