// crates/mh_multiphase/src/smoother/registry.rs

//! 平滑核注册表
//!
//! 每种场值类型（标量、矢量）各有一个注册表，按 `type` 构造平滑核。

use glam::DVec3;
use mh_config::Dictionary;
use mh_foundation::{MhError, MhResult};
use std::collections::BTreeMap;
use std::fmt;

use super::{CskSmoother, FaceAverageSmoother, NoSmoothing, NormalDirSmoother, SmootherKernel};
use crate::fields::FieldValue;
use crate::selectors::ModelSelectors;
use crate::weight::WeightFactorRegistry;

/// 平滑核构造函数
///
/// 组合平滑核通过传入的注册表构造其委托。
pub type SmootherFactory<T> =
    fn(&Dictionary, &SmootherRegistry<T>, &WeightFactorRegistry) -> MhResult<Box<dyn SmootherKernel<T>>>;

/// 平滑核注册表
pub struct SmootherRegistry<T: FieldValue> {
    factories: BTreeMap<&'static str, SmootherFactory<T>>,
}

impl<T: FieldValue> SmootherRegistry<T> {
    /// 模型族名称
    pub const FAMILY: &'static str = "smootherKernel";

    /// 缺省类型
    pub const DEFAULT_TYPE: &'static str = "none";

    /// 空注册表
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 标准注册表：`cfcInterpolation`、`Csk`、`normalDir`、`none`
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("none", |_, _, _| Ok(Box::new(NoSmoothing)));
        registry.register("cfcInterpolation", |dict, _, weights| {
            Ok(Box::new(FaceAverageSmoother::from_dict(dict, weights)?))
        });
        registry.register("Csk", |dict, smoothers, weights| {
            Ok(Box::new(CskSmoother::from_dict(dict, smoothers, weights)?))
        });
        registry.register("normalDir", |dict, _, _| Ok(Box::new(NormalDirSmoother::from_dict(dict))));
        registry
    }

    /// 注册构造函数
    pub fn register(&mut self, name: &'static str, factory: SmootherFactory<T>) {
        self.factories.insert(name, factory);
    }

    /// 已注册类型名（已排序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().map(|s| s.to_string()).collect()
    }

    /// 按 `type` 构造；缺失时使用 `none` 并警告，未知类型为致命错误
    pub fn create(&self, dict: &Dictionary, weights: &WeightFactorRegistry) -> MhResult<Box<dyn SmootherKernel<T>>> {
        let kind: String = dict.lookup_or_default("type", Self::DEFAULT_TYPE.to_string());
        let factory = self
            .factories
            .get(kind.as_str())
            .ok_or_else(|| MhError::unknown_type(Self::FAMILY, &kind, self.names()))?;
        log::info!(
            "Selecting {} {} ({}) for {}",
            Self::FAMILY,
            kind,
            T::rank_name(),
            dict.name()
        );
        factory(dict, self, weights)
    }
}

impl<T: FieldValue> Clone for SmootherRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<T: FieldValue> fmt::Debug for SmootherRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmootherRegistry")
            .field("rank", &T::rank_name())
            .field("types", &self.names())
            .finish()
    }
}

impl<T: FieldValue> Default for SmootherRegistry<T> {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================
// 按场值类型取注册表
// ============================================================

/// 可平滑的场值类型
pub trait SmootherRank: FieldValue {
    /// 选择器集合中对应的注册表
    fn registry(selectors: &ModelSelectors) -> &SmootherRegistry<Self>;
}

impl SmootherRank for f64 {
    fn registry(selectors: &ModelSelectors) -> &SmootherRegistry<Self> {
        selectors.scalar_smoothers()
    }
}

impl SmootherRank for DVec3 {
    fn registry(selectors: &ModelSelectors) -> &SmootherRegistry<Self> {
        selectors.vector_smoothers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldRegistry, VolField};
    use mh_mesh::BoxMeshBuilder;
    use std::sync::Arc;

    #[test]
    fn test_default_type_is_none() {
        let registry = SmootherRegistry::<f64>::standard();
        let dict = Dictionary::new("smoothAlpha");
        let smoother = registry.create(&dict, &WeightFactorRegistry::standard()).unwrap();
        assert_eq!(smoother.type_name(), "none");
        assert_eq!(smoother.num_iterations(), 0);
        assert_eq!(dict.warnings().len(), 1);
    }

    #[test]
    fn test_unknown_type_lists_valid_names() {
        let registry = SmootherRegistry::<DVec3>::standard();
        let dict = Dictionary::new("smoothAlpha").with("type", "gaussian");
        match registry.create(&dict, &WeightFactorRegistry::standard()) {
            Err(MhError::UnknownType { family, name, valid }) => {
                assert_eq!(family, "smootherKernel");
                assert_eq!(name, "gaussian");
                assert_eq!(valid, vec!["Csk", "cfcInterpolation", "none", "normalDir"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_csk_of_cfc() {
        let registry = SmootherRegistry::<DVec3>::standard();
        let dict = Dictionary::from_json_str(
            "smoothNormal",
            r#"{ "type": "Csk", "numIts": 2, "Csk": 0.4,
                 "smoother": { "type": "cfcInterpolation", "numIts": 1,
                               "weightFactor": { "type": "unweighted" } } }"#,
        )
        .unwrap();
        let smoother = registry.create(&dict, &WeightFactorRegistry::standard()).unwrap();
        assert_eq!(smoother.type_name(), "Csk");
        assert!(dict.diagnostics().is_empty());

        let mesh = Arc::new(BoxMeshBuilder::new(3, 3, 1).empty_z().build().unwrap());
        let db = FieldRegistry::new(mesh.clone());
        let field = VolField::uniform("n", &mesh, DVec3::new(0.0, 1.0, 0.0));
        let out = smoother.smoothen(&db, &field).unwrap();
        for v in out.internal() {
            assert!((*v - DVec3::Y).length() < 1e-14);
        }
    }

    #[test]
    fn test_none_is_identity() {
        let registry = SmootherRegistry::<f64>::standard();
        let dict = Dictionary::new("s").with("type", "none");
        let smoother = registry.create(&dict, &WeightFactorRegistry::standard()).unwrap();
        let mesh = Arc::new(BoxMeshBuilder::new(2, 2, 1).build().unwrap());
        let db = FieldRegistry::new(mesh.clone());
        let field = VolField::extrapolated("x", &mesh, vec![0.1, 0.2, 0.3, 0.4]);
        let out = smoother.smoothen(&db, &field).unwrap();
        assert_eq!(*out, field);
    }
}
