// crates/mh_multiphase/src/weight.rs

//! 平滑权重因子
//!
//! 权重因子根据体积分数给出每个单元的平滑权重。"不加权"以 `None` 表示，
//! 而不是一个全为 1 的场。
//!
//! | 类型名 | 权重 |
//! |--------|------|
//! | `unweighted` | `None` |
//! | `sqrtAlphaInt`, `Raeini` | √(α(1−α) + SMALL)，α 截断到 [0, 1] |

use mh_config::Dictionary;
use mh_foundation::float::{safe_sqrt, SMALL};
use mh_foundation::{MhError, MhResult};
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::{FieldRegistry, VolField};

/// 权重因子
pub trait WeightFactor: Send + Sync + fmt::Debug {
    /// 类型名
    fn type_name(&self) -> &'static str;

    /// 计算权重场；`None` 表示均匀不加权
    fn weight(&self, db: &FieldRegistry) -> MhResult<Option<VolField<f64>>>;
}

// ============================================================
// 不加权
// ============================================================

/// 不加权
#[derive(Debug, Clone, Default)]
pub struct Unweighted;

impl WeightFactor for Unweighted {
    fn type_name(&self) -> &'static str {
        "unweighted"
    }

    fn weight(&self, _db: &FieldRegistry) -> MhResult<Option<VolField<f64>>> {
        Ok(None)
    }
}

// ============================================================
// 界面权重
// ============================================================

/// 界面权重 √(α(1−α) + SMALL)
///
/// 在 α = 0.5 处取最大值 ≈ 0.5，远离界面处趋于 √SMALL。
#[derive(Debug, Clone)]
pub struct SqrtAlphaInt {
    alpha_name: String,
}

impl SqrtAlphaInt {
    /// 缺省体积分数字段名
    pub const DEFAULT_ALPHA: &'static str = "alpha";

    /// 以体积分数字段名创建
    pub fn new(alpha_name: impl Into<String>) -> Self {
        Self {
            alpha_name: alpha_name.into(),
        }
    }

    /// 从字典读取 `alpha`，缺失时使用 `"alpha"` 并警告
    pub fn from_dict(dict: &Dictionary) -> Self {
        Self::new(dict.lookup_or_default("alpha", Self::DEFAULT_ALPHA.to_string()))
    }

    /// 体积分数字段名
    pub fn alpha_name(&self) -> &str {
        &self.alpha_name
    }

    /// 单点权重
    #[inline]
    pub fn value(alpha: f64) -> f64 {
        let a = alpha.clamp(0.0, 1.0);
        safe_sqrt(a * (1.0 - a) + SMALL)
    }

    /// 计算权重场（单元值与边界值）
    pub fn compute(&self, db: &FieldRegistry) -> MhResult<VolField<f64>> {
        let alpha = db.scalar(&self.alpha_name)?;
        log::trace!("计算权重 sqrtAlphaInt({})", self.alpha_name);
        Ok(alpha.map(
            db.mesh(),
            format!("sqrtAlphaInt({})", self.alpha_name),
            Self::value,
        ))
    }
}

impl WeightFactor for SqrtAlphaInt {
    fn type_name(&self) -> &'static str {
        "sqrtAlphaInt"
    }

    fn weight(&self, db: &FieldRegistry) -> MhResult<Option<VolField<f64>>> {
        self.compute(db).map(Some)
    }
}

// ============================================================
// 选择
// ============================================================

/// 权重因子构造函数
pub type WeightFactorFactory = fn(&Dictionary) -> MhResult<Box<dyn WeightFactor>>;

/// 权重因子注册表
#[derive(Clone)]
pub struct WeightFactorRegistry {
    factories: BTreeMap<&'static str, WeightFactorFactory>,
}

impl WeightFactorRegistry {
    /// 模型族名称
    pub const FAMILY: &'static str = "weightFactor";

    /// 缺省类型
    pub const DEFAULT_TYPE: &'static str = "unweighted";

    /// 空注册表
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 标准注册表
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("unweighted", |_| Ok(Box::new(Unweighted)));
        registry.register("sqrtAlphaInt", |dict| Ok(Box::new(SqrtAlphaInt::from_dict(dict))));
        registry.register("Raeini", |dict| Ok(Box::new(SqrtAlphaInt::from_dict(dict))));
        registry
    }

    /// 注册构造函数
    pub fn register(&mut self, name: &'static str, factory: WeightFactorFactory) {
        self.factories.insert(name, factory);
    }

    /// 已注册类型名（已排序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().map(|s| s.to_string()).collect()
    }

    /// 按 `type` 构造；缺失时使用 `unweighted` 并警告
    pub fn create(&self, dict: &Dictionary) -> MhResult<Box<dyn WeightFactor>> {
        let kind: String = dict.lookup_or_default("type", Self::DEFAULT_TYPE.to_string());
        let factory = self
            .factories
            .get(kind.as_str())
            .ok_or_else(|| MhError::unknown_type(Self::FAMILY, &kind, self.names()))?;
        log::info!("Selecting {} {} for {}", Self::FAMILY, kind, dict.name());
        factory(dict)
    }
}

impl fmt::Debug for WeightFactorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightFactorRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl Default for WeightFactorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_mesh::BoxMeshBuilder;
    use std::sync::Arc;

    fn registry_with_alpha(values: Vec<f64>) -> FieldRegistry {
        let mesh = Arc::new(BoxMeshBuilder::new(values.len(), 1, 1).build().unwrap());
        let mut db = FieldRegistry::new(mesh.clone());
        db.insert_scalar(VolField::extrapolated("alpha", &mesh, values)).unwrap();
        db
    }

    #[test]
    fn test_value_symmetry_and_limits() {
        // 二进制网格上 1 - a 精确，对称性逐位成立
        for i in 0..=128 {
            let a = i as f64 / 128.0;
            assert_eq!(SqrtAlphaInt::value(a), SqrtAlphaInt::value(1.0 - a), "a = {a}");
        }
        // 十进制 α 的 1 - (1 - a) 有舍入，只要求相对误差
        for i in 0..=100 {
            let a = i as f64 / 100.0;
            let (w, w_mirror) = (SqrtAlphaInt::value(a), SqrtAlphaInt::value(1.0 - a));
            assert!((w - w_mirror).abs() <= 1e-15 * w, "a = {a}: {w} vs {w_mirror}");
        }
        assert_eq!(SqrtAlphaInt::value(0.0), SMALL.sqrt());
        assert_eq!(SqrtAlphaInt::value(1.0), SMALL.sqrt());
        // 越界值先截断
        assert_eq!(SqrtAlphaInt::value(-0.2), SMALL.sqrt());
        assert_eq!(SqrtAlphaInt::value(1.3), SMALL.sqrt());
    }

    #[test]
    fn test_value_peaks_at_half() {
        let peak = SqrtAlphaInt::value(0.5);
        for i in 0..=100 {
            assert!(SqrtAlphaInt::value(i as f64 / 100.0) <= peak);
        }
        assert!((peak - (0.25 + SMALL).sqrt()).abs() < 1e-16);
    }

    #[test]
    fn test_weight_field_including_boundary() {
        let db = registry_with_alpha(vec![0.0, 0.5, 1.0]);
        let w = SqrtAlphaInt::new("alpha").weight(&db).unwrap().unwrap();
        assert_eq!(w.internal()[1], SqrtAlphaInt::value(0.5));
        let mesh = db.mesh();
        let xmax = mesh.patch_index("xmax").unwrap();
        assert_eq!(w.patch_values(mesh, xmax), &[SMALL.sqrt()]);
    }

    #[test]
    fn test_unweighted_is_none() {
        let db = registry_with_alpha(vec![0.5]);
        assert!(Unweighted.weight(&db).unwrap().is_none());
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let db = registry_with_alpha(vec![0.5]);
        let result = SqrtAlphaInt::new("alpha.water").weight(&db);
        assert!(matches!(result, Err(MhError::FieldNotFound { .. })));
    }

    #[test]
    fn test_registry_selection() {
        let registry = WeightFactorRegistry::standard();
        let dict = Dictionary::new("weightFactor").with("type", "Raeini").with("alpha", "alpha.water");
        assert_eq!(registry.create(&dict).unwrap().type_name(), "sqrtAlphaInt");

        // 缺省 type
        let dict = Dictionary::new("weightFactor");
        assert_eq!(registry.create(&dict).unwrap().type_name(), "unweighted");
        assert_eq!(dict.warnings().len(), 1);

        // 缺省 alpha 名
        let dict = Dictionary::new("weightFactor").with("type", "sqrtAlphaInt");
        registry.create(&dict).unwrap();
        assert!(dict.warnings().iter().any(|d| d.key == "alpha"));
    }

    #[test]
    fn test_unknown_type_lists_valid_names() {
        let registry = WeightFactorRegistry::standard();
        let dict = Dictionary::new("weightFactor").with("type", "bogus");
        match registry.create(&dict) {
            Err(MhError::UnknownType { family, valid, .. }) => {
                assert_eq!(family, "weightFactor");
                assert_eq!(valid, vec!["Raeini", "sqrtAlphaInt", "unweighted"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
