// crates/mh_multiphase/src/smoother/csk.rs

//! 凸组合平滑（`Csk`）
//!
//! 每次迭代先用委托平滑核得到平滑值，再与上一次结果做凸组合：
//!
//! ```text
//! φ ← Csk·smoothen(φ) + (1 − Csk)·φ,    Csk ∈ [0, 1)
//! ```

use mh_config::Dictionary;
use mh_foundation::MhResult;
use std::borrow::Cow;

use super::{blend, read_num_iterations, SmootherKernel, SmootherRegistry};
use crate::fields::{FieldRegistry, FieldValue, VolField};
use crate::weight::WeightFactorRegistry;

/// 凸组合平滑核
#[derive(Debug)]
pub struct CskSmoother<T: FieldValue> {
    num_its: usize,
    csk: f64,
    smoother: Box<dyn SmootherKernel<T>>,
}

impl<T: FieldValue> CskSmoother<T> {
    /// 缺省松弛系数
    pub const DEFAULT_CSK: f64 = 0.5;

    /// 创建平滑核
    pub fn new(num_its: usize, csk: f64, smoother: Box<dyn SmootherKernel<T>>) -> Self {
        Self {
            num_its,
            csk,
            smoother,
        }
    }

    /// 从字典读取 `numIts`、`Csk` 与必需的 `smoother` 子字典
    pub fn from_dict(
        dict: &Dictionary,
        smoothers: &SmootherRegistry<T>,
        weights: &WeightFactorRegistry,
    ) -> MhResult<Self> {
        let num_its = read_num_iterations(dict);
        let csk = dict.lookup_checked(
            "Csk",
            Self::DEFAULT_CSK,
            |c: &f64| (0.0..1.0).contains(c),
            "This value must be in [0, 1)",
        );
        let smoother = smoothers.create(&dict.sub_dict("smoother")?, weights)?;
        Ok(Self::new(num_its, csk, smoother))
    }

    /// 松弛系数
    pub fn csk(&self) -> f64 {
        self.csk
    }

    /// 委托平滑核
    pub fn inner(&self) -> &dyn SmootherKernel<T> {
        self.smoother.as_ref()
    }
}

impl<T: FieldValue> SmootherKernel<T> for CskSmoother<T> {
    fn type_name(&self) -> &'static str {
        "Csk"
    }

    fn num_iterations(&self) -> usize {
        self.num_its
    }

    fn smoothen<'a>(&self, db: &FieldRegistry, field: &'a VolField<T>) -> MhResult<Cow<'a, VolField<T>>> {
        let mesh = db.mesh();
        let mut current = Cow::Borrowed(field);
        for iter in 0..self.num_its {
            let next = {
                let smoothed = self.smoother.smoothen(db, &*current)?;
                blend(mesh, field, &smoothed, &current, |_| self.csk, |_| self.csk)
            };
            current = Cow::Owned(next);
            log::trace!("Csk {} 迭代 {}/{}", field.name(), iter + 1, self.num_its);
        }
        Ok(current)
    }
}
