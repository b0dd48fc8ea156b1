// crates/mh_multiphase/src/smoother/normal_dir.rs

//! 界面法向平滑（`normalDir`）
//!
//! 持有一个 `sqrtAlphaInt` 权重因子和一个单次迭代的面平均委托。每次调用只计算一次权重 w，
//! 每次迭代：
//!
//! ```text
//! s ← average(w·φ) / average(w)
//! φ ← (1 − 2w)·s + 2w·φ0
//! ```
//!
//! 其中 φ0 为输入场。界面处 w ≈ 0.5，结果保持原值；远离界面处 w → 0，结果为平滑值。

use mh_config::Dictionary;
use mh_foundation::MhResult;
use std::borrow::Cow;

use super::{blend, read_num_iterations, FaceAverageSmoother, SmootherKernel, WeightedSmootherKernel};
use crate::fields::{FieldRegistry, FieldValue, VolField};
use crate::weight::SqrtAlphaInt;

/// 界面法向平滑核
#[derive(Debug)]
pub struct NormalDirSmoother {
    num_its: usize,
    weight: SqrtAlphaInt,
    smoother: FaceAverageSmoother,
}

impl NormalDirSmoother {
    /// 创建平滑核
    pub fn new(num_its: usize, alpha_name: impl Into<String>) -> Self {
        Self {
            num_its,
            weight: SqrtAlphaInt::new(alpha_name),
            smoother: FaceAverageSmoother::new(1, None),
        }
    }

    /// 从字典读取 `numIts` 与 `alpha`
    pub fn from_dict(dict: &Dictionary) -> Self {
        let num_its = read_num_iterations(dict);
        if !dict.found("alpha") {
            dict.warn(
                "alpha",
                format!(
                    "Keyword \"alpha\" not found in {}. Assuming the default value \"{}\" instead. \
                     A field with that name must exist when smoothing.",
                    dict.name(),
                    SqrtAlphaInt::DEFAULT_ALPHA
                ),
            );
        }
        let alpha: String = dict.lookup_or_default_quiet("alpha", SqrtAlphaInt::DEFAULT_ALPHA.to_string());
        Self::new(num_its, alpha)
    }

    /// 权重使用的体积分数字段名
    pub fn alpha_name(&self) -> &str {
        self.weight.alpha_name()
    }
}

impl<T: FieldValue> SmootherKernel<T> for NormalDirSmoother {
    fn type_name(&self) -> &'static str {
        "normalDir"
    }

    fn num_iterations(&self) -> usize {
        self.num_its
    }

    fn smoothen<'a>(&self, db: &FieldRegistry, field: &'a VolField<T>) -> MhResult<Cow<'a, VolField<T>>> {
        if self.num_its == 0 {
            return Ok(Cow::Borrowed(field));
        }
        let mesh = db.mesh();
        let weight = self.weight.compute(db)?;
        let (w_internal, w_boundary) = (weight.internal(), weight.boundary());

        let mut current = Cow::Borrowed(field);
        for iter in 0..self.num_its {
            let next = {
                let smoothed = self.smoother.smoothen_weighted(mesh, &*current, Some(&weight));
                blend(
                    mesh,
                    field,
                    &smoothed,
                    field,
                    |i| 1.0 - 2.0 * w_internal[i],
                    |i| 1.0 - 2.0 * w_boundary[i],
                )
            };
            current = Cow::Owned(next);
            log::trace!("normalDir {} 迭代 {}/{}", field.name(), iter + 1, self.num_its);
        }
        Ok(current)
    }
}
