// crates/mh_multiphase/src/smoother/face_average.rs

//! 面平均平滑（`cfcInterpolation`）
//!
//! 每次迭代将单元值替换为其各面插值的面积加权平均：
//!
//! ```text
//! φ ← average(φ)                         不加权
//! φ ← average(w·φ) / average(w)          加权
//! ```
//!
//! 权重在一次调用中只计算一次，所有迭代共用。

use mh_config::Dictionary;
use mh_foundation::MhResult;
use mh_mesh::FvMesh;
use std::borrow::Cow;

use super::{read_num_iterations, SmootherKernel, WeightedSmootherKernel};
use crate::fields::{FieldRegistry, FieldValue, VolField};
use crate::fvc;
use crate::weight::{WeightFactor, WeightFactorRegistry};

/// 面平均平滑核
#[derive(Debug)]
pub struct FaceAverageSmoother {
    num_its: usize,
    weight: Option<Box<dyn WeightFactor>>,
}

impl FaceAverageSmoother {
    /// 创建平滑核；`weight` 为 `None` 时仅能通过 [`WeightedSmootherKernel`] 接收外部权重
    pub fn new(num_its: usize, weight: Option<Box<dyn WeightFactor>>) -> Self {
        Self { num_its, weight }
    }

    /// 从字典读取 `numIts` 与 `weightFactor` 子字典
    pub fn from_dict(dict: &Dictionary, weights: &WeightFactorRegistry) -> MhResult<Self> {
        let num_its = read_num_iterations(dict);
        let weight = weights.create(&dict.sub_dict_or_empty("weightFactor"))?;
        Ok(Self::new(num_its, Some(weight)))
    }

    /// 权重因子
    pub fn weight_factor(&self) -> Option<&dyn WeightFactor> {
        self.weight.as_deref()
    }
}

impl<T: FieldValue> SmootherKernel<T> for FaceAverageSmoother {
    fn type_name(&self) -> &'static str {
        "cfcInterpolation"
    }

    fn num_iterations(&self) -> usize {
        self.num_its
    }

    fn smoothen<'a>(&self, db: &FieldRegistry, field: &'a VolField<T>) -> MhResult<Cow<'a, VolField<T>>> {
        if self.num_its == 0 {
            return Ok(Cow::Borrowed(field));
        }
        let weight = match &self.weight {
            Some(factor) => factor.weight(db)?,
            None => None,
        };
        Ok(self.smoothen_weighted(db.mesh(), field, weight.as_ref()))
    }
}

impl<T: FieldValue> WeightedSmootherKernel<T> for FaceAverageSmoother {
    fn smoothen_weighted<'a>(
        &self,
        mesh: &FvMesh,
        field: &'a VolField<T>,
        weight: Option<&VolField<f64>>,
    ) -> Cow<'a, VolField<T>> {
        let mut current = Cow::Borrowed(field);
        for iter in 0..self.num_its {
            let (internal, boundary) = fvc::weighted_average(mesh, &*current, weight).into_values();
            current = Cow::Owned(field.derived(mesh, internal, boundary));
            log::trace!(
                "cfcInterpolation {} 迭代 {}/{} (加权: {})",
                field.name(),
                iter + 1,
                self.num_its,
                weight.is_some()
            );
        }
        current
    }
}
