// crates/mh_multiphase/src/smoother/mod.rs

//! 场平滑核
//!
//! 所有平滑核都是迭代式的，迭代次数在构造时确定。迭代次数为零时平滑为恒等映射，
//! 返回 [`Cow::Borrowed`]；调用方需要持久化结果时调用 `into_owned()` 得到独立副本，
//! 因此被覆盖的持久场不会与输入共享存储。
//!
//! # 平滑核类型
//!
//! | 类型名 | 实现 | 说明 |
//! |--------|------|------|
//! | `cfcInterpolation` | [`FaceAverageSmoother`] | 面积加权面平均，可选权重因子 |
//! | `Csk` | [`CskSmoother`] | 与委托平滑核结果的凸组合 |
//! | `normalDir` | [`NormalDirSmoother`] | 界面附近保持原值的法向平滑 |
//! | `none` | [`NoSmoothing`] | 不平滑 |
//!
//! # 配置示例
//!
//! ```json
//! "smoothAlpha": {
//!     "type": "Csk",
//!     "numIts": 2,
//!     "Csk": 0.5,
//!     "smoother": { "type": "cfcInterpolation", "numIts": 1,
//!                   "weightFactor": { "type": "unweighted" } }
//! }
//! ```
//!
//! 每次迭代后结果以输入场的名称与边界条件重建，并重新求值边界。

mod csk;
mod face_average;
mod normal_dir;
mod registry;

pub use csk::CskSmoother;
pub use face_average::FaceAverageSmoother;
pub use normal_dir::NormalDirSmoother;
pub use registry::{SmootherFactory, SmootherRank, SmootherRegistry};

use mh_config::Dictionary;
use mh_foundation::MhResult;
use mh_mesh::FvMesh;
use std::borrow::Cow;
use std::fmt;

use crate::fields::{FieldRegistry, FieldValue, VolField};

/// 缺省迭代次数
pub const DEFAULT_NUM_ITS: usize = 2;

/// 场平滑核
pub trait SmootherKernel<T: FieldValue>: Send + Sync + fmt::Debug {
    /// 类型名
    fn type_name(&self) -> &'static str;

    /// 迭代次数
    fn num_iterations(&self) -> usize;

    /// 平滑场
    ///
    /// 迭代次数为零时返回借用的输入；否则返回新计算的场。
    fn smoothen<'a>(&self, db: &FieldRegistry, field: &'a VolField<T>) -> MhResult<Cow<'a, VolField<T>>>;
}

/// 可接收外部权重的平滑核
///
/// 组合平滑核在一次调用中只计算一次权重，然后逐次迭代传给委托。
pub trait WeightedSmootherKernel<T: FieldValue>: SmootherKernel<T> {
    /// 以给定权重平滑；`None` 表示不加权
    fn smoothen_weighted<'a>(
        &self,
        mesh: &FvMesh,
        field: &'a VolField<T>,
        weight: Option<&VolField<f64>>,
    ) -> Cow<'a, VolField<T>>;
}

/// 读取 `numIts`
///
/// 缺失、无效或为负时回退到 [`DEFAULT_NUM_ITS`] 并警告；显式为 0 时接受并给出提示。
pub fn read_num_iterations(dict: &Dictionary) -> usize {
    match dict.lookup_optional::<i64>("numIts") {
        Ok(Some(n)) if n > 0 => n as usize,
        Ok(Some(0)) => {
            dict.note(
                "numIts",
                format!("Specified numIts = 0 in {}. Smoothing is disabled.", dict.name()),
            );
            0
        }
        Ok(Some(n)) => {
            dict.warn(
                "numIts",
                format!(
                    "Specified numIts = {n} in {}. This value must not be negative. \
                     Assuming the default value {DEFAULT_NUM_ITS} instead.",
                    dict.name()
                ),
            );
            DEFAULT_NUM_ITS
        }
        Ok(None) => {
            dict.warn(
                "numIts",
                format!(
                    "Keyword \"numIts\" not found in {}. Assuming the default value {DEFAULT_NUM_ITS} instead.",
                    dict.name()
                ),
            );
            DEFAULT_NUM_ITS
        }
        Err(e) => {
            dict.warn(
                "numIts",
                format!("{e}. Assuming the default value {DEFAULT_NUM_ITS} instead."),
            );
            DEFAULT_NUM_ITS
        }
    }
}

/// 逐元素凸组合 `a·wa + b·(1 − wa)`，以 `template` 的名称与边界条件重建
///
/// `wa` 按单元与边界面给出；结果重新求值边界。
pub(crate) fn blend<T: FieldValue>(
    mesh: &FvMesh,
    template: &VolField<T>,
    a: &VolField<T>,
    b: &VolField<T>,
    wa_internal: impl Fn(usize) -> f64,
    wa_boundary: impl Fn(usize) -> f64,
) -> VolField<T> {
    let internal = a
        .internal()
        .iter()
        .zip(b.internal())
        .enumerate()
        .map(|(i, (&x, &y))| {
            let w = wa_internal(i);
            x * w + y * (1.0 - w)
        })
        .collect();
    let boundary = a
        .boundary()
        .iter()
        .zip(b.boundary())
        .enumerate()
        .map(|(i, (&x, &y))| {
            let w = wa_boundary(i);
            x * w + y * (1.0 - w)
        })
        .collect();
    template.derived(mesh, internal, boundary)
}

// ============================================================
// 不平滑
// ============================================================

/// 不平滑（恒等）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSmoothing;

impl<T: FieldValue> SmootherKernel<T> for NoSmoothing {
    fn type_name(&self) -> &'static str {
        "none"
    }

    fn num_iterations(&self) -> usize {
        0
    }

    fn smoothen<'a>(&self, _db: &FieldRegistry, field: &'a VolField<T>) -> MhResult<Cow<'a, VolField<T>>> {
        Ok(Cow::Borrowed(field))
    }
}

/// 按名称平滑注册表中的标量场，返回独立副本
pub fn smoothen_registered(
    db: &FieldRegistry,
    smoother: &dyn SmootherKernel<f64>,
    name: &str,
) -> MhResult<VolField<f64>> {
    let field = db.scalar(name)?;
    log::debug!("平滑 {name}: {} x {}", smoother.type_name(), smoother.num_iterations());
    Ok(smoother.smoothen(db, field)?.into_owned())
}
