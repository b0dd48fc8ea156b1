// crates/mh_multiphase/src/selectors.rs

//! 运行时模型选择器集合
//!
//! 所有按名称构造的模型族在一个显式对象中注册，构造后按引用传给各工厂函数。

use glam::DVec3;

use crate::curvature::CurvatureModelRegistry;
use crate::dirac_delta::DiracDeltaRegistry;
use crate::smoother::SmootherRegistry;
use crate::weight::WeightFactorRegistry;

/// 模型选择器集合
#[derive(Debug, Clone)]
pub struct ModelSelectors {
    weights: WeightFactorRegistry,
    scalar_smoothers: SmootherRegistry<f64>,
    vector_smoothers: SmootherRegistry<DVec3>,
    curvature_models: CurvatureModelRegistry,
    delta_models: DiracDeltaRegistry,
}

impl ModelSelectors {
    /// 标准模型集合
    pub fn standard() -> Self {
        Self {
            weights: WeightFactorRegistry::standard(),
            scalar_smoothers: SmootherRegistry::standard(),
            vector_smoothers: SmootherRegistry::standard(),
            curvature_models: CurvatureModelRegistry::standard(),
            delta_models: DiracDeltaRegistry::standard(),
        }
    }

    /// 权重因子
    pub fn weights(&self) -> &WeightFactorRegistry {
        &self.weights
    }

    /// 权重因子（可注册新类型）
    pub fn weights_mut(&mut self) -> &mut WeightFactorRegistry {
        &mut self.weights
    }

    /// 标量平滑核
    pub fn scalar_smoothers(&self) -> &SmootherRegistry<f64> {
        &self.scalar_smoothers
    }

    /// 标量平滑核（可注册新类型）
    pub fn scalar_smoothers_mut(&mut self) -> &mut SmootherRegistry<f64> {
        &mut self.scalar_smoothers
    }

    /// 矢量平滑核
    pub fn vector_smoothers(&self) -> &SmootherRegistry<DVec3> {
        &self.vector_smoothers
    }

    /// 曲率模型
    pub fn curvature_models(&self) -> &CurvatureModelRegistry {
        &self.curvature_models
    }

    /// Dirac δ 模型
    pub fn delta_models(&self) -> &DiracDeltaRegistry {
        &self.delta_models
    }
}

impl Default for ModelSelectors {
    fn default() -> Self {
        Self::standard()
    }
}
