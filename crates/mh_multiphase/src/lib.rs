// crates/mh_multiphase/src/lib.rs

//! MariHydro 多相界面层
//!
//! 基于体积分数 (VOF) 的界面曲率估计，包括：
//! - 场与场注册表 (fields)
//! - 有限体积算子 (fvc) - 插值、梯度、散度、面平均
//! - 边界条件与接触角模型 (boundary)
//! - 权重因子 (weight)
//! - 场平滑核 (smoother)
//! - 曲率模型 (curvature) - `normal`、`smoothed`
//! - Dirac δ 与表面张力系数 (dirac_delta, surface_tension)
//! - 界面属性 (interface)
//!
//! # 计算流程
//!
//! ```text
//! α ──(平滑)──> α̃ ──grad──> n̂ = ∇α̃/(|∇α̃| + ε) ──接触角修正──> n̂·Sf ──div──> K = −∇·n̂
//!                                                                            │
//!                                                                      (平滑) └──> K
//! ```
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//! use mh_config::Dictionary;
//! use mh_mesh::BoxMeshBuilder;
//! use mh_multiphase::{FieldRegistry, InterfaceProperties, ModelSelectors, VolField};
//!
//! let mesh = Arc::new(BoxMeshBuilder::new(8, 8, 1).empty_z().build().unwrap());
//! let alpha = mesh.cell_centres().iter().map(|c| if c.x < 0.5 { 1.0 } else { 0.0 }).collect();
//! let mut db = FieldRegistry::new(mesh.clone());
//! db.insert_scalar(VolField::extrapolated("alpha.water", &mesh, alpha)).unwrap();
//!
//! let transport = Dictionary::from_json_str(
//!     "transportProperties",
//!     r#"{ "phases": ["water", "air"], "water": { "rho": 1000.0 }, "air": { "rho": 1.0 },
//!          "sigma": 0.07, "curvatureModel": "normal" }"#,
//! ).unwrap();
//! let props = InterfaceProperties::new(transport, &mut db, "alpha.water", "U", ModelSelectors::standard()).unwrap();
//! assert!(props.k().internal().iter().all(|k| k.is_finite()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod curvature;
pub mod dirac_delta;
pub mod fields;
pub mod fvc;
pub mod interface;
pub mod selectors;
pub mod smoother;
pub mod surface_tension;
pub mod weight;

// 重导出常用类型
pub use boundary::ContactAngleModel;
pub use curvature::{
    CurvatureContext, CurvatureModel, CurvatureModelRegistry, NormalCurvature, PatchGradientUpdate,
    SmoothedCurvature,
};
pub use dirac_delta::{DiracDeltaModel, DiracDeltaRegistry, SnGradDelta, SnGradPcDelta};
pub use fields::{FieldRegistry, FieldValue, PatchCondition, SurfaceField, VolField};
pub use interface::InterfaceProperties;
pub use selectors::ModelSelectors;
pub use smoother::{
    smoothen_registered, CskSmoother, FaceAverageSmoother, NoSmoothing, NormalDirSmoother, SmootherKernel,
    SmootherRegistry,
};
pub use surface_tension::SurfaceTensionModel;
pub use weight::{SqrtAlphaInt, Unweighted, WeightFactor, WeightFactorRegistry};
