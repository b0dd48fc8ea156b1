// crates/mh_config/src/lib.rs

//! MariHydro Config Layer
//!
//! 配置层，提供嵌套字典和算例配置。
//!
//! # 模块概览
//!
//! - [`dictionary`]: 带路径名的嵌套字典，缺省值回退并记录诊断
//! - [`case_config`]: 算例配置（网格、初始体积分数、边界条件）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! mh_cli         ─> CaseConfig
//! mh_multiphase  ─> Dictionary（模型选择与参数读取）
//! mh_config      ─> Dictionary, CaseConfig (本层)
//! mh_foundation
//! ```
//!
//! # 设计原则
//!
//! 1. **缺省可恢复**: 可选参数缺失或越界只产生诊断，不产生错误
//! 2. **必需项致命**: 缺失必需条目或子字典返回 [`ConfigError`]
//! 3. **全 f64 配置**: 所有数值使用 f64

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case_config;
pub mod dictionary;
pub mod error;

// 重导出核心类型
pub use case_config::{AlphaInit, CaseConfig, MeshConfig, OutputConfig};
pub use dictionary::{Diagnostic, Dictionary, Severity};
pub use error::ConfigError;
