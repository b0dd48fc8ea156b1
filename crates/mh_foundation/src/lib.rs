// crates/mh_foundation/src/lib.rs

//! MariHydro Foundation Layer
//!
//! 最底层基础层，提供整个工作区共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `MhError` / `MhResult`
//! - [`float`]: 数值常量（`SMALL`、`VSMALL` 等）和安全浮点辅助函数
//!
//! # 示例
//!
//! ```
//! use mh_foundation::error::{MhError, MhResult};
//! use mh_foundation::float::{safe_div, SMALL};
//!
//! fn ratio(a: f64, b: f64) -> MhResult<f64> {
//!     if !a.is_finite() {
//!         return Err(MhError::invalid_input("a 非有限"));
//!     }
//!     Ok(safe_div(a, b, 0.0))
//! }
//!
//! assert_eq!(ratio(1.0, 0.0).unwrap(), 0.0);
//! assert!(SMALL > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;

// 重导出常用类型
pub use error::{MhError, MhResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{MhError, MhResult};
    pub use crate::float::{safe_div, safe_sqrt, ROOT_VSMALL, SMALL, VSMALL};
    pub use crate::{ensure, require};
}
