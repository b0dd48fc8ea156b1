// crates/mh_mesh/src/lib.rs

//! MariHydro 网格模块
//!
//! 提供以面寻址的有限体积网格，用于界面曲率与表面张力计算。
//!
//! # 核心类型
//!
//! - [`FvMesh`]: 只读的 SoA 布局多面体网格（owner/neighbour 寻址）
//! - [`Patch`]: 边界补丁（连续的边界面区间）
//! - [`BoxMeshBuilder`]: 结构化盒子网格生成器
//!
//! # 示例
//!
//! ```rust
//! use mh_mesh::{BoxMeshBuilder, PatchKind};
//! use mh_mesh::generation::Side;
//!
//! let mesh = BoxMeshBuilder::new(8, 8, 8)
//!     .patch(Side::YMin, "bottom", PatchKind::Wall)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mesh.n_cells(), 512);
//! assert!((mesh.mean_cell_volume() - 1.0 / 512.0).abs() < 1e-15);
//! ```

#![warn(clippy::all)]

pub mod fv_mesh;
pub mod generation;

// 重新导出核心类型
pub use fv_mesh::{FvMesh, MeshStatistics, Patch, PatchKind};
pub use generation::BoxMeshBuilder;
