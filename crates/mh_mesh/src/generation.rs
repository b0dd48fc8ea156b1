// crates/mh_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供结构化六面体盒子网格生成工具，用于测试和验证：
//!
//! - [`BoxMeshBuilder`]: 矩形盒子网格生成器，六个侧面各为一个补丁
//!
//! # 使用示例
//!
//! ```rust
//! use mh_mesh::generation::BoxMeshBuilder;
//!
//! // 生成 10x10 的二维网格（z 方向一层，前后面为空补丁）
//! let mesh = BoxMeshBuilder::new(10, 10, 1)
//!     .extent([0.0, 0.0, 0.0], [1.0, 1.0, 0.1])
//!     .empty_z()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mesh.n_cells(), 100);
//! assert_eq!(mesh.n_internal_faces(), 180);
//! ```

use glam::DVec3;
use mh_foundation::{MhError, MhResult};

use crate::fv_mesh::{FvMesh, Patch, PatchKind};

/// 盒子侧面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// x 最小侧
    XMin,
    /// x 最大侧
    XMax,
    /// y 最小侧
    YMin,
    /// y 最大侧
    YMax,
    /// z 最小侧
    ZMin,
    /// z 最大侧
    ZMax,
}

impl Side {
    /// 全部侧面（补丁顺序）
    pub const ALL: [Side; 6] = [
        Side::XMin,
        Side::XMax,
        Side::YMin,
        Side::YMax,
        Side::ZMin,
        Side::ZMax,
    ];

    /// 缺省补丁名
    pub fn default_name(&self) -> &'static str {
        match self {
            Side::XMin => "xmin",
            Side::XMax => "xmax",
            Side::YMin => "ymin",
            Side::YMax => "ymax",
            Side::ZMin => "zmin",
            Side::ZMax => "zmax",
        }
    }

    /// 由缺省补丁名解析
    pub fn from_name(name: &str) -> Option<Side> {
        Side::ALL.into_iter().find(|s| s.default_name() == name)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// 盒子网格生成器
///
/// 单元按 `i + nx * (j + ny * k)` 编号，节点按 `i + (nx+1) * (j + (ny+1) * k)` 编号。
#[derive(Debug, Clone)]
pub struct BoxMeshBuilder {
    cells: [usize; 3],
    min: DVec3,
    max: DVec3,
    patches: [(String, PatchKind); 6],
}

impl BoxMeshBuilder {
    /// 创建生成器，缺省为单位立方体，所有侧面为普通补丁
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            cells: [nx, ny, nz],
            min: DVec3::ZERO,
            max: DVec3::ONE,
            patches: Side::ALL.map(|s| (s.default_name().to_string(), PatchKind::Patch)),
        }
    }

    /// 设置盒子范围
    pub fn extent(mut self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.min = DVec3::from_array(min);
        self.max = DVec3::from_array(max);
        self
    }

    /// 设置侧面补丁名与类型
    pub fn patch(mut self, side: Side, name: impl Into<String>, kind: PatchKind) -> Self {
        self.patches[side.index()] = (name.into(), kind);
        self
    }

    /// 设置侧面补丁类型
    pub fn kind(mut self, side: Side, kind: PatchKind) -> Self {
        self.patches[side.index()].1 = kind;
        self
    }

    /// 二维：z 方向前后面为空补丁
    pub fn empty_z(self) -> Self {
        self.kind(Side::ZMin, PatchKind::Empty)
            .kind(Side::ZMax, PatchKind::Empty)
    }

    /// 各方向网格间距
    pub fn spacing(&self) -> DVec3 {
        (self.max - self.min)
            / DVec3::new(
                self.cells[0] as f64,
                self.cells[1] as f64,
                self.cells[2] as f64,
            )
    }

    /// 构建网格
    pub fn build(&self) -> MhResult<FvMesh> {
        let [nx, ny, nz] = self.cells;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(MhError::invalid_input(format!(
                "盒子网格单元数必须为正: {:?}",
                self.cells
            )));
        }
        let d = self.spacing();
        if !(d.x > 0.0 && d.y > 0.0 && d.z > 0.0) {
            return Err(MhError::invalid_input(format!(
                "盒子范围无效: {:?} .. {:?}",
                self.min, self.max
            )));
        }

        // 添加节点
        let pid = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push(self.min + DVec3::new(i as f64, j as f64, k as f64) * d);
                }
            }
        }

        let cid = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

        // 法向沿 +x/+y/+z 的面（右手法则）
        let x_face = |i: usize, j: usize, k: usize| {
            vec![pid(i, j, k), pid(i, j + 1, k), pid(i, j + 1, k + 1), pid(i, j, k + 1)]
        };
        let y_face = |i: usize, j: usize, k: usize| {
            vec![pid(i, j, k), pid(i, j, k + 1), pid(i + 1, j, k + 1), pid(i + 1, j, k)]
        };
        let z_face = |i: usize, j: usize, k: usize| {
            vec![pid(i, j, k), pid(i + 1, j, k), pid(i + 1, j + 1, k), pid(i, j + 1, k)]
        };
        let reversed = |mut f: Vec<usize>| {
            f.reverse();
            f
        };

        let mut faces = Vec::new();
        let mut owner = Vec::new();
        let mut neighbour = Vec::new();

        // 内部面：逐单元向 +x, +y, +z 方向
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = cid(i, j, k);
                    if i + 1 < nx {
                        faces.push(x_face(i + 1, j, k));
                        owner.push(c);
                        neighbour.push(cid(i + 1, j, k));
                    }
                    if j + 1 < ny {
                        faces.push(y_face(i, j + 1, k));
                        owner.push(c);
                        neighbour.push(cid(i, j + 1, k));
                    }
                    if k + 1 < nz {
                        faces.push(z_face(i, j, k + 1));
                        owner.push(c);
                        neighbour.push(cid(i, j, k + 1));
                    }
                }
            }
        }

        // 边界面：按补丁顺序，面积矢量指向域外
        let mut patches = Vec::with_capacity(6);
        for side in Side::ALL {
            let start = faces.len();
            match side {
                Side::XMin | Side::XMax => {
                    let i = if side == Side::XMin { 0 } else { nx };
                    for k in 0..nz {
                        for j in 0..ny {
                            let f = x_face(i, j, k);
                            faces.push(if side == Side::XMin { reversed(f) } else { f });
                            owner.push(cid(i.min(nx - 1), j, k));
                        }
                    }
                }
                Side::YMin | Side::YMax => {
                    let j = if side == Side::YMin { 0 } else { ny };
                    for k in 0..nz {
                        for i in 0..nx {
                            let f = y_face(i, j, k);
                            faces.push(if side == Side::YMin { reversed(f) } else { f });
                            owner.push(cid(i, j.min(ny - 1), k));
                        }
                    }
                }
                Side::ZMin | Side::ZMax => {
                    let k = if side == Side::ZMin { 0 } else { nz };
                    for j in 0..ny {
                        for i in 0..nx {
                            let f = z_face(i, j, k);
                            faces.push(if side == Side::ZMin { reversed(f) } else { f });
                            owner.push(cid(i, j, k.min(nz - 1)));
                        }
                    }
                }
            }
            let (name, kind) = &self.patches[side.index()];
            patches.push(Patch::new(name.clone(), *kind, start, faces.len() - start));
        }

        log::debug!(
            "生成盒子网格 {}x{}x{}: {} 单元, {} 面",
            nx,
            ny,
            nz,
            nx * ny * nz,
            faces.len()
        );

        FvMesh::from_polyhedra(&points, &faces, owner, neighbour, patches)
    }
}
