// crates/mh_mesh/src/fv_mesh.rs

//! 有限体积网格
//!
//! 以面寻址的只读多面体网格，SoA 布局。
//!
//! # 面排序约定
//!
//! 1. 内部面 `0..n_internal_faces`，`owner < neighbour`，面积矢量由 owner 指向 neighbour
//! 2. 边界面按补丁连续排列，`Patch::start..Patch::start + Patch::size`，面积矢量指向域外
//!
//! # 几何量
//!
//! 面中心与面积矢量按三角扇分解计算，单元中心与体积按棱锥分解计算，
//! 对平面多边形面与凸多面体单元是精确的。

use glam::DVec3;
use mh_foundation::float::{ROOT_VSMALL, VSMALL};
use mh_foundation::{MhError, MhResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;

// ============================================================
// 边界补丁
// ============================================================

/// 补丁类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchKind {
    /// 普通补丁
    Patch,
    /// 壁面（可携带接触角条件）
    Wall,
    /// 对称面
    SymmetryPlane,
    /// 空补丁：二维算例的前后面，所有算子跳过
    Empty,
}

impl PatchKind {
    /// 类型名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Wall => "wall",
            Self::SymmetryPlane => "symmetryPlane",
            Self::Empty => "empty",
        }
    }
}

/// 边界补丁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// 补丁名
    pub name: String,
    /// 补丁类型
    pub kind: PatchKind,
    /// 第一个面的全局索引
    pub start: usize,
    /// 面数
    pub size: usize,
}

impl Patch {
    /// 创建补丁
    pub fn new(name: impl Into<String>, kind: PatchKind, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            start,
            size,
        }
    }

    /// 全局面索引范围
    #[inline]
    pub fn faces(&self) -> Range<usize> {
        self.start..self.start + self.size
    }

    /// 是否为空补丁
    #[inline]
    pub fn is_empty_kind(&self) -> bool {
        self.kind == PatchKind::Empty
    }

    /// 是否为壁面
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.kind == PatchKind::Wall
    }
}

// ============================================================
// 网格
// ============================================================

/// 有限体积网格
#[derive(Debug, Clone)]
pub struct FvMesh {
    // ===== 单元数据 =====
    n_cells: usize,
    cell_centres: Vec<DVec3>,
    cell_volumes: Vec<f64>,
    /// 单元面索引 (压缩格式: offsets + indices)
    cell_face_offsets: Vec<usize>,
    cell_face_indices: Vec<usize>,

    // ===== 面数据 =====
    n_internal_faces: usize,
    face_centres: Vec<DVec3>,
    /// 面积矢量 Sf
    face_areas: Vec<DVec3>,
    /// |Sf|
    face_mag_areas: Vec<f64>,
    owner: Vec<usize>,
    /// 仅内部面
    neighbour: Vec<usize>,
    /// 线性插值权重（owner 侧）；边界面为 1
    weights: Vec<f64>,
    /// 1 / (n̂·d)
    delta_coeffs: Vec<f64>,

    // ===== 边界数据 =====
    patches: Vec<Patch>,

    // ===== 统计 =====
    mean_cell_volume: f64,
}

impl FvMesh {
    /// 由节点和多边形面构建网格
    ///
    /// # 参数
    ///
    /// - `points`: 节点坐标
    /// - `faces`: 每个面的节点索引（右手法则给出面积矢量方向）
    /// - `owner`: 每个面的 owner 单元
    /// - `neighbour`: 每个内部面的 neighbour 单元
    /// - `patches`: 边界补丁，必须连续覆盖 `neighbour.len()..faces.len()`
    pub fn from_polyhedra(
        points: &[DVec3],
        faces: &[Vec<usize>],
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<Patch>,
    ) -> MhResult<Self> {
        MhError::check_size("owner", faces.len(), owner.len())?;
        if neighbour.len() > faces.len() {
            return Err(MhError::invalid_mesh(format!(
                "内部面数 {} 超过总面数 {}",
                neighbour.len(),
                faces.len()
            )));
        }

        let mut face_centres = Vec::with_capacity(faces.len());
        let mut face_areas = Vec::with_capacity(faces.len());
        for (f, verts) in faces.iter().enumerate() {
            if verts.len() < 3 {
                return Err(MhError::invalid_mesh(format!("面 {f} 只有 {} 个节点", verts.len())));
            }
            for &v in verts {
                MhError::check_index("Point", v, points.len())?;
            }
            let (c, s) = polygon_centre_and_area(points, verts);
            face_centres.push(c);
            face_areas.push(s);
        }

        let n_cells = owner
            .iter()
            .chain(neighbour.iter())
            .copied()
            .max()
            .map_or(0, |m| m + 1);

        let (cell_centres, cell_volumes) =
            cell_centres_and_volumes(n_cells, &face_centres, &face_areas, &owner, &neighbour);

        Self::from_geometry(
            cell_centres,
            cell_volumes,
            face_centres,
            face_areas,
            owner,
            neighbour,
            patches,
        )
    }

    /// 由已计算的几何量构建网格
    pub fn from_geometry(
        cell_centres: Vec<DVec3>,
        cell_volumes: Vec<f64>,
        face_centres: Vec<DVec3>,
        face_areas: Vec<DVec3>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<Patch>,
    ) -> MhResult<Self> {
        let n_cells = cell_centres.len();
        let n_faces = face_centres.len();
        let n_internal_faces = neighbour.len();

        MhError::check_size("cell_volumes", n_cells, cell_volumes.len())?;
        MhError::check_size("face_areas", n_faces, face_areas.len())?;
        MhError::check_size("owner", n_faces, owner.len())?;

        let face_mag_areas: Vec<f64> = face_areas.iter().map(|s| s.length()).collect();

        // 线性插值权重与 delta 系数
        let mut weights = vec![1.0; n_faces];
        let mut delta_coeffs = vec![0.0; n_faces];
        for f in 0..n_faces {
            let o = owner[f];
            MhError::check_index("Cell", o, n_cells)?;
            let n_hat = face_areas[f] / face_mag_areas[f].max(VSMALL);
            if f < n_internal_faces {
                let nb = neighbour[f];
                MhError::check_index("Cell", nb, n_cells)?;
                let sf = face_areas[f];
                let d_own = sf.dot(face_centres[f] - cell_centres[o]);
                let d_nei = sf.dot(cell_centres[nb] - face_centres[f]);
                weights[f] = d_nei / (d_own + d_nei).max(VSMALL);
                delta_coeffs[f] = 1.0 / n_hat.dot(cell_centres[nb] - cell_centres[o]).max(VSMALL);
            } else {
                delta_coeffs[f] = 1.0 / n_hat.dot(face_centres[f] - cell_centres[o]).max(VSMALL);
            }
        }

        // 单元面 CSR
        let mut counts = vec![0usize; n_cells];
        for f in 0..n_faces {
            counts[owner[f]] += 1;
            if f < n_internal_faces {
                counts[neighbour[f]] += 1;
            }
        }
        let mut cell_face_offsets = Vec::with_capacity(n_cells + 1);
        cell_face_offsets.push(0);
        for c in 0..n_cells {
            cell_face_offsets.push(cell_face_offsets[c] + counts[c]);
        }
        let mut cursor = cell_face_offsets[..n_cells].to_vec();
        let mut cell_face_indices = vec![0usize; cell_face_offsets[n_cells]];
        for f in 0..n_faces {
            let o = owner[f];
            cell_face_indices[cursor[o]] = f;
            cursor[o] += 1;
            if f < n_internal_faces {
                let nb = neighbour[f];
                cell_face_indices[cursor[nb]] = f;
                cursor[nb] += 1;
            }
        }

        let total_volume: f64 = cell_volumes.iter().sum();
        let mean_cell_volume = if n_cells > 0 {
            total_volume / n_cells as f64
        } else {
            0.0
        };

        let mesh = Self {
            n_cells,
            cell_centres,
            cell_volumes,
            cell_face_offsets,
            cell_face_indices,
            n_internal_faces,
            face_centres,
            face_areas,
            face_mag_areas,
            owner,
            neighbour,
            weights,
            delta_coeffs,
            patches,
            mean_cell_volume,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    // =========================================================================
    // 基本统计
    // =========================================================================

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 面数量
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_centres.len()
    }

    /// 内部面数量
    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.n_internal_faces
    }

    /// 边界面数量
    #[inline]
    pub fn n_boundary_faces(&self) -> usize {
        self.n_faces() - self.n_internal_faces
    }

    /// 平均单元体积
    #[inline]
    pub fn mean_cell_volume(&self) -> f64 {
        self.mean_cell_volume
    }

    // =========================================================================
    // 单元访问
    // =========================================================================

    /// 单元中心
    #[inline]
    pub fn cell_centres(&self) -> &[DVec3] {
        &self.cell_centres
    }

    /// 单元体积
    #[inline]
    pub fn cell_volumes(&self) -> &[f64] {
        &self.cell_volumes
    }

    /// 获取单元的面索引
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> &[usize] {
        let start = self.cell_face_offsets[cell];
        let end = self.cell_face_offsets[cell + 1];
        &self.cell_face_indices[start..end]
    }

    // =========================================================================
    // 面访问
    // =========================================================================

    /// 面中心
    #[inline]
    pub fn face_centres(&self) -> &[DVec3] {
        &self.face_centres
    }

    /// 面积矢量 Sf
    #[inline]
    pub fn face_areas(&self) -> &[DVec3] {
        &self.face_areas
    }

    /// 面积 |Sf|
    #[inline]
    pub fn face_mag_areas(&self) -> &[f64] {
        &self.face_mag_areas
    }

    /// 单位法向量
    #[inline]
    pub fn face_normal(&self, face: usize) -> DVec3 {
        self.face_areas[face] / self.face_mag_areas[face].max(VSMALL)
    }

    /// 面 owner
    #[inline]
    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    /// 内部面 neighbour
    #[inline]
    pub fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    /// 线性插值权重
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// delta 系数
    #[inline]
    pub fn delta_coeffs(&self) -> &[f64] {
        &self.delta_coeffs
    }

    // =========================================================================
    // 补丁
    // =========================================================================

    /// 所有补丁
    #[inline]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// 按名称查找补丁索引
    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name == name)
    }

    /// 按名称查找补丁
    pub fn patch_by_name(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }

    /// 补丁面的 owner 单元
    #[inline]
    pub fn patch_face_cells(&self, patch: usize) -> &[usize] {
        let p = &self.patches[patch];
        &self.owner[p.faces()]
    }

    // =========================================================================
    // 范围迭代
    // =========================================================================

    /// 内部面索引范围
    #[inline]
    pub fn internal_faces(&self) -> Range<usize> {
        0..self.n_internal_faces
    }

    /// 边界面索引范围
    #[inline]
    pub fn boundary_faces(&self) -> Range<usize> {
        self.n_internal_faces..self.n_faces()
    }

    /// 单元索引范围
    #[inline]
    pub fn cells(&self) -> Range<usize> {
        0..self.n_cells
    }

    // =========================================================================
    // 统计信息
    // =========================================================================

    /// 计算统计信息
    pub fn statistics(&self) -> MeshStatistics {
        let mut min_volume = f64::MAX;
        let mut max_volume = f64::MIN;
        let mut total_volume = 0.0;
        for &v in &self.cell_volumes {
            min_volume = min_volume.min(v);
            max_volume = max_volume.max(v);
            total_volume += v;
        }

        let mut min_area = f64::MAX;
        let mut max_area = f64::MIN;
        for &a in &self.face_mag_areas {
            min_area = min_area.min(a);
            max_area = max_area.max(a);
        }

        MeshStatistics {
            n_cells: self.n_cells,
            n_faces: self.n_faces(),
            n_internal_faces: self.n_internal_faces,
            n_boundary_faces: self.n_boundary_faces(),
            n_patches: self.patches.len(),
            total_volume,
            min_cell_volume: min_volume,
            max_cell_volume: max_volume,
            min_face_area: min_area,
            max_face_area: max_area,
        }
    }

    /// 验证网格完整性
    pub fn validate(&self) -> MhResult<()> {
        let n_faces = self.n_faces();

        // 检查 owner/neighbour
        for (f, &nb) in self.neighbour.iter().enumerate() {
            let o = self.owner[f];
            if o >= nb {
                return Err(MhError::invalid_mesh(format!(
                    "内部面 {f}: owner {o} 必须小于 neighbour {nb}"
                )));
            }
            if self.face_areas[f].dot(self.cell_centres[nb] - self.cell_centres[o]) <= 0.0 {
                return Err(MhError::invalid_mesh(format!(
                    "内部面 {f} 的面积矢量未指向 neighbour"
                )));
            }
        }

        // 检查补丁覆盖
        let mut next = self.n_internal_faces;
        for p in &self.patches {
            if p.start != next {
                return Err(MhError::invalid_mesh(format!(
                    "补丁 {} 起始于 {}, 期望 {next}",
                    p.name, p.start
                )));
            }
            next += p.size;
        }
        if next != n_faces {
            return Err(MhError::invalid_mesh(format!(
                "补丁覆盖到面 {next}, 总面数 {n_faces}"
            )));
        }

        // 检查体积与封闭性
        for c in self.cells() {
            let v = self.cell_volumes[c];
            if !(v > 0.0 && v.is_finite()) {
                return Err(MhError::invalid_mesh(format!("单元 {c} 体积非正: {v}")));
            }
            let mut sum = DVec3::ZERO;
            let mut scale = 0.0;
            for &f in self.cell_faces(c) {
                let sign = if self.owner[f] == c { 1.0 } else { -1.0 };
                sum += sign * self.face_areas[f];
                scale += self.face_mag_areas[f];
            }
            if sum.length() > 1e-9 * scale.max(ROOT_VSMALL) {
                return Err(MhError::invalid_mesh(format!(
                    "单元 {c} 不封闭: |ΣSf| = {:.3e}",
                    sum.length()
                )));
            }
        }

        Ok(())
    }
}

// ============================================================
// 几何计算
// ============================================================

/// 多边形面中心与面积矢量
fn polygon_centre_and_area(points: &[DVec3], verts: &[usize]) -> (DVec3, DVec3) {
    let n = verts.len();
    if n == 3 {
        let (a, b, c) = (points[verts[0]], points[verts[1]], points[verts[2]]);
        return ((a + b + c) / 3.0, 0.5 * (b - a).cross(c - a));
    }

    let estimate = verts.iter().map(|&v| points[v]).sum::<DVec3>() / n as f64;

    let mut sum_n = DVec3::ZERO;
    let mut sum_a = 0.0;
    let mut sum_ac = DVec3::ZERO;
    for i in 0..n {
        let p = points[verts[i]];
        let q = points[verts[(i + 1) % n]];
        let c = p + q + estimate;
        let tri_n = (q - p).cross(estimate - p);
        let a = tri_n.length();
        sum_n += tri_n;
        sum_a += a;
        sum_ac += a * c;
    }

    let centre = if sum_a < ROOT_VSMALL {
        estimate
    } else {
        sum_ac / (3.0 * sum_a)
    };
    (centre, 0.5 * sum_n)
}

/// 单元中心与体积（棱锥分解）
fn cell_centres_and_volumes(
    n_cells: usize,
    face_centres: &[DVec3],
    face_areas: &[DVec3],
    owner: &[usize],
    neighbour: &[usize],
) -> (Vec<DVec3>, Vec<f64>) {
    // 面中心平均作为估计中心
    let mut estimate = vec![DVec3::ZERO; n_cells];
    let mut n_faces = vec![0usize; n_cells];
    for (f, &o) in owner.iter().enumerate() {
        estimate[o] += face_centres[f];
        n_faces[o] += 1;
    }
    for (f, &nb) in neighbour.iter().enumerate() {
        estimate[nb] += face_centres[f];
        n_faces[nb] += 1;
    }
    for (e, &k) in estimate.iter_mut().zip(&n_faces) {
        if k > 0 {
            *e /= k as f64;
        }
    }

    let mut centres = vec![DVec3::ZERO; n_cells];
    let mut volumes = vec![0.0; n_cells];

    for (f, &o) in owner.iter().enumerate() {
        let pyr3_vol = face_areas[f].dot(face_centres[f] - estimate[o]);
        let pc = 0.75 * face_centres[f] + 0.25 * estimate[o];
        centres[o] += pyr3_vol * pc;
        volumes[o] += pyr3_vol;
    }
    for (f, &nb) in neighbour.iter().enumerate() {
        let pyr3_vol = face_areas[f].dot(estimate[nb] - face_centres[f]);
        let pc = 0.75 * face_centres[f] + 0.25 * estimate[nb];
        centres[nb] += pyr3_vol * pc;
        volumes[nb] += pyr3_vol;
    }

    for c in 0..n_cells {
        if volumes[c].abs() > VSMALL {
            centres[c] /= volumes[c];
        } else {
            centres[c] = estimate[c];
        }
        volumes[c] /= 3.0;
    }

    (centres, volumes)
}

// ============================================================
// 统计
// ============================================================

/// 网格统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStatistics {
    pub n_cells: usize,
    pub n_faces: usize,
    pub n_internal_faces: usize,
    pub n_boundary_faces: usize,
    pub n_patches: usize,
    pub total_volume: f64,
    pub min_cell_volume: f64,
    pub max_cell_volume: f64,
    pub min_face_area: f64,
    pub max_face_area: f64,
}

impl std::fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 网格统计 ===")?;
        writeln!(f, "单元数: {}", self.n_cells)?;
        writeln!(
            f,
            "面数: {} (内部: {}, 边界: {}, 补丁: {})",
            self.n_faces, self.n_internal_faces, self.n_boundary_faces, self.n_patches
        )?;
        writeln!(f, "总体积: {:.4e} m³", self.total_volume)?;
        writeln!(
            f,
            "单元体积: [{:.4e}, {:.4e}] m³",
            self.min_cell_volume, self.max_cell_volume
        )?;
        writeln!(
            f,
            "面积: [{:.4e}, {:.4e}] m²",
            self.min_face_area, self.max_face_area
        )
    }
}
