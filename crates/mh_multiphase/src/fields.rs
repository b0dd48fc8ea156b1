// crates/mh_multiphase/src/fields.rs

//! 网格场与字段注册系统
//!
//! 提供单元中心场 [`VolField`]、面场 [`SurfaceField`] 以及按名称管理场数据的
//! [`FieldRegistry`]。
//!
//! # 设计原则
//!
//! 1. **边界值显式存储**: 单元场为每个边界面保存一个值，由补丁条件求值
//! 2. **空补丁跳过**: 空补丁面的值恒为零，所有算子跳过
//! 3. **按名称查找**: 注册表中找不到的字段是致命错误，错误中列出已注册字段
//!
//! # 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use mh_mesh::BoxMeshBuilder;
//! use mh_multiphase::fields::{FieldRegistry, VolField};
//!
//! let mesh = Arc::new(BoxMeshBuilder::new(4, 4, 1).empty_z().build().unwrap());
//! let mut db = FieldRegistry::new(mesh.clone());
//!
//! db.insert_scalar(VolField::uniform("alpha.water", &mesh, 0.5)).unwrap();
//! assert!(db.exists("alpha.water"));
//! assert!(db.scalar("alpha.air").is_err());
//! ```

use glam::DVec3;
use mh_foundation::float::safe_div;
use mh_foundation::{MhError, MhResult};
use mh_mesh::{FvMesh, PatchKind};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::sync::Arc;

use crate::boundary::ContactAngleModel;

// ============================================================
// 场值类型
// ============================================================

/// 场值类型（标量或矢量）
pub trait FieldValue:
    Copy
    + Send
    + Sync
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
    + 'static
{
    /// 零值
    const ZERO: Self;

    /// 模
    fn mag(self) -> f64;

    /// 类型名（用于日志）
    fn rank_name() -> &'static str;
}

impl FieldValue for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn mag(self) -> f64 {
        self.abs()
    }

    fn rank_name() -> &'static str {
        "scalar"
    }
}

impl FieldValue for DVec3 {
    const ZERO: Self = DVec3::ZERO;

    #[inline]
    fn mag(self) -> f64 {
        self.length()
    }

    fn rank_name() -> &'static str {
        "vector"
    }
}

// ============================================================
// 补丁条件
// ============================================================

/// 补丁边界条件
#[derive(Debug, Clone, PartialEq)]
pub enum PatchCondition<T: FieldValue> {
    /// 边界值由赋值决定，求值时保持不变
    Calculated,
    /// 零梯度：边界值等于相邻单元值
    ZeroGradient,
    /// 固定值
    FixedValue(Vec<T>),
    /// 固定法向梯度：φ_b = φ_P + g / Δ
    FixedGradient(Vec<T>),
    /// 接触角：以固定梯度方式求值，梯度由接触角修正写入
    ContactAngle {
        /// 接触角模型
        model: ContactAngleModel,
        /// 当前法向梯度
        gradient: Vec<T>,
    },
    /// 空补丁
    Empty,
}

impl<T: FieldValue> PatchCondition<T> {
    /// 类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Calculated => "calculated",
            Self::ZeroGradient => "zeroGradient",
            Self::FixedValue(_) => "fixedValue",
            Self::FixedGradient(_) => "fixedGradient",
            Self::ContactAngle { model, .. } => model.type_name(),
            Self::Empty => "empty",
        }
    }

    /// 是否为接触角条件
    #[inline]
    pub fn is_contact_angle(&self) -> bool {
        matches!(self, Self::ContactAngle { .. })
    }
}

// ============================================================
// 单元场
// ============================================================

/// 单元中心场
#[derive(Debug, Clone, PartialEq)]
pub struct VolField<T: FieldValue> {
    name: String,
    /// 单元值
    internal: Vec<T>,
    /// 边界面值（按 `face - n_internal_faces` 索引）
    boundary: Vec<T>,
    /// 每个补丁的边界条件
    conditions: Vec<PatchCondition<T>>,
}

impl<T: FieldValue> VolField<T> {
    /// 由单元值和补丁条件创建，并立即求值边界
    pub fn new(
        name: impl Into<String>,
        mesh: &FvMesh,
        internal: Vec<T>,
        conditions: Vec<PatchCondition<T>>,
    ) -> MhResult<Self> {
        MhError::check_size("internal", mesh.n_cells(), internal.len())?;
        MhError::check_size("conditions", mesh.patches().len(), conditions.len())?;
        for (patch, cond) in mesh.patches().iter().zip(&conditions) {
            let expected = match cond {
                PatchCondition::FixedValue(v) | PatchCondition::FixedGradient(v) => Some(v.len()),
                PatchCondition::ContactAngle { gradient, .. } => Some(gradient.len()),
                _ => None,
            };
            if let Some(n) = expected {
                MhError::check_size("patch condition", patch.size, n)?;
            }
            if (patch.kind == PatchKind::Empty) != (*cond == PatchCondition::Empty) {
                return Err(MhError::invalid_input(format!(
                    "补丁 {} ({}) 不能使用 {} 条件",
                    patch.name,
                    patch.kind.name(),
                    cond.type_name()
                )));
            }
        }
        let mut field = Self {
            name: name.into(),
            boundary: vec![T::ZERO; mesh.n_boundary_faces()],
            internal,
            conditions,
        };
        field.seed_boundary(mesh);
        field.correct_boundary_conditions(mesh);
        Ok(field)
    }

    /// 均匀场，非空补丁为零梯度
    pub fn uniform(name: impl Into<String>, mesh: &FvMesh, value: T) -> Self {
        Self::extrapolated(name, mesh, vec![value; mesh.n_cells()])
    }

    /// 零梯度外推场（非空补丁为零梯度）
    ///
    /// `internal` 长度必须等于单元数。
    pub fn extrapolated(name: impl Into<String>, mesh: &FvMesh, internal: Vec<T>) -> Self {
        let conditions = default_conditions(mesh, PatchCondition::ZeroGradient);
        let mut field = Self {
            name: name.into(),
            boundary: vec![T::ZERO; mesh.n_boundary_faces()],
            internal,
            conditions,
        };
        field.seed_boundary(mesh);
        field
    }

    /// 计算型场：边界值直接给定（非空补丁为 calculated）
    pub fn calculated(name: impl Into<String>, mesh: &FvMesh, internal: Vec<T>, boundary: Vec<T>) -> Self {
        let conditions = default_conditions(mesh, PatchCondition::Calculated);
        let mut field = Self {
            name: name.into(),
            internal,
            boundary,
            conditions,
        };
        field.zero_empty(mesh);
        field
    }

    /// 以本场的名称与边界条件创建新值的场，并重新求值边界
    pub fn derived(&self, mesh: &FvMesh, internal: Vec<T>, boundary: Vec<T>) -> Self {
        let mut field = Self {
            name: self.name.clone(),
            internal,
            boundary,
            conditions: self.conditions.clone(),
        };
        field.correct_boundary_conditions(mesh);
        field
    }

    /// 以边界相邻单元值初始化边界值
    fn seed_boundary(&mut self, mesh: &FvMesh) {
        let n_internal = mesh.n_internal_faces();
        for f in mesh.boundary_faces() {
            self.boundary[f - n_internal] = self.internal[mesh.owner()[f]];
        }
        self.zero_empty(mesh);
    }

    fn zero_empty(&mut self, mesh: &FvMesh) {
        let n_internal = mesh.n_internal_faces();
        for patch in mesh.patches().iter().filter(|p| p.is_empty_kind()) {
            for f in patch.faces() {
                self.boundary[f - n_internal] = T::ZERO;
            }
        }
    }

    // =========================================================================
    // 访问
    // =========================================================================

    /// 字段名
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 构建器风格重命名
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 单元值
    #[inline]
    pub fn internal(&self) -> &[T] {
        &self.internal
    }

    /// 可变单元值
    #[inline]
    pub fn internal_mut(&mut self) -> &mut [T] {
        &mut self.internal
    }

    /// 全部边界值
    #[inline]
    pub fn boundary(&self) -> &[T] {
        &self.boundary
    }

    /// 边界面值
    #[inline]
    pub fn boundary_value(&self, mesh: &FvMesh, face: usize) -> T {
        self.boundary[face - mesh.n_internal_faces()]
    }

    /// 补丁上的边界值
    pub fn patch_values(&self, mesh: &FvMesh, patch: usize) -> &[T] {
        let p = &mesh.patches()[patch];
        let start = p.start - mesh.n_internal_faces();
        &self.boundary[start..start + p.size]
    }

    /// 补丁相邻单元值
    pub fn patch_internal_values(&self, mesh: &FvMesh, patch: usize) -> Vec<T> {
        mesh.patch_face_cells(patch)
            .iter()
            .map(|&c| self.internal[c])
            .collect()
    }

    /// 所有补丁条件
    #[inline]
    pub fn conditions(&self) -> &[PatchCondition<T>] {
        &self.conditions
    }

    /// 补丁条件
    #[inline]
    pub fn condition(&self, patch: usize) -> &PatchCondition<T> {
        &self.conditions[patch]
    }

    /// 设置补丁条件并求值
    pub fn set_condition(&mut self, mesh: &FvMesh, patch: usize, condition: PatchCondition<T>) -> MhResult<()> {
        MhError::check_index("Patch", patch, self.conditions.len())?;
        self.conditions[patch] = condition;
        self.evaluate_patch(mesh, patch);
        Ok(())
    }

    /// 设置固定梯度或接触角补丁的梯度（不求值）
    pub fn set_patch_gradient(&mut self, patch: usize, values: Vec<T>) -> MhResult<()> {
        MhError::check_index("Patch", patch, self.conditions.len())?;
        match &mut self.conditions[patch] {
            PatchCondition::FixedGradient(g) | PatchCondition::ContactAngle { gradient: g, .. } => {
                MhError::check_size("patch gradient", g.len(), values.len())?;
                *g = values;
                Ok(())
            }
            other => Err(MhError::invalid_input(format!(
                "字段 {} 的补丁 {patch} 为 {} 条件, 不能设置梯度",
                self.name,
                other.type_name()
            ))),
        }
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.internal.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    /// 拆分为单元值与边界值
    pub fn into_values(self) -> (Vec<T>, Vec<T>) {
        (self.internal, self.boundary)
    }

    // =========================================================================
    // 边界求值
    // =========================================================================

    /// 求值单个补丁
    pub fn evaluate_patch(&mut self, mesh: &FvMesh, patch: usize) {
        let p = &mesh.patches()[patch];
        let n_internal = mesh.n_internal_faces();
        let owner = mesh.owner();
        let delta = mesh.delta_coeffs();
        match &self.conditions[patch] {
            PatchCondition::Calculated => {}
            PatchCondition::ZeroGradient => {
                for f in p.faces() {
                    self.boundary[f - n_internal] = self.internal[owner[f]];
                }
            }
            PatchCondition::FixedValue(values) => {
                for (i, f) in p.faces().enumerate() {
                    self.boundary[f - n_internal] = values[i];
                }
            }
            PatchCondition::FixedGradient(gradient)
            | PatchCondition::ContactAngle { gradient, .. } => {
                for (i, f) in p.faces().enumerate() {
                    self.boundary[f - n_internal] = self.internal[owner[f]] + gradient[i] / delta[f];
                }
            }
            PatchCondition::Empty => {
                for f in p.faces() {
                    self.boundary[f - n_internal] = T::ZERO;
                }
            }
        }
    }

    /// 重新求值所有补丁
    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        for patch in 0..self.conditions.len() {
            self.evaluate_patch(mesh, patch);
        }
    }

    /// 补丁法向梯度
    pub fn patch_sn_grad(&self, mesh: &FvMesh, patch: usize) -> Vec<T> {
        let p = &mesh.patches()[patch];
        let n_internal = mesh.n_internal_faces();
        let owner = mesh.owner();
        let delta = mesh.delta_coeffs();
        match &self.conditions[patch] {
            PatchCondition::ZeroGradient => vec![T::ZERO; p.size],
            PatchCondition::FixedGradient(g) | PatchCondition::ContactAngle { gradient: g, .. } => g.clone(),
            PatchCondition::Empty => vec![T::ZERO; p.size],
            PatchCondition::Calculated | PatchCondition::FixedValue(_) => p
                .faces()
                .map(|f| (self.boundary[f - n_internal] - self.internal[owner[f]]) * delta[f])
                .collect(),
        }
    }

    // =========================================================================
    // 逐元素运算
    // =========================================================================

    /// 逐元素映射（单元与边界值），返回计算型场
    pub fn map<U: FieldValue>(&self, mesh: &FvMesh, name: impl Into<String>, f: impl Fn(T) -> U) -> VolField<U> {
        VolField::calculated(
            name,
            mesh,
            self.internal.iter().map(|&v| f(v)).collect(),
            self.boundary.iter().map(|&v| f(v)).collect(),
        )
    }

    /// 以标量场逐元素缩放
    pub fn scaled_by(&self, mesh: &FvMesh, weight: &VolField<f64>) -> VolField<T> {
        VolField::calculated(
            format!("({}*{})", weight.name, self.name),
            mesh,
            self.internal
                .iter()
                .zip(&weight.internal)
                .map(|(&v, &w)| v * w)
                .collect(),
            self.boundary
                .iter()
                .zip(&weight.boundary)
                .map(|(&v, &w)| v * w)
                .collect(),
        )
    }

    /// 复制另一个场的值（保留本场名称与条件）
    pub fn assign(&mut self, other: &VolField<T>) -> MhResult<()> {
        MhError::check_size("internal", self.internal.len(), other.internal.len())?;
        MhError::check_size("boundary", self.boundary.len(), other.boundary.len())?;
        self.internal.copy_from_slice(&other.internal);
        self.boundary.copy_from_slice(&other.boundary);
        Ok(())
    }

    /// 单元值最大模
    pub fn max_mag(&self) -> f64 {
        self.internal.iter().map(|v| v.mag()).fold(0.0, f64::max)
    }
}

impl VolField<f64> {
    /// 单元值最小值
    pub fn min(&self) -> f64 {
        self.internal.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// 单元值最大值
    pub fn max(&self) -> f64 {
        self.internal.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// 体积加权平均
    pub fn weighted_mean(&self, mesh: &FvMesh) -> f64 {
        let (num, den) = self
            .internal
            .iter()
            .zip(mesh.cell_volumes())
            .fold((0.0, 0.0), |(n, d), (&v, &vol)| (n + v * vol, d + vol));
        safe_div(num, den, 0.0)
    }
}

/// 空补丁为 Empty，其余为给定条件
fn default_conditions<T: FieldValue>(mesh: &FvMesh, condition: PatchCondition<T>) -> Vec<PatchCondition<T>> {
    mesh.patches()
        .iter()
        .map(|p| {
            if p.is_empty_kind() {
                PatchCondition::Empty
            } else {
                condition.clone()
            }
        })
        .collect()
}

// ============================================================
// 面场
// ============================================================

/// 面场（所有面，空补丁面为零）
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceField<T: FieldValue> {
    name: String,
    values: Vec<T>,
}

impl<T: FieldValue> SurfaceField<T> {
    /// 创建面场
    pub fn new(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// 零值面场
    pub fn zeros(name: impl Into<String>, mesh: &FvMesh) -> Self {
        Self::new(name, vec![T::ZERO; mesh.n_faces()])
    }

    /// 字段名
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所有面值
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 补丁面值
    pub fn patch_values(&self, mesh: &FvMesh, patch: usize) -> &[T] {
        &self.values[mesh.patches()[patch].faces()]
    }

    /// 可变补丁面值
    pub fn patch_values_mut(&mut self, mesh: &FvMesh, patch: usize) -> &mut [T] {
        &mut self.values[mesh.patches()[patch].faces()]
    }

    /// 面数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 逐面乘以标量面场
    pub fn scaled_by(&self, other: &SurfaceField<f64>) -> SurfaceField<T> {
        SurfaceField::new(
            format!("({}*{})", self.name, other.name),
            self.values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| a * b)
                .collect(),
        )
    }

    /// 逐面映射
    pub fn map<U: FieldValue>(&self, name: impl Into<String>, f: impl Fn(T) -> U) -> SurfaceField<U> {
        SurfaceField::new(name, self.values.iter().map(|&v| f(v)).collect())
    }

    /// 复制另一个面场的值（保留名称）
    pub fn assign(&mut self, other: &SurfaceField<T>) -> MhResult<()> {
        MhError::check_size("surface values", self.values.len(), other.values.len())?;
        self.values.copy_from_slice(&other.values);
        Ok(())
    }
}

// ============================================================
// 字段注册表
// ============================================================

/// 网格级字段注册表
///
/// 持有网格与按名称索引的标量、矢量单元场。
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    mesh: Arc<FvMesh>,
    scalars: BTreeMap<String, VolField<f64>>,
    vectors: BTreeMap<String, VolField<DVec3>>,
}

impl FieldRegistry {
    /// 创建空注册表
    pub fn new(mesh: Arc<FvMesh>) -> Self {
        Self {
            mesh,
            scalars: BTreeMap::new(),
            vectors: BTreeMap::new(),
        }
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &FvMesh {
        &self.mesh
    }

    /// 网格共享句柄
    #[inline]
    pub fn mesh_arc(&self) -> &Arc<FvMesh> {
        &self.mesh
    }

    /// 注册（或替换）标量场
    pub fn insert_scalar(&mut self, field: VolField<f64>) -> MhResult<Option<VolField<f64>>> {
        self.check_shape(&field)?;
        Ok(self.scalars.insert(field.name().to_string(), field))
    }

    /// 注册（或替换）矢量场
    pub fn insert_vector(&mut self, field: VolField<DVec3>) -> MhResult<Option<VolField<DVec3>>> {
        self.check_shape(&field)?;
        Ok(self.vectors.insert(field.name().to_string(), field))
    }

    fn check_shape<T: FieldValue>(&self, field: &VolField<T>) -> MhResult<()> {
        MhError::check_size("internal", self.mesh.n_cells(), field.internal().len())?;
        MhError::check_size("boundary", self.mesh.n_boundary_faces(), field.boundary().len())?;
        MhError::check_size("conditions", self.mesh.patches().len(), field.conditions().len())
    }

    /// 查找标量场
    pub fn scalar(&self, name: &str) -> MhResult<&VolField<f64>> {
        self.scalars
            .get(name)
            .ok_or_else(|| MhError::field_not_found(name, self.names()))
    }

    /// 查找可变标量场
    pub fn scalar_mut(&mut self, name: &str) -> MhResult<&mut VolField<f64>> {
        if !self.scalars.contains_key(name) {
            return Err(MhError::field_not_found(name, self.names()));
        }
        self.scalars
            .get_mut(name)
            .ok_or_else(|| MhError::internal("scalar registry changed during lookup"))
    }

    /// 查找矢量场
    pub fn vector(&self, name: &str) -> MhResult<&VolField<DVec3>> {
        self.vectors
            .get(name)
            .ok_or_else(|| MhError::field_not_found(name, self.names()))
    }

    /// 是否存在（任意类型）
    pub fn exists(&self, name: &str) -> bool {
        self.scalars.contains_key(name) || self.vectors.contains_key(name)
    }

    /// 所有字段名（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scalars
            .keys()
            .chain(self.vectors.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }
}

// ============================================================
// 测试
// ============================================================
