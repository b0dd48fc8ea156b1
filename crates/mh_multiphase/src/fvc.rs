// crates/mh_multiphase/src/fvc.rs

//! 有限体积显式算子
//!
//! 所有算子按单元收集面贡献（不跨单元归约），因此串行与并行结果逐位一致。
//! 单元数不小于 [`PARALLEL_THRESHOLD`] 时使用 rayon 并行。
//!
//! | 算子 | 公式 |
//! |------|------|
//! | [`interpolate`] | φ_f = φ_N + w·(φ_O − φ_N) |
//! | [`grad`] | ∇φ ≈ (1/V) Σ_f Sf·φ_f，边界修正 g_b = g_P + n̂(∂φ/∂n − n̂·g_P) |
//! | [`div`] | ∇·F ≈ (1/V) Σ_f ±F_f |
//! | [`sn_grad`] | (φ_N − φ_O)·Δ |
//! | [`average`] | Σ|Sf|·φ_f / Σ|Sf| |
//! | [`weighted_average`] | average(w·φ) / average(w) |
//!
//! 空补丁面不参与任何求和。

use glam::DVec3;
use mh_foundation::float::{stabilise, ROOT_VSMALL};
use mh_mesh::FvMesh;
use rayon::prelude::*;

use crate::fields::{FieldValue, SurfaceField, VolField};

/// 并行阈值（单元数）
pub const PARALLEL_THRESHOLD: usize = 1000;

/// 按单元计算，单元数足够大时并行
fn collect_cells<T, F>(n_cells: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if n_cells >= PARALLEL_THRESHOLD {
        (0..n_cells).into_par_iter().map(f).collect()
    } else {
        (0..n_cells).map(f).collect()
    }
}

/// 面是否属于空补丁
fn empty_face_mask(mesh: &FvMesh) -> Vec<bool> {
    let mut mask = vec![false; mesh.n_faces()];
    for patch in mesh.patches().iter().filter(|p| p.is_empty_kind()) {
        for f in patch.faces() {
            mask[f] = true;
        }
    }
    mask
}

// ============================================================
// 插值
// ============================================================

/// 线性插值到面
pub fn interpolate<T: FieldValue>(mesh: &FvMesh, field: &VolField<T>) -> SurfaceField<T> {
    let owner = mesh.owner();
    let neighbour = mesh.neighbour();
    let w = mesh.weights();
    let phi = field.internal();

    let mut values = Vec::with_capacity(mesh.n_faces());
    for f in mesh.internal_faces() {
        let (po, pn) = (phi[owner[f]], phi[neighbour[f]]);
        values.push(pn + (po - pn) * w[f]);
    }
    values.extend_from_slice(field.boundary());

    SurfaceField::new(format!("interpolate({})", field.name()), values)
}

/// 加权线性插值：interpolate(w·φ) / interpolate(w)
///
/// `weight` 为 `None` 时等同于 [`interpolate`]。
pub fn weighted_interpolate<T: FieldValue>(
    mesh: &FvMesh,
    field: &VolField<T>,
    weight: Option<&VolField<f64>>,
) -> SurfaceField<T> {
    let Some(weight) = weight else {
        return interpolate(mesh, field);
    };
    let num = interpolate(mesh, &field.scaled_by(mesh, weight));
    let den = interpolate(mesh, weight);
    let values = num
        .values()
        .iter()
        .zip(den.values())
        .map(|(&n, &d)| n / stabilise(d, ROOT_VSMALL))
        .collect();
    SurfaceField::new(format!("weightedInterpolate({})", field.name()), values)
}

// ============================================================
// 梯度
// ============================================================

/// Gauss 线性梯度
///
/// 返回计算型场；非空补丁上的边界值为修正后的面梯度。
pub fn grad(mesh: &FvMesh, field: &VolField<f64>) -> VolField<DVec3> {
    let phi_f = interpolate(mesh, field);
    let sf = mesh.face_areas();
    let owner = mesh.owner();
    let volumes = mesh.cell_volumes();
    let empty = empty_face_mask(mesh);

    let internal = collect_cells(mesh.n_cells(), |c| {
        let mut g = DVec3::ZERO;
        for &f in mesh.cell_faces(c) {
            if empty[f] {
                continue;
            }
            let sign = if owner[f] == c { 1.0 } else { -1.0 };
            g += sign * sf[f] * phi_f.values()[f];
        }
        g / volumes[c]
    });

    // 边界修正
    let n_internal = mesh.n_internal_faces();
    let mut boundary = vec![DVec3::ZERO; mesh.n_boundary_faces()];
    for (pi, patch) in mesh.patches().iter().enumerate() {
        if patch.is_empty_kind() {
            continue;
        }
        let sn = field.patch_sn_grad(mesh, pi);
        for (i, f) in patch.faces().enumerate() {
            let n = mesh.face_normal(f);
            let gp = internal[owner[f]];
            boundary[f - n_internal] = gp + n * (sn[i] - n.dot(gp));
        }
    }

    VolField::calculated(format!("grad({})", field.name()), mesh, internal, boundary)
}

// ============================================================
// 散度与面法向梯度
// ============================================================

/// 面通量的散度，边界零梯度外推
pub fn div(mesh: &FvMesh, flux: &SurfaceField<f64>) -> VolField<f64> {
    let owner = mesh.owner();
    let volumes = mesh.cell_volumes();
    let empty = empty_face_mask(mesh);
    let phi = flux.values();

    let internal = collect_cells(mesh.n_cells(), |c| {
        let mut sum = 0.0;
        for &f in mesh.cell_faces(c) {
            if empty[f] {
                continue;
            }
            if owner[f] == c {
                sum += phi[f];
            } else {
                sum -= phi[f];
            }
        }
        sum / volumes[c]
    });

    VolField::extrapolated(format!("div({})", flux.name()), mesh, internal)
}

/// 面法向梯度（非正交不修正）
pub fn sn_grad(mesh: &FvMesh, field: &VolField<f64>) -> SurfaceField<f64> {
    let owner = mesh.owner();
    let neighbour = mesh.neighbour();
    let delta = mesh.delta_coeffs();
    let phi = field.internal();

    let mut values = Vec::with_capacity(mesh.n_faces());
    for f in mesh.internal_faces() {
        values.push(delta[f] * (phi[neighbour[f]] - phi[owner[f]]));
    }
    for pi in 0..mesh.patches().len() {
        values.extend(field.patch_sn_grad(mesh, pi));
    }

    SurfaceField::new(format!("snGrad({})", field.name()), values)
}

/// 矢量面场与面积矢量的点积，空补丁面为零
pub fn dot_sf(mesh: &FvMesh, field: &SurfaceField<DVec3>) -> SurfaceField<f64> {
    let empty = empty_face_mask(mesh);
    let values = field
        .values()
        .iter()
        .zip(mesh.face_areas())
        .zip(&empty)
        .map(|((v, s), &e)| if e { 0.0 } else { v.dot(*s) })
        .collect();
    SurfaceField::new(format!("({} & Sf)", field.name()), values)
}

// ============================================================
// 平均
// ============================================================

/// 单元面值求和（不带符号）
pub fn surface_sum<T: FieldValue>(mesh: &FvMesh, field: &SurfaceField<T>) -> Vec<T> {
    let empty = empty_face_mask(mesh);
    let values = field.values();
    collect_cells(mesh.n_cells(), |c| {
        let mut sum = T::ZERO;
        for &f in mesh.cell_faces(c) {
            if !empty[f] {
                sum += values[f];
            }
        }
        sum
    })
}

/// 面积加权平均
///
/// 单元值为相邻面插值的面积加权平均；边界值取自插值面场（即输入场的边界值）。
pub fn average<T: FieldValue>(mesh: &FvMesh, field: &VolField<T>) -> VolField<T> {
    let phi_f = interpolate(mesh, field);
    let mag_sf = mesh.face_mag_areas();
    let empty = empty_face_mask(mesh);

    let internal = collect_cells(mesh.n_cells(), |c| {
        let mut num = T::ZERO;
        let mut den = 0.0;
        for &f in mesh.cell_faces(c) {
            if empty[f] {
                continue;
            }
            num += phi_f.values()[f] * mag_sf[f];
            den += mag_sf[f];
        }
        num / den
    });

    VolField::calculated(
        format!("average({})", field.name()),
        mesh,
        internal,
        field.boundary().to_vec(),
    )
}

/// 加权平均：average(w·φ) / average(w)
///
/// `weight` 为 `None` 时与 [`average`] 逐位一致；分母模下限为 `ROOT_VSMALL`。
pub fn weighted_average<T: FieldValue>(
    mesh: &FvMesh,
    field: &VolField<T>,
    weight: Option<&VolField<f64>>,
) -> VolField<T> {
    let Some(weight) = weight else {
        return average(mesh, field);
    };

    let num = average(mesh, &field.scaled_by(mesh, weight));
    let den = average(mesh, weight);

    let ratio = |n: &[T], d: &[f64]| -> Vec<T> {
        n.iter()
            .zip(d)
            .map(|(&n, &d)| n / stabilise(d, ROOT_VSMALL))
            .collect()
    };

    VolField::calculated(
        format!("weightedAverage({},{})", field.name(), weight.name()),
        mesh,
        ratio(num.internal(), den.internal()),
        ratio(num.boundary(), den.boundary()),
    )
}

// ============================================================
// 测试
// ============================================================
