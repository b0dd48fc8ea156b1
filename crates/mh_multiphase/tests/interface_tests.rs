// crates/mh_multiphase/tests/interface_tests.rs

//! 界面属性测试
//! 表面张力、界面指示场、接触角与重新读取

use std::sync::Arc;

use glam::DVec3;
use mh_config::Dictionary;
use mh_foundation::MhError;
use mh_mesh::generation::Side;
use mh_mesh::{BoxMeshBuilder, FvMesh, PatchKind};
use mh_multiphase::boundary::ContactAngleModel;
use mh_multiphase::{FieldRegistry, InterfaceProperties, ModelSelectors, PatchCondition, VolField};

fn transport(rho1: f64, rho2: f64, density_weighted: bool) -> Dictionary {
    Dictionary::from_json_str(
        "transportProperties",
        &format!(
            r#"{{ "phases": ["water", "air"],
                  "water": {{ "rho": {rho1:?} }}, "air": {{ "rho": {rho2:?} }},
                  "sigma": 0.07, "cAlpha": 1.0, "curvatureModel": "normal",
                  "surfaceTensionForceModel": {{ "densityWeighted": {density_weighted} }} }}"#
        ),
    )
    .unwrap()
}

fn droplet_mesh() -> Arc<FvMesh> {
    Arc::new(
        BoxMeshBuilder::new(16, 16, 1)
            .extent([0.0; 3], [1.0, 1.0, 0.1])
            .empty_z()
            .build()
            .unwrap(),
    )
}

fn droplet_db(mesh: &Arc<FvMesh>) -> FieldRegistry {
    let alpha = mesh
        .cell_centres()
        .iter()
        .map(|c| {
            let r = ((c.x - 0.5).powi(2) + (c.y - 0.5).powi(2)).sqrt();
            0.5 * (1.0 - ((r - 0.3) / 0.08).tanh())
        })
        .collect();
    let mut db = FieldRegistry::new(mesh.clone());
    db.insert_scalar(VolField::extrapolated("alpha.water", mesh, alpha)).unwrap();
    db
}

/// 测试界面指示场：严格在 (0.01, 0.99) 内为 1
#[test]
fn test_near_interface_bounds() {
    let mesh = Arc::new(BoxMeshBuilder::new(7, 1, 1).empty_z().build().unwrap());
    let values = vec![0.0, 0.01, 0.010001, 0.5, 0.989999, 0.99, 1.0];
    let mut db = FieldRegistry::new(mesh.clone());
    db.insert_scalar(VolField::extrapolated("alpha.water", &mesh, values)).unwrap();

    let props =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let near = props.near_interface(&db).unwrap();
    assert_eq!(near.internal(), &[0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    assert!(near.internal().iter().all(|&v| v == 0.0 || v == 1.0));
}

/// 测试两相密度相等时密度加权与不加权的表面张力一致
#[test]
fn test_density_weighting_is_neutral_for_equal_densities() {
    let mesh = droplet_mesh();
    let mut db = droplet_db(&mesh);
    let plain =
        InterfaceProperties::new(transport(1000.0, 1000.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let weighted =
        InterfaceProperties::new(transport(1000.0, 1000.0, true), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    assert!(!plain.density_weighted() && weighted.density_weighted());

    let f_plain = plain.surface_tension_force(&db).unwrap();
    let f_weighted = weighted.surface_tension_force(&db).unwrap();
    let scale = f_plain.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    assert!(scale > 0.0, "表面张力全为零");
    for (face, (a, b)) in f_plain.values().iter().zip(f_weighted.values()).enumerate() {
        assert!((a - b).abs() <= 1e-12 * scale, "面 {face}: {a} vs {b}");
    }
}

/// 测试密度加权改变界面两侧的表面张力分布
#[test]
fn test_density_weighting_shifts_force() {
    let mesh = droplet_mesh();
    let mut db = droplet_db(&mesh);
    let plain =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let weighted =
        InterfaceProperties::new(transport(1000.0, 1.0, true), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let f_plain = plain.surface_tension_force(&db).unwrap();
    let f_weighted = weighted.surface_tension_force(&db).unwrap();
    assert_ne!(f_plain.values(), f_weighted.values());
    assert!(f_weighted.values().iter().all(|v| v.is_finite()));
}

/// 测试表面张力 = interpolate(σK)·snGrad(α)
#[test]
fn test_surface_tension_force_matches_definition() {
    let mesh = droplet_mesh();
    let mut db = droplet_db(&mesh);
    let props =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let force = props.surface_tension_force(&db).unwrap();

    let sigma_k = props.sigma_k(&mesh);
    let alpha = db.scalar("alpha.water").unwrap().internal().to_vec();
    let k = sigma_k.internal();
    for face in mesh.internal_faces() {
        let (o, n) = (mesh.owner()[face], mesh.neighbour()[face]);
        let w = mesh.weights()[face];
        let sigma_k_f = w * k[o] + (1.0 - w) * k[n];
        let sn_grad = mesh.delta_coeffs()[face] * (alpha[n] - alpha[o]);
        let expected = sigma_k_f * sn_grad;
        assert!(
            (force.values()[face] - expected).abs() <= 1e-12 * expected.abs().max(1e-12),
            "面 {face}: {} vs {expected}",
            force.values()[face]
        );
    }
}

fn wall_mesh() -> Arc<FvMesh> {
    Arc::new(
        BoxMeshBuilder::new(8, 8, 1)
            .empty_z()
            .patch(Side::YMin, "bottom", PatchKind::Wall)
            .build()
            .unwrap(),
    )
}

fn wall_db(mesh: &Arc<FvMesh>, model: ContactAngleModel) -> FieldRegistry {
    let values = mesh
        .cell_centres()
        .iter()
        .map(|c| if c.x < 0.5 { 1.0 } else { 0.0 })
        .collect();
    let mut alpha = VolField::extrapolated("alpha.water", mesh, values);
    let wall = mesh.patch_index("bottom").unwrap();
    alpha
        .set_condition(mesh, wall, PatchCondition::ContactAngle { model, gradient: vec![0.0; 8] })
        .unwrap();
    let mut db = FieldRegistry::new(mesh.clone());
    db.insert_scalar(alpha).unwrap();
    db
}

fn wall_gradient(db: &FieldRegistry, wall: usize) -> Vec<f64> {
    match db.scalar("alpha.water").unwrap().condition(wall) {
        PatchCondition::ContactAngle { gradient, .. } => gradient.clone(),
        other => panic!("unexpected condition {other:?}"),
    }
}

/// 测试构造时接触角修正写回体积分数的壁面梯度
#[test]
fn test_contact_angle_updates_alpha_boundary() {
    let mesh = wall_mesh();
    let wall = mesh.patch_index("bottom").unwrap();
    let mut db = wall_db(&mesh, ContactAngleModel::Constant { theta0: 60.0 });

    let _props =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();

    // 界面两侧的壁面面：|∇α| = 0.5/h = 4，n·nf = cos 60°
    let gradient = wall_gradient(&db, wall);
    for (i, &g) in gradient.iter().enumerate() {
        if i == 3 || i == 4 {
            assert!((g - 2.0).abs() < 1e-6, "面 {i}: 梯度 = {g}");
        } else {
            assert_eq!(g, 0.0, "面 {i} 远离界面");
        }
    }

    // 边界值按固定梯度重新求值
    let alpha = db.scalar("alpha.water").unwrap();
    assert_eq!(alpha.patch_sn_grad(&mesh, wall), gradient);
    assert!(alpha.patch_values(&mesh, wall)[3] > 1.0);
}

/// 测试动态接触角需要速度场，静止时与常接触角一致
#[test]
fn test_dynamic_contact_angle_requires_velocity() {
    let mesh = wall_mesh();
    let wall = mesh.patch_index("bottom").unwrap();
    let dynamic = ContactAngleModel::Dynamic {
        theta0: 60.0,
        u_theta: 1.0,
        theta_a: 80.0,
        theta_r: 40.0,
    };

    let mut db = wall_db(&mesh, dynamic.clone());
    let result =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard());
    assert!(matches!(result, Err(MhError::FieldNotFound { .. })));

    let mut db = wall_db(&mesh, dynamic);
    db.insert_vector(VolField::uniform("U", &mesh, DVec3::ZERO)).unwrap();
    InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
        .unwrap();

    let mut reference = wall_db(&mesh, ContactAngleModel::Constant { theta0: 60.0 });
    InterfaceProperties::new(
        transport(1000.0, 1.0, false),
        &mut reference,
        "alpha.water",
        "U",
        ModelSelectors::standard(),
    )
    .unwrap();
    assert_eq!(wall_gradient(&db, wall), wall_gradient(&reference, wall));
}

/// 测试重复 correct 结果稳定
#[test]
fn test_repeated_correct_is_deterministic() {
    let mesh = droplet_mesh();
    let mut db = droplet_db(&mesh);
    let mut props =
        InterfaceProperties::new(transport(1000.0, 1.0, false), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();
    let first = props.k().clone();
    props.correct(&mut db).unwrap();
    assert_eq!(props.k(), &first);
}

/// 测试 read 在缺少可选项时回退并保持成功
#[test]
fn test_read_with_missing_optional_entries() {
    let mesh = droplet_mesh();
    let mut db = droplet_db(&mesh);
    let mut props =
        InterfaceProperties::new(transport(1000.0, 1.0, true), &mut db, "alpha.water", "U", ModelSelectors::standard())
            .unwrap();

    let reduced = Dictionary::from_json_str(
        "transportProperties",
        r#"{ "phases": ["water", "air"], "water": { "rho": 998.0 }, "air": { "rho": 1.2 }, "sigma": 0.072 }"#,
    )
    .unwrap();
    assert!(props.read_from(reduced).unwrap());
    assert_eq!(props.densities(), (998.0, 1.2));
    assert_eq!(props.c_alpha(), 1.0);
    assert!(!props.density_weighted());
    assert_eq!(props.curvature_model().type_name(), "normal");

    let keys: Vec<String> = props.transport().warnings().into_iter().map(|d| d.key).collect();
    assert!(keys.contains(&"cAlpha".to_string()), "{keys:?}");
    assert!(keys.contains(&"surfaceTensionForceModel".to_string()), "{keys:?}");

    // 缺少 sigma 为致命错误
    let broken = Dictionary::from_json_str(
        "transportProperties",
        r#"{ "phases": ["water", "air"], "water": { "rho": 998.0 }, "air": { "rho": 1.2 } }"#,
    )
    .unwrap();
    assert!(matches!(props.read_from(broken), Err(MhError::MissingConfig { .. })));
}
