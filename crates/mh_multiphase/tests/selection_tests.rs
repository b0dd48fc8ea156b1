// crates/mh_multiphase/tests/selection_tests.rs

//! 运行时选择测试
//! 平滑核、权重因子与曲率模型的按名构造、回退诊断与致命错误

use std::borrow::Cow;
use std::sync::Arc;

use glam::DVec3;
use mh_config::Dictionary;
use mh_foundation::{MhError, MhResult};
use mh_mesh::BoxMeshBuilder;
use mh_multiphase::smoother::SmootherRank;
use mh_multiphase::weight::SqrtAlphaInt;
use mh_multiphase::{
    fvc, ContactAngleModel, FieldRegistry, InterfaceProperties, ModelSelectors, PatchCondition, VolField, WeightFactor,
};

fn setup() -> FieldRegistry {
    let mesh = Arc::new(
        BoxMeshBuilder::new(12, 12, 1)
            .extent([0.0; 3], [1.0, 1.0, 0.1])
            .empty_z()
            .build()
            .unwrap(),
    );
    let alpha = mesh
        .cell_centres()
        .iter()
        .map(|c| {
            let r = ((c.x - 0.5).powi(2) + (c.y - 0.5).powi(2)).sqrt();
            if r < 0.3 {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    let mut db = FieldRegistry::new(mesh.clone());
    db.insert_scalar(VolField::extrapolated("alpha", &mesh, alpha)).unwrap();
    db
}

fn dict(json: &str) -> Dictionary {
    Dictionary::from_json_str("smoother", json).unwrap()
}

const ZERO_ITERATION_KERNELS: [&str; 4] = [
    r#"{ "type": "none" }"#,
    r#"{ "type": "cfcInterpolation", "numIts": 0, "weightFactor": { "type": "unweighted" } }"#,
    r#"{ "type": "Csk", "numIts": 0, "Csk": 0.5,
         "smoother": { "type": "cfcInterpolation", "numIts": 1, "weightFactor": { "type": "unweighted" } } }"#,
    r#"{ "type": "normalDir", "numIts": 0, "alpha": "alpha" }"#,
];

fn assert_identity<T: SmootherRank>(db: &FieldRegistry, field: &VolField<T>) {
    let selectors = ModelSelectors::standard();
    for json in ZERO_ITERATION_KERNELS {
        let smoother = T::registry(&selectors).create(&dict(json), selectors.weights()).unwrap();
        let out = smoother.smoothen(db, field).unwrap();
        assert!(
            matches!(out, Cow::Borrowed(_)),
            "{} ({}) 零次迭代应返回输入",
            smoother.type_name(),
            T::rank_name()
        );
        assert_eq!(out.internal(), field.internal());
    }
}

/// 测试零次迭代时所有平滑核为恒等映射（标量与矢量）
#[test]
fn test_zero_iterations_are_identity() {
    let db = setup();
    let alpha = db.scalar("alpha").unwrap().clone();
    assert_identity(&db, &alpha);

    let grad = fvc::grad(db.mesh(), &alpha);
    assert_identity::<DVec3>(&db, &grad);
}

#[derive(Debug)]
struct UnitWeight;

impl WeightFactor for UnitWeight {
    fn type_name(&self) -> &'static str {
        "unit"
    }

    fn weight(&self, db: &FieldRegistry) -> MhResult<Option<VolField<f64>>> {
        Ok(Some(VolField::uniform("one", db.mesh(), 1.0)))
    }
}

/// 测试不加权的面平均与单位权重结果逐位相同
#[test]
fn test_unweighted_matches_unit_weight() {
    let db = setup();
    let alpha = db.scalar("alpha").unwrap();
    let mut selectors = ModelSelectors::standard();
    selectors.weights_mut().register("unit", |_| Ok(Box::new(UnitWeight)));

    let smoothers = selectors.scalar_smoothers();
    let unweighted = smoothers
        .create(
            &dict(r#"{ "type": "cfcInterpolation", "numIts": 3, "weightFactor": { "type": "unweighted" } }"#),
            selectors.weights(),
        )
        .unwrap();
    let unit = smoothers
        .create(
            &dict(r#"{ "type": "cfcInterpolation", "numIts": 3, "weightFactor": { "type": "unit" } }"#),
            selectors.weights(),
        )
        .unwrap();

    let a = unweighted.smoothen(&db, alpha).unwrap();
    let b = unit.smoothen(&db, alpha).unwrap();
    assert_eq!(a.internal(), b.internal());
    assert_eq!(a.boundary(), b.boundary());
}

/// 测试界面权重：对称、在 α = 0.5 取最大、在纯相中趋于零
#[test]
fn test_interface_weight_properties() {
    for a in [0.0, 0.1, 0.25, 0.4] {
        let w1 = SqrtAlphaInt::value(a);
        let w2 = SqrtAlphaInt::value(1.0 - a);
        assert!((w1 - w2).abs() < 1e-15, "α = {a}: {w1} vs {w2}");
        assert!(w1 <= SqrtAlphaInt::value(0.5));
    }
    assert!((SqrtAlphaInt::value(0.5) - 0.5).abs() < 1e-12);
    assert!(SqrtAlphaInt::value(0.0) < 1e-6);
    assert!(SqrtAlphaInt::value(1.0) < 1e-6);

    let db = setup();
    let selectors = ModelSelectors::standard();
    let raeini = selectors
        .weights()
        .create(&Dictionary::new("weightFactor").with("type", "Raeini").with("alpha", "alpha"))
        .unwrap();
    let w = raeini.weight(&db).unwrap().unwrap();
    assert!(w.internal().iter().all(|&v| v > 0.0 && v <= 0.5));
}

/// 测试 Csk 的两个极限
#[test]
fn test_csk_limits() {
    let db = setup();
    let alpha = db.scalar("alpha").unwrap();
    let selectors = ModelSelectors::standard();
    let create = |csk: f64| {
        selectors
            .scalar_smoothers()
            .create(
                &Dictionary::new("smoothAlpha")
                    .with("type", "Csk")
                    .with("numIts", 1)
                    .with("Csk", csk)
                    .with_dict(
                        "smoother",
                        Dictionary::new("smoother")
                            .with("type", "cfcInterpolation")
                            .with("numIts", 1)
                            .with_dict("weightFactor", Dictionary::new("w").with("type", "unweighted")),
                    ),
                selectors.weights(),
            )
            .unwrap()
    };

    let unchanged = create(0.0).smoothen(&db, alpha).unwrap();
    assert_eq!(unchanged.internal(), alpha.internal());

    let delegate = fvc::average(db.mesh(), alpha);
    let nearly_full = create(1.0 - 1e-12).smoothen(&db, alpha).unwrap();
    for (a, b) in nearly_full.internal().iter().zip(delegate.internal()) {
        assert!((a - b).abs() < 1e-10, "{a} vs {b}");
    }
}

/// 测试未知类型名的错误列出全部合法类型
#[test]
fn test_unknown_types_list_valid_names() {
    let mut db = setup();
    let transport = Dictionary::from_json_str(
        "transportProperties",
        r#"{ "phases": ["water", "air"], "water": { "rho": 1000.0 }, "air": { "rho": 1.0 },
             "sigma": 0.07, "curvatureModel": "levelSet" }"#,
    )
    .unwrap();
    match InterfaceProperties::new(transport, &mut db, "alpha", "U", ModelSelectors::standard()) {
        Err(MhError::UnknownType { family, name, valid }) => {
            assert_eq!(family, "curvatureModel");
            assert_eq!(name, "levelSet");
            assert_eq!(valid, vec!["normal", "smoothed", "vofsmooth"]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let selectors = ModelSelectors::standard();
    match selectors
        .vector_smoothers()
        .create(&dict(r#"{ "type": "gaussian" }"#), selectors.weights())
    {
        Err(MhError::UnknownType { family, valid, .. }) => {
            assert_eq!(family, "smootherKernel");
            assert_eq!(valid, vec!["Csk", "cfcInterpolation", "none", "normalDir"]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = selectors
        .weights()
        .create(&Dictionary::new("weightFactor").with("type", "gaussian"))
        .unwrap_err();
    assert!(err.to_string().contains("sqrtAlphaInt"), "{err}");
}

fn smoothed_transport(smooth_alpha: &str) -> Dictionary {
    Dictionary::from_json_str(
        "transportProperties",
        &format!(
            r#"{{ "phases": ["water", "air"], "water": {{ "rho": 1000.0 }}, "air": {{ "rho": 1.0 }},
                  "sigma": 0.07, "cAlpha": 1.0, "curvatureModel": "smoothed",
                  "surfaceTensionForceModel": {{ "densityWeighted": false }},
                  "smoothedCoeffs": {{ "smoothAlpha": {smooth_alpha},
                                       "smoothCurvature": {{ "type": "none" }} }} }}"#
        ),
    )
    .unwrap()
}

/// 测试权重字段缺失在首次使用时为致命错误
#[test]
fn test_missing_weight_field_is_fatal() {
    let mut db = setup();
    let transport = smoothed_transport(r#"{ "type": "normalDir", "numIts": 1, "alpha": "alpha.oil" }"#);
    match InterfaceProperties::new(transport, &mut db, "alpha", "U", ModelSelectors::standard()) {
        Err(MhError::FieldNotFound { name, available }) => {
            assert_eq!(name, "alpha.oil");
            assert!(available.contains(&"alpha".to_string()));
        }
        other => panic!("unexpected {other:?}"),
    }
}

/// 测试缺少系数子字典为致命错误
#[test]
fn test_missing_coefficients_are_fatal() {
    let mut db = setup();
    let transport = Dictionary::from_json_str(
        "transportProperties",
        r#"{ "phases": ["water", "air"], "water": { "rho": 1000.0 }, "air": { "rho": 1.0 },
             "sigma": 0.07, "curvatureModel": "vofsmooth" }"#,
    )
    .unwrap();
    match InterfaceProperties::new(transport, &mut db, "alpha", "U", ModelSelectors::standard()) {
        Err(MhError::MissingConfig { key, .. }) => assert_eq!(key, "vofsmoothCoeffs"),
        other => panic!("unexpected {other:?}"),
    }
}

/// 测试缺省项回退时产生诊断但不失败
#[test]
fn test_fallbacks_are_reported() {
    let mut db = setup();
    let transport = smoothed_transport(r#"{ "type": "cfcInterpolation" }"#);
    let props =
        InterfaceProperties::new(transport.clone(), &mut db, "alpha", "U", ModelSelectors::standard()).unwrap();
    assert_eq!(props.curvature_model().type_name(), "smoothed");

    let warnings = transport.warnings();
    let keys: Vec<&str> = warnings.iter().map(|d| d.key.as_str()).collect();
    assert!(keys.contains(&"numIts"), "{keys:?}");
    assert!(keys.contains(&"weightFactor"), "{keys:?}");
    assert!(warnings.iter().all(|d| d.dict.starts_with("transportProperties")));

    // 平滑体积分数已发布到注册表
    let smooth = db.scalar("smooth(alpha)").unwrap();
    assert!(smooth.internal().iter().any(|&a| a > 0.0 && a < 1.0));
}

/// 带固定值、固定梯度与接触角补丁的场，初始为 φ = x + 2y
fn field_with_patch_conditions(db: &FieldRegistry) -> VolField<f64> {
    let mesh = db.mesh();
    let values = mesh.cell_centres().iter().map(|c| c.x + 2.0 * c.y).collect();
    let mut phi = VolField::extrapolated("phi", mesh, values);
    let n = |name: &str| mesh.patches()[mesh.patch_index(name).unwrap()].faces().len();
    let patch = |name: &str| mesh.patch_index(name).unwrap();

    phi.set_condition(mesh, patch("xmin"), PatchCondition::FixedValue(vec![5.0; n("xmin")]))
        .unwrap();
    phi.set_condition(mesh, patch("xmax"), PatchCondition::FixedGradient(vec![0.3; n("xmax")]))
        .unwrap();
    phi.set_condition(
        mesh,
        patch("ymin"),
        PatchCondition::ContactAngle {
            model: ContactAngleModel::Constant { theta0: 60.0 },
            gradient: vec![-0.2; n("ymin")],
        },
    )
    .unwrap();
    phi
}

/// 检查每个补丁的边界值与补丁条件一致
fn assert_patch_conditions_hold(db: &FieldRegistry, out: &VolField<f64>, label: &str) {
    let mesh = db.mesh();
    let owner = mesh.owner();
    let delta = mesh.delta_coeffs();
    let n_internal = mesh.n_internal_faces();
    let check = |name: &str, expected: &dyn Fn(usize) -> f64| {
        let p = &mesh.patches()[mesh.patch_index(name).unwrap()];
        for f in p.faces() {
            let got = out.boundary()[f - n_internal];
            let want = expected(f);
            assert!((got - want).abs() < 1e-12, "{label}: {name} 面{f} 边界值 {got}，应为 {want}");
        }
    };
    check("xmin", &|_: usize| 5.0);
    check("xmax", &|f: usize| out.internal()[owner[f]] + 0.3 / delta[f]);
    check("ymin", &|f: usize| out.internal()[owner[f]] - 0.2 / delta[f]);
    check("ymax", &|f: usize| out.internal()[owner[f]]);
}

/// 测试每次平滑迭代后重新求值边界条件
#[test]
fn test_smoothing_reevaluates_patch_conditions() {
    let db = setup();
    let phi = field_with_patch_conditions(&db);
    let selectors = ModelSelectors::standard();
    let kernels = [
        r#"{ "type": "cfcInterpolation", "numIts": 3, "weightFactor": { "type": "unweighted" } }"#,
        r#"{ "type": "cfcInterpolation", "numIts": 2, "weightFactor": { "type": "sqrtAlphaInt", "alpha": "alpha" } }"#,
        r#"{ "type": "Csk", "numIts": 3, "Csk": 0.5,
             "smoother": { "type": "cfcInterpolation", "numIts": 1, "weightFactor": { "type": "unweighted" } } }"#,
        r#"{ "type": "normalDir", "numIts": 3, "alpha": "alpha" }"#,
    ];
    for json in kernels {
        let smoother = selectors
            .scalar_smoothers()
            .create(&dict(json), selectors.weights())
            .unwrap();
        let out = smoother.smoothen(&db, &phi).unwrap();
        assert!(
            matches!(out, Cow::Owned(_)),
            "{} 非零次迭代应返回新场",
            smoother.type_name()
        );
        assert_ne!(out.internal(), phi.internal(), "{} 应改变单元值", smoother.type_name());
        assert_patch_conditions_hold(&db, &out, smoother.type_name());
        assert_eq!(out.conditions(), phi.conditions());
    }
}
