// crates/mh_config/src/case_config.rs

//! CaseConfig - 算例配置
//!
//! 描述一次界面曲率计算所需的全部输入：结构化盒子网格、体积分数初始化、
//! 壁面速度、`transportProperties` 字典以及体积分数的边界条件。
//! 数值使用 f64 存储以便 JSON 序列化。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::dictionary::Dictionary;
use crate::error::ConfigError;

/// 算例配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// 网格配置
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 体积分数字段名
    #[serde(default = "default_alpha_name")]
    pub alpha_name: String,

    /// 速度字段名
    #[serde(default = "default_velocity_name")]
    pub velocity_name: String,

    /// 体积分数初始化
    #[serde(default)]
    pub alpha: AlphaInit,

    /// 均匀速度 [m/s]
    #[serde(default)]
    pub velocity: [f64; 3],

    /// `transportProperties` 字典内容
    #[serde(default = "default_transport_properties")]
    pub transport_properties: Value,

    /// 体积分数边界条件（补丁名 -> 条件字典）
    #[serde(default)]
    pub alpha_boundary: BTreeMap<String, Value>,

    /// 曲率计算总次数（含构造时的一次），至少为 1
    #[serde(default = "default_corrections")]
    pub corrections: usize,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_alpha_name() -> String { "alpha.water".to_string() }
fn default_velocity_name() -> String { "U".to_string() }
fn default_corrections() -> usize { 1 }

fn default_transport_properties() -> Value {
    serde_json::json!({
        "phases": ["water", "air"],
        "sigma": 0.07,
        "water": { "rho": 1000.0 },
        "air": { "rho": 1.0 },
        "curvatureModel": "normal"
    })
}

/// 结构化盒子网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// 各方向单元数
    #[serde(default = "default_cells")]
    pub cells: [usize; 3],

    /// 盒子原点 [m]
    #[serde(default)]
    pub origin: [f64; 3],

    /// 盒子尺寸 [m]
    #[serde(default = "default_lengths")]
    pub lengths: [f64; 3],

    /// 二维算例：z 方向前后面为空补丁
    #[serde(default)]
    pub two_dimensional: bool,

    /// 按壁面处理的补丁名（`xmin`, `xmax`, `ymin`, `ymax`, `zmin`, `zmax`）
    #[serde(default)]
    pub walls: Vec<String>,
}

fn default_cells() -> [usize; 3] { [32, 32, 1] }
fn default_lengths() -> [f64; 3] { [1.0, 1.0, 1.0 / 32.0] }

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            cells: default_cells(),
            origin: [0.0; 3],
            lengths: default_lengths(),
            two_dimensional: true,
            walls: Vec::new(),
        }
    }
}

/// 体积分数初始化形状
///
/// 所有形状都取单元中心处的指示函数值，不做体积平均。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum AlphaInit {
    /// 均匀值
    Uniform {
        /// 体积分数
        value: f64,
    },
    /// 平面台阶：`x[axis] < position` 的单元为 1
    Step {
        /// 坐标轴（0, 1, 2）
        axis: usize,
        /// 台阶位置 [m]
        position: f64,
    },
    /// 圆柱（忽略 z）：中心距离小于半径的单元为 1
    Circle {
        /// 圆心 [m]
        center: [f64; 3],
        /// 半径 [m]
        radius: f64,
    },
    /// 球：中心距离小于半径的单元为 1
    Sphere {
        /// 球心 [m]
        center: [f64; 3],
        /// 半径 [m]
        radius: f64,
    },
}

impl Default for AlphaInit {
    fn default() -> Self {
        Self::Circle {
            center: [0.5, 0.5, 0.0],
            radius: 0.25,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// 是否写出单元场（CSV）
    #[serde(default)]
    pub write_fields: bool,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            write_fields: false,
        }
    }
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            mesh: MeshConfig::default(),
            alpha_name: default_alpha_name(),
            velocity_name: default_velocity_name(),
            alpha: AlphaInit::default(),
            velocity: [0.0; 3],
            transport_properties: default_transport_properties(),
            alpha_boundary: BTreeMap::new(),
            corrections: default_corrections(),
            output: OutputConfig::default(),
        }
    }
}

impl CaseConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: CaseConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `transportProperties` 字典
    pub fn transport_dictionary(&self) -> Result<Dictionary, ConfigError> {
        Dictionary::from_value("transportProperties", self.transport_properties.clone())
    }

    /// 某补丁的体积分数边界条件字典
    pub fn alpha_boundary_dictionary(&self, patch: &str) -> Result<Option<Dictionary>, ConfigError> {
        self.alpha_boundary
            .get(patch)
            .map(|v| Dictionary::from_value(format!("{}.boundaryField.{patch}", self.alpha_name), v.clone()))
            .transpose()
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, &n) in self.mesh.cells.iter().enumerate() {
            if n == 0 {
                return Err(invalid(format!("mesh.cells[{i}]"), n, "单元数必须为正"));
            }
        }
        for (i, &l) in self.mesh.lengths.iter().enumerate() {
            if !(l > 0.0 && l.is_finite()) {
                return Err(invalid(format!("mesh.lengths[{i}]"), l, "尺寸必须为正"));
            }
        }
        if self.mesh.two_dimensional && self.mesh.cells[2] != 1 {
            return Err(invalid(
                "mesh.cells[2]",
                self.mesh.cells[2],
                "二维算例 z 方向只能有一层单元",
            ));
        }
        const PATCHES: [&str; 6] = ["xmin", "xmax", "ymin", "ymax", "zmin", "zmax"];
        for wall in &self.mesh.walls {
            if !PATCHES.contains(&wall.as_str()) {
                return Err(invalid("mesh.walls", wall, "补丁名必须是 xmin/xmax/ymin/ymax/zmin/zmax"));
            }
        }
        match &self.alpha {
            AlphaInit::Uniform { value } if !(0.0..=1.0).contains(value) => {
                return Err(invalid("alpha.value", value, "体积分数必须在 [0, 1] 内"));
            }
            AlphaInit::Step { axis, .. } if *axis > 2 => {
                return Err(invalid("alpha.axis", axis, "坐标轴必须是 0, 1 或 2"));
            }
            AlphaInit::Circle { radius, .. } | AlphaInit::Sphere { radius, .. } if *radius <= 0.0 => {
                return Err(invalid("alpha.radius", radius, "半径必须为正"));
            }
            _ => {}
        }
        if self.corrections == 0 {
            return Err(invalid(
                "corrections",
                self.corrections,
                "构造时已计算一次曲率，次数至少为 1",
            ));
        }
        if !self.transport_properties.is_object() {
            return Err(invalid(
                "transport_properties",
                &self.transport_properties,
                "必须是 JSON 对象",
            ));
        }
        Ok(())
    }
}

fn invalid(key: impl Into<String>, value: impl std::fmt::Display, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
