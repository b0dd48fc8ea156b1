// crates/mh_config/src/dictionary.rs

//! 嵌套配置字典
//!
//! 以 JSON 对象为载体的键值树，带路径名，用于模型的运行时选择和参数读取。
//!
//! # 查找语义
//!
//! | 方法 | 缺失时 | 类型错误时 |
//! |------|--------|------------|
//! | [`Dictionary::lookup`] | `Err` | `Err` |
//! | [`Dictionary::lookup_or_default`] | 缺省值 + 警告 | 缺省值 + 警告 |
//! | [`Dictionary::lookup_or_default_quiet`] | 缺省值 | 缺省值 + 警告 |
//! | [`Dictionary::lookup_checked`] | 缺省值 + 警告 | 缺省值 + 警告（含越界） |
//! | [`Dictionary::sub_dict`] | `Err` | `Err` |
//! | [`Dictionary::sub_dict_or_empty`] | 空字典 + 警告 | 空字典 + 警告 |
//!
//! 所有警告同时写入 `log` 和共享的诊断列表；子字典与父字典共享同一个列表，
//! 因此根字典的 [`Dictionary::diagnostics`] 能看到整棵树上的回退记录。
//!
//! # 示例
//!
//! ```
//! use mh_config::Dictionary;
//!
//! let dict = Dictionary::from_json_str(
//!     "smoothCurvature",
//!     r#"{ "type": "Csk", "numIts": 3, "Csk": 1.5 }"#,
//! ).unwrap();
//!
//! let its: i64 = dict.lookup_or_default("numIts", 2);
//! let csk = dict.lookup_checked("Csk", 0.5, |c: &f64| (0.0..1.0).contains(c), "必须在 [0, 1) 内");
//! assert_eq!(its, 3);
//! assert_eq!(csk, 0.5);
//! assert_eq!(dict.diagnostics().len(), 1);
//! ```

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::error::ConfigError;

// ============================================================
// 诊断
// ============================================================

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// 提示（如显式的零迭代）
    Info,
    /// 警告（回退到缺省值）
    Warning,
}

/// 一条非致命诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 级别
    pub severity: Severity,
    /// 字典路径
    pub dict: String,
    /// 相关键
    pub key: String,
    /// 说明
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}.{}: {}", self.severity, self.dict, self.key, self.message)
    }
}

/// 共享诊断列表
#[derive(Debug, Clone, Default)]
struct DiagnosticSink(Arc<Mutex<Vec<Diagnostic>>>);

impl DiagnosticSink {
    /// 相同的诊断只保留一条，重复读取不会使列表增长
    fn push(&self, diagnostic: Diagnostic) {
        let mut list = self.0.lock();
        if !list.contains(&diagnostic) {
            list.push(diagnostic);
        }
    }

    fn snapshot(&self) -> Vec<Diagnostic> {
        self.0.lock().clone()
    }
}

// ============================================================
// 字典
// ============================================================

/// 命名的嵌套配置字典
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// 路径名（如 `transportProperties.vofsmoothCoeffs`）
    name: String,
    /// 条目
    entries: Map<String, Value>,
    /// 诊断列表（与父字典共享）
    sink: DiagnosticSink,
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries == other.entries
    }
}

impl Dictionary {
    /// 创建空字典
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Map::new(),
            sink: DiagnosticSink::default(),
        }
    }

    /// 从 JSON 值创建；`null` 视为空字典
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, ConfigError> {
        let name = name.into();
        match value {
            Value::Object(entries) => Ok(Self {
                name,
                entries,
                sink: DiagnosticSink::default(),
            }),
            Value::Null => Ok(Self::new(name)),
            other => Err(ConfigError::Parse(format!(
                "{name} 必须是 JSON 对象, 实际为 {other}"
            ))),
        }
    }

    /// 从 JSON 字符串解析
    pub fn from_json_str(name: impl Into<String>, content: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(name, value)
    }

    /// 字典路径名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否存在条目
    pub fn found(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 条目是否为子字典
    pub fn is_dict(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Value::Object(_)))
    }

    /// 所有键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // =========================================================================
    // 查找
    // =========================================================================

    /// 读取必需条目
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        match self.lookup_optional(key)? {
            Some(v) => Ok(v),
            None => Err(ConfigError::MissingEntry {
                key: key.to_string(),
                dict: self.name.clone(),
            }),
        }
    }

    /// 读取可选条目；存在但类型错误时返回 `Err`
    pub fn lookup_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: self.path_of(key),
                    value: value.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// 读取条目，缺失或无效时回退到缺省值并警告
    pub fn lookup_or_default<T: DeserializeOwned + Debug>(&self, key: &str, default: T) -> T {
        match self.lookup_optional(key) {
            Ok(Some(v)) => v,
            Ok(None) => {
                self.warn(
                    key,
                    format!(
                        "Keyword \"{key}\" not found in {}. Using the default {default:?} instead.",
                        self.name
                    ),
                );
                default
            }
            Err(e) => {
                self.warn(key, format!("{e}. Using the default {default:?} instead."));
                default
            }
        }
    }

    /// 读取条目，缺失时静默回退；无效时回退并警告
    pub fn lookup_or_default_quiet<T: DeserializeOwned + Debug>(&self, key: &str, default: T) -> T {
        match self.lookup_optional(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                self.warn(key, format!("{e}. Using the default {default:?} instead."));
                default
            }
        }
    }

    /// 读取并校验数值条目
    ///
    /// 缺失、类型错误或 `valid` 返回 false 时回退到缺省值，并给出说明 `requirement` 的警告。
    pub fn lookup_checked<T, F>(&self, key: &str, default: T, valid: F, requirement: &str) -> T
    where
        T: DeserializeOwned + Debug + Clone,
        F: Fn(&T) -> bool,
    {
        let value = self.lookup_or_default(key, default.clone());
        if valid(&value) {
            value
        } else {
            self.warn(
                key,
                format!(
                    "Specified {key} = {value:?} in {}. {requirement}. Assuming the default value {default:?} instead.",
                    self.name
                ),
            );
            default
        }
    }

    // =========================================================================
    // 子字典
    // =========================================================================

    /// 读取必需子字典
    pub fn sub_dict(&self, key: &str) -> Result<Dictionary, ConfigError> {
        match self.entries.get(key) {
            Some(Value::Object(entries)) => Ok(self.child(key, entries.clone())),
            Some(_) => Err(ConfigError::NotADictionary {
                key: key.to_string(),
                dict: self.name.clone(),
            }),
            None => Err(ConfigError::MissingSubDict {
                key: key.to_string(),
                dict: self.name.clone(),
            }),
        }
    }

    /// 读取子字典，缺失时返回空字典并警告
    pub fn sub_dict_or_empty(&self, key: &str) -> Dictionary {
        match self.sub_dict(key) {
            Ok(dict) => dict,
            Err(e) => {
                self.warn(key, format!("{e}. Using an empty dictionary instead."));
                self.child(key, Map::new())
            }
        }
    }

    fn child(&self, key: &str, entries: Map<String, Value>) -> Dictionary {
        Dictionary {
            name: self.path_of(key),
            entries,
            sink: self.sink.clone(),
        }
    }

    fn path_of(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }

    // =========================================================================
    // 修改（用于程序化构建）
    // =========================================================================

    /// 插入或覆盖条目
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// 插入或覆盖子字典
    pub fn insert_dict(&mut self, key: impl Into<String>, dict: Dictionary) -> &mut Self {
        self.entries.insert(key.into(), Value::Object(dict.entries));
        self
    }

    /// 构建器风格插入
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// 构建器风格插入子字典
    pub fn with_dict(mut self, key: impl Into<String>, dict: Dictionary) -> Self {
        self.insert_dict(key, dict);
        self
    }

    // =========================================================================
    // 诊断
    // =========================================================================

    /// 记录警告
    pub fn warn(&self, key: &str, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {}", self.name, message);
        self.sink.push(Diagnostic {
            severity: Severity::Warning,
            dict: self.name.clone(),
            key: key.to_string(),
            message,
        });
    }

    /// 记录提示
    pub fn note(&self, key: &str, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}: {}", self.name, message);
        self.sink.push(Diagnostic {
            severity: Severity::Info,
            dict: self.name.clone(),
            key: key.to_string(),
            message,
        });
    }

    /// 当前记录的所有诊断（含子字典）
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.snapshot()
    }

    /// 仅警告级别的诊断
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }
}

// ============================================================
// 测试
// ============================================================
