// crates/mh_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `MhError` 枚举和 `MhResult` 类型别名，用于整个工作区的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，字典解析错误在 `mh_config` 中定义并转换
//! 2. **致命与可恢复分离**: 只有配置错误与缺失字段是错误；缺省参数回退和数值退化不构成错误
//! 3. **可追溯**: 类型选择错误携带全部合法名称
//!
//! # 示例
//!
//! ```
//! use mh_foundation::error::{MhError, MhResult};
//!
//! fn select(name: &str) -> MhResult<()> {
//!     Err(MhError::unknown_type("smootherKernel", name, vec!["none".into()]))
//! }
//! assert!(select("foo").unwrap_err().to_string().contains("none"));
//! ```

use thiserror::Error;

/// 统一结果类型
pub type MhResult<T> = Result<T, MhError>;

/// MariHydro 错误类型
#[derive(Error, Debug)]
pub enum MhError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    // ========================================================================
    // 数据错误
    // ========================================================================
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 配置错误（致命）
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少必需的配置项或子字典
    #[error("缺少必需的配置项: {key} (在 {dict} 中)")]
    MissingConfig {
        /// 配置键名
        key: String,
        /// 所在字典路径
        dict: String,
    },

    /// 未知的运行时类型名
    #[error("未知的 {family} 类型 '{name}'. 合法的 {family} 类型: {valid:?}")]
    UnknownType {
        /// 模型族名称（如 smootherKernel）
        family: &'static str,
        /// 请求的类型名
        name: String,
        /// 已注册的合法类型名（已排序）
        valid: Vec<String>,
    },

    /// 注册表中找不到字段
    #[error("字段 '{name}' 未在注册表中找到 (已注册: {available:?})")]
    FieldNotFound {
        /// 请求的字段名
        name: String,
        /// 已注册的字段名
        available: Vec<String>,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl MhError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>, dict: impl Into<String>) -> Self {
        Self::MissingConfig {
            key: key.into(),
            dict: dict.into(),
        }
    }

    /// 未知类型；合法名称会被排序
    pub fn unknown_type(family: &'static str, name: impl Into<String>, mut valid: Vec<String>) -> Self {
        valid.sort();
        Self::UnknownType {
            family,
            name: name.into(),
            valid,
        }
    }

    /// 字段未找到
    pub fn field_not_found(name: impl Into<String>, mut available: Vec<String>) -> Self {
        available.sort();
        Self::FieldNotFound {
            name: name.into(),
            available,
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为配置类致命错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::MissingConfig { .. } | Self::UnknownType { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl MhError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> MhResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> MhResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// 解包 Option，为 None 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for MhError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MhError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_unknown_type_lists_sorted_names() {
        let err = MhError::unknown_type(
            "curvatureModel",
            "bogus",
            vec!["vofsmooth".into(), "normal".into(), "smoothed".into()],
        );
        match &err {
            MhError::UnknownType { valid, .. } => {
                assert_eq!(valid, &["normal", "smoothed", "vofsmooth"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        assert!(msg.contains("normal"));
    }

    #[test]
    fn test_field_not_found() {
        let err = MhError::field_not_found("alpha.water", vec!["U".into(), "alpha".into()]);
        assert!(err.to_string().contains("alpha.water"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_check_size() {
        assert!(MhError::check_size("test", 10, 10).is_ok());
        assert!(MhError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(MhError::check_index("Cell", 5, 10).is_ok());
        assert!(MhError::check_index("Cell", 10, 10).is_err());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let mh_err: MhError = io_err.into();
        assert!(matches!(mh_err, MhError::Io { .. }));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: i32) -> MhResult<()> {
            ensure!(value > 0, MhError::invalid_input("value must be positive"));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(check(-1).is_err());
    }

    #[test]
    fn test_require_macro() {
        fn get_value(opt: Option<i32>) -> MhResult<i32> {
            let v = require!(opt, MhError::internal("value"));
            Ok(v)
        }

        assert_eq!(get_value(Some(42)).unwrap(), 42);
        assert!(get_value(None).is_err());
    }
}
