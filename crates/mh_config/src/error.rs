// crates/mh_config/src/error.rs

//! 配置层错误类型

use mh_foundation::MhError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失条目
    #[error("缺失条目 '{key}' (在 {dict} 中)")]
    MissingEntry {
        /// 配置键
        key: String,
        /// 字典路径
        dict: String,
    },

    /// 缺失子字典
    #[error("缺失子字典 '{key}' (在 {dict} 中)")]
    MissingSubDict {
        /// 子字典键
        key: String,
        /// 字典路径
        dict: String,
    },

    /// 条目存在但不是字典
    #[error("条目 '{key}' 不是字典 (在 {dict} 中)")]
    NotADictionary {
        /// 配置键
        key: String,
        /// 字典路径
        dict: String,
    },
}

impl From<ConfigError> for MhError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingEntry { key, dict } | ConfigError::MissingSubDict { key, dict } => {
                MhError::missing_config(key, dict)
            }
            ConfigError::Io(e) => MhError::from(e),
            other => MhError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "Csk".to_string(),
            value: "-1".to_string(),
            reason: "必须在 [0, 1) 内".to_string(),
        };
        assert!(err.to_string().contains("Csk"));
    }

    #[test]
    fn test_missing_sub_dict_converts_to_missing_config() {
        let err = ConfigError::MissingSubDict {
            key: "smoothAlpha".into(),
            dict: "transportProperties.vofsmoothCoeffs".into(),
        };
        let mh: MhError = err.into();
        assert!(matches!(mh, MhError::MissingConfig { .. }));
        assert!(mh.is_config_error());
    }
}
