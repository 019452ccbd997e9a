use thiserror::Error;

/// 設定値の検証エラー。構築時・更新時に一度だけ報告する。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("debounce window size must be at least 1")]
    ZeroWindow,

    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} is too large, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

impl ConfigError {
    pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { name, value })
        }
    }

    pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { name, value })
        }
    }
}
