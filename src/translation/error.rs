//! 翻译模块统一错误处理

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 引擎仍在加载
    #[error("translation engine is still loading")]
    EngineNotReady,

    /// 引擎加载失败，本进程内不可用
    #[error("translation engine is unavailable: {0}")]
    EngineUnavailable(String),

    /// 加载器报告的加载失败
    #[error("failed to load translation engine: {0}")]
    EngineLoadFailed(String),

    /// 翻译服务错误
    #[error("translation service error: {0}")]
    TranslationServiceError(String),

    /// 超时错误
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// 请求已被客户端取消
    #[error("request was cancelled")]
    Cancelled,

    /// 缓存目录读写错误
    #[error("engine cache error: {0}")]
    CacheError(String),

    /// 序列化错误
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::EngineNotReady => ErrorSeverity::Info,
            TranslationError::Cancelled => ErrorSeverity::Info,
            TranslationError::Timeout(_) => ErrorSeverity::Warning,
            TranslationError::TranslationServiceError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::CacheError(_) => ErrorSeverity::Error,
            TranslationError::EngineUnavailable(_) => ErrorSeverity::Critical,
            TranslationError::EngineLoadFailed(_) => ErrorSeverity::Critical,
        }
    }

    /// 是否由引擎生命周期引起（这类错误不能按节点跳过）
    pub fn is_engine_state(&self) -> bool {
        matches!(
            self,
            TranslationError::EngineNotReady
                | TranslationError::EngineUnavailable(_)
                | TranslationError::EngineLoadFailed(_)
                | TranslationError::Cancelled
        )
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::CacheError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(error.to_string())
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::Timeout(error.to_string())
        } else {
            TranslationError::TranslationServiceError(error.to_string())
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error<T: fmt::Display>(error: &TranslationError, context: T) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("{}: {}", context, error),
            ErrorSeverity::Warning => tracing::warn!("{}: {}", context, error),
            ErrorSeverity::Error => tracing::error!("{}: {}", context, error),
            ErrorSeverity::Critical => tracing::error!("{} (critical): {}", context, error),
        }
    }

    /// 创建翻译服务错误
    pub fn service_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::TranslationServiceError(msg.to_string())
    }
}
