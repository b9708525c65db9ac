//! 类型安全的环境变量
//!
//! 所有变量以 `BABEL_PROXY_` 开头，设置后覆盖配置文件中的对应项。

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::core::NodeFailurePolicy;

/// 环境变量解析错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Environment variable '{variable}': {message}")]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    /// 未设置时返回 `None`，设置了但无法解析时返回错误
    fn get() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn error(message: impl Into<String>) -> EnvError {
        EnvError {
            variable: Self::NAME.to_string(),
            message: message.into(),
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "BABEL_PROXY_LOG_LEVEL";
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(Self::error(format!(
                    "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                    value
                ))),
            }
        }
    }
}

/// HTTP 服务
pub mod server {
    use super::*;

    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "BABEL_PROXY_BIND";
        const DESCRIPTION: &'static str = "Address the HTTP server binds to";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(Self::error("Bind address cannot be empty"));
            }
            Ok(addr.to_string())
        }
    }

    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "BABEL_PROXY_PORT";
        const DESCRIPTION: &'static str = "Port the HTTP server listens on";

        fn parse(value: &str) -> EnvResult<u16> {
            match value.trim().parse::<u16>() {
                Ok(0) => Err(Self::error("Port cannot be 0")),
                Ok(port) => Ok(port),
                Err(_) => Err(Self::error("Must be a valid port number (1-65535)")),
            }
        }
    }
}

/// 翻译引擎
pub mod engine {
    use super::*;

    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "BABEL_PROXY_ENGINE_URL";
        const DESCRIPTION: &'static str = "Base URL of the inference server";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(Self::error("Engine URL must start with http:// or https://"))
            }
        }
    }

    pub struct CacheDir;
    impl EnvVar<String> for CacheDir {
        const NAME: &'static str = "BABEL_PROXY_CACHE_DIR";
        const DESCRIPTION: &'static str = "Directory for engine artifacts (tilde is expanded)";

        fn parse(value: &str) -> EnvResult<String> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(Self::error("Cache directory cannot be empty"));
            }
            Ok(dir.to_string())
        }
    }

    pub struct EstimatedLoadTime;
    impl EnvVar<Duration> for EstimatedLoadTime {
        const NAME: &'static str = "BABEL_PROXY_ESTIMATED_LOAD_SECS";
        const DESCRIPTION: &'static str = "Estimated engine load time in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 0, 3600)
        }
    }

    pub struct TranslateTimeout;
    impl EnvVar<Duration> for TranslateTimeout {
        const NAME: &'static str = "BABEL_PROXY_TRANSLATE_TIMEOUT_SECS";
        const DESCRIPTION: &'static str = "Timeout of a single engine call in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 600)
        }
    }
}

/// 远程获取
pub mod fetch {
    use super::*;

    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "BABEL_PROXY_USER_AGENT";
        const DESCRIPTION: &'static str = "User-Agent sent to remote sites";

        fn parse(value: &str) -> EnvResult<String> {
            let agent = value.trim();
            if agent.is_empty() {
                return Err(Self::error("User-Agent cannot be empty"));
            }
            Ok(agent.to_string())
        }
    }

    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "BABEL_PROXY_FETCH_TIMEOUT_SECS";
        const DESCRIPTION: &'static str = "Timeout for fetching a remote page in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 600)
        }
    }
}

/// 翻译行为
pub mod translation {
    use super::*;

    pub struct DefaultTargetLang;
    impl EnvVar<String> for DefaultTargetLang {
        const NAME: &'static str = "BABEL_PROXY_DEFAULT_LANG";
        const DESCRIPTION: &'static str = "Target language used when a request has no lang";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if lang.is_empty() {
                return Err(Self::error("Language cannot be empty"));
            }
            Ok(lang.to_string())
        }
    }

    pub struct SkipUndetermined;
    impl EnvVar<bool> for SkipUndetermined {
        const NAME: &'static str = "BABEL_PROXY_SKIP_UNDETERMINED";
        const DESCRIPTION: &'static str = "Do not translate pages that declare no language";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    pub struct NodeFailure;
    impl EnvVar<NodeFailurePolicy> for NodeFailure {
        const NAME: &'static str = "BABEL_PROXY_NODE_FAILURE";
        const DESCRIPTION: &'static str = "What to do when one text node fails: abort or skip";

        fn parse(value: &str) -> EnvResult<NodeFailurePolicy> {
            value.parse().map_err(Self::error)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let secs: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a whole number of seconds".to_string(),
    })?;

    if secs < min || secs > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is outside {}..={}", secs, min, max),
        });
    }

    Ok(Duration::from_secs(secs))
}

/// 从环境变量读取到的覆盖项，未设置的为 `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub engine_url: Option<String>,
    pub cache_dir: Option<String>,
    pub estimated_load: Option<Duration>,
    pub translate_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub fetch_timeout: Option<Duration>,
    pub default_target_lang: Option<String>,
    pub skip_undetermined: Option<bool>,
    pub node_failure: Option<NodeFailurePolicy>,
}

impl EnvOverrides {
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            bind_address: server::BindAddress::get()?,
            port: server::Port::get()?,
            engine_url: engine::ApiUrl::get()?,
            cache_dir: engine::CacheDir::get()?,
            estimated_load: engine::EstimatedLoadTime::get()?,
            translate_timeout: engine::TranslateTimeout::get()?,
            user_agent: fetch::UserAgent::get()?,
            fetch_timeout: fetch::Timeout::get()?,
            default_target_lang: translation::DefaultTargetLang::get()?,
            skip_undetermined: translation::SkipUndetermined::get()?,
            node_failure: translation::NodeFailure::get()?,
        })
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let entries: [(&str, &str); 12] = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (server::BindAddress::NAME, server::BindAddress::DESCRIPTION),
        (server::Port::NAME, server::Port::DESCRIPTION),
        (engine::ApiUrl::NAME, engine::ApiUrl::DESCRIPTION),
        (engine::CacheDir::NAME, engine::CacheDir::DESCRIPTION),
        (engine::EstimatedLoadTime::NAME, engine::EstimatedLoadTime::DESCRIPTION),
        (engine::TranslateTimeout::NAME, engine::TranslateTimeout::DESCRIPTION),
        (fetch::UserAgent::NAME, fetch::UserAgent::DESCRIPTION),
        (fetch::Timeout::NAME, fetch::Timeout::DESCRIPTION),
        (translation::DefaultTargetLang::NAME, translation::DefaultTargetLang::DESCRIPTION),
        (translation::SkipUndetermined::NAME, translation::SkipUndetermined::DESCRIPTION),
        (translation::NodeFailure::NAME, translation::NodeFailure::DESCRIPTION),
    ];

    let mut docs = String::from("Environment variables:\n");
    for (name, description) in entries {
        docs.push_str(&format!("  {:<36} {}\n", name, description));
    }
    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(translation::SkipUndetermined::parse("true").unwrap());
        assert!(translation::SkipUndetermined::parse("YES").unwrap());
        assert!(!translation::SkipUndetermined::parse("off").unwrap());
        assert!(translation::SkipUndetermined::parse("maybe").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(engine::ApiUrl::parse("http://localhost:7860").is_ok());
        assert!(engine::ApiUrl::parse("https://inference.internal").is_ok());
        assert!(engine::ApiUrl::parse("ftp://example.com").is_err());
        assert!(engine::ApiUrl::parse("localhost:7860").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(server::Port::parse("8080").unwrap(), 8080);
        assert!(server::Port::parse("0").is_err());
        assert!(server::Port::parse("70000").is_err());

        assert_eq!(
            engine::TranslateTimeout::parse("15").unwrap(),
            Duration::from_secs(15)
        );
        assert!(engine::TranslateTimeout::parse("0").is_err());
        assert_eq!(
            engine::EstimatedLoadTime::parse("0").unwrap(),
            Duration::ZERO
        );
    }

    #[test]
    fn test_node_failure_parsing() {
        assert_eq!(
            translation::NodeFailure::parse("skip").unwrap(),
            NodeFailurePolicy::Skip
        );
        let err = translation::NodeFailure::parse("retry").unwrap_err();
        assert_eq!(err.variable, "BABEL_PROXY_NODE_FAILURE");
    }

    #[test]
    fn test_overrides_from_env() {
        env::set_var("BABEL_PROXY_PORT", "9123");
        env::set_var("BABEL_PROXY_NODE_FAILURE", "skip");

        let overrides = EnvOverrides::from_env().unwrap();
        assert_eq!(overrides.port, Some(9123));
        assert_eq!(overrides.node_failure, Some(NodeFailurePolicy::Skip));

        env::remove_var("BABEL_PROXY_PORT");
        env::remove_var("BABEL_PROXY_NODE_FAILURE");
    }

    #[test]
    fn test_env_docs_list_every_variable() {
        let docs = generate_env_docs();
        assert!(docs.contains("BABEL_PROXY_ENGINE_URL"));
        assert!(docs.contains("BABEL_PROXY_NODE_FAILURE"));
    }
}
