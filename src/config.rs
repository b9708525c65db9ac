//! 代理配置
//!
//! 加载顺序（后者覆盖前者）：默认值 → 配置文件 → `.env` 文件 → `BABEL_PROXY_*` 环境变量 → 命令行参数。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{NodeFailurePolicy, PipelineOptions};
use crate::env::{EnvError, EnvOverrides};
use crate::network::fetcher::DEFAULT_USER_AGENT;
use crate::translation::LanguageMapper;

/// 依次查找的配置文件
pub const CONFIG_PATHS: &[&str] = &["./babel-proxy.toml", "~/.config/babel-proxy/config.toml"];

/// 依次尝试的 `.env` 文件，只加载第一个存在的
const ENV_FILES: &[&str] = &[".env.local", ".env"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 7080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 推理服务地址
    pub api_url: String,
    /// 引擎产物缓存目录，支持 `~`
    pub cache_dir: String,
    /// 预估的加载耗时，仅用于 `/status` 的倒计时
    pub estimated_load_secs: u64,
    pub translate_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:7860".to_string(),
            cache_dir: "~/.cache/babel-proxy".to_string(),
            estimated_load_secs: 120,
            translate_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub default_target_lang: String,
    /// 页面未声明语言时不翻译
    pub skip_undetermined: bool,
    pub node_failure: NodeFailurePolicy,
    /// 追加或覆盖内置的语言代码映射
    pub language_codes: HashMap<String, String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_target_lang: "en".to_string(),
            skip_undetermined: false,
            node_failure: NodeFailurePolicy::Abort,
            language_codes: HashMap::new(),
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub log_level: Option<String>,
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub fetch: FetchConfig,
    pub translation: TranslationConfig,
}

/// 命令行参数带来的覆盖项
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub cache_dir: Option<String>,
    pub engine_url: Option<String>,
}

impl ProxyConfig {
    /// 按完整的优先级链加载配置
    pub fn load(cli: &CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(cli.config_path.as_deref()) {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        load_dotenv();
        config.apply_env(EnvOverrides::from_env()?);
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("加载配置文件: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env(&mut self, env: EnvOverrides) {
        if let Some(level) = env.log_level {
            self.log_level = Some(level);
        }
        if let Some(bind) = env.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = env.port {
            self.server.port = port;
        }
        if let Some(url) = env.engine_url {
            tracing::info!("环境变量覆盖引擎地址: {}", url);
            self.engine.api_url = url;
        }
        if let Some(dir) = env.cache_dir {
            self.engine.cache_dir = dir;
        }
        if let Some(estimate) = env.estimated_load {
            self.engine.estimated_load_secs = estimate.as_secs();
        }
        if let Some(timeout) = env.translate_timeout {
            self.engine.translate_timeout_secs = timeout.as_secs();
        }
        if let Some(agent) = env.user_agent {
            self.fetch.user_agent = agent;
        }
        if let Some(timeout) = env.fetch_timeout {
            self.fetch.timeout_secs = timeout.as_secs();
        }
        if let Some(lang) = env.default_target_lang {
            self.translation.default_target_lang = lang;
        }
        if let Some(skip) = env.skip_undetermined {
            self.translation.skip_undetermined = skip;
        }
        if let Some(policy) = env.node_failure {
            self.translation.node_failure = policy;
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(bind) = &cli.bind_address {
            self.server.bind_address = bind.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(dir) = &cli.cache_dir {
            self.engine.cache_dir = dir.clone();
        }
        if let Some(url) = &cli.engine_url {
            self.engine.api_url = url.clone();
        }
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address cannot be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port cannot be 0".into()));
        }
        if !(self.engine.api_url.starts_with("http://")
            || self.engine.api_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "engine api_url must be an http(s) URL, got '{}'",
                self.engine.api_url
            )));
        }
        if self.engine.cache_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("cache directory cannot be empty".into()));
        }
        if self.engine.translate_timeout_secs == 0 || self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than 0".into()));
        }
        if self.translation.default_target_lang.trim().is_empty() {
            return Err(ConfigError::Invalid("default target language cannot be empty".into()));
        }
        Ok(())
    }

    /// 展开 `~` 与环境变量后的缓存目录
    pub fn cache_dir(&self) -> PathBuf {
        match shellexpand::full(&self.engine.cache_dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => PathBuf::from(shellexpand::tilde(&self.engine.cache_dir).as_ref()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn estimated_load_time(&self) -> Duration {
        Duration::from_secs(self.engine.estimated_load_secs)
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.translate_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn language_mapper(&self) -> LanguageMapper {
        LanguageMapper::new(
            &self.translation.language_codes,
            self.translation.skip_undetermined,
        )
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            default_target_lang: self.translation.default_target_lang.trim().to_string(),
            translate_timeout: self.translate_timeout(),
            node_failure: self.translation.node_failure,
        }
    }
}

/// 显式指定的路径优先，否则按 [`CONFIG_PATHS`] 查找第一个存在的文件
fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    CONFIG_PATHS
        .iter()
        .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
        .find(|path| path.exists())
}

/// 加载 `.env` 文件
fn load_dotenv() {
    for env_file in ENV_FILES {
        if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
            tracing::info!("已加载环境变量文件: {}", env_file);
            break;
        }
    }
}
