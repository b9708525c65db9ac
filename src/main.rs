//! babel-proxy 服务入口

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use babel_proxy::config::{CliOverrides, ProxyConfig};
use babel_proxy::core::ProxyPipeline;
use babel_proxy::env::generate_env_docs;
use babel_proxy::network::RemoteFetcher;
use babel_proxy::translation::{HttpModelLoader, TranslationEngine};
use babel_proxy::web::{AppState, WebServer};

/// Translating forwarding proxy: browse any site in your language
#[derive(Parser, Debug)]
#[command(name = "babel-proxy", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for engine artifacts
    #[arg(long)]
    cache_dir: Option<String>,

    /// Base URL of the inference server
    #[arg(long)]
    engine_url: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// List supported environment variables and exit
    #[arg(long)]
    print_env: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            bind_address: self.bind.clone(),
            port: self.port,
            cache_dir: self.cache_dir.clone(),
            engine_url: self.engine_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_env {
        print!("{}", generate_env_docs());
        return Ok(());
    }

    // 日志级别来自配置，加载配置期间的日志先用临时订阅器输出到 stderr
    let config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        ProxyConfig::load(&args.overrides())
    })?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_tracing(config.log_level.as_deref());

    let cache_dir = config.cache_dir();
    tokio::fs::create_dir_all(&cache_dir).await?;
    tracing::info!("引擎缓存目录: {}", cache_dir.display());

    let engine = Arc::new(TranslationEngine::new(cache_dir, config.estimated_load_time()));
    let loader = HttpModelLoader::new(&config.engine.api_url, config.translate_timeout())?;
    engine.initialize(Arc::new(loader));

    let fetcher = RemoteFetcher::new(&config.fetch.user_agent, config.fetch_timeout())?;
    let pipeline = ProxyPipeline::new(
        engine,
        config.language_mapper(),
        fetcher,
        config.pipeline_options(),
    );

    WebServer::new(config.bind_addr(), AppState { pipeline })
        .start()
        .await?;

    Ok(())
}

fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("babel_proxy=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

/// `RUST_LOG` 优先，其次是配置中的日志级别
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.unwrap_or("info");
        EnvFilter::new(format!("babel_proxy={level},tower_http={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
