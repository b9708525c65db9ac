// 集成测试公共模块
//
// 提供假的翻译引擎、本地上游站点以及构建应用状态的辅助函数

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{any, get},
    Router,
};
use tokio::sync::Notify;

use babel_proxy::core::{PipelineOptions, ProxyPipeline};
use babel_proxy::network::{RemoteFetcher, DEFAULT_USER_AGENT};
use babel_proxy::translation::{
    EngineLoader, LanguageMapper, TranslationEngine, TranslationError, TranslationResult,
    Translator,
};
use babel_proxy::web::AppState;

/// 1x1 透明 PNG
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub const ENGLISH_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<title>Example</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<h1>Hello world</h1>
<p>First paragraph</p>
<a href="/about">About us</a>
<a href="#top">Back to top</a>
<a href="mailto:team@example.com">Write to us</a>
<img src="logo.png" alt="logo">
<form action="/search" method="get"><input name="q"></form>
<script>console.log("untouched");</script>
</body>
</html>"##;

pub const FRENCH_PAGE: &str = r#"<html lang="fr"><body><p>Bonjour le monde</p><a href="/suite">Suite</a></body></html>"#;

/// 返回 `[目标语言] 原文`，并记录每次调用的原文
#[derive(Default)]
pub struct RecordingTranslator {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingTranslator {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        _source_lang: Option<&str>,
    ) -> TranslationResult<String> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(format!("[{}] {}", target_lang, text))
    }
}

/// 等待放行后才完成加载的加载器
pub struct GatedLoader {
    pub gate: Arc<Notify>,
    pub translator: Arc<RecordingTranslator>,
}

#[async_trait]
impl EngineLoader for GatedLoader {
    async fn load(&self, _cache_dir: &Path) -> TranslationResult<Arc<dyn Translator>> {
        self.gate.notified().await;
        let translator: Arc<dyn Translator> = self.translator.clone();
        Ok(translator)
    }
}

/// 总是失败的加载器
pub struct FailingLoader;

#[async_trait]
impl EngineLoader for FailingLoader {
    async fn load(&self, _cache_dir: &Path) -> TranslationResult<Arc<dyn Translator>> {
        Err(TranslationError::EngineLoadFailed("model weights missing".into()))
    }
}

/// 在本地临时端口上启动上游测试站点
pub async fn spawn_upstream() -> SocketAddr {
    let router = Router::new()
        .route("/", get(|| async { Html(ENGLISH_PAGE) }))
        .route("/fr", get(|| async { Html(FRENCH_PAGE) }))
        .route(
            "/many",
            get(|| async {
                Html(
                    r#"<html lang="en"><body><ul><li>one</li><li>two <b>three</b></li></ul><p>four</p><noscript>never</noscript><p>five</p></body></html>"#,
                )
            }),
        )
        .route(
            "/latin1",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html; charset=ISO-8859-1")],
                    b"<html lang=\"en\"><body><p>caf\xE9</p></body></html>".to_vec(),
                )
            }),
        )
        .route(
            "/legacy",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    b"<html lang=\"fr\"><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body><p>caf\xE9 cr\xE8me</p></body></html>".to_vec(),
                )
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html(ENGLISH_PAGE)
            }),
        )
        .route(
            "/logo.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route(
            "/missing.txt",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "no such file",
                )
                    .into_response()
            }),
        )
        .route(
            "/echo",
            any(|method: Method, body: String| async move {
                Html(format!(
                    r#"<html lang="en"><body><p>{} {}</p></body></html>"#,
                    method, body
                ))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn test_fetcher(timeout: Duration) -> RemoteFetcher {
    RemoteFetcher::new(DEFAULT_USER_AGENT, timeout).unwrap()
}

/// 以给定引擎构建应用状态
pub fn app_state(engine: Arc<TranslationEngine>) -> Arc<AppState> {
    app_state_with_fetcher(engine, test_fetcher(Duration::from_secs(5)))
}

pub fn app_state_with_fetcher(
    engine: Arc<TranslationEngine>,
    fetcher: RemoteFetcher,
) -> Arc<AppState> {
    Arc::new(AppState {
        pipeline: ProxyPipeline::new(
            engine,
            LanguageMapper::default(),
            fetcher,
            PipelineOptions::default(),
        ),
    })
}

/// 已就绪的引擎及其翻译器
pub fn ready_engine() -> (Arc<TranslationEngine>, Arc<RecordingTranslator>) {
    let translator = Arc::new(RecordingTranslator::default());
    let engine = Arc::new(TranslationEngine::ready(translator.clone()));
    (engine, translator)
}

/// 代理地址
pub fn proxy_uri(upstream: SocketAddr, path: &str, lang: Option<&str>) -> String {
    let target = format!("http://{}{}", upstream, path);
    let mut uri = format!("/proxy?url={}", encode(&target));
    if let Some(lang) = lang {
        uri.push_str(&format!("&lang={}", lang));
    }
    uri
}

pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
