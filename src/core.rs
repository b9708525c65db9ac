use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use markup5ever_rcdom::RcDom;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task;
use tokio_util::sync::CancellationToken;

use crate::network::fetcher::{FetchedDocument, ProxiedRequest, RemoteFetcher};
use crate::parsers::{
    collect_text_nodes, get_document_lang, parse_html_bytes, rewrite_links_in_dom,
    serialize_document,
};
use crate::translation::{LanguageMapper, TranslationEngine, TranslationError};
use crate::utils::url::Url;

/// 代理请求处理过程中的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// 请求参数不合法
    #[error("{0}")]
    MalformedInput(String),

    #[error("translation engine is still loading")]
    EngineNotReady,

    /// 引擎加载失败，本进程内不会恢复
    #[error("translation engine is unavailable: {0}")]
    EngineUnavailable(String),

    #[error("failed to fetch the remote page: {0}")]
    UpstreamFetchError(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("failed to process the page: {0}")]
    Processing(String),

    /// 客户端已断开
    #[error("request was cancelled by the client")]
    Cancelled,
}

impl ProxyError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::EngineNotReady | ProxyError::EngineUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ProxyError::UpstreamFetchError(_) | ProxyError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            // nginx 的 "client closed request"，客户端已经看不到了
            ProxyError::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<TranslationError> for ProxyError {
    fn from(error: TranslationError) -> Self {
        match error {
            TranslationError::EngineNotReady => ProxyError::EngineNotReady,
            TranslationError::EngineUnavailable(reason)
            | TranslationError::EngineLoadFailed(reason) => ProxyError::EngineUnavailable(reason),
            TranslationError::Timeout(message) => ProxyError::Timeout(message),
            TranslationError::Cancelled => ProxyError::Cancelled,
            other => ProxyError::Processing(other.to_string()),
        }
    }
}

/// 单个文本节点翻译失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFailurePolicy {
    /// 整个请求失败，不返回部分结果
    #[default]
    Abort,
    /// 保留原文，继续处理后续节点
    Skip,
}

impl FromStr for NodeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(NodeFailurePolicy::Abort),
            "skip" => Ok(NodeFailurePolicy::Skip),
            other => Err(format!("unknown node failure policy '{}'", other)),
        }
    }
}

/// 页面处理选项
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// 未指定 `lang` 时使用的目标语言
    pub default_target_lang: String,
    /// 单次引擎调用的超时
    pub translate_timeout: Duration,
    pub node_failure: NodeFailurePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_target_lang: "en".to_string(),
            translate_timeout: Duration::from_secs(30),
            node_failure: NodeFailurePolicy::Abort,
        }
    }
}

/// 文本节点翻译统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub collected: usize,
    pub translated: usize,
    pub skipped: usize,
}

/// 代理响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyResponse {
    /// 转换后的 UTF-8 HTML
    Html(Vec<u8>),
    /// 非 HTML 内容，原样转发
    Passthrough {
        status: StatusCode,
        content_type: Option<String>,
        body: Vec<u8>,
    },
}

/// 代理主流程：就绪检查 → 获取 → 解析 → 翻译 → 改写链接 → 序列化
pub struct ProxyPipeline {
    engine: Arc<TranslationEngine>,
    mapper: Arc<LanguageMapper>,
    fetcher: RemoteFetcher,
    options: PipelineOptions,
}

impl ProxyPipeline {
    pub fn new(
        engine: Arc<TranslationEngine>,
        mapper: LanguageMapper,
        fetcher: RemoteFetcher,
        options: PipelineOptions,
    ) -> Self {
        Self {
            engine,
            mapper: Arc::new(mapper),
            fetcher,
            options,
        }
    }

    pub fn engine(&self) -> &Arc<TranslationEngine> {
        &self.engine
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 处理一次代理请求
    pub async fn handle(
        &self,
        request: ProxiedRequest,
        cancel: CancellationToken,
    ) -> Result<ProxyResponse, ProxyError> {
        // 引擎未就绪时在获取页面之前快速失败
        self.engine.translator()?;

        let document = self.fetcher.fetch(&request, &cancel).await?;

        if !document.is_html() {
            tracing::debug!(
                "非 HTML 内容直接转发: {} ({})",
                request.target_url,
                document.content_type.as_deref().unwrap_or("no content-type")
            );
            return Ok(ProxyResponse::Passthrough {
                status: document.status,
                content_type: document.content_type,
                body: document.body,
            });
        }

        let html = self
            .process_html(document, request.target_lang.clone(), cancel)
            .await?;

        tracing::info!("已翻译 {} -> {}", request.target_url, request.target_lang);
        Ok(ProxyResponse::Html(html))
    }

    /// DOM 不能跨线程，整段处理放在阻塞线程中进行
    async fn process_html(
        &self,
        document: FetchedDocument,
        target_lang: String,
        cancel: CancellationToken,
    ) -> Result<Vec<u8>, ProxyError> {
        let engine = Arc::clone(&self.engine);
        let mapper = Arc::clone(&self.mapper);
        let options = self.options.clone();

        task::spawn_blocking(move || {
            tokio::runtime::Handle::current().block_on(translate_document(
                &document,
                &target_lang,
                &engine,
                &mapper,
                &options,
                &cancel,
            ))
        })
        .await
        .map_err(|e| ProxyError::Processing(format!("page task failed: {}", e)))?
    }
}

/// 翻译整个 HTML 文档并返回序列化结果
pub async fn translate_document(
    document: &FetchedDocument,
    target_lang: &str,
    engine: &TranslationEngine,
    mapper: &LanguageMapper,
    options: &PipelineOptions,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ProxyError> {
    let charset = document.charset();
    let dom = parse_html_bytes(&document.body, charset.as_deref());

    let page_lang = get_document_lang(&dom);
    if mapper.needs_translation(page_lang.as_deref(), target_lang) {
        let report = translate_text_nodes(
            &dom,
            engine,
            &mapper.to_engine_code(target_lang),
            mapper.source_hint(page_lang.as_deref()).as_deref(),
            options,
            cancel,
        )
        .await?;
        tracing::debug!(
            "文本节点: 收集 {} 个, 翻译 {} 个, 跳过 {} 个",
            report.collected,
            report.translated,
            report.skipped
        );
    } else {
        tracing::debug!(
            "页面语言 {:?} 与目标语言 {} 相同，跳过翻译",
            page_lang,
            target_lang
        );
    }

    let rewrite = rewrite_links_in_dom(&dom, &document.final_url, target_lang);
    tracing::debug!(
        "链接改写: {} 个属性, {} 个表单",
        rewrite.rewritten,
        rewrite.forms
    );

    serialize_dom(dom)
}

fn serialize_dom(dom: RcDom) -> Result<Vec<u8>, ProxyError> {
    serialize_document(dom).map_err(|e| ProxyError::Processing(e.to_string()))
}

/// 逐个翻译 `<body>` 下的文本节点并原地替换
///
/// 每个节点一次引擎调用，按文档顺序串行执行。
pub async fn translate_text_nodes(
    dom: &RcDom,
    engine: &TranslationEngine,
    target_code: &str,
    source_hint: Option<&str>,
    options: &PipelineOptions,
    cancel: &CancellationToken,
) -> Result<WalkReport, ProxyError> {
    let translator = engine.translator()?;
    let text_nodes = collect_text_nodes(dom);

    let mut report = WalkReport {
        collected: text_nodes.len(),
        ..WalkReport::default()
    };

    for text_node in &text_nodes {
        let call = translator.translate(text_node.trimmed(), target_code, source_hint);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TranslationError::Cancelled),
            result = tokio::time::timeout(options.translate_timeout, call) => match result {
                Ok(result) => result,
                Err(_) => Err(TranslationError::Timeout(format!(
                    "engine call exceeded {:?}",
                    options.translate_timeout
                ))),
            },
        };

        match result {
            Ok(translated) => {
                text_node.replace(&translated);
                report.translated += 1;
            }
            Err(e) if options.node_failure == NodeFailurePolicy::Skip && !e.is_engine_state() => {
                tracing::warn!("文本节点翻译失败，保留原文: {}", e);
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// 由查询参数构建代理请求
///
/// `url` 必须是绝对的 http(s) 地址；`lang` 缺失或为空时使用默认目标语言。
pub fn build_proxied_request(
    url: Option<&str>,
    lang: Option<&str>,
    default_target_lang: &str,
) -> Result<(Url, String), ProxyError> {
    let url = url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ProxyError::MalformedInput("missing 'url' query parameter".to_string()))?;

    let target_url = Url::parse(url)
        .map_err(|e| ProxyError::MalformedInput(format!("invalid url '{}': {}", url, e)))?;

    if !crate::utils::url::is_http_url(&target_url) || target_url.host_str().is_none() {
        return Err(ProxyError::MalformedInput(format!(
            "url must be an absolute http(s) URL, got '{}'",
            url
        )));
    }

    let target_lang = lang
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(default_target_lang)
        .to_string();

    Ok((target_url, target_lang))
}
