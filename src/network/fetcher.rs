//! 远程页面获取
//!
//! 按入站请求的方法与请求体转发到目标地址，附带固定的浏览器 User-Agent，
//! 并根据 Content-Type 判断响应是否为 HTML。

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};

use tokio_util::sync::CancellationToken;

use crate::core::ProxyError;
use crate::utils::url::Url;

/// 默认的浏览器 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 被视为 HTML 的媒体类型
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// 代理请求
#[derive(Debug, Clone)]
pub struct ProxiedRequest {
    pub method: Method,
    pub target_url: Url,
    pub target_lang: String,
    pub body: Vec<u8>,
    /// 入站请求体的 Content-Type（表单提交时需要）
    pub content_type: Option<String>,
}

/// 获取到的远程文档
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub status: StatusCode,
    /// 跟随重定向后的最终地址
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedDocument {
    /// 是否为 HTML 文档
    pub fn is_html(&self) -> bool {
        is_html_content_type(self.content_type.as_deref())
    }

    /// Content-Type 中声明的字符集
    pub fn charset(&self) -> Option<String> {
        self.content_type.as_deref().and_then(parse_charset)
    }
}

/// 判断 Content-Type 是否为 HTML；缺失时按非 HTML 处理
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    HTML_MEDIA_TYPES.contains(&media_type.as_str())
}

/// 从 Content-Type 中解析 charset 参数
pub fn parse_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"').trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// 远程页面获取器
#[derive(Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl RemoteFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProxyError::Processing(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeout,
        })
    }

    /// 转发请求并读取完整响应
    ///
    /// 非 2xx 状态不视为错误，原样交给调用方。
    pub async fn fetch(
        &self,
        request: &ProxiedRequest,
        cancel: &CancellationToken,
    ) -> Result<FetchedDocument, ProxyError> {
        tracing::debug!("{} {}", request.method, request.target_url);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProxyError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.send(request)) => match result {
                Ok(result) => result,
                Err(_) => Err(ProxyError::Timeout(format!(
                    "fetching {} took longer than {:?}",
                    request.target_url, self.timeout
                ))),
            },
        }
    }

    async fn send(&self, request: &ProxiedRequest) -> Result<FetchedDocument, ProxyError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.target_url.clone())
            .header(USER_AGENT, &self.user_agent);

        if !request.body.is_empty() {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(upstream_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.bytes().await.map_err(upstream_error)?.to_vec();

        Ok(FetchedDocument {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

fn upstream_error(error: reqwest::Error) -> ProxyError {
    if error.is_timeout() {
        ProxyError::Timeout(error.to_string())
    } else {
        ProxyError::UpstreamFetchError(error.to_string())
    }
}
