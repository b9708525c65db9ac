//! 代理入口

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

use crate::core::{build_proxied_request, ProxyError, ProxyResponse};
use crate::network::fetcher::ProxiedRequest;
use crate::web::types::{AppState, ProxyQuery};

/// `ANY /proxy?url=<绝对地址>&lang=<目标语言>`
///
/// 客户端断开时处理器 future 被丢弃，`drop_guard` 随之取消令牌，
/// 正在进行的翻译在下一次引擎调用处停止。
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match handle_proxy(&state, query, method, headers, body, cancel).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::MalformedInput(_) => tracing::warn!("拒绝代理请求: {}", e),
                ProxyError::EngineNotReady => tracing::info!("引擎尚未就绪，拒绝代理请求"),
                ProxyError::Cancelled => tracing::info!("客户端已断开，放弃处理"),
                _ => tracing::error!("代理请求失败: {}", e),
            }
            e.into_response()
        }
    }
}

async fn handle_proxy(
    state: &AppState,
    query: ProxyQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
    cancel: CancellationToken,
) -> Result<Response, ProxyError> {
    let pipeline = &state.pipeline;
    let (target_url, target_lang) = build_proxied_request(
        query.url.as_deref(),
        query.lang.as_deref(),
        &pipeline.options().default_target_lang,
    )?;

    tracing::info!("{} {} (lang={})", method, target_url, target_lang);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let request = ProxiedRequest {
        method,
        target_url,
        target_lang,
        body: body.to_vec(),
        content_type,
    };

    let response = match pipeline.handle(request, cancel).await? {
        ProxyResponse::Html(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        ProxyResponse::Passthrough {
            status,
            content_type,
            body,
        } => {
            let mut response = (status, body).into_response();
            match content_type.and_then(|v| v.parse().ok()) {
                Some(value) => {
                    response.headers_mut().insert(header::CONTENT_TYPE, value);
                }
                None => {
                    response.headers_mut().remove(header::CONTENT_TYPE);
                }
            }
            response
        }
    };

    Ok(response)
}
