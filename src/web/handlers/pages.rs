//! 页面处理器

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

/// 主页：地址栏 + iframe，并轮询引擎状态
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn ping() -> &'static str {
    "pong"
}
