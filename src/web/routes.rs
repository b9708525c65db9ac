//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};

use crate::utils::url::PROXY_PATH;
use crate::web::{handlers::*, types::AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping))
        .route("/status", get(engine_status))
        // 表单被改写为 POST，其余方法同样原样转发
        .route(PROXY_PATH, any(proxy))
}
