//! Web 服务器模块
//!
//! 对外提供代理入口、引擎状态轮询与前端页面

pub mod error;
pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::create_routes;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ProxyError;

/// Web 服务器
pub struct WebServer {
    bind_addr: String,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(bind_addr: impl Into<String>, state: AppState) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            state: Arc::new(state),
        }
    }

    /// 启动 Web 服务器，收到 Ctrl-C 后优雅退出
    pub async fn start(&self) -> Result<(), ProxyError> {
        let app = create_router(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| ProxyError::Processing(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Web server listening at http://{}", self.bind_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ProxyError::Processing(format!("Server error: {}", e)))?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}

/// 创建带中间件的路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
}
