//! Web 模块的数据类型定义

use serde::{Deserialize, Serialize};

use crate::core::ProxyPipeline;

/// 应用状态
pub struct AppState {
    pub pipeline: ProxyPipeline,
}

/// `/proxy` 的查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub lang: Option<String>,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
}
