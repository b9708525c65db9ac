//! # 工具模块
//!
//! - `url` - URL解析、页面源站计算、代理链接编码与解码

pub mod url;

// Re-export commonly used items for convenience
pub use self::url::{
    create_proxy_url, is_http_url, page_origin, parse_proxy_url, resolve_against_origin, Url,
    PROXY_PATH,
};
