//! # 网络模块
//!
//! - `fetcher` - 远程页面获取与内容类型判断

pub mod fetcher;

// Re-export commonly used items for convenience
pub use fetcher::{FetchedDocument, ProxiedRequest, RemoteFetcher, DEFAULT_USER_AGENT};
