//! # Babel Proxy
//!
//! 翻译转发代理：代替客户端获取远程网页，把正文文本机器翻译为目标语言，
//! 并改写所有链接，使后续请求继续经过代理。
//!
//! ## 模块组织
//!
//! - `core` - 代理主流程与错误类型
//! - `config` / `env` - 配置文件与环境变量
//! - `network` - 远程页面获取
//! - `parsers` - HTML 解析、文本节点遍历与链接改写
//! - `translation` - 翻译引擎适配器与语言映射
//! - `utils` - URL 工具函数
//! - `web` - HTTP 服务

pub mod config;
pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;
pub mod utils;
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use crate::network::*;
pub use crate::parsers::*;
pub use crate::utils::*;
