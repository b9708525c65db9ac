//! # 解析器模块
//!
//! - `html` - HTML文档解析、文本节点遍历、序列化
//! - `link_rewriter` - 链接重写功能，将HTML中的链接转换为代理链接

pub mod html;
pub mod link_rewriter;

// Re-export commonly used items for convenience
pub use html::{
    collect_text_nodes, decode_html, get_document_lang, html_to_dom, parse_html_bytes,
    serialize_document, TextNode,
};
pub use link_rewriter::{rewrite_links_in_dom, RewriteReport};
