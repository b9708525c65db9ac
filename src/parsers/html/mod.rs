//! HTML解析和处理模块
//!
//! - `dom`: 解析、解码与基础DOM操作
//! - `serializer`: 序列化功能
//! - `walker`: 文本节点收集与原地替换

pub mod dom;
pub mod serializer;
pub mod walker;

pub use dom::{
    decode_html, find_nodes, get_body_node, get_charset, get_child_node_by_name,
    get_document_lang, get_node_attr, get_node_name, html_to_dom, parse_html_bytes,
    set_node_attr,
};
pub use serializer::serialize_document;
pub use walker::{collect_text_nodes, get_text_contents, set_text_contents, TextNode};
