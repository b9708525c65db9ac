use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::network::fetcher::parse_charset;

/// 按指定字符集解码 HTML 字节，未知字符集按 UTF-8 宽松解码
pub fn decode_html(data: &[u8], document_encoding: Option<&str>) -> String {
    if let Some(encoding) = document_encoding.and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        let (string, _, _) = encoding.decode(data);
        return string.into_owned();
    }

    String::from_utf8_lossy(data).into_owned()
}

/// 将 HTML 文本转换为 DOM
pub fn html_to_dom(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// 解码并解析页面字节
///
/// 响应头带有字符集时直接使用；否则先按 UTF-8 解析一次，若文档内 `<meta>` 声明了
/// 其他有效字符集，则按该字符集重新解码解析。
pub fn parse_html_bytes(data: &[u8], header_charset: Option<&str>) -> RcDom {
    if header_charset.is_some() {
        return html_to_dom(&decode_html(data, header_charset));
    }

    let dom = html_to_dom(&decode_html(data, None));
    let meta_encoding = get_charset(&dom)
        .and_then(|label| Encoding::for_label_no_replacement(label.as_bytes()))
        .map(|encoding| encoding.output_encoding());

    match meta_encoding {
        Some(encoding) if encoding != encoding_rs::UTF_8 => {
            let (html, _, _) = encoding.decode(data);
            html_to_dom(&html)
        }
        _ => dom,
    }
}

/// 读取 `<head>` 中 `<meta>` 声明的字符集
///
/// 支持 `<meta charset="...">` 与
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种写法。
pub fn get_charset(dom: &RcDom) -> Option<String> {
    for meta_node in find_nodes(&dom.document, &["html", "head", "meta"]) {
        if let Some(charset) = get_node_attr(&meta_node, "charset") {
            let charset = charset.trim();
            if !charset.is_empty() {
                return Some(charset.to_string());
            }
            continue;
        }

        let is_content_type = get_node_attr(&meta_node, "http-equiv")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("content-type"));
        if is_content_type {
            if let Some(charset) = get_node_attr(&meta_node, "content")
                .as_deref()
                .and_then(parse_charset)
            {
                return Some(charset);
            }
        }
    }

    None
}

/// 查找指定路径的DOM节点
///
/// 路径的第一段可以出现在任意深度，后续各段必须是前一段的直接或间接子孙。
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == *node_name {
            if rest.is_empty() {
                found_nodes.push(node.clone());
            } else {
                for child_node in node.children.borrow().iter() {
                    found_nodes.append(&mut find_nodes(child_node, rest));
                }
            }
            return found_nodes;
        }
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, node_names));
    }

    found_nodes
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取文档的 `<body>` 元素
pub fn get_body_node(dom: &RcDom) -> Option<Handle> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// 获取根元素上声明的语言（`<html lang="...">`），空值视为未声明
pub fn get_document_lang(dom: &RcDom) -> Option<String> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_node_attr(&html, "lang")
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}
