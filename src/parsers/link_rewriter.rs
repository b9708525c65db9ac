//! 链接重写模块
//!
//! 把页面中的 href/src/action 改写为指向本代理的链接，让后续导航与资源请求继续经过代理，
//! 并携带目标语言。所有表单的提交方式统一改为 POST。

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::parsers::html::{get_node_attr, get_node_name, set_node_attr};
use crate::utils::url::{
    create_proxy_url, is_http_url, page_origin, resolve_against_origin, Url, PROXY_PATH,
};

/// 可改写的属性，按优先级排列；每个元素只改写第一个出现的属性
pub const LINK_ATTRIBUTES: [&str; 3] = ["href", "src", "action"];

/// 不改写链接的元素
///
/// `<base href>` 若指向代理，浏览器会把未改写的相对地址解析到代理路径下。
const SKIPPED_ELEMENTS: [&str; 1] = ["base"];

/// 链接重写统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// 改写的属性数
    pub rewritten: usize,
    /// 改为 POST 的表单数
    pub forms: usize,
}

/// 重写DOM中的所有链接
///
/// # Arguments
///
/// * `dom` - DOM树
/// * `page_url` - 当前页面的URL，只使用其源站部分
/// * `target_lang` - 写入代理链接的目标语言
pub fn rewrite_links_in_dom(dom: &RcDom, page_url: &Url, target_lang: &str) -> RewriteReport {
    let origin = page_origin(page_url);
    let mut report = RewriteReport::default();
    walk_and_rewrite_links(&dom.document, &origin, target_lang, &mut report);
    report
}

/// 递归遍历DOM树并重写链接
fn walk_and_rewrite_links(
    node: &Handle,
    origin: &Url,
    target_lang: &str,
    report: &mut RewriteReport,
) {
    match node.data {
        NodeData::Document => {
            for child_node in node.children.borrow().iter() {
                walk_and_rewrite_links(child_node, origin, target_lang, report);
            }
        }
        NodeData::Element { .. } => {
            let skipped = get_node_name(node).is_some_and(|name| SKIPPED_ELEMENTS.contains(&name));
            if !skipped && rewrite_element_link(node, origin, target_lang) {
                report.rewritten += 1;
            }

            if get_node_name(node) == Some("form") {
                set_node_attr(node, "method", Some("post".to_string()));
                report.forms += 1;
            }

            for child_node in node.children.borrow().iter() {
                walk_and_rewrite_links(child_node, origin, target_lang, report);
            }
        }
        _ => {}
    }
}

/// 改写元素上第一个出现的链接属性，返回是否发生改写
fn rewrite_element_link(node: &Handle, origin: &Url, target_lang: &str) -> bool {
    let Some((attr_name, value)) = LINK_ATTRIBUTES
        .iter()
        .find_map(|attr_name| get_node_attr(node, attr_name).map(|value| (*attr_name, value)))
    else {
        return false;
    };

    match rewrite_url(value.trim(), origin, target_lang) {
        Some(rewritten) => {
            set_node_attr(node, attr_name, Some(rewritten));
            true
        }
        None => false,
    }
}

/// 判断是否应该跳过重写的链接
fn should_skip_link(value: &str) -> bool {
    value.is_empty() || value.starts_with('#') || is_proxy_url(value)
}

/// 是否已经是代理链接
fn is_proxy_url(value: &str) -> bool {
    value
        .strip_prefix(PROXY_PATH)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('?'))
}

/// 重写单个URL
fn rewrite_url(value: &str, origin: &Url, target_lang: &str) -> Option<String> {
    if should_skip_link(value) {
        return None;
    }

    let absolute_url = resolve_against_origin(origin, value)?;
    if !is_http_url(&absolute_url) {
        // mailto:, javascript:, data: 等保持原样
        return None;
    }

    Some(create_proxy_url(&absolute_url, target_lang))
}
