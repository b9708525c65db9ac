//! 文本节点遍历
//!
//! 翻译分两步进行：先按文档顺序（深度优先）收集 `<body>` 下所有可翻译的文本节点，
//! 再逐个替换其内容。收集阶段只持有节点引用，不修改树，替换阶段不增删节点。

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::dom::get_body_node;

/// 文本永远不会被翻译的元素
pub const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// 可翻译的文本节点
#[derive(Debug, Clone)]
pub struct TextNode {
    /// DOM 中的文本节点
    pub node: Handle,
    /// 原始文本（未裁剪）
    pub text: String,
}

impl TextNode {
    /// 去掉首尾空白后的文本，送入翻译引擎的就是这一部分
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// 用译文替换节点内容，保留原文本首尾的空白
    pub fn replace(&self, translated: &str) {
        let trimmed_start = self.text.trim_start();
        let leading = &self.text[..self.text.len() - trimmed_start.len()];
        let trailing = &trimmed_start[trimmed_start.trim_end().len()..];

        set_text_contents(&self.node, &format!("{}{}{}", leading, translated, trailing));
    }
}

/// 收集文档 `<body>` 下的可翻译文本节点
pub fn collect_text_nodes(dom: &RcDom) -> Vec<TextNode> {
    let mut text_nodes = Vec::new();
    if let Some(body) = get_body_node(dom) {
        walk_text_nodes(&body, &mut text_nodes);
    }
    text_nodes
}

fn walk_text_nodes(node: &Handle, text_nodes: &mut Vec<TextNode>) {
    match node.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                text_nodes.push(TextNode {
                    node: node.clone(),
                    text,
                });
            }
        }
        NodeData::Element { ref name, .. } => {
            if SKIPPED_ELEMENTS.contains(&name.local.as_ref()) {
                return;
            }

            for child_node in node.children.borrow().iter() {
                walk_text_nodes(child_node, text_nodes);
            }
        }
        _ => {}
    }
}

/// 获取文本节点内容
pub fn get_text_contents(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 设置文本节点内容
pub fn set_text_contents(node: &Handle, text: &str) {
    if let NodeData::Text { ref contents } = node.data {
        let mut contents = contents.borrow_mut();
        contents.clear();
        contents.push_slice(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    #[test]
    fn test_collects_body_text_in_document_order() {
        let dom = html_to_dom(
            "<html><head><title>Head title</title></head><body>\
             <h1>One</h1><p>Two <a href=\"/x\">Three</a> Four</p>\
             <script>var five = 5;</script><style>.six {}</style>\
             <div>   </div><ul><li>Seven</li></ul></body></html>",
        );

        let texts: Vec<String> = collect_text_nodes(&dom)
            .iter()
            .map(|t| t.trimmed().to_string())
            .collect();

        assert_eq!(texts, vec!["One", "Two", "Three", "Four", "Seven"]);
    }

    #[test]
    fn test_replace_keeps_surrounding_whitespace() {
        let dom = html_to_dom("<body><p>\n  Hello world  </p></body>");
        let nodes = collect_text_nodes(&dom);
        assert_eq!(nodes.len(), 1);

        nodes[0].replace("Bonjour le monde");
        assert_eq!(
            get_text_contents(&nodes[0].node).unwrap(),
            "\n  Bonjour le monde  "
        );
    }

    #[test]
    fn test_replace_does_not_change_node_count() {
        let dom = html_to_dom("<body><p>a</p><p>b <i>c</i></p></body>");
        let before = collect_text_nodes(&dom);
        for node in &before {
            node.replace(&node.trimmed().to_uppercase());
        }

        let after: Vec<String> = collect_text_nodes(&dom)
            .iter()
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(after, vec!["A", "B ", "C"]);
    }

    #[test]
    fn test_no_body_text_yields_nothing() {
        let dom = html_to_dom("<html><head><title>Only a title</title></head></html>");
        assert!(collect_text_nodes(&dom).is_empty());
    }
}
