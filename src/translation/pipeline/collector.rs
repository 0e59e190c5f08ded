//! 文本收集器模块
//!
//! 从 DOM 中收集需要翻译的文本节点与元素属性，并为每处位置生成回写句柄

use std::rc::Rc;

use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData};

use super::filters::Classifier;
use super::unit::{TranslatableUnit, WriteTarget};
use crate::parsers::html::{find_nodes, get_node_attr, get_node_name, set_node_attr};
use crate::translation::config::constants;

/// 定位待翻译文本
///
/// 返回的单元已经过去空白与忽略规则过滤，协调器不再做任何筛选。
pub trait TextLocator {
    type Root: ?Sized;

    /// 收集正文文本单元
    fn collect(&self, root: &Self::Root) -> Vec<TranslatableUnit>;

    /// 收集需要翻译的属性单元
    fn collect_attributes(&self, _root: &Self::Root) -> Vec<TranslatableUnit> {
        Vec::new()
    }
}

/// 文本节点回写句柄，保留节点原有的首尾空白
pub struct TextNodeTarget {
    node: Handle,
}

impl TextNodeTarget {
    pub fn new(node: Handle) -> Self {
        Self { node }
    }
}

impl WriteTarget for TextNodeTarget {
    fn write(&self, text: &str) {
        if let NodeData::Text { contents } = &self.node.data {
            let mut contents = contents.borrow_mut();
            let current: &str = &contents;
            let trimmed_start = current.trim_start();
            let leading = &current[..current.len() - trimmed_start.len()];
            let trailing = &trimmed_start[trimmed_start.trim_end().len()..];

            let replaced = format!("{}{}{}", leading, text, trailing);
            *contents = StrTendril::from_slice(&replaced);
        }
    }
}

/// 元素属性回写句柄
pub struct AttributeTarget {
    node: Handle,
    attr_name: String,
}

impl AttributeTarget {
    pub fn new(node: Handle, attr_name: &str) -> Self {
        Self {
            node,
            attr_name: attr_name.to_string(),
        }
    }
}

impl WriteTarget for AttributeTarget {
    fn write(&self, text: &str) {
        set_node_attr(&self.node, &self.attr_name, Some(text.to_string()));
    }
}

/// 基于 rcdom 的默认定位器
pub struct DomLocator<C> {
    classifier: C,
}

impl<C: Classifier> DomLocator<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// 有 `<body>` 时只扫描 body
    fn scan_root(root: &Handle) -> Handle {
        if get_node_name(root) == Some("body") {
            return root.clone();
        }
        find_nodes(root, &["body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| root.clone())
    }

    fn collect_texts(&self, node: &Handle, units: &mut Vec<TranslatableUnit>) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().trim().to_string();
                if !text.is_empty() && self.classifier.is_source_language(&text) {
                    units.push(TranslatableUnit::new(
                        Rc::new(TextNodeTarget::new(node.clone())),
                        text,
                    ));
                }
            }
            NodeData::Element { .. } if is_ignored_element(node) => {}
            _ => {
                for child in node.children.borrow().iter() {
                    self.collect_texts(child, units);
                }
            }
        }
    }

    fn collect_attrs(&self, node: &Handle, units: &mut Vec<TranslatableUnit>) {
        if let NodeData::Element { .. } = node.data {
            if is_ignored_element(node) {
                return;
            }

            for attr_name in constants::TRANSLATABLE_ATTRS {
                let Some(value) = get_node_attr(node, attr_name) else {
                    continue;
                };
                let text = value.trim();
                if !text.is_empty() && self.classifier.is_source_language(text) {
                    units.push(TranslatableUnit::new(
                        Rc::new(AttributeTarget::new(node.clone(), attr_name)),
                        text,
                    ));
                }
            }
        }

        for child in node.children.borrow().iter() {
            self.collect_attrs(child, units);
        }
    }
}

impl<C: Classifier> TextLocator for DomLocator<C> {
    type Root = Handle;

    fn collect(&self, root: &Handle) -> Vec<TranslatableUnit> {
        let mut units = Vec::new();
        self.collect_texts(&Self::scan_root(root), &mut units);
        units
    }

    fn collect_attributes(&self, root: &Handle) -> Vec<TranslatableUnit> {
        let mut units = Vec::new();
        self.collect_attrs(&Self::scan_root(root), &mut units);
        units
    }
}

/// 判断元素（连同其子树）是否跳过翻译
pub fn is_ignored_element(node: &Handle) -> bool {
    let Some(name) = get_node_name(node) else {
        return false;
    };

    if constants::SKIP_ELEMENTS.contains(&name) {
        return true;
    }

    if get_node_attr(node, "translate").is_some_and(|v| v.trim().eq_ignore_ascii_case("no")) {
        return true;
    }

    if get_node_attr(node, "data-no-translate").is_some() || get_node_attr(node, "hidden").is_some()
    {
        return true;
    }

    if get_node_attr(node, "class")
        .is_some_and(|class| class.split_whitespace().any(|c| c == constants::NO_TRANSLATE_CLASS))
    {
        return true;
    }

    // 静态文档没有布局信息，只能识别内联的 display:none
    get_node_attr(node, "style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}
