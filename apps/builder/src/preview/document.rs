//! In-memory element tree backing the preview surface.
//!
//! Template layouts deserialize straight into this tree. User text only ever
//! enters it as [`Node::Text`], so no element can be created from input; the
//! HTML serializer escapes text and attribute values on the way out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::markup::escape_html;

const VOID_TAGS: &[&str] = &["img", "br", "hr", "meta", "input", "link"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.clone(),
            Node::Element(e) => e.text_content(),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.style.insert(property.to_string(), value.into());
    }

    /// Concatenated text of every descendant, like the DOM's `textContent`.
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    pub fn replace_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.tag.as_str(), "ul" | "ol")
    }

    pub fn is_hidden(&self) -> bool {
        self.style.get("display").map(String::as_str) == Some("none")
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.set_style("display", "none");
        } else {
            self.style.remove("display");
        }
    }

    /// Child-index path from this element to the element carrying `id`.
    pub fn find_path(&self, id: &str) -> Option<Vec<usize>> {
        if self.id.as_deref() == Some(id) {
            return Some(Vec::new());
        }
        for (i, child) in self.children.iter().enumerate() {
            if let Node::Element(el) = child {
                if let Some(mut path) = el.find_path(id) {
                    path.insert(0, i);
                    return Some(path);
                }
            }
        }
        None
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &i in path {
            match current.children.get(i)? {
                Node::Element(el) => current = el,
                Node::Text(_) => return None,
            }
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &i in path {
            match current.children.get_mut(i)? {
                Node::Element(el) => current = el,
                Node::Text(_) => return None,
            }
        }
        Some(current)
    }

    /// Every `id` in this subtree, duplicates included, in document order.
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(id) = self.id.as_deref() {
            out.push(id);
        }
        for el in self.child_elements() {
            el.collect_ids(out);
        }
    }

    /// Applies `f` to every element in this subtree (self included) with `class`.
    pub fn for_each_with_class_mut(&mut self, class: &str, f: &mut dyn FnMut(&mut Element)) {
        if self.has_class(class) {
            f(self);
        }
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                el.for_each_with_class_mut(class, f);
            }
        }
    }

    /// All descendants (self included) with the given tag, in document order.
    pub fn descendants_by_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.tag == tag {
            out.push(self);
        }
        for el in self.child_elements() {
            el.descendants_by_tag(tag, out);
        }
    }

    pub fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            out.push_str(&format!(" id=\"{}\"", escape_html(id)));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_html(&self.classes.join(" "))));
        }
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        if !self.style.is_empty() {
            let css: Vec<String> = self.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            out.push_str(&format!(" style=\"{}\"", escape_html(&css.join("; "))));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(&escape_html(t)),
                Node::Element(el) => el.write_html(out),
            }
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

/// The document currently loaded in the preview surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDocument {
    template_id: String,
    root: Element,
}

impl PreviewDocument {
    pub fn new(template_id: impl Into<String>, root: Element) -> Self {
        Self {
            template_id: template_id.into(),
            root,
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        let path = self.root.find_path(id)?;
        self.root.at_path(&path)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.root.find_path(id)?;
        self.root.at_path_mut(&path)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        self.root.at_path_mut(path)
    }

    /// Path of the nearest element with `tag` enclosing `id` (the element itself
    /// included), falling back to its immediate parent. `None` when `id` is
    /// absent or is the root.
    pub fn section_path(&self, id: &str, tag: &str) -> Option<Vec<usize>> {
        let path = self.root.find_path(id)?;
        if path.is_empty() {
            return None;
        }
        for depth in (0..=path.len()).rev() {
            let prefix = &path[..depth];
            if self.root.at_path(prefix).is_some_and(|el| el.tag == tag) {
                return Some(prefix.to_vec());
            }
        }
        Some(path[..path.len() - 1].to_vec())
    }

    pub fn for_each_with_class_mut(&mut self, class: &str, f: &mut dyn FnMut(&mut Element)) {
        self.root.for_each_with_class_mut(class, f);
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.root.descendants_by_tag(tag, &mut out);
        out
    }

    /// Serialized markup consumed by the export collaborators.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PreviewDocument {
        let root = Element::new("div")
            .with_class("resume")
            .with_child(
                Element::new("header")
                    .with_child(Element::new("h1").with_id("namePreview"))
                    .with_child(Element::new("p").with_id("rolePreview")),
            )
            .with_child(
                Element::new("div")
                    .with_class("block")
                    .with_child(Element::new("ul").with_id("skillsPreview")),
            );
        PreviewDocument::new("1", root)
    }

    #[test]
    fn test_element_by_id() {
        let mut doc = sample();
        doc.element_by_id_mut("namePreview").unwrap().set_text("Jane");
        assert_eq!(doc.element_by_id("namePreview").unwrap().text_content(), "Jane");
        assert!(doc.element_by_id("missing").is_none());
    }

    #[test]
    fn test_section_path_prefers_tagged_ancestor() {
        let doc = sample();
        let path = doc.section_path("rolePreview", "header").unwrap();
        assert_eq!(path, vec![0]);
    }

    #[test]
    fn test_section_path_falls_back_to_parent() {
        let doc = sample();
        let path = doc.section_path("skillsPreview", "section").unwrap();
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn test_html_escapes_text_and_attributes() {
        let root = Element::new("p")
            .with_attr("title", "a\"b")
            .with_text("<script>alert(1)</script>");
        let html = PreviewDocument::new("1", root).to_html();
        assert_eq!(
            html,
            "<p title=\"a&quot;b\">&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_layout_deserializes_text_and_elements() {
        let json = r#"{"tag": "section", "class": ["summary"], "children": [
            {"tag": "h2", "children": ["Summary"]},
            {"tag": "p", "id": "summaryPreview"}
        ]}"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.child_elements().count(), 2);
        assert_eq!(el.text_content(), "Summary");
        assert!(el.find_path("summaryPreview").is_some());
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let html = PreviewDocument::new("1", Element::new("img").with_class("avatar")).to_html();
        assert_eq!(html, "<img class=\"avatar\">");
    }
}
