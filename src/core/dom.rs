// src/core/dom.rs
//! Queryable document tree built from a rendered page (or from pre-extracted text).
//!
//! The extractor only needs four things from a page: tag names, ids, class
//! tokens/attributes and visible text. This module provides exactly that over a
//! flat arena of nodes. It is not a conforming HTML parser; it implies a close
//! for repeated `tr`/`td`/`li`/`p` siblings and otherwise trusts the markup.

use super::html::{self, Token, Tokens};
use super::sanitize::{decode_entities, normalize_ws};

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> { self.attr("id") }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c.eq_ignore_ascii_case(class))
    }

    fn is_hidden(&self) -> bool {
        if self.attr("hidden").is_some() {
            return true;
        }
        self.attr("style")
            .map(|s| s.replace(' ', "").to_ascii_lowercase().contains("display:none"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    children: Vec<NodeId>,
}

/// How an id must match.
#[derive(Debug, Clone, Copy)]
pub enum IdMatch<'a> {
    Exact(&'a str),
    Prefix(&'a str),
    Contains(&'a str),
}

/// A single compound selector: every populated part must match.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector<'a> {
    tag: Option<&'a str>,
    id: Option<IdMatch<'a>>,
    class: Option<&'a str>,
    attr: Option<(&'a str, Option<&'a str>)>,
}

impl<'a> Selector<'a> {
    pub const fn tag(tag: &'a str) -> Self {
        Self { tag: Some(tag), id: None, class: None, attr: None }
    }
    pub const fn class(class: &'a str) -> Self {
        Self { tag: None, id: None, class: Some(class), attr: None }
    }
    pub const fn id(id: &'a str) -> Self {
        Self { tag: None, id: Some(IdMatch::Exact(id)), class: None, attr: None }
    }
    pub const fn id_contains(part: &'a str) -> Self {
        Self { tag: None, id: Some(IdMatch::Contains(part)), class: None, attr: None }
    }
    pub const fn attr(name: &'a str) -> Self {
        Self { tag: None, id: None, class: None, attr: Some((name, None)) }
    }
    pub const fn attr_eq(name: &'a str, value: &'a str) -> Self {
        Self { tag: None, id: None, class: None, attr: Some((name, Some(value))) }
    }

    pub const fn and_id(self, id: &'a str) -> Self {
        Self { id: Some(IdMatch::Exact(id)), ..self }
    }
    pub const fn and_id_prefix(self, prefix: &'a str) -> Self {
        Self { id: Some(IdMatch::Prefix(prefix)), ..self }
    }

    pub fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) { return false; }
        }
        if let Some(want) = self.id {
            let Some(id) = el.id() else { return false };
            let ok = match want {
                IdMatch::Exact(v) => id == v,
                IdMatch::Prefix(v) => id.starts_with(v),
                IdMatch::Contains(v) => id.contains(v),
            };
            if !ok { return false; }
        }
        if let Some(class) = self.class {
            if !el.has_class(class) { return false; }
        }
        if let Some((name, value)) = self.attr {
            match (el.attr(name), value) {
                (None, _) => return false,
                (Some(v), Some(want)) if v != want => return false,
                _ => {}
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

/// Tags that implicitly close an open sibling of the same name.
const SELF_NESTING_BREAKS: &[&str] = &["tr", "td", "th", "li", "p", "option"];

impl Document {
    pub const ROOT: NodeId = 0;

    fn empty() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(Element { tag: "#document".into(), attrs: Vec::new() }),
                children: Vec::new(),
            }],
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node { data, children: Vec::new() });
        self.nodes[parent].children.push(id);
        id
    }

    /// Build a tree from page markup. Never fails; garbage in gives a tree of text.
    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::empty();
        let mut stack: Vec<NodeId> = vec![Self::ROOT];

        for token in Tokens::new(markup) {
            let top = *stack.last().unwrap_or(&Self::ROOT);
            match token {
                Token::Text(t) => {
                    doc.push(top, NodeData::Text(decode_entities(t)));
                }
                Token::Open { name, attrs, self_closing } => {
                    if SELF_NESTING_BREAKS.contains(&name.as_str())
                        && doc.element(top).is_some_and(|el| el.tag == name)
                    {
                        stack.pop();
                    }
                    let parent = *stack.last().unwrap_or(&Self::ROOT);
                    let void = self_closing || html::is_void(&name);
                    let id = doc.push(parent, NodeData::Element(Element { tag: name, attrs }));
                    if !void {
                        stack.push(id);
                    }
                }
                Token::Close(name) => {
                    // Pop back to the nearest matching open element; ignore strays.
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|&id| doc.element(id).is_some_and(|el| el.tag == name))
                    {
                        if pos > 0 {
                            stack.truncate(pos);
                        }
                    }
                }
            }
        }
        doc
    }

    /// Wrap already-extracted page text: one block per line.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::empty();
        let body = doc.push(Self::ROOT, NodeData::Element(Element { tag: "body".into(), attrs: Vec::new() }));
        for line in text.lines() {
            let div = doc.push(body, NodeData::Element(Element { tag: "div".into(), attrs: Vec::new() }));
            doc.push(div, NodeData::Text(line.to_string()));
        }
        doc
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    pub fn select_all(&self, scope: NodeId, sel: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.element(n).is_some_and(|el| sel.matches(el)))
            .collect()
    }

    pub fn select_first(&self, scope: NodeId, sel: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.element(n).is_some_and(|el| sel.matches(el)))
    }

    /// True if `id` or any element below it satisfies `pred`.
    pub fn any_in_subtree(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> bool {
        std::iter::once(id)
            .chain(self.descendants(id))
            .any(|n| self.element(n).is_some_and(&pred))
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        enum Frame {
            Enter(NodeId),
            Leave { block: bool },
        }

        // Explicit stack; page nesting depth is unbounded.
        let mut stack = vec![Frame::Enter(id)];
        while let Some(frame) = stack.pop() {
            let n = match frame {
                Frame::Enter(n) => n,
                Frame::Leave { block } => {
                    if block { buf.push('\n'); }
                    continue;
                }
            };
            let Some(node) = self.nodes.get(n) else { continue };
            match &node.data {
                NodeData::Text(t) => buf.push_str(t),
                NodeData::Element(el) => {
                    if el.tag == "head" || html::is_raw_text(&el.tag) || el.is_hidden() {
                        continue;
                    }
                    let block = html::is_block(&el.tag);
                    if block { buf.push('\n'); }
                    if matches!(el.tag.as_str(), "td" | "th") { buf.push(' '); }
                    stack.push(Frame::Leave { block });
                    stack.extend(node.children.iter().rev().map(|&c| Frame::Enter(c)));
                }
            }
        }
    }

    /// Visible text of a subtree, one entry per rendered line, blanks dropped.
    pub fn text_lines(&self, id: NodeId) -> Vec<String> {
        let mut buf = String::new();
        self.collect_text(id, &mut buf);
        buf.lines().map(normalize_ws).filter(|l| !l.is_empty()).collect()
    }

    /// Visible text of a subtree collapsed onto a single line.
    pub fn text_one_line(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.collect_text(id, &mut buf);
        normalize_ws(&buf)
    }

    /// Visible text of the whole document, line-structured.
    pub fn visible_lines(&self) -> Vec<String> {
        self.text_lines(Self::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><title>Track</title><style>.x{}</style></head>
        <body>
          <div id="main" class="wrap Outer">
            <table><tbody>
              <tr id="row_0" class="past"><td>Shipped</td><td>Mon</td>
              <tr id="row_1"><td>Out&nbsp;for <b>Delivery</b></td></tr>
            </tbody></table>
            <p hidden>secret</p>
            <span data-testid="tracking-status">In Transit</span>
          </div>
        </body></html>"#;

    #[test]
    fn selects_by_tag_id_prefix_and_class() {
        let doc = Document::parse(PAGE);
        let rows = doc.select_all(Document::ROOT, &Selector::tag("tr").and_id_prefix("row_"));
        assert_eq!(rows.len(), 2, "implicit </tr> must not nest rows");
        assert_eq!(doc.text_one_line(rows[0]), "Shipped Mon");
        assert_eq!(doc.text_one_line(rows[1]), "Out for Delivery");

        let main = doc.select_first(Document::ROOT, &Selector::class("outer")).unwrap();
        assert_eq!(doc.element(main).unwrap().id(), Some("main"));

        let status = doc.select_first(Document::ROOT, &Selector::attr_eq("data-testid", "tracking-status"));
        assert_eq!(doc.text_one_line(status.unwrap()), "In Transit");
    }

    #[test]
    fn visible_lines_skip_head_scripts_and_hidden() {
        let doc = Document::parse(PAGE);
        let lines = doc.visible_lines();
        assert!(lines.iter().any(|l| l == "Shipped Mon"));
        assert!(!lines.iter().any(|l| l.contains("secret")));
        assert!(!lines.iter().any(|l| l.contains("Track")));
        assert!(!lines.iter().any(|l| l.contains(".x")));
    }

    #[test]
    fn from_text_keeps_one_line_per_input_line() {
        let doc = Document::from_text("Label Created\n\n  Delivered  \n");
        assert_eq!(doc.visible_lines(), vec!["Label Created", "Delivered"]);
    }

    #[test]
    fn deeply_nested_markup_yields_its_text() {
        let markup = format!("{}In Transit", "<div>".repeat(200_000));
        let doc = Document::parse(&markup);
        assert_eq!(doc.visible_lines(), vec!["In Transit"]);
        let inner = doc.select_all(Document::ROOT, &Selector::tag("div"));
        assert_eq!(inner.len(), 200_000);
        assert_eq!(doc.text_one_line(inner[199_999]), "In Transit");
    }
}
