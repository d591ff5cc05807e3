//! Terminal display surface.
//!
//! Keeps the committed tree in a [`MemoryHost`] and paints it as lines of
//! text through crossterm commands. Table rows become one line each with
//! cells separated by `│`, checkboxes paint as `[x]` / `[ ]`, buttons as
//! `<label>`. Elements styled `display: none` are skipped.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::error::HostError;
use crate::types::{PropValue, Props};

use super::{HostConfig, HostOps, MemoryHost, MemoryNode, NodeId, ParentRef};

/// Elements that start a new line.
const BLOCK_KINDS: &[&str] = &[
    "table", "thead", "tbody", "tr", "caption", "div", "p", "form", "section", "ul", "li",
];

/// A run of text with its attributes.
#[derive(Debug, Clone, PartialEq)]
struct Span {
    text: String,
    bold: bool,
}

type Line = Vec<Span>;

/// Host backend painting to a terminal.
#[derive(Debug, Default)]
pub struct TerminalHost {
    tree: MemoryHost,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed tree.
    pub fn tree(&self) -> &MemoryHost {
        &self.tree
    }

    /// Plain text of every painted line.
    pub fn lines(&self) -> Vec<String> {
        self.layout()
            .into_iter()
            .map(|line| line.into_iter().map(|span| span.text).collect())
            .collect()
    }

    /// Paint the committed tree, one terminal row per line.
    pub fn paint<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (y, line) in self.layout().into_iter().enumerate() {
            let row = u16::try_from(y).unwrap_or(u16::MAX);
            queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
            for span in line {
                if span.bold {
                    queue!(out, PrintStyledContent(span.text.as_str().bold()))?;
                } else {
                    queue!(out, Print(span.text.as_str()))?;
                }
            }
        }
        out.flush()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current = Line::new();
        for &id in self.tree.container() {
            self.layout_node(id, &mut lines, &mut current);
        }
        flush_line(&mut lines, &mut current);
        lines
    }

    fn layout_node(&self, id: NodeId, lines: &mut Vec<Line>, current: &mut Line) {
        match self.tree.node(id) {
            Some(MemoryNode::Text { text }) => push_span(current, text.clone(), false),
            Some(MemoryNode::Instance { kind, props, children }) => {
                if is_hidden(props) {
                    return;
                }
                if kind == "tr" {
                    flush_line(lines, current);
                    lines.push(self.row_line(children));
                } else if BLOCK_KINDS.contains(&kind.as_str()) {
                    flush_line(lines, current);
                    for &child in children {
                        self.layout_node(child, lines, current);
                    }
                    flush_line(lines, current);
                } else {
                    let bold = is_bold(props);
                    push_span(current, self.inline_text(id), bold);
                }
            }
            None => {}
        }
    }

    fn row_line(&self, cells: &[NodeId]) -> Line {
        let mut line = Line::new();
        let visible = cells.iter().filter(|&&cell| {
            !matches!(self.tree.node(cell), Some(MemoryNode::Instance { props, .. }) if is_hidden(props))
        });
        for (i, &cell) in visible.enumerate() {
            if i > 0 {
                push_span(&mut line, " │ ".to_string(), false);
            }
            let bold = matches!(self.tree.node(cell), Some(MemoryNode::Instance { props, .. }) if is_bold(props));
            push_span(&mut line, self.inline_text(cell), bold);
        }
        line
    }

    fn inline_text(&self, id: NodeId) -> String {
        match self.tree.node(id) {
            Some(MemoryNode::Text { text }) => text.clone(),
            Some(MemoryNode::Instance { kind, props, children }) => {
                if is_hidden(props) {
                    return String::new();
                }
                let inner: String = children.iter().map(|&child| self.inline_text(child)).collect();
                match kind.as_str() {
                    "button" => format!("<{inner}>"),
                    "input" if prop_str(props, "type") == Some("checkbox") => {
                        let checked = props.get("checked").and_then(PropValue::as_bool).unwrap_or(false);
                        if checked { "[x]".to_string() } else { "[ ]".to_string() }
                    }
                    "input" => format!("[{}]", prop_str(props, "value").unwrap_or("")),
                    _ => inner,
                }
            }
            None => String::new(),
        }
    }
}

fn prop_str<'a>(props: &'a Props, name: &str) -> Option<&'a str> {
    props.get(name).and_then(PropValue::as_str)
}

fn style_str<'a>(props: &'a Props, name: &str) -> Option<&'a str> {
    props
        .get("style")
        .and_then(PropValue::as_map)
        .and_then(|style| prop_str(style, name))
}

fn is_hidden(props: &Props) -> bool {
    style_str(props, "display") == Some("none")
}

fn is_bold(props: &Props) -> bool {
    style_str(props, "font_weight") == Some("bold")
}

fn push_span(line: &mut Line, text: String, bold: bool) {
    if text.is_empty() {
        return;
    }
    match line.last_mut() {
        Some(last) if last.bold == bold => last.text.push_str(&text),
        _ => line.push(Span { text, bold }),
    }
}

fn flush_line(lines: &mut Vec<Line>, current: &mut Line) {
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
}

// =============================================================================
// Host contract (delegates to the in-memory tree)
// =============================================================================

impl HostConfig for TerminalHost {
    type Node = NodeId;

    fn supported_ops(&self) -> HostOps {
        self.tree.supported_ops()
    }

    fn create_instance(&mut self, kind: &str, props: &Props) -> Result<NodeId, HostError> {
        self.tree.create_instance(kind, props)
    }

    fn create_text_leaf(&mut self, text: &str) -> Result<NodeId, HostError> {
        self.tree.create_text_leaf(text)
    }

    fn append_child(&mut self, parent: ParentRef<'_, NodeId>, child: &NodeId) -> Result<(), HostError> {
        self.tree.append_child(parent, child)
    }

    fn insert_before(
        &mut self,
        parent: ParentRef<'_, NodeId>,
        child: &NodeId,
        before: &NodeId,
    ) -> Result<(), HostError> {
        self.tree.insert_before(parent, child, before)
    }

    fn remove_child(&mut self, parent: ParentRef<'_, NodeId>, child: &NodeId) -> Result<(), HostError> {
        self.tree.remove_child(parent, child)
    }

    fn update_instance_properties(&mut self, node: &NodeId, props: &Props) -> Result<(), HostError> {
        self.tree.update_instance_properties(node, props)
    }

    fn update_text_leaf(&mut self, node: &NodeId, text: &str) -> Result<(), HostError> {
        self.tree.update_text_leaf(node, text)
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        self.tree.clear_container()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn build_row(host: &mut TerminalHost, cells: &[(&str, bool)]) -> NodeId {
        let row = host.create_instance("tr", &Props::new()).unwrap();
        for (text, bold) in cells {
            let style = if *bold {
                Props::new().with("font_weight", "bold")
            } else {
                Props::new()
            };
            let cell = host
                .create_instance("td", &Props::new().with("style", style))
                .unwrap();
            let leaf = host.create_text_leaf(text).unwrap();
            host.append_child(ParentRef::Node(&cell), &leaf).unwrap();
            host.append_child(ParentRef::Node(&row), &cell).unwrap();
        }
        row
    }

    #[test]
    fn test_rows_paint_as_lines() {
        let mut host = TerminalHost::new();
        let table = host.create_instance("table", &Props::new()).unwrap();
        let header = build_row(&mut host, &[("Name", true), ("Age", true)]);
        let body = build_row(&mut host, &[("Adam", false), ("13", false)]);
        host.append_child(ParentRef::Node(&table), &header).unwrap();
        host.append_child(ParentRef::Node(&table), &body).unwrap();
        host.append_child(ParentRef::Container, &table).unwrap();

        assert_eq!(host.lines(), vec!["Name │ Age", "Adam │ 13"]);
    }

    #[test]
    fn test_hidden_rows_are_skipped() {
        let mut host = TerminalHost::new();
        let hidden = host
            .create_instance(
                "tr",
                &Props::new().with("style", Props::new().with("display", "none")),
            )
            .unwrap();
        let visible = build_row(&mut host, &[("Joey", false)]);
        host.append_child(ParentRef::Container, &hidden).unwrap();
        host.append_child(ParentRef::Container, &visible).unwrap();

        assert_eq!(host.lines(), vec!["Joey"]);
    }

    #[test]
    fn test_controls_paint_inline() {
        let mut host = TerminalHost::new();
        let p = host.create_instance("p", &Props::new()).unwrap();
        let checkbox = host
            .create_instance("input", &Props::new().with("type", "checkbox").with("checked", true))
            .unwrap();
        let button = host.create_instance("button", &Props::new()).unwrap();
        let label = host.create_text_leaf("Edit Adam").unwrap();
        host.append_child(ParentRef::Node(&button), &label).unwrap();
        host.append_child(ParentRef::Node(&p), &checkbox).unwrap();
        host.append_child(ParentRef::Node(&p), &button).unwrap();
        host.append_child(ParentRef::Container, &p).unwrap();

        assert_eq!(host.lines(), vec!["[x]<Edit Adam>"]);
    }

    #[test]
    fn test_paint_writes_commands() {
        let mut host = TerminalHost::new();
        let row = build_row(&mut host, &[("Name", true), ("Ronja", false)]);
        host.append_child(ParentRef::Container, &row).unwrap();

        let mut out = Vec::new();
        host.paint(&mut out).unwrap();
        let painted = String::from_utf8_lossy(&out);

        assert!(painted.contains("Name"), "bold header text painted");
        assert!(painted.contains("Ronja"));
        assert!(painted.contains('\u{1b}'), "escape sequences emitted");
    }
}
