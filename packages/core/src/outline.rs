//! Markdown outline to mind map conversion
//!
//! Headings and list items become nodes; heading levels and list indentation
//! decide the parent of each one, tracked with two stacks the same way a
//! nested document is walked. Paragraph text and fenced code are skipped.
//!
//! ```
//! use chrono::Utc;
//! use mindmap_core::config::Locale;
//! use mindmap_core::outline::outline_to_project;
//!
//! let markdown = "# Trip\n## Packing\n- Passport\n- **Tickets**\n## Route\n";
//! let project = outline_to_project("Trip", markdown, Locale::En.messages(), Utc::now());
//!
//! assert_eq!(project.nodes.len(), 5);
//! assert_eq!(project.edges.len(), 4);
//! assert_eq!(project.nodes[3].data.label, "Tickets");
//! ```

use chrono::{DateTime, Utc};

use crate::config::Messages;
use crate::models::{MindMapEdge, MindMapNode, NodeData, NodeType, Position, Project};
use crate::utils::{generate_id, generate_prefixed_id, strip_markdown};

pub const OUTLINE_ORIGIN_X: f64 = 400.0;
pub const OUTLINE_COLUMN_WIDTH: f64 = 240.0;
pub const OUTLINE_ROW_HEIGHT: f64 = 80.0;

/// Spaces per list nesting level; a tab counts as one level
const LIST_INDENT_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq)]
enum OutlineLine {
    Heading { level: usize, text: String },
    ListItem { indent: usize, text: String },
}

/// An entry on one of the hierarchy stacks
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    index: usize,
    level: usize,
}

#[derive(Debug)]
struct OutlineNode {
    label: String,
    parent: Option<usize>,
    depth: usize,
}

struct OutlineBuilder {
    nodes: Vec<OutlineNode>,
    heading_stack: Vec<StackEntry>,
    list_stack: Vec<StackEntry>,
    root_level: usize,
}

impl OutlineBuilder {
    fn new(root_label: String, root_level: usize) -> Self {
        Self {
            nodes: vec![OutlineNode {
                label: root_label,
                parent: None,
                depth: 0,
            }],
            heading_stack: Vec::new(),
            list_stack: Vec::new(),
            root_level,
        }
    }

    /// List context wins over heading context; the root catches the rest
    fn current_parent(&self) -> usize {
        self.list_stack
            .last()
            .or_else(|| self.heading_stack.last())
            .map(|entry| entry.index)
            .unwrap_or(0)
    }

    fn push_node(&mut self, label: String, parent: usize) -> usize {
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(OutlineNode {
            label,
            parent: Some(parent),
            depth,
        });
        self.nodes.len() - 1
    }

    fn add_heading(&mut self, level: usize, label: String) {
        // Headings at or above the root's level still hang off the root
        let level = level.max(self.root_level + 1);
        while self.heading_stack.last().is_some_and(|top| top.level >= level) {
            self.heading_stack.pop();
        }
        self.list_stack.clear();

        let parent = self.heading_stack.last().map(|e| e.index).unwrap_or(0);
        let index = self.push_node(label, parent);
        self.heading_stack.push(StackEntry { index, level });
    }

    fn add_list_item(&mut self, indent: usize, label: String) {
        while self.list_stack.last().is_some_and(|top| top.level >= indent) {
            self.list_stack.pop();
        }

        let parent = self.current_parent();
        let index = self.push_node(label, parent);
        self.list_stack.push(StackEntry {
            index,
            level: indent,
        });
    }
}

/// Build a new project from a markdown outline
///
/// The first heading, when it opens the document, labels the single root
/// node; otherwise the root is labelled with `title`. A blank title falls
/// back to the default project title.
pub fn outline_to_project(
    title: &str,
    markdown: &str,
    messages: &Messages,
    now: DateTime<Utc>,
) -> Project {
    let title = match title.trim() {
        "" => messages.default_project_title.to_string(),
        trimmed => trimmed.to_string(),
    };

    let mut lines = parse_lines(markdown).into_iter().peekable();
    let mut builder = match lines.peek() {
        Some(OutlineLine::Heading { level, text }) => {
            let builder = OutlineBuilder::new(text.clone(), *level);
            lines.next();
            builder
        }
        _ => OutlineBuilder::new(title.clone(), 0),
    };

    for line in lines {
        match line {
            OutlineLine::Heading { level, text } => builder.add_heading(level, text),
            OutlineLine::ListItem { indent, text } => builder.add_list_item(indent, text),
        }
    }

    let positions = layout(&builder.nodes);
    let ids: Vec<String> = builder.nodes.iter().map(|_| generate_id()).collect();

    let nodes = builder
        .nodes
        .iter()
        .zip(positions)
        .zip(&ids)
        .map(|((node, position), id)| {
            let node_type = match node.depth {
                0 => NodeType::Root,
                1 => NodeType::Branch,
                _ => NodeType::Leaf,
            };
            MindMapNode::new(id.clone(), position, NodeData::styled(node.label.clone(), node_type))
        })
        .collect();

    let edges = builder
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            node.parent.map(|parent| {
                MindMapEdge::new(generate_prefixed_id("edge"), ids[parent].clone(), ids[index].clone())
            })
        })
        .collect();

    tracing::debug!("Converted outline into {} nodes", ids.len());

    Project {
        id: generate_id(),
        title,
        description: None,
        nodes,
        edges,
        created_at: now,
        updated_at: now,
        thumbnail: None,
    }
}

/// Tidy tree layout
///
/// Nodes arrive in document order, which is a pre-order walk, so leaves are
/// ranked by index and every child has a larger index than its parent.
fn layout(nodes: &[OutlineNode]) -> Vec<Position> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            children[parent].push(index);
        }
    }

    let mut ys = vec![0.0; nodes.len()];
    let mut leaf_rank = 0.0;
    for (index, kids) in children.iter().enumerate() {
        if kids.is_empty() {
            ys[index] = leaf_rank * OUTLINE_ROW_HEIGHT;
            leaf_rank += 1.0;
        }
    }
    for index in (0..nodes.len()).rev() {
        if let (Some(first), Some(last)) = (children[index].first(), children[index].last()) {
            ys[index] = (ys[*first] + ys[*last]) / 2.0;
        }
    }

    nodes
        .iter()
        .zip(ys)
        .map(|(node, y)| Position::new(OUTLINE_ORIGIN_X + node.depth as f64 * OUTLINE_COLUMN_WIDTH, y))
        .collect()
}

fn parse_lines(markdown: &str) -> Vec<OutlineLine> {
    let mut parsed = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.is_empty() {
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            let label = strip_markdown(text);
            if !label.is_empty() {
                parsed.push(OutlineLine::Heading { level, text: label });
            }
        } else if let Some(text) = list_item(trimmed) {
            let label = strip_markdown(text);
            if !label.is_empty() {
                parsed.push(OutlineLine::ListItem {
                    indent: indent_level(line),
                    text: label,
                });
            }
        }
    }
    parsed
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, rest));
    }
    rest.strip_prefix(' ')
        .map(|text| (level, text.trim().trim_end_matches('#').trim_end()))
}

fn list_item(line: &str) -> Option<&str> {
    let text = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .or_else(|| {
            let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return None;
            }
            line[digits..]
                .strip_prefix(". ")
                .or_else(|| line[digits..].strip_prefix(") "))
        })?;

    // Task list checkboxes are not part of the label
    let text = ["[ ] ", "[x] ", "[X] "]
        .iter()
        .find_map(|checkbox| text.strip_prefix(checkbox))
        .unwrap_or(text);
    Some(text)
}

fn indent_level(line: &str) -> usize {
    let (mut spaces, mut tabs) = (0, 0);
    for c in line.chars() {
        match c {
            ' ' => spaces += 1,
            '\t' => tabs += 1,
            _ => break,
        }
    }
    tabs + spaces / LIST_INDENT_WIDTH
}
