//! SVG rendering
//!
//! Produces standalone SVG markup for a project: edges underneath, then one
//! rounded box per node styled through [`MindMapNode::resolved_style`].
//! Node positions are the top-left corner of the box, as the canvas stores
//! them. Box sizes are estimated from the label length since no text
//! measurement is available here.

use std::collections::HashMap;
use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::Messages;
use crate::models::{EdgeShape, MindMapEdge, MindMapNode, Project};

const CANVAS_MARGIN: f64 = 40.0;
const NODE_PADDING_X: f64 = 16.0;
const NODE_PADDING_Y: f64 = 8.0;
const MIN_NODE_WIDTH: f64 = 80.0;
const CHAR_WIDTH_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Bounds {
    fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

fn node_bounds(node: &MindMapNode) -> Bounds {
    let style = node.resolved_style();
    let label_width = node.data.label.chars().count() as f64 * style.font_size * CHAR_WIDTH_RATIO;
    Bounds {
        x: node.position.x,
        y: node.position.y,
        width: (label_width + NODE_PADDING_X * 2.0).max(MIN_NODE_WIDTH),
        height: style.font_size + NODE_PADDING_Y * 2.0,
    }
}

pub fn render_svg(project: &Project) -> String {
    let bounds: HashMap<&str, Bounds> = project
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node_bounds(node)))
        .collect();

    let (min_x, min_y, max_x, max_y) = if bounds.is_empty() {
        (0.0, 0.0, 200.0, 120.0)
    } else {
        bounds.values().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(min_x, min_y, max_x, max_y), b| {
                (
                    min_x.min(b.x),
                    min_y.min(b.y),
                    max_x.max(b.x + b.width),
                    max_y.max(b.bottom()),
                )
            },
        )
    };
    let view_x = min_x - CANVAS_MARGIN;
    let view_y = min_y - CANVAS_MARGIN;
    let width = max_x - min_x + CANVAS_MARGIN * 2.0;
    let height = max_y - min_y + CANVAS_MARGIN * 2.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
        x = fmt_num(view_x),
        y = fmt_num(view_y),
        w = fmt_num(width),
        h = fmt_num(height),
    );
    let _ = writeln!(
        svg,
        r##"  <title>{}</title>"##,
        escape_xml(&project.title)
    );

    for edge in &project.edges {
        let (Some(source), Some(target)) = (
            bounds.get(edge.source.as_str()),
            bounds.get(edge.target.as_str()),
        ) else {
            continue;
        };
        render_edge(&mut svg, edge, source, target);
    }

    for node in &project.nodes {
        if let Some(b) = bounds.get(node.id.as_str()) {
            render_node(&mut svg, node, b);
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_edge(svg: &mut String, edge: &MindMapEdge, source: &Bounds, target: &Bounds) {
    let (sx, sy) = (source.center_x(), source.bottom());
    let (tx, ty) = (target.center_x(), target.y);
    let path = match edge.shape {
        EdgeShape::Straight => format!("M {} {} L {} {}", fmt_num(sx), fmt_num(sy), fmt_num(tx), fmt_num(ty)),
        EdgeShape::Smoothstep | EdgeShape::Step => {
            let mid_y = (sy + ty) / 2.0;
            format!(
                "M {} {} V {} H {} V {}",
                fmt_num(sx),
                fmt_num(sy),
                fmt_num(mid_y),
                fmt_num(tx),
                fmt_num(ty)
            )
        }
    };
    let (stroke, stroke_width) = edge.stroke();
    let dash = if edge.animated { r#" stroke-dasharray="5""# } else { "" };

    let _ = writeln!(
        svg,
        r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
        path,
        escape_xml(stroke),
        fmt_num(stroke_width),
        dash
    );
}

fn render_node(svg: &mut String, node: &MindMapNode, b: &Bounds) {
    let style = node.resolved_style();
    let weight = if style.bold { "bold" } else { "normal" };

    let _ = writeln!(
        svg,
        r#"  <g data-node-id="{}">"#,
        escape_xml(&node.id)
    );
    let _ = writeln!(
        svg,
        r##"    <rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="{}" stroke="#e5e7eb"/>"##,
        fmt_num(b.x),
        fmt_num(b.y),
        fmt_num(b.width),
        fmt_num(b.height),
        escape_xml(&style.background)
    );
    let _ = writeln!(
        svg,
        r#"    <text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-size="{}" font-weight="{}" fill="{}">{}</text>"#,
        fmt_num(b.center_x()),
        fmt_num(b.y + b.height / 2.0),
        fmt_num(style.font_size),
        weight,
        escape_xml(&style.color),
        escape_xml(&node.data.label)
    );
    svg.push_str("  </g>\n");
}

/// Preview image as a base64 `data:` URL
pub fn generate_thumbnail(project: &Project, messages: &Messages) -> String {
    let summary = format!(
        "{} {} {} {}",
        project.nodes.len(),
        messages.nodes_unit,
        project.edges.len(),
        messages.edges_unit
    );
    let svg = format!(
        r##"<svg width="200" height="120" xmlns="http://www.w3.org/2000/svg"><rect width="200" height="120" fill="#f8fafc"/><circle cx="100" cy="60" r="20" fill="#3b82f6"/><text x="100" y="90" text-anchor="middle" font-size="12" fill="#64748b">{}</text></svg>"##,
        escape_xml(&summary)
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whole numbers without a trailing `.0`, otherwise two decimals at most
fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::models::{NodeData, NodeType, Position};
    use chrono::Utc;

    fn project() -> Project {
        let now = Utc::now();
        Project {
            id: "p".to_string(),
            title: "Plans & <Ideas>".to_string(),
            description: None,
            nodes: vec![
                MindMapNode::new("a", Position::new(400.0, 100.0), NodeData::styled("Root", NodeType::Root)),
                MindMapNode::new("b", Position::new(300.0, 250.0), NodeData::styled("A < B", NodeType::Leaf)),
            ],
            edges: vec![
                MindMapEdge::new("e1", "a", "b"),
                MindMapEdge::new("e2", "a", "missing"),
            ],
            created_at: now,
            updated_at: now,
            thumbnail: None,
        }
    }

    #[test]
    fn test_render_escapes_and_skips_dangling_edges() {
        let svg = render_svg(&project());

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("<title>Plans &amp; &lt;Ideas&gt;</title>"));
        assert!(svg.contains(">A &lt; B</text>"));
        assert_eq!(svg.matches("<path ").count(), 1);
        assert_eq!(svg.matches("<rect ").count(), 2);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_uses_type_styles() {
        let svg = render_svg(&project());
        assert!(svg.contains(r##"fill="#dbeafe""##));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r##"fill="#fef3c7""##));
    }

    #[test]
    fn test_view_box_covers_nodes_with_margin() {
        let svg = render_svg(&project());
        assert!(svg.contains(r#"viewBox="260 60 "#));
    }

    #[test]
    fn test_empty_project_renders() {
        let mut empty = project();
        empty.nodes.clear();
        empty.edges.clear();

        let svg = render_svg(&empty);
        assert!(svg.contains(r#"viewBox="-40 -40 280 200""#));
    }

    #[test]
    fn test_thumbnail_is_base64_data_url() {
        let url = generate_thumbnail(&project(), Locale::En.messages());
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();

        assert!(decoded.contains("2 nodes 2 edges"));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(-40.0), "-40");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(1.256), "1.26");
    }
}
