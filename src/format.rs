//! Output formatting for nodes: JSON, YAML or flat `path = value` lines.

use crate::flatten::Flattener;
use crate::node::{Mapping, Node};
use anyhow::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::SecondsFormat;

/// Output format for rendered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    /// One `path = value` line per leaf
    Flat,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "flat" | "properties" => Some(OutputFormat::Flat),
            _ => None,
        }
    }
}

/// Render `node` in `format`. Flat output joins paths with `delimiter`.
pub fn render(node: &Node, format: OutputFormat, delimiter: char) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(node)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(node)?.trim_end().to_string()),
        OutputFormat::Flat => Ok(render_flat(node, delimiter)),
    }
}

fn render_flat(node: &Node, delimiter: char) -> String {
    let root: Mapping = match node {
        Node::Mapping(map) if !map.is_empty() => map.clone(),
        Node::Sequence(items) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item.clone()))
            .collect(),
        leaf => return render_scalar(leaf),
    };

    let index = Flattener::new().delimiter(delimiter).flatten(&root);
    index
        .values()
        .iter()
        .map(|(path, leaf)| format!("{path} = {}", render_scalar(leaf)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line rendering of a leaf.
///
/// Strings are JSON-quoted so that `"1"` and `1` stay distinguishable;
/// bytes are base64; times are RFC 3339.
pub fn render_scalar(node: &Node) -> String {
    match node {
        Node::Null => "null".to_string(),
        Node::Bool(b) => b.to_string(),
        Node::Int(i) => i.to_string(),
        Node::Float(f) => f.to_string(),
        Node::String(s) => serde_json::to_string(s).unwrap_or_else(|_| s.clone()),
        Node::Bytes(data) => format!("base64:{}", STANDARD.encode(data)),
        Node::Duration(d) => format!("{d:?}"),
        Node::Time(t) => t.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Node::Mapping(map) if map.is_empty() => "{}".to_string(),
        Node::Sequence(items) if items.is_empty() => "[]".to_string(),
        container => serde_json::to_string(container).unwrap_or_default(),
    }
}
