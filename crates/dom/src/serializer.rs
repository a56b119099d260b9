//! DOM Serializer - render a subtree as HTML
//!
//! Properties become attributes:
//! - `className` → `class`, `htmlFor` → `for`
//! - strings and numbers as values, `true` as a bare attribute
//! - mappings as a `key: value; ...` declaration list (for `style`)
//! - `false`, `null`, lists, functions and node references are skipped
//!
//! Attributes are emitted in sorted order so output is deterministic.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};
use crate::value::Value;

/// Serializer configuration
#[derive(Debug, Clone, Default)]
pub struct SerializerConfig {
    /// One node per line, indented by depth
    pub pretty: bool,
    /// Cap on the length of each text node, in characters
    pub max_text_length: Option<usize>,
}

#[derive(Debug, Default)]
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the subtree rooted at `node_id`
    pub fn serialize(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, node_id, 0, &mut output)?;
        Ok(output)
    }

    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = if self.config.pretty {
            "  ".repeat(depth)
        } else {
            String::new()
        };

        match node.node_type {
            NodeType::Element => {
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);
                push_attributes(node, output);
                output.push('>');
                self.newline(output);

                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, output)?;
                }

                output.push_str(&indent);
                output.push_str("</");
                output.push_str(&node.node_name);
                output.push('>');
                self.newline(output);
            }
            NodeType::Text => {
                let text = match self.config.max_text_length {
                    Some(max_len) => cap_text_length(&node.node_value, max_len),
                    None => node.node_value.clone(),
                };
                if self.config.pretty && text.trim().is_empty() {
                    return Ok(());
                }
                output.push_str(&indent);
                push_escaped(&text, false, output);
                self.newline(output);
            }
        }

        Ok(())
    }

    fn newline(&self, output: &mut String) {
        if self.config.pretty {
            output.push('\n');
        }
    }
}

fn attribute_name(property: &str) -> &str {
    match property {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

/// Property keys that cannot be written as an attribute name are skipped
fn is_valid_attribute_name(name: &str) -> bool {
    let forbidden = |c: char| {
        c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=')
    };
    !name.is_empty() && !name.chars().any(forbidden)
}

fn push_attributes(node: &DomNode, output: &mut String) {
    let mut properties: Vec<_> = node
        .properties
        .iter()
        .filter(|(key, _)| is_valid_attribute_name(key))
        .collect();
    properties.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in properties {
        let rendered = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) => Some(value.to_string()),
            Value::Bool(true) => None,
            Value::Map(map) => {
                let map = map.borrow();
                let mut entries: Vec<_> = map
                    .iter()
                    .filter(|(_, v)| matches!(v, Value::String(_) | Value::Number(_)))
                    .collect();
                if entries.is_empty() {
                    continue;
                }
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let declarations: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                Some(declarations.join("; "))
            }
            _ => continue,
        };

        output.push(' ');
        output.push_str(attribute_name(key));
        if let Some(rendered) = rendered {
            output.push_str("=\"");
            push_escaped(&rendered, true, output);
            output.push('"');
        }
    }
}

fn push_escaped(text: &str, attribute: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if attribute => output.push_str("&quot;"),
            other => output.push(other),
        }
    }
}

/// Cap text length (in characters), marking the cut with `...`
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
