//! Core node definitions
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most nodes have few children)
//! 3. Properties are a dynamic bag, not a fixed struct

use crate::value::{PropertyMap, Value};
use serde::Serialize;
use smallvec::SmallVec;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Node type, numbered as in the DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
}

/// Node name used for every text node
pub const TEXT_NODE_NAME: &str = "#text";

/// Property key of the lifecycle hook fired at the end of a build
pub const ONBUILD: &str = "onbuild";

/// A document tree node
///
/// Navigation uses arena indices rather than pointers, so a node can be
/// moved between parents by rewriting a couple of ids.
#[derive(Debug, Clone, Serialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Lower-cased tag name for elements, `#text` for text nodes
    pub node_name: String,
    /// Text content of text nodes
    pub node_value: String,

    pub properties: PropertyMap,
}

impl DomNode {
    pub fn element(node_id: NodeId, tag: &str) -> Self {
        Self::new(node_id, NodeType::Element, tag.to_ascii_lowercase(), String::new())
    }

    pub fn text(node_id: NodeId, content: String) -> Self {
        Self::new(node_id, NodeType::Text, TEXT_NODE_NAME.to_string(), content)
    }

    fn new(node_id: NodeId, node_type: NodeType, node_name: String, node_value: String) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value,
            properties: PropertyMap::default(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get a property value
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Get a property as a string slice, if it holds a string
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.prop(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tag_is_lowercased() {
        let node = DomNode::element(0, "DIV");
        assert_eq!(node.tag_name(), Some("div"));
        assert!(node.is_element());
    }

    #[test]
    fn test_text_node_has_no_tag() {
        let node = DomNode::text(1, "hello".to_string());
        assert_eq!(node.tag_name(), None);
        assert_eq!(node.node_name, "#text");
        assert_eq!(node.node_value, "hello");
    }

    #[test]
    fn test_node_serializes_to_json() {
        let mut node = DomNode::element(2, "p");
        node.properties.insert("id".to_string(), Value::from("intro"));
        node.children_ids.push(5);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["node_name"], "p");
        assert_eq!(json["node_type"], "Element");
        assert_eq!(json["children_ids"], serde_json::json!([5]));
        assert_eq!(json["properties"]["id"], "intro");
    }
}
