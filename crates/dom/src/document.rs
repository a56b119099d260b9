//! Document - main entry point for building and configuring nodes
//!
//! Owns the node arena and the merge policy, and exposes the two
//! operations the element builder is made of: merging a property batch
//! onto a node and appending a batch of children.

use crate::arena::DomArena;
use crate::error::Result;
use crate::iter;
use crate::merge::{self, MergeMode};
use crate::serializer::DomSerializer;
use crate::types::{DomNode, NodeId};
use crate::value::{PropertyMap, Value};

/// Configuration for a document
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// How nested mappings are assigned when merging properties
    pub merge_mode: MergeMode,
    /// Initial node capacity of the arena
    pub capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::Alias,
            capacity: 64,
        }
    }
}

#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    arena: DomArena,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            arena: DomArena::with_capacity(config.capacity),
            config,
        }
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.create_element(tag)
    }

    pub fn create_text_node(&mut self, content: impl Into<String>) -> NodeId {
        self.arena.create_text_node(content)
    }

    /// Merge a property batch onto a node's properties
    pub fn merge_properties(
        &mut self,
        node_id: NodeId,
        properties: &PropertyMap,
    ) -> Result<NodeId> {
        let mode = self.config.merge_mode;
        let node = self.arena.get_mut(node_id)?;
        merge::merge(&mut node.properties, properties, mode);
        Ok(node_id)
    }

    /// Append a batch of children to a node, in order
    ///
    /// `Value::Node` items are appended as they are (moving them if they
    /// are attached elsewhere); any other value becomes a text node.
    pub fn append_children(&mut self, node_id: NodeId, children: &[Value]) -> Result<NodeId> {
        self.arena.get(node_id)?;
        for child in children {
            let child_id = match child {
                Value::Node(id) => *id,
                other => self.arena.create_text_node(other.to_string()),
            };
            self.arena.append_child(node_id, child_id)?;
        }
        Ok(node_id)
    }

    /// Detach every child matching `predicate`, returning the removed ids in document order
    pub fn prune_children<P>(&mut self, node_id: NodeId, mut predicate: P) -> Result<Vec<NodeId>>
    where
        P: FnMut(&DomNode) -> bool,
    {
        let mut ids = self.arena.get(node_id)?.children_ids.to_vec();
        let mut removed = Vec::new();
        let mut failure = None;
        let arena = &mut self.arena;

        iter::for_each_mut(
            &mut ids,
            |ids, index| {
                if failure.is_some() {
                    return;
                }
                let child = ids[index];
                let matched = match arena.get(child) {
                    Ok(node) => predicate(node),
                    Err(err) => {
                        failure = Some(err);
                        return;
                    }
                };
                if matched {
                    if let Err(err) = arena.remove_child(node_id, child) {
                        failure = Some(err);
                        return;
                    }
                    ids.remove(index);
                    removed.push(child);
                }
            },
            true,
        );

        if let Some(err) = failure {
            return Err(err);
        }
        removed.reverse();
        Ok(removed)
    }

    /// Mutable access to one node, as handed to hooks
    pub fn node_mut(&mut self, node_id: NodeId) -> Result<NodeMut<'_>> {
        self.arena.get(node_id)?;
        Ok(NodeMut {
            document: self,
            node_id,
        })
    }

    /// Render a subtree with the default serializer
    pub fn to_html(&self, node_id: NodeId) -> Result<String> {
        DomSerializer::new().serialize(&self.arena, node_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A node together with its document
///
/// This is the context a `Hook` runs in: it can read and write the node's
/// properties, append children, and reach the document to create more nodes.
#[derive(Debug)]
pub struct NodeMut<'a> {
    document: &'a mut Document,
    node_id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.node_id
    }

    pub fn node(&self) -> Result<&DomNode> {
        self.document.node(self.node_id)
    }

    pub fn document(&mut self) -> &mut Document {
        &mut *self.document
    }

    /// Current value of a property
    pub fn get(&self, key: &str) -> Option<Value> {
        self.node().ok()?.prop(key).cloned()
    }

    /// Assign a property directly, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.document
            .arena
            .get_mut(self.node_id)?
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    pub fn merge(&mut self, properties: &PropertyMap) -> Result<()> {
        self.document.merge_properties(self.node_id, properties)?;
        Ok(())
    }

    pub fn append_children(&mut self, children: &[Value]) -> Result<()> {
        self.document.append_children(self.node_id, children)?;
        Ok(())
    }
}
