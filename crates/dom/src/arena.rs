//! Arena-based document tree storage
//!
//! Every node lives in one `Vec<DomNode>` and is addressed by its index.
//! Nodes are never freed: a removed node is detached and stays in the
//! arena, free to be appended somewhere else.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

#[derive(Debug)]
pub struct DomArena {
    nodes: Vec<DomNode>,
}

impl DomArena {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    /// Create a detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node_id = self.next_id();
        self.nodes.push(DomNode::element(node_id, tag));
        node_id
    }

    /// Create a detached text node
    pub fn create_text_node(&mut self, content: impl Into<String>) -> NodeId {
        let node_id = self.next_id();
        self.nodes.push(DomNode::text(node_id, content.into()));
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Whether `ancestor` is `node` itself or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that is already attached is moved, not copied. Text nodes
    /// cannot have children, and a node cannot be appended into its own
    /// subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(child)?;
        if self.get(parent)?.node_type != NodeType::Element
            || self.is_inclusive_ancestor(child, parent)?
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        if let Some(old_parent) = self.get(child)?.parent_id {
            tracing::trace!(child, old_parent, new_parent = parent, "moving attached node");
            self.detach(old_parent, child)?;
        }

        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent_id != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(parent, child)
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(parent)?.children_ids.retain(|id| *id != child);
        self.get_mut(child)?.parent_id = None;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Traverse a subtree depth-first, in document order (iterative)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Find nodes matching predicate
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(|node| node.node_id)
            .collect()
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Concatenated text of all text nodes in a subtree
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();

        self.traverse_df(node_id, |node| {
            if node.is_text() {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;

        Ok(text)
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
