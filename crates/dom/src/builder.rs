//! Element builder - declarative element construction
//!
//! An element is built from a tag name and a sequence of arguments, each
//! either a property batch or a children batch. Arguments are applied
//! strictly in order; properties and children may repeat. If the node ends
//! up with a callable `onbuild` property it is called last, with the new
//! node as its context, and stays attached as an ordinary property.
//!
//! ```
//! use scratch_dom::{Document, ElementBuilder, Value};
//!
//! let mut doc = Document::new();
//! let span = doc.build("span", []).unwrap();
//! let div = ElementBuilder::new("div")
//!     .property("className", "x")
//!     .children(vec![Value::from("hello"), Value::Node(span)])
//!     .build(&mut doc)
//!     .unwrap();
//!
//! assert_eq!(doc.to_html(div).unwrap(), r#"<div class="x">hello<span></span></div>"#);
//! ```

use crate::document::{Document, NodeMut};
use crate::error::{DomError, Result};
use crate::types::{NodeId, ONBUILD};
use crate::value::{PropertyMap, Value};

/// One build argument
#[derive(Debug, Clone)]
pub enum BuildArg {
    Properties(PropertyMap),
    Children(Vec<Value>),
}

impl TryFrom<Value> for BuildArg {
    type Error = DomError;

    /// Lists are children, mappings are properties; nothing else is accepted
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::List(children) => Ok(BuildArg::Children(children)),
            Value::Map(map) => Ok(BuildArg::Properties(map.borrow().clone())),
            other => Err(DomError::unsupported_argument(other.kind())),
        }
    }
}

impl From<PropertyMap> for BuildArg {
    fn from(properties: PropertyMap) -> Self {
        BuildArg::Properties(properties)
    }
}

impl From<Vec<Value>> for BuildArg {
    fn from(children: Vec<Value>) -> Self {
        BuildArg::Children(children)
    }
}

impl Document {
    /// Create an element and apply `args` to it in order
    pub fn build<I>(&mut self, tag: &str, args: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = BuildArg>,
    {
        self.build_with(tag, args.into_iter().map(Ok))
    }

    /// Like [`Document::build`], detecting each argument's kind from its shape
    ///
    /// Fails with `InvalidArgument` on the first argument that is neither a
    /// list nor a mapping. Arguments before it have already been applied to
    /// the half-built node, which is simply left detached.
    pub fn build_values<I>(&mut self, tag: &str, args: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = Value>,
    {
        self.build_with(tag, args.into_iter().map(BuildArg::try_from))
    }

    fn build_with<I>(&mut self, tag: &str, args: I) -> Result<NodeId>
    where
        I: Iterator<Item = Result<BuildArg>>,
    {
        let node_id = self.create_element(tag);

        for arg in args {
            match arg? {
                BuildArg::Properties(properties) => self.merge_properties(node_id, &properties)?,
                BuildArg::Children(children) => self.append_children(node_id, &children)?,
            };
        }

        let hook = self
            .node(node_id)?
            .prop(ONBUILD)
            .and_then(Value::as_hook)
            .cloned();
        if let Some(hook) = hook {
            tracing::debug!("Running onbuild hook for <{}> ({})", tag, node_id);
            hook.call(&mut self.node_mut(node_id)?)?;
        }

        tracing::debug!(tag, node_id, "element built");
        Ok(node_id)
    }
}

/// Builder-style front end to [`Document::build`]
///
/// Records arguments in call order. Consecutive `property` calls land in
/// the same property batch, consecutive `child` calls in the same
/// children batch.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    args: Vec<BuildArg>,
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            args: Vec::new(),
        }
    }

    /// Add a whole property batch
    pub fn properties(mut self, properties: PropertyMap) -> Self {
        self.args.push(BuildArg::Properties(properties));
        self
    }

    /// Set one property
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (key, value) = (key.into(), value.into());
        match self.args.last_mut() {
            Some(BuildArg::Properties(properties)) => {
                properties.insert(key, value);
            }
            _ => {
                let mut properties = PropertyMap::default();
                properties.insert(key, value);
                self.args.push(BuildArg::Properties(properties));
            }
        }
        self
    }

    /// Add a whole children batch
    pub fn children(mut self, children: Vec<Value>) -> Self {
        self.args.push(BuildArg::Children(children));
        self
    }

    /// Append one child (a `Value::Node`, or anything else as text)
    pub fn child(mut self, child: impl Into<Value>) -> Self {
        let child = child.into();
        match self.args.last_mut() {
            Some(BuildArg::Children(children)) => children.push(child),
            _ => self.args.push(BuildArg::Children(vec![child])),
        }
        self
    }

    /// Set the `onbuild` hook
    pub fn on_build<F>(self, hook: F) -> Self
    where
        F: Fn(&mut NodeMut<'_>) -> Result<()> + 'static,
    {
        self.property(ONBUILD, Value::function(hook))
    }

    pub fn build(self, document: &mut Document) -> Result<NodeId> {
        document.build(&self.tag, self.args)
    }
}
