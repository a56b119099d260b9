//! Dynamic property values
//!
//! Node properties are a loosely typed bag: strings, numbers, nested
//! mappings (`style`), callbacks (`onbuild`) and references to other nodes.
//! Nested mappings are shared and mutable (`Rc<RefCell<_>>`), so two
//! property bags can hold the very same mapping, exactly like object
//! references in a host document.

use crate::document::NodeMut;
use crate::error::{DomError, Result};
use crate::types::NodeId;
use ahash::AHashMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A key → value mapping ("plain mapping")
pub type PropertyMap = AHashMap<String, Value>;

/// A shared, mutable mapping
pub type MapRef = Rc<RefCell<PropertyMap>>;

/// Nesting limit for serialization and debug output (cyclic mappings)
const MAX_DEPTH: usize = 128;

type HookFn = dyn Fn(&mut NodeMut<'_>) -> Result<()>;

/// A callable property value
///
/// Receives the node it is attached to as its context.
#[derive(Clone)]
pub struct Hook(Rc<HookFn>);

impl Hook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut NodeMut<'_>) -> Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, node: &mut NodeMut<'_>) -> Result<()> {
        (self.0)(node)
    }

    /// Identity comparison (two hooks are equal only if they are the same closure)
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// A property value
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(MapRef),
    Function(Hook),
    Node(NodeId),
}

impl Value {
    /// Wrap a mapping into a fresh shared map value
    pub fn map(map: PropertyMap) -> Self {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&mut NodeMut<'_>) -> Result<()> + 'static,
    {
        Value::Function(Hook::new(f))
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
            Value::Function(_) => "function",
            Value::Node(_) => "node",
        }
    }

    /// Host truthiness: null, false, 0, NaN and "" are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Function(_) | Value::Node(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hook(&self) -> Option<&Hook> {
        match self {
            Value::Function(hook) => Some(hook),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Look up a key in a map value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_map().and_then(|map| map.borrow().get(key).cloned())
    }

    /// Render as JSON (functions become `null`)
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Build a property map from a JSON object
pub fn properties_from_json(json: serde_json::Value) -> Result<PropertyMap> {
    match json {
        serde_json::Value::Object(object) => Ok(object
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        other => Err(DomError::InvalidArgument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Render a property map as a JSON object
pub fn properties_to_json(map: &PropertyMap) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(map)?)
}

impl PartialEq for Value {
    /// Structural equality; functions compare by identity.
    /// Comparing two distinct cyclic mappings does not terminate.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().all(|(key, value)| b.get(key) == Some(value))
            }
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Node(a), Value::Node(b)) => a == b,
            _ => false,
        }
    }
}

/// Integral numbers print without a fraction, like the host's number-to-string
fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        write!(f, "{:.0}", if n == 0.0 { 0.0 } else { n })
    } else {
        write!(f, "{n}")
    }
}

/// Text form, as used when a value becomes a text node
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // null inside a list joins as an empty string
                    if !matches!(item, Value::Null) {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Map(_) => f.write_str("[object Object]"),
            Value::Function(_) => f.write_str("function"),
            Value::Node(id) => write!(f, "[node {id}]"),
        }
    }
}

struct DebugAt<'a>(&'a Value, usize);

impl fmt::Debug for DebugAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DebugAt(value, depth) = *self;
        if depth > MAX_DEPTH {
            return f.write_str("..");
        }
        match value {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f
                .debug_list()
                .entries(items.iter().map(|item| DebugAt(item, depth + 1)))
                .finish(),
            Value::Map(map) => match map.try_borrow() {
                Ok(map) => f
                    .debug_map()
                    .entries(map.iter().map(|(k, v)| (k, DebugAt(v, depth + 1))))
                    .finish(),
                Err(_) => f.write_str("Map(<borrowed>)"),
            },
            Value::Function(hook) => write!(f, "{hook:?}"),
            Value::Node(id) => write!(f, "Node({id})"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DebugAt(self, 0).fmt(f)
    }
}

struct Nested<'a> {
    value: &'a Value,
    depth: usize,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.depth > MAX_DEPTH {
            return Err(S::Error::custom("value nesting exceeds maximum depth"));
        }
        let depth = self.depth + 1;
        match self.value {
            Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for value in items {
                    seq.serialize_element(&Nested { value, depth })?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let map = map
                    .try_borrow()
                    .map_err(|_| S::Error::custom("mapping is being modified"))?;
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Nested { value, depth })?;
                }
                out.end()
            }
            Value::Node(id) => {
                let mut out = serializer.serialize_map(Some(1))?;
                out.serialize_entry("$node", id)?;
                out.end()
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Nested {
            value: self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<PropertyMap> for Value {
    fn from(map: PropertyMap) -> Self {
        Value::map(map)
    }
}

impl From<Hook> for Value {
    fn from(hook: Hook) -> Self {
        Value::Function(hook)
    }
}
