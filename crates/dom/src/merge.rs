//! Recursive property merging
//!
//! `merge` writes every key of a source mapping onto a target. When both
//! sides hold a mapping under the same key the target's mapping is kept
//! and merged key by key (so `style` gains entries instead of being
//! replaced). Anything else is overwritten.
//!
//! By default assigned mappings are shared with the source, so targets
//! merged from the same source share mutable sub-mappings. Use
//! [`MergeMode::DeepCopy`] when that is not wanted.

use crate::value::{MapRef, PropertyMap, Value};
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// How mappings are assigned into the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Assign source mappings by reference
    #[default]
    Alias,
    /// Assign deep copies of source mappings
    DeepCopy,
}

type MapPtr = *const RefCell<PropertyMap>;

/// Per-call merge state
///
/// Tracks visited (target, source) pairs so cyclic structures terminate,
/// and already-made copies so shared sub-mappings stay shared in the copy.
/// Every pointer key is stored next to a clone of its mapping, so no keyed
/// address can be freed and reused before the call ends.
struct Merger {
    mode: MergeMode,
    visited: AHashMap<(MapPtr, MapPtr), (MapRef, MapRef)>,
    copies: AHashMap<MapPtr, (MapRef, MapRef)>,
}

impl Merger {
    fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            visited: AHashMap::new(),
            copies: AHashMap::new(),
        }
    }

    fn merge_into(&mut self, target: &mut PropertyMap, source: &PropertyMap) {
        for (key, value) in source.iter() {
            match nested_pair(target, key, value) {
                Some((dst, src)) => self.merge_shared(&dst, &src),
                None => {
                    let value = self.assigned(value);
                    target.insert(key.clone(), value);
                }
            }
        }
    }

    // No borrow is held across the recursive call: the target may be
    // reachable again from inside the source.
    fn merge_shared(&mut self, target: &MapRef, source: &MapRef) {
        if Rc::ptr_eq(target, source) {
            return;
        }
        let pair = (Rc::as_ptr(target), Rc::as_ptr(source));
        if self.visited.contains_key(&pair) {
            return;
        }
        self.visited.insert(pair, (Rc::clone(target), Rc::clone(source)));

        for (key, value) in snapshot(source) {
            let nested = nested_pair(&target.borrow(), &key, &value);
            match nested {
                Some((dst, src)) => {
                    tracing::trace!(key = %key, "merging nested mapping");
                    self.merge_shared(&dst, &src);
                }
                None => {
                    let value = self.assigned(&value);
                    target.borrow_mut().insert(key, value);
                }
            }
        }
    }

    fn assigned(&mut self, value: &Value) -> Value {
        match self.mode {
            MergeMode::Alias => value.clone(),
            MergeMode::DeepCopy => self.copy(value),
        }
    }

    fn copy(&mut self, value: &Value) -> Value {
        match value {
            Value::Map(map) => {
                let ptr = Rc::as_ptr(map);
                if let Some((_, copy)) = self.copies.get(&ptr) {
                    return Value::Map(Rc::clone(copy));
                }

                // Registered before filling, so cycles point back at the copy
                let copy: MapRef = Rc::new(RefCell::new(PropertyMap::default()));
                self.copies.insert(ptr, (Rc::clone(map), Rc::clone(&copy)));

                let filled: PropertyMap = snapshot(map)
                    .into_iter()
                    .map(|(key, value)| {
                        let value = self.copy(&value);
                        (key, value)
                    })
                    .collect();
                *copy.borrow_mut() = filled;
                Value::Map(copy)
            }
            Value::List(items) => Value::List(items.iter().map(|item| self.copy(item)).collect()),
            other => other.clone(),
        }
    }
}

/// Both sides hold a mapping under `key`: the recursion case
fn nested_pair(target: &PropertyMap, key: &str, value: &Value) -> Option<(MapRef, MapRef)> {
    match (target.get(key), value) {
        (Some(Value::Map(dst)), Value::Map(src)) => Some((Rc::clone(dst), Rc::clone(src))),
        _ => None,
    }
}

fn snapshot(map: &MapRef) -> Vec<(String, Value)> {
    map.borrow()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Merge `source` onto `target` in place, returning `target` for chaining
///
/// Example: merging `{style: {background: "blue"}}` onto
/// `{id: "foo", style: {color: "red"}}` yields
/// `{id: "foo", style: {color: "red", background: "blue"}}`.
pub fn merge<'t>(
    target: &'t mut PropertyMap,
    source: &PropertyMap,
    mode: MergeMode,
) -> &'t mut PropertyMap {
    Merger::new(mode).merge_into(target, source);
    target
}

/// Merge into a shared mapping
///
/// Merging a mapping into itself is a no-op.
pub fn merge_shared(target: &MapRef, source: &MapRef, mode: MergeMode) {
    Merger::new(mode).merge_shared(target, source);
}

/// Deep copy a value
///
/// Mappings and lists are copied recursively. A mapping reachable twice
/// is copied once, which also keeps cycles intact.
pub fn deep_copy(value: &Value) -> Value {
    Merger::new(MergeMode::DeepCopy).copy(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{properties_from_json, properties_to_json};
    use serde_json::json;

    fn props(json: serde_json::Value) -> PropertyMap {
        properties_from_json(json).unwrap()
    }

    #[test]
    fn test_merge_into_empty_equals_source() {
        let source = props(json!({
            "id": "foo",
            "tabIndex": 2,
            "style": { "color": "red", "border": { "width": 1 } },
            "items": [1, 2, 3]
        }));

        let mut target = PropertyMap::default();
        merge(&mut target, &source, MergeMode::Alias);

        assert_eq!(
            properties_to_json(&target).unwrap(),
            properties_to_json(&source).unwrap()
        );
    }

    #[test]
    fn test_nested_mappings_merge_key_by_key() {
        let mut target = props(json!({ "style": { "color": "red" } }));
        let source = props(json!({ "style": { "background": "blue" } }));

        merge(&mut target, &source, MergeMode::Alias);

        assert_eq!(
            properties_to_json(&target).unwrap(),
            json!({ "style": { "color": "red", "background": "blue" } })
        );
    }

    #[test]
    fn test_existing_mapping_keeps_its_identity() {
        let mut target = props(json!({ "style": { "color": "red" } }));
        let before = Rc::clone(target["style"].as_map().unwrap());

        merge(&mut target, &props(json!({ "style": { "color": "green" } })), MergeMode::Alias);

        assert!(Rc::ptr_eq(&before, target["style"].as_map().unwrap()));
        assert_eq!(before.borrow()["color"], Value::from("green"));
    }

    #[test]
    fn test_scalar_is_replaced_by_mapping() {
        let mut target = props(json!({ "a": 1 }));
        merge(&mut target, &props(json!({ "a": { "b": 2 } })), MergeMode::Alias);

        assert_eq!(properties_to_json(&target).unwrap(), json!({ "a": { "b": 2 } }));
    }

    #[test]
    fn test_non_mapping_values_overwrite() {
        let mut target = props(json!({
            "style": { "color": "red" },
            "items": [1, 2, 3],
            "empty": null
        }));
        let source = props(json!({
            "style": "color: blue",
            "items": [9],
            "empty": { "x": 1 }
        }));

        merge(&mut target, &source, MergeMode::Alias);

        assert_eq!(
            properties_to_json(&target).unwrap(),
            json!({ "style": "color: blue", "items": [9], "empty": { "x": 1 } })
        );
    }

    #[test]
    fn test_alias_mode_shares_assigned_mappings() {
        let source = props(json!({ "style": { "color": "red" } }));
        let mut first = PropertyMap::default();
        let mut second = PropertyMap::default();

        merge(&mut first, &source, MergeMode::Alias);
        merge(&mut second, &source, MergeMode::Alias);

        first["style"]
            .as_map()
            .unwrap()
            .borrow_mut()
            .insert("color".to_string(), Value::from("blue"));

        // Both targets see the change through the shared mapping
        assert_eq!(second["style"].get("color"), Some(Value::from("blue")));
        assert_eq!(source["style"].get("color"), Some(Value::from("blue")));
    }

    #[test]
    fn test_deep_copy_mode_isolates_targets() {
        let source = props(json!({ "style": { "color": "red" }, "list": [{ "k": 1 }] }));
        let mut target = PropertyMap::default();

        merge(&mut target, &source, MergeMode::DeepCopy);
        assert_eq!(
            properties_to_json(&target).unwrap(),
            properties_to_json(&source).unwrap()
        );

        target["style"]
            .as_map()
            .unwrap()
            .borrow_mut()
            .insert("color".to_string(), Value::from("blue"));

        assert_eq!(source["style"].get("color"), Some(Value::from("red")));
        let copied = target["list"].as_list().unwrap()[0].as_map().unwrap();
        let original = source["list"].as_list().unwrap()[0].as_map().unwrap();
        assert!(!Rc::ptr_eq(copied, original));
    }

    #[test]
    fn test_merge_is_chainable() {
        let mut target = PropertyMap::default();
        let len = merge(&mut target, &props(json!({ "a": 1, "b": 2 })), MergeMode::Alias).len();
        assert_eq!(len, 2);
    }

    #[test]
    fn test_merging_a_mapping_into_itself_is_a_no_op() {
        let map = Value::from(json!({ "a": { "b": 1 } }));
        let shared = map.as_map().unwrap();

        merge_shared(shared, shared, MergeMode::Alias);

        assert_eq!(map.to_json().unwrap(), json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn test_cyclic_structures_terminate() {
        // target.child -> target, source.child -> source
        let target = Value::from(json!({ "name": "t" }));
        let source = Value::from(json!({ "extra": 1 }));
        let (t, s) = (target.as_map().unwrap(), source.as_map().unwrap());
        t.borrow_mut().insert("child".to_string(), target.clone());
        s.borrow_mut().insert("child".to_string(), source.clone());

        merge_shared(t, s, MergeMode::Alias);

        assert_eq!(t.borrow()["extra"], Value::from(1));
        assert!(Rc::ptr_eq(t.borrow()["child"].as_map().unwrap(), t));
    }

    #[test]
    fn test_visited_mappings_stay_alive_for_the_whole_call() {
        let target = Value::from(json!({ "style": { "color": "red" } }));
        let source = Value::from(json!({ "style": { "color": "blue" } }));
        let (t, s) = (target.as_map().unwrap(), source.as_map().unwrap());
        let nested = Rc::clone(t.borrow()["style"].as_map().unwrap());
        let before = Rc::strong_count(&nested);

        let mut merger = Merger::new(MergeMode::DeepCopy);
        merger.merge_shared(t, s);
        // Overwriting the nested target does not free it while the merger runs
        t.borrow_mut().insert("style".to_string(), Value::Null);
        assert_eq!(Rc::strong_count(&nested), before);

        drop(merger);
        assert_eq!(Rc::strong_count(&nested), before - 1);
        assert_eq!(nested.borrow()["color"], Value::from("blue"));
    }

    #[test]
    fn test_deep_copy_preserves_cycles_and_sharing() {
        let root = Value::from(json!({ "shared": { "n": 1 } }));
        let root_map = root.as_map().unwrap();
        let shared = root_map.borrow()["shared"].clone();
        root_map.borrow_mut().insert("again".to_string(), shared);
        root_map.borrow_mut().insert("me".to_string(), root.clone());

        let copy = deep_copy(&root);
        let copy_map = copy.as_map().unwrap();
        let copy_ref = copy_map.borrow();

        assert!(!Rc::ptr_eq(copy_map, root_map));
        assert!(Rc::ptr_eq(copy_ref["me"].as_map().unwrap(), copy_map));
        assert!(Rc::ptr_eq(
            copy_ref["shared"].as_map().unwrap(),
            copy_ref["again"].as_map().unwrap()
        ));
    }
}
