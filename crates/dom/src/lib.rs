//! DOM convenience helpers
//!
//! Declarative element construction on top of an arena-backed document:
//!
//! - [`merge`]: recursive property merging (nested mappings merge key by key)
//! - [`Document::build`] / [`ElementBuilder`]: create an element from a tag
//!   plus property and children batches, with an optional `onbuild` hook
//! - [`Document::append_children`]: append nodes, wrapping plain values as text
//! - [`iter`]: fold / map / for_each / times helpers
//!
//! ## Core Design
//!
//! ```text
//! BuildArg* → Document::build → merge / append_children → onbuild → NodeId
//!                                      ↓
//!                               DomArena (Vec<DomNode>)
//! ```
//!
//! Single-threaded: values share mappings through `Rc<RefCell<_>>`.

pub mod arena;
pub mod builder;
pub mod document;
pub mod error;
pub mod iter;
pub mod merge;
pub mod serializer;
pub mod types;
pub mod value;

pub use arena::DomArena;
pub use builder::{BuildArg, ElementBuilder};
pub use document::{Document, DocumentConfig, NodeMut};
pub use error::{DomError, Result};
pub use merge::{deep_copy, merge, merge_shared, MergeMode};
pub use serializer::{DomSerializer, SerializerConfig};
pub use types::*;
pub use value::{properties_from_json, properties_to_json, Hook, MapRef, PropertyMap, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_default_merge_shares_style_between_elements() {
        init_logging();
        let mut doc = Document::new();

        let shared_style = properties_from_json(json!({ "style": { "margin": "0" } })).unwrap();
        let label = ElementBuilder::new("label")
            .properties(shared_style.clone())
            .property("htmlFor", "name")
            .child("Name")
            .build(&mut doc)
            .unwrap();
        let own = json!({ "id": "name", "style": { "width": "10em" } });
        let input = ElementBuilder::new("input")
            .properties(shared_style)
            .properties(properties_from_json(own).unwrap())
            .on_build(|node| node.set("value", "anonymous"))
            .build(&mut doc)
            .unwrap();
        let form = doc
            .build_values("form", [Value::List(vec![Value::Node(label), Value::Node(input)])])
            .unwrap();

        assert_eq!(
            doc.to_html(form).unwrap(),
            concat!(
                r#"<form><label for="name" style="margin: 0; width: 10em">Name</label>"#,
                r#"<input id="name" style="margin: 0; width: 10em" value="anonymous">"#,
                r#"</input></form>"#
            )
        );
    }
}
