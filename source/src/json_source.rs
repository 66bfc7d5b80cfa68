//! A [`BindingSource`] over a JSON document.

use std::cell::RefCell;
use std::io::Read;

use serde_json::Value;

use form_schema_core::{BindingContext, BindingSource, FormKey};

use crate::error::Result;

/// Binds form definitions against a [`serde_json::Value`] tree.
///
/// Element lookups index object members: an array member fans out to one
/// binding context per item, any other non-null member yields a single
/// context. Attribute lookups accept scalar members only (strings are
/// returned verbatim, numbers and booleans in their JSON rendering). A
/// form root is considered present wherever the context value is an
/// object.
///
/// Contexts are indices into an internal arena of values, registered
/// lazily as the binder descends. The arena uses interior mutability and
/// is not shareable across threads; binding is sequential and single-owner
/// by design.
///
/// # Examples
///
/// ```
/// use form_schema_core::{BindingContext, BindingSource};
/// use form_schema_source::JsonBindingSource;
/// use serde_json::json;
///
/// let source = JsonBindingSource::new(json!({
///     "name": "Ada",
///     "phone": [{"kind": "home"}, {"kind": "work"}],
/// }));
///
/// assert_eq!(source.elements(&BindingContext::ROOT, "phone").len(), 2);
/// assert_eq!(
///     source.attribute(&BindingContext::ROOT, "name"),
///     Some("Ada".to_string()),
/// );
/// ```
#[derive(Debug)]
pub struct JsonBindingSource {
    nodes: RefCell<Vec<Value>>,
}

impl JsonBindingSource {
    /// Creates a source rooted at `value`; [`BindingContext::ROOT`] maps
    /// to it.
    pub fn new(value: Value) -> Self {
        Self {
            nodes: RefCell::new(vec![value]),
        }
    }

    /// Parses a JSON document from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(Self::new(serde_json::from_reader(reader)?))
    }

    fn value_at(&self, context: &BindingContext) -> Option<Value> {
        self.nodes.borrow().get(context.token() as usize).cloned()
    }

    fn register(&self, value: Value) -> BindingContext {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(value);
        BindingContext::new((nodes.len() - 1) as u64)
    }
}

impl BindingSource for JsonBindingSource {
    fn elements(&self, context: &BindingContext, lookup: &str) -> Vec<BindingContext> {
        let Some(value) = self.value_at(context) else {
            return Vec::new();
        };
        match value.get(lookup) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.register(item.clone()))
                .collect(),
            Some(member) => vec![self.register(member.clone())],
        }
    }

    fn attribute(&self, context: &BindingContext, lookup: &str) -> Option<String> {
        let value = self.value_at(context)?;
        match value.get(lookup)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn has_form(&self, context: &BindingContext, _key: &FormKey) -> bool {
        self.value_at(context).is_some_and(|value| value.is_object())
    }
}
