//! Bound instance trees.
//!
//! The binder produces a freshly allocated tree, separate from the
//! definition tree it was bound against; instance nodes carry their own
//! copies of the definition identity (id, lookup) and are never written
//! back into definitions.

use serde::Serialize;

use crate::types::FormKey;

/// The multiplicity-checked result of binding one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormInstance {
    /// Key of the form that was bound.
    pub key: FormKey,
    /// Bound child nodes; choice and form-reference subtrees are spliced
    /// in at the position of the defining node.
    pub children: Vec<InstanceNode>,
}

impl FormInstance {
    /// Finds a direct child element by definition id.
    pub fn find_element(&self, id: &str) -> Option<&ElementInstance> {
        self.children.iter().find_map(|child| match child {
            InstanceNode::Element(element) if element.id == id => Some(element),
            _ => None,
        })
    }

    /// Counts direct child elements with the given definition id.
    pub fn element_count(&self, id: &str) -> usize {
        self.children
            .iter()
            .filter(|child| matches!(child, InstanceNode::Element(element) if element.id == id))
            .count()
    }
}

/// One node of a bound instance tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InstanceNode {
    Element(ElementInstance),
    Attribute(AttributeInstance),
    Extension(ExtensionInstance),
}

impl InstanceNode {
    /// The defining node's id, when it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            InstanceNode::Element(element) => Some(&element.id),
            InstanceNode::Attribute(attribute) => Some(&attribute.id),
            InstanceNode::Extension(extension) => extension.id.as_deref(),
        }
    }
}

/// One bound occurrence of an element definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementInstance {
    /// Defining element's id.
    pub id: String,
    /// Lookup key that selected the data.
    pub lookup: String,
    /// Children bound under this occurrence's context.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InstanceNode>,
}

/// A bound attribute with its value from the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeInstance {
    /// Defining attribute's id.
    pub id: String,
    /// Lookup key that selected the data.
    pub lookup: String,
    /// Value reported by the binding source.
    pub value: String,
    /// Extension sub-instances, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InstanceNode>,
}

/// A sub-instance produced by an extension binder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionInstance {
    /// Extension identity of the defining node.
    pub name: String,
    /// Defining node's id, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Opaque payload the extension attached; never inspected by the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Sub-bindings the extension attached.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InstanceNode>,
}
