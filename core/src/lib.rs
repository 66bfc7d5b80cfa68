//! Core types, definition validation, and instance binding for form
//! schemas.
//!
//! This crate defines the foundational pieces for declaring the shape of a
//! form — a named, nested schema of elements, attributes, choices, and
//! cross-form references, each carrying a multiplicity constraint — and for
//! reconciling that shape against external data:
//!
//! - [`FormDefinition`] and [`NodeDefinition`] — the immutable definition
//!   tree (elements, attributes, single-element choices, form references,
//!   and opaque extension nodes).
//! - [`Cardinality`] — the multiplicity constraints (`required`,
//!   `required+`, `optional`, `optional+`, `prohibited`).
//! - [`FormRegistry`] — the set of known forms keyed by `(group, id)`,
//!   with the global uniqueness pass.
//! - [`DefinitionValidator`] — design-time validation of definition trees
//!   against the registry's key set.
//! - [`InstanceBinder`] — run-time reconciliation of a definition tree
//!   against a [`BindingSource`], producing a [`FormInstance`].
//! - [`ExtensionValidator`] / [`ExtensionBinder`] — the contracts plugin
//!   node kinds are delegated through.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let form = FormDefinition::new("person", "people.json")
//!     .with_group("hr")
//!     .with_child(ElementDefinition::new("name", "name"))
//!     .with_child(
//!         ElementDefinition::new("phone", "phone")
//!             .with_cardinality(Cardinality::OptionalMultiple),
//!     );
//!
//! let registry = FormRegistry::from_forms(vec![form]).unwrap();
//! assert!(registry.validate_all(&[]).is_ok());
//! ```

mod bind;
mod error;
mod instance;
mod path;
mod registry;
mod types;
mod validate;

pub use bind::{
    BindContext, BindingContext, BindingSource, DEFAULT_MAX_REFERENCE_DEPTH, ExtensionBinder,
    InstanceBinder,
};
pub use error::{ErrorKind, Result, SchemaError};
pub use instance::{
    AttributeInstance, ElementInstance, ExtensionInstance, FormInstance, InstanceNode,
};
pub use path::NodePath;
pub use registry::FormRegistry;
pub use types::*;
pub use validate::{DefinitionValidator, ExtensionValidator, NodeContext};
