//! Definition document loading and binding sources for form schemas.
//!
//! This crate is the reference implementation of the two external
//! collaborators the core treats as boundaries:
//!
//! - the *definition source* — [`DefinitionSet`] loads [`FormDocument`]s
//!   (JSON or YAML) from files and directories, fills in provenance, and
//!   hands the result to the core registry;
//! - a *binding source* — [`JsonBindingSource`] matches element and
//!   attribute lookups against a JSON data document at bind time.
//!
//! # Quick start
//!
//! ```no_run
//! use form_schema_core::{FormKey, InstanceBinder};
//! use form_schema_source::{DefinitionSet, JsonBindingSource};
//!
//! let registry = DefinitionSet::from_dir("schemas/")
//!     .unwrap()
//!     .into_registry()
//!     .unwrap();
//! registry.validate_all(&[]).unwrap();
//!
//! let data = JsonBindingSource::new(serde_json::json!({"name": "Ada"}));
//! let binder = InstanceBinder::new(&registry, &data);
//! let instance = binder.bind_form(&FormKey::new("hr", "person")).unwrap();
//! println!("bound {} nodes", instance.children.len());
//! ```

mod document;
mod error;
mod json_source;
mod loader;

pub use document::FormDocument;
pub use error::{Result, SourceError};
pub use json_source::JsonBindingSource;
pub use loader::{DefinitionSet, DefinitionSetBuilder, DefinitionSource};
