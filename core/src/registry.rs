//! Read-only registry of known forms.

use std::collections::{HashMap, HashSet};

use crate::error::{ErrorKind, Result};
use crate::types::{FormDefinition, FormKey};
use crate::validate::{DefinitionValidator, ExtensionValidator};

/// The set of all known forms, indexed by normalized `(group, id)` key.
///
/// Built once from a finite collection of form definitions and read-only
/// thereafter. Construction performs the registry-level uniqueness pass:
/// two forms sharing a key are rejected, citing both forms' provenance.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FormDefinition, FormKey, FormRegistry};
///
/// let registry = FormRegistry::from_forms(vec![
///     FormDefinition::new("person", "people.json").with_group("hr"),
///     FormDefinition::new("address", "places.json").with_group("hr"),
/// ])
/// .unwrap();
///
/// assert_eq!(registry.len(), 2);
/// assert!(registry.lookup(&FormKey::new("hr", "person")).is_some());
/// assert!(registry.lookup(&FormKey::new("", "person")).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    forms: HashMap<FormKey, FormDefinition>,
    order: Vec<FormKey>,
}

impl FormRegistry {
    /// Builds a registry, rejecting duplicate form keys.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DuplicateForm`] when two forms normalize to the same
    /// key; the first occurrence's provenance is cited first.
    pub fn from_forms(forms: Vec<FormDefinition>) -> Result<Self> {
        let mut registry = Self::default();
        for form in forms {
            let key = form.key();
            if let Some(existing) = registry.forms.get(&key) {
                return Err(ErrorKind::DuplicateForm {
                    key,
                    first: existing.source.clone(),
                    second: form.source.clone(),
                }
                .into());
            }
            registry.order.push(key.clone());
            registry.forms.insert(key, form);
        }
        Ok(registry)
    }

    /// Looks a form up by key.
    pub fn lookup(&self, key: &FormKey) -> Option<&FormDefinition> {
        self.forms.get(key)
    }

    /// The set of keys handed to the validator for reference resolution.
    pub fn known_keys(&self) -> HashSet<FormKey> {
        self.forms.keys().cloned().collect()
    }

    /// Forms in registration order.
    pub fn forms(&self) -> impl Iterator<Item = &FormDefinition> {
        self.order.iter().filter_map(|key| self.forms.get(key))
    }

    /// Number of registered forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Returns `true` when no forms are registered.
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Validates every registered form, stopping at the first failure.
    ///
    /// Callers wanting a different aggregation policy can drive
    /// [`DefinitionValidator::validate_form`] themselves.
    pub fn validate_all(&self, extensions: &[Box<dyn ExtensionValidator>]) -> Result<()> {
        let known_keys = self.known_keys();
        let validator = DefinitionValidator::with_extensions(&known_keys, extensions);
        for form in self.forms() {
            validator.validate_form(form)?;
        }
        Ok(())
    }
}
