use serde::{Deserialize, Serialize};

use form_schema_core::FormDefinition;

/// Serializable definition bundle: one document holding one or more forms.
///
/// Documents are the concrete syntax the loader reads from disk (JSON or
/// YAML); parsing a document yields plain [`FormDefinition`] trees ready
/// for the registry.
///
/// # Examples
///
/// ```
/// use form_schema_core::FormDefinition;
/// use form_schema_source::FormDocument;
///
/// let mut document = FormDocument::new();
/// document.name = Some("hr-forms".into());
/// document.forms.push(FormDefinition::new("person", "people.json"));
///
/// assert_eq!(document.form_count(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormDocument {
    /// Optional document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional document description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Form definitions included in this document.
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
}

impl FormDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of forms in this document.
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }
}
