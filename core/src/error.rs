//! Error taxonomy for definition validation and instance binding.
//!
//! Every failure renders the bracketed wire format `[<Kind> is <problem>:
//! <value>]`; when a node path is attached the rendered form is
//! `<error>, <path>`. The message text is the sole diagnostic payload, so
//! the format strings here are load-bearing for conformance.

use thiserror::Error;

use crate::path::NodePath;
use crate::types::FormKey;

/// Convenience alias for results carrying a [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

/// The specific violation detected during validation or binding.
///
/// Variants fall into five groups: format (malformed id/group/lookup/
/// cardinality token), uniqueness (duplicate ids, forms, references,
/// ambiguous choices), resolution (unresolvable or cyclic references),
/// cardinality (bound count violates the declared multiplicity), and
/// extension (raised by or about a plugin).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Identifier does not match `[A-Za-z_][A-Za-z0-9_-]*`.
    #[error("[ID is not valid: {0}]")]
    InvalidId(String),
    /// Group is non-empty and does not match the identifier pattern.
    #[error("[Group is not valid: {0}]")]
    InvalidGroup(String),
    /// Element or attribute declares no lookup key.
    #[error("[Lookup is not present: {0}]")]
    MissingLookup(String),
    /// Declared cardinality token is outside the allowed set for its
    /// context, or absent with no derivable default.
    #[error("[Cardinality is not valid: {0}]")]
    InvalidCardinality(String),
    /// Form carries no source provenance.
    #[error("[Source is not present: {0}]")]
    MissingSource(FormKey),
    /// A node kind appears under a parent that does not admit it.
    #[error("[{kind} is not allowed: {token}]")]
    ChildNotAllowed {
        kind: &'static str,
        token: String,
    },

    /// Two sibling nodes, or a choice branch and an ancestor choice, share
    /// an id.
    #[error("[ID is not unique: {0}]")]
    DuplicateId(String),
    /// Two forms share a normalized `(group, id)` key.
    #[error("[Form is not unique: {key}, ({first}), ({second})]")]
    DuplicateForm {
        key: FormKey,
        first: String,
        second: String,
    },
    /// Two sibling form references resolve to the same key.
    #[error("[Form reference is not unique: {0}]")]
    DuplicateReference(FormKey),
    /// More than one choice alternative bound data.
    #[error("[Multiple single elements are present: {0}]")]
    AmbiguousChoice(String),

    /// Form reference target is not in the registry.
    #[error("[Form reference can not be resolved: {0}]")]
    UnresolvedReference(FormKey),
    /// Reference expansion exceeded the configured depth bound.
    #[error("[Form reference is cyclic: {0}]")]
    CyclicReference(FormKey),

    /// A form root required by a binding is absent from the source.
    #[error("[Form is not present: {0}]")]
    FormMissing(FormKey),
    /// A prohibited form inclusion found its root in the source.
    #[error("[Prohibited form is present: {0}]")]
    ProhibitedFormPresent(FormKey),
    #[error("[Required element is not present: {0}]")]
    RequiredElementMissing(String),
    #[error("[Required element is present more than once: {0}]")]
    RequiredElementRepeated(String),
    #[error("[Optional element is present more than once: {0}]")]
    OptionalElementRepeated(String),
    #[error("[Prohibited element is present: {0}]")]
    ProhibitedElementPresent(String),
    #[error("[Required attribute is not present: {0}]")]
    RequiredAttributeMissing(String),
    #[error("[Prohibited attribute is present: {0}]")]
    ProhibitedAttributePresent(String),
    #[error("[Required single element is not present: {0}]")]
    RequiredChoiceMissing(String),
    #[error("[Prohibited single element is present: {0}]")]
    ProhibitedChoicePresent(String),

    /// No supplied extension implementation accepted the node.
    #[error("[Extension is not supported: {0}]")]
    UnsupportedExtension(String),
    /// Opaque failure raised by an extension implementation.
    #[error("[Extension failed: {0}]")]
    Extension(String),
}

impl ErrorKind {
    /// Attaches the accumulated node path, producing a [`SchemaError`].
    pub fn at(self, path: NodePath) -> SchemaError {
        SchemaError { kind: self, path }
    }
}

/// A validation or binding failure paired with the ancestry trail at the
/// point of detection.
///
/// # Examples
///
/// ```
/// use form_schema_core::{ErrorKind, NodePath};
///
/// let path = NodePath::root()
///     .child("{people.json}form[@hr:person]")
///     .child("element[@name]");
/// let error = ErrorKind::RequiredElementMissing("element[@name]".into()).at(path);
/// assert_eq!(
///     error.to_string(),
///     "[Required element is not present: element[@name]], \
///      {people.json}form[@hr:person]/element[@name]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    kind: ErrorKind,
    path: NodePath,
}

impl SchemaError {
    /// The violation that was detected.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The ancestry trail accumulated up to and including the offending
    /// node; empty for registry-level failures.
    pub fn path(&self) -> &NodePath {
        &self.path
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}, {}", self.kind, self.path)
        }
    }
}

impl std::error::Error for SchemaError {}

impl From<ErrorKind> for SchemaError {
    fn from(kind: ErrorKind) -> Self {
        kind.at(NodePath::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_exact() {
        assert_eq!(
            ErrorKind::InvalidId("-id".into()).to_string(),
            "[ID is not valid: -id]"
        );
        assert_eq!(
            ErrorKind::UnresolvedReference(FormKey::new("group", "id2")).to_string(),
            "[Form reference can not be resolved: @group:id2]"
        );
        assert_eq!(
            ErrorKind::DuplicateForm {
                key: FormKey::new("group", "id1"),
                first: "source1".into(),
                second: "source1".into(),
            }
            .to_string(),
            "[Form is not unique: @group:id1, (source1), (source1)]"
        );
        assert_eq!(
            ErrorKind::AmbiguousChoice("single-element[@payment]".into()).to_string(),
            "[Multiple single elements are present: single-element[@payment]]"
        );
    }

    #[test]
    fn test_pathless_error_renders_without_suffix() {
        let error: SchemaError = ErrorKind::InvalidGroup("9g".into()).into();
        assert_eq!(error.to_string(), "[Group is not valid: 9g]");
        assert!(error.path().is_empty());
    }

    #[test]
    fn test_path_suffix_joins_ancestors() {
        let path = NodePath::root().child("{f}form[@:a]").child("element[@b]");
        let error = ErrorKind::DuplicateId("b".into()).at(path);
        assert_eq!(
            error.to_string(),
            "[ID is not unique: b], {f}form[@:a]/element[@b]"
        );
    }
}
