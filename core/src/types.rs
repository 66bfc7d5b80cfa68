//! Definition model for form schemas.
//!
//! This module defines the immutable value types that represent a form
//! schema tree. The types are designed for serialization with [`serde`] and
//! round-trip through JSON and YAML documents; once built they are consumed
//! read-only by the validator and the binder.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, SchemaError};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_-]*$").expect("static regex must compile"));

/// Checks whether `value` is a well-formed node identifier.
///
/// Identifiers must be non-empty, start with an ASCII letter or underscore,
/// and continue with ASCII letters, digits, underscores, or dashes.
///
/// # Examples
///
/// ```
/// use form_schema_core::is_valid_identifier;
///
/// assert!(is_valid_identifier("person"));
/// assert!(is_valid_identifier("_list-2"));
/// assert!(!is_valid_identifier("2fast"));
/// assert!(!is_valid_identifier(""));
/// ```
pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}

/// Checks whether `value` is a well-formed group name.
///
/// Groups follow the identifier pattern but may also be empty; an empty
/// group is the normalized form of an absent group.
pub fn is_valid_group(value: &str) -> bool {
    value.is_empty() || IDENTIFIER_RE.is_match(value)
}

/// Declared multiplicity constraint of a schema node.
///
/// Each variant has a canonical token form used verbatim in documents and
/// diagnostics: `required`, `required+`, `optional`, `optional+`,
/// `prohibited`.
///
/// # Examples
///
/// ```
/// use form_schema_core::Cardinality;
///
/// assert_eq!(Cardinality::RequiredMultiple.token(), "required+");
/// assert_eq!(Cardinality::from_token("optional"), Some(Cardinality::Optional));
/// assert!(Cardinality::Optional.allows_absent());
/// assert!(!Cardinality::Required.allows_multiple());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one occurrence.
    #[serde(rename = "required")]
    Required,
    /// One or more occurrences.
    #[serde(rename = "required+")]
    RequiredMultiple,
    /// Zero or one occurrence.
    #[serde(rename = "optional")]
    Optional,
    /// Zero or more occurrences.
    #[serde(rename = "optional+")]
    OptionalMultiple,
    /// No occurrence allowed.
    #[serde(rename = "prohibited")]
    Prohibited,
}

/// Every cardinality, in declaration order. Useful for building allowed
/// sets in [`CardinalityRule`]s.
pub const ALL_CARDINALITIES: [Cardinality; 5] = [
    Cardinality::Required,
    Cardinality::RequiredMultiple,
    Cardinality::Optional,
    Cardinality::OptionalMultiple,
    Cardinality::Prohibited,
];

/// How a bound occurrence count violates a [`Cardinality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityViolation {
    /// A required node produced no occurrence.
    Absent,
    /// A single-occurrence node produced more than one.
    Repeated,
    /// A prohibited node produced an occurrence.
    Present,
}

impl Cardinality {
    /// Returns the canonical token form.
    pub fn token(&self) -> &'static str {
        match self {
            Cardinality::Required => "required",
            Cardinality::RequiredMultiple => "required+",
            Cardinality::Optional => "optional",
            Cardinality::OptionalMultiple => "optional+",
            Cardinality::Prohibited => "prohibited",
        }
    }

    /// Parses a canonical token, returning `None` for anything else.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "required" => Some(Cardinality::Required),
            "required+" => Some(Cardinality::RequiredMultiple),
            "optional" => Some(Cardinality::Optional),
            "optional+" => Some(Cardinality::OptionalMultiple),
            "prohibited" => Some(Cardinality::Prohibited),
            _ => None,
        }
    }

    /// Returns `true` if zero occurrences satisfy this constraint.
    pub fn allows_absent(&self) -> bool {
        matches!(
            self,
            Cardinality::Optional | Cardinality::OptionalMultiple | Cardinality::Prohibited
        )
    }

    /// Returns `true` if more than one occurrence satisfies this constraint.
    pub fn allows_multiple(&self) -> bool {
        matches!(
            self,
            Cardinality::RequiredMultiple | Cardinality::OptionalMultiple
        )
    }

    /// Checks an occurrence count against this constraint.
    ///
    /// Returns `None` when `count` is acceptable, otherwise the kind of
    /// violation. Extension binders enforcing their own multiplicity rules
    /// can reuse this instead of re-deriving the case analysis.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::{Cardinality, CardinalityViolation};
    ///
    /// assert_eq!(Cardinality::Required.check(1), None);
    /// assert_eq!(Cardinality::Required.check(0), Some(CardinalityViolation::Absent));
    /// assert_eq!(Cardinality::Optional.check(2), Some(CardinalityViolation::Repeated));
    /// assert_eq!(Cardinality::Prohibited.check(1), Some(CardinalityViolation::Present));
    /// ```
    pub fn check(&self, count: usize) -> Option<CardinalityViolation> {
        match self {
            Cardinality::Required => match count {
                0 => Some(CardinalityViolation::Absent),
                1 => None,
                _ => Some(CardinalityViolation::Repeated),
            },
            Cardinality::RequiredMultiple => (count == 0).then_some(CardinalityViolation::Absent),
            Cardinality::Optional => (count > 1).then_some(CardinalityViolation::Repeated),
            Cardinality::OptionalMultiple => None,
            Cardinality::Prohibited => (count > 0).then_some(CardinalityViolation::Present),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Context-sensitive cardinality rule: the default applied when a node
/// declares nothing, and the set of tokens a declaration may use.
///
/// The standard contexts are provided as constructors; extension validators
/// and binders can build their own rule with [`CardinalityRule::new`] to
/// advertise a different allowed set for the sub-nodes they own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityRule {
    default: Option<Cardinality>,
    allowed: Vec<Cardinality>,
}

impl CardinalityRule {
    /// Builds a custom rule.
    pub fn new(default: Option<Cardinality>, allowed: impl Into<Vec<Cardinality>>) -> Self {
        Self {
            default,
            allowed: allowed.into(),
        }
    }

    /// Rule for elements, choices, and form references directly under a
    /// form or element: default `required`, any token allowed.
    pub fn element_under_form() -> Self {
        Self::new(Some(Cardinality::Required), ALL_CARDINALITIES)
    }

    /// Rule for element and choice alternatives under a choice: default
    /// `optional`, any token allowed.
    pub fn element_under_choice() -> Self {
        Self::new(Some(Cardinality::Optional), ALL_CARDINALITIES)
    }

    /// Rule for attributes directly under a form or element: default
    /// `required`, only `required` and `prohibited` may be declared.
    pub fn attribute_under_form() -> Self {
        Self::new(
            Some(Cardinality::Required),
            [Cardinality::Required, Cardinality::Prohibited],
        )
    }

    /// Resolves a declared cardinality against this rule.
    ///
    /// A declaration outside the allowed set, or no declaration when the
    /// rule has no default, yields [`ErrorKind::InvalidCardinality`] naming
    /// the attempted token (empty for an absent declaration).
    pub fn resolve(&self, declared: Option<Cardinality>) -> Result<Cardinality, ErrorKind> {
        match declared {
            Some(cardinality) if self.allowed.contains(&cardinality) => Ok(cardinality),
            Some(cardinality) => Err(ErrorKind::InvalidCardinality(cardinality.token().into())),
            None => self
                .default
                .ok_or_else(|| ErrorKind::InvalidCardinality(String::new())),
        }
    }
}

/// Normalized `(group, id)` identity of a form.
///
/// An absent group and an empty group are the same key. Keys render as
/// `@group:id` in diagnostics.
///
/// # Examples
///
/// ```
/// use form_schema_core::FormKey;
///
/// let key = FormKey::new("hr", "person");
/// assert_eq!(key.to_string(), "@hr:person");
///
/// let parsed: FormKey = "@hr:person".parse().unwrap();
/// assert_eq!(parsed, key);
///
/// let ungrouped: FormKey = "person".parse().unwrap();
/// assert_eq!(ungrouped, FormKey::new("", "person"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormKey {
    group: String,
    id: String,
}

impl FormKey {
    /// Creates a key from a group (empty for ungrouped) and an id.
    pub fn new(group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            id: id.into(),
        }
    }

    /// The normalized group, empty when ungrouped.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The form id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.group, self.id)
    }
}

impl FromStr for FormKey {
    type Err = SchemaError;

    /// Parses `[@][group:]id`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix('@').unwrap_or(s);
        let (group, id) = match raw.split_once(':') {
            Some((group, id)) => (group, id),
            None => ("", raw),
        };
        if !is_valid_group(group) {
            return Err(ErrorKind::InvalidGroup(group.to_string()).into());
        }
        if !is_valid_identifier(id) {
            return Err(ErrorKind::InvalidId(id.to_string()).into());
        }
        Ok(FormKey::new(group, id))
    }
}

/// A named, top-level schema unit keyed by `(group, id)`.
///
/// Forms are the roots of definition trees. The `source` field is a
/// provenance string (typically the document path) used only in
/// diagnostics.
///
/// # Examples
///
/// ```
/// use form_schema_core::{ElementDefinition, FormDefinition, FormKey};
///
/// let form = FormDefinition::new("person", "people.json")
///     .with_group("hr")
///     .with_child(ElementDefinition::new("name", "name"));
///
/// assert_eq!(form.key(), FormKey::new("hr", "person"));
/// assert_eq!(form.children.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Group the form belongs to; empty when ungrouped.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// Form id, unique within the group.
    pub id: String,
    /// Provenance string shown in diagnostics. A form loaded from disk
    /// carries the path of the document it was read from.
    #[serde(default)]
    pub source: String,
    /// Child nodes in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl FormDefinition {
    /// Creates an ungrouped form.
    pub fn new(id: &str, source: &str) -> Self {
        Self {
            group: String::new(),
            id: id.to_string(),
            source: source.to_string(),
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    /// Sets the group.
    pub fn with_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Returns the normalized registry key.
    pub fn key(&self) -> FormKey {
        FormKey::new(self.group.clone(), self.id.clone())
    }

    /// Diagnostic token for the form as a tree root: `{source}form[@group:id]`.
    pub fn root_token(&self) -> String {
        format!("{{{}}}form[@{}:{}]", self.source, self.group, self.id)
    }
}

/// A schema node matching zero or more items from the binding source via
/// its lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Node id, unique among siblings directly under a form or element.
    pub id: String,
    /// Lookup key presented to the binding source.
    pub lookup: String,
    /// Declared multiplicity; the context default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Child nodes in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl ElementDefinition {
    pub fn new(id: &str, lookup: &str) -> Self {
        Self {
            id: id.to_string(),
            lookup: lookup.to_string(),
            cardinality: None,
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Diagnostic token: `element[@id]`.
    pub fn path_token(&self) -> String {
        format!("element[@{}]", self.id)
    }
}

/// A schema node matching zero or one item from the binding source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Node id.
    pub id: String,
    /// Lookup key presented to the binding source.
    pub lookup: String,
    /// Declared multiplicity; the context default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Child nodes; only extension nodes are valid here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl AttributeDefinition {
    pub fn new(id: &str, lookup: &str) -> Self {
        Self {
            id: id.to_string(),
            lookup: lookup.to_string(),
            cardinality: None,
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Diagnostic token: `attribute[@id]`.
    pub fn path_token(&self) -> String {
        format!("attribute[@{}]", self.id)
    }
}

/// A choice ("single-element") node: its declared alternatives are mutually
/// exclusive at bind time and exactly one alternative's subtree survives.
///
/// A choice may be anonymous; its branches are exempt from the sibling
/// uniqueness rule but must not re-declare the id of an ancestor choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    /// Optional node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Declared multiplicity; the context default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Alternative subtrees in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl ChoiceDefinition {
    pub fn new(id: Option<&str>) -> Self {
        Self {
            id: id.map(String::from),
            cardinality: None,
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Diagnostic token: `single-element[@id]`, or bare `single-element`
    /// when anonymous.
    pub fn path_token(&self) -> String {
        match &self.id {
            Some(id) => format!("single-element[@{id}]"),
            None => "single-element".to_string(),
        }
    }
}

/// An inclusion point that splices another form's children into the
/// current position at bind time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormReferenceDefinition {
    /// Group of the referenced form; empty when ungrouped.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// Id of the referenced form.
    pub id: String,
    /// Declared multiplicity of the inclusion; consumed only by the binder
    /// (presence of the referenced form's root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Child nodes; only extension nodes are valid here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl FormReferenceDefinition {
    pub fn new(group: &str, id: &str) -> Self {
        Self {
            group: group.to_string(),
            id: id.to_string(),
            cardinality: None,
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Returns the normalized key of the referenced form.
    pub fn key(&self) -> FormKey {
        FormKey::new(self.group.clone(), self.id.clone())
    }

    /// Diagnostic token: `form-reference[@group:id]`.
    pub fn path_token(&self) -> String {
        format!("form-reference[@{}:{}]", self.group, self.id)
    }
}

/// An opaque, plugin-defined node.
///
/// The core never interprets an extension node; it forwards the node to the
/// first matching implementation in the caller-supplied extension list. The
/// `name` is the identity the extension matches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDefinition {
    /// Extension identity, owned by the extension implementation.
    pub name: String,
    /// Optional node id; semantics are plugin-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Declared multiplicity; interpretation is plugin-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Child nodes; any standard or extension kind, owned by the plugin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    /// Uninterpreted pass-through attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<String, String>,
}

impl ExtensionDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            cardinality: None,
            children: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeDefinition>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Diagnostic token: `name[@id]`, or the bare name without an id.
    pub fn path_token(&self) -> String {
        match &self.id {
            Some(id) => format!("{}[@{id}]", self.name),
            None => self.name.clone(),
        }
    }
}

/// A node in a definition tree.
///
/// The closed set of standard kinds plus the open [`Extension`] arm whose
/// payload the core only forwards to extension implementations.
///
/// [`Extension`]: NodeDefinition::Extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeDefinition {
    /// Repeating data-backed node.
    Element(ElementDefinition),
    /// At-most-once data-backed node.
    Attribute(AttributeDefinition),
    /// Discriminated choice between alternatives.
    #[serde(rename = "single-element")]
    Choice(ChoiceDefinition),
    /// Inclusion of another form.
    FormReference(FormReferenceDefinition),
    /// Opaque plugin-defined node.
    Extension(ExtensionDefinition),
}

impl NodeDefinition {
    /// Returns the node id when the kind carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            NodeDefinition::Element(element) => Some(&element.id),
            NodeDefinition::Attribute(attribute) => Some(&attribute.id),
            NodeDefinition::Choice(choice) => choice.id.as_deref(),
            NodeDefinition::FormReference(reference) => Some(&reference.id),
            NodeDefinition::Extension(extension) => extension.id.as_deref(),
        }
    }

    /// Diagnostic ancestor token for this node.
    pub fn path_token(&self) -> String {
        match self {
            NodeDefinition::Element(element) => element.path_token(),
            NodeDefinition::Attribute(attribute) => attribute.path_token(),
            NodeDefinition::Choice(choice) => choice.path_token(),
            NodeDefinition::FormReference(reference) => reference.path_token(),
            NodeDefinition::Extension(extension) => extension.path_token(),
        }
    }
}

impl From<ElementDefinition> for NodeDefinition {
    fn from(element: ElementDefinition) -> Self {
        NodeDefinition::Element(element)
    }
}

impl From<AttributeDefinition> for NodeDefinition {
    fn from(attribute: AttributeDefinition) -> Self {
        NodeDefinition::Attribute(attribute)
    }
}

impl From<ChoiceDefinition> for NodeDefinition {
    fn from(choice: ChoiceDefinition) -> Self {
        NodeDefinition::Choice(choice)
    }
}

impl From<FormReferenceDefinition> for NodeDefinition {
    fn from(reference: FormReferenceDefinition) -> Self {
        NodeDefinition::FormReference(reference)
    }
}

impl From<ExtensionDefinition> for NodeDefinition {
    fn from(extension: ExtensionDefinition) -> Self {
        NodeDefinition::Extension(extension)
    }
}

/// The node an extension node hangs off, handed to extension validators and
/// binders so they can apply parent-sensitive rules.
#[derive(Debug, Clone, Copy)]
pub enum ParentNode<'a> {
    Form(&'a FormDefinition),
    Element(&'a ElementDefinition),
    Attribute(&'a AttributeDefinition),
    Choice(&'a ChoiceDefinition),
    FormReference(&'a FormReferenceDefinition),
    Extension(&'a ExtensionDefinition),
}
