//! Definition validation.
//!
//! Walks a definition tree top-down, enforcing per-kind rules against a
//! read-only set of known form keys: identifier and lookup formats,
//! context-sensitive cardinality, sibling id uniqueness, form-reference
//! resolution, and delegation to extension validators. Validation is
//! fail-fast: the first violation is returned with the ancestry trail
//! accumulated so far.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//! use form_schema_core::{DefinitionValidator, ElementDefinition, FormDefinition};
//!
//! let form = FormDefinition::new("person", "people.json")
//!     .with_child(ElementDefinition::new("name", "name"));
//!
//! let known_keys = HashSet::from([form.key()]);
//! let validator = DefinitionValidator::new(&known_keys);
//! assert!(validator.validate_form(&form).is_ok());
//! ```

use std::collections::HashSet;

use crate::error::{ErrorKind, Result};
use crate::path::NodePath;
use crate::types::{
    AttributeDefinition, CardinalityRule, ChoiceDefinition, ElementDefinition,
    ExtensionDefinition, FormDefinition, FormKey, FormReferenceDefinition, NodeDefinition,
    ParentNode, is_valid_group, is_valid_identifier,
};

/// Validation hook for one extension node kind.
///
/// Implementations are assembled by the caller into a list handed to the
/// [`DefinitionValidator`]; the first implementation whose [`matches`]
/// accepts a node owns it. The `validator` handle is re-entrant: an
/// extension owning standard-kind sub-nodes validates them by calling back
/// into the per-kind methods with a [`NodeContext`] of its choosing.
///
/// [`matches`]: ExtensionValidator::matches
pub trait ExtensionValidator {
    /// Returns `true` when this implementation owns `node`.
    fn matches(&self, node: &ExtensionDefinition) -> bool;

    /// Validates `node` and everything it contains.
    fn validate(
        &self,
        parent: ParentNode<'_>,
        node: &ExtensionDefinition,
        validator: &DefinitionValidator<'_>,
        ctx: &NodeContext,
    ) -> Result<()>;
}

/// Per-level validation context: the ancestry trail, the cardinality rules
/// the parent kind imposes on children, and the ids owned by ancestor
/// choices.
#[derive(Debug, Clone)]
pub struct NodeContext {
    path: NodePath,
    element_rule: CardinalityRule,
    attribute_rule: CardinalityRule,
    choice_ids: Vec<String>,
}

impl NodeContext {
    /// Context for the children of a form root.
    pub fn under_form(path: NodePath) -> Self {
        Self {
            path,
            element_rule: CardinalityRule::element_under_form(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            choice_ids: Vec::new(),
        }
    }

    /// Context with caller-chosen rules; the entry point for extension
    /// validators that advertise a different allowed set for the sub-nodes
    /// they own.
    pub fn custom(
        path: NodePath,
        element_rule: CardinalityRule,
        attribute_rule: CardinalityRule,
    ) -> Self {
        Self {
            path,
            element_rule,
            attribute_rule,
            choice_ids: Vec::new(),
        }
    }

    /// The ancestry trail up to the current node.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Rule applied to element, choice, and form-reference children.
    pub fn element_rule(&self) -> &CardinalityRule {
        &self.element_rule
    }

    /// Rule applied to attribute children.
    pub fn attribute_rule(&self) -> &CardinalityRule {
        &self.attribute_rule
    }

    /// Derives the context for the children of an element at `path`.
    fn element_scope(&self, path: NodePath) -> Self {
        Self {
            path,
            element_rule: CardinalityRule::element_under_form(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            choice_ids: self.choice_ids.clone(),
        }
    }

    /// Derives the context for the alternatives of a choice at `path`,
    /// recording the choice's own id for the ancestor-uniqueness rule.
    fn choice_scope(&self, path: NodePath, choice_id: Option<&str>) -> Self {
        let mut choice_ids = self.choice_ids.clone();
        if let Some(id) = choice_id {
            choice_ids.push(id.to_string());
        }
        Self {
            path,
            element_rule: CardinalityRule::element_under_choice(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            choice_ids,
        }
    }

    /// Derives the context for the extension children of an attribute or
    /// form reference at `path`.
    fn leaf_scope(&self, path: NodePath) -> Self {
        Self {
            path,
            element_rule: self.element_rule.clone(),
            attribute_rule: self.attribute_rule.clone(),
            choice_ids: self.choice_ids.clone(),
        }
    }

    fn owns_choice_id(&self, id: &str) -> bool {
        self.choice_ids.iter().any(|owned| owned == id)
    }
}

/// Kinds a parent admits as direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildPolicy {
    /// Form/element: every kind.
    Any,
    /// Choice: element, choice, and extension alternatives.
    Alternatives,
    /// Attribute/form reference: extension only.
    ExtensionOnly,
}

impl ChildPolicy {
    fn admits(&self, child: &NodeDefinition) -> bool {
        match self {
            ChildPolicy::Any => true,
            ChildPolicy::Alternatives => matches!(
                child,
                NodeDefinition::Element(_)
                    | NodeDefinition::Choice(_)
                    | NodeDefinition::Extension(_)
            ),
            ChildPolicy::ExtensionOnly => matches!(child, NodeDefinition::Extension(_)),
        }
    }
}

fn rejected_kind(child: &NodeDefinition) -> &'static str {
    match child {
        NodeDefinition::Element(_) => "Element",
        NodeDefinition::Attribute(_) => "Attribute",
        NodeDefinition::Choice(_) => "Single element",
        NodeDefinition::FormReference(_) => "Form reference",
        NodeDefinition::Extension(_) => "Extension",
    }
}

/// Walks definition trees and enforces the per-kind rules.
///
/// Holds the read-only set of valid form keys (typically
/// [`FormRegistry::known_keys`](crate::FormRegistry::known_keys)) and the
/// caller-assembled extension validator list. Validation of the same form
/// against the same key set is a pure function of its inputs.
pub struct DefinitionValidator<'a> {
    known_keys: &'a HashSet<FormKey>,
    extensions: &'a [Box<dyn ExtensionValidator>],
}

impl<'a> DefinitionValidator<'a> {
    /// Creates a validator with no extension support.
    pub fn new(known_keys: &'a HashSet<FormKey>) -> Self {
        Self {
            known_keys,
            extensions: &[],
        }
    }

    /// Creates a validator delegating extension nodes to `extensions`,
    /// first match wins.
    pub fn with_extensions(
        known_keys: &'a HashSet<FormKey>,
        extensions: &'a [Box<dyn ExtensionValidator>],
    ) -> Self {
        Self {
            known_keys,
            extensions,
        }
    }

    /// Validates one form and, transitively, everything it contains.
    pub fn validate_form(&self, form: &FormDefinition) -> Result<()> {
        let path = NodePath::root().child(form.root_token());
        if form.source.trim().is_empty() {
            return Err(ErrorKind::MissingSource(form.key()).at(path));
        }
        if !is_valid_group(&form.group) {
            return Err(ErrorKind::InvalidGroup(form.group.clone()).at(path));
        }
        if !is_valid_identifier(&form.id) {
            return Err(ErrorKind::InvalidId(form.id.clone()).at(path));
        }
        let ctx = NodeContext::under_form(path);
        self.validate_children(
            ParentNode::Form(form),
            &form.children,
            &ctx,
            ChildPolicy::Any,
            true,
        )
    }

    /// Validates an element and its subtree under `ctx`.
    pub fn validate_element(&self, element: &ElementDefinition, ctx: &NodeContext) -> Result<()> {
        let path = ctx.path().child(element.path_token());
        if !is_valid_identifier(&element.id) {
            return Err(ErrorKind::InvalidId(element.id.clone()).at(path));
        }
        if ctx.owns_choice_id(&element.id) {
            return Err(ErrorKind::DuplicateId(element.id.clone()).at(path));
        }
        if element.lookup.trim().is_empty() {
            return Err(ErrorKind::MissingLookup(element.path_token()).at(path));
        }
        if let Err(kind) = ctx.element_rule().resolve(element.cardinality) {
            return Err(kind.at(path));
        }
        let child_ctx = ctx.element_scope(path);
        self.validate_children(
            ParentNode::Element(element),
            &element.children,
            &child_ctx,
            ChildPolicy::Any,
            true,
        )
    }

    /// Validates an attribute under `ctx`; children may only be extensions.
    pub fn validate_attribute(
        &self,
        attribute: &AttributeDefinition,
        ctx: &NodeContext,
    ) -> Result<()> {
        let path = ctx.path().child(attribute.path_token());
        if !is_valid_identifier(&attribute.id) {
            return Err(ErrorKind::InvalidId(attribute.id.clone()).at(path));
        }
        if attribute.lookup.trim().is_empty() {
            return Err(ErrorKind::MissingLookup(attribute.path_token()).at(path));
        }
        if let Err(kind) = ctx.attribute_rule().resolve(attribute.cardinality) {
            return Err(kind.at(path));
        }
        let child_ctx = ctx.leaf_scope(path);
        self.validate_children(
            ParentNode::Attribute(attribute),
            &attribute.children,
            &child_ctx,
            ChildPolicy::ExtensionOnly,
            false,
        )
    }

    /// Validates a choice and its alternatives under `ctx`.
    ///
    /// Alternatives are exempt from sibling id uniqueness but must not
    /// re-declare the id of this or any ancestor choice.
    pub fn validate_choice(&self, choice: &ChoiceDefinition, ctx: &NodeContext) -> Result<()> {
        let path = ctx.path().child(choice.path_token());
        if let Some(id) = &choice.id {
            if !is_valid_identifier(id) {
                return Err(ErrorKind::InvalidId(id.clone()).at(path));
            }
            if ctx.owns_choice_id(id) {
                return Err(ErrorKind::DuplicateId(id.clone()).at(path));
            }
        }
        if let Err(kind) = ctx.element_rule().resolve(choice.cardinality) {
            return Err(kind.at(path));
        }
        let child_ctx = ctx.choice_scope(path, choice.id.as_deref());
        self.validate_children(
            ParentNode::Choice(choice),
            &choice.children,
            &child_ctx,
            ChildPolicy::Alternatives,
            false,
        )
    }

    /// Validates a form reference under `ctx`: identifier format, declared
    /// cardinality, and key existence in the known set. Resolution is
    /// existence-only; the referenced form is not walked.
    pub fn validate_form_reference(
        &self,
        reference: &FormReferenceDefinition,
        ctx: &NodeContext,
    ) -> Result<()> {
        let path = ctx.path().child(reference.path_token());
        if !is_valid_group(&reference.group) {
            return Err(ErrorKind::InvalidGroup(reference.group.clone()).at(path));
        }
        if !is_valid_identifier(&reference.id) {
            return Err(ErrorKind::InvalidId(reference.id.clone()).at(path));
        }
        if let Err(kind) = ctx.element_rule().resolve(reference.cardinality) {
            return Err(kind.at(path));
        }
        let key = reference.key();
        if !self.known_keys.contains(&key) {
            return Err(ErrorKind::UnresolvedReference(key).at(path));
        }
        let child_ctx = ctx.leaf_scope(path);
        self.validate_children(
            ParentNode::FormReference(reference),
            &reference.children,
            &child_ctx,
            ChildPolicy::ExtensionOnly,
            false,
        )
    }

    /// Delegates an extension node to the first matching implementation.
    pub fn validate_extension(
        &self,
        parent: ParentNode<'_>,
        node: &ExtensionDefinition,
        ctx: &NodeContext,
    ) -> Result<()> {
        for extension in self.extensions {
            if extension.matches(node) {
                return extension.validate(parent, node, self, ctx);
            }
        }
        let path = ctx.path().child(node.path_token());
        Err(ErrorKind::UnsupportedExtension(node.name.clone()).at(path))
    }

    /// One pass over a node's children: kind gating, sibling id
    /// uniqueness, sibling reference-key uniqueness, and recursion.
    fn validate_children(
        &self,
        parent: ParentNode<'_>,
        children: &[NodeDefinition],
        ctx: &NodeContext,
        policy: ChildPolicy,
        unique_siblings: bool,
    ) -> Result<()> {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut seen_references: HashSet<FormKey> = HashSet::new();

        for child in children {
            if !policy.admits(child) {
                let token = child.path_token();
                return Err(ErrorKind::ChildNotAllowed {
                    kind: rejected_kind(child),
                    token: token.clone(),
                }
                .at(ctx.path().child(token)));
            }

            if unique_siblings
                && matches!(child, NodeDefinition::Element(_) | NodeDefinition::Choice(_))
            {
                if let Some(id) = child.id() {
                    if !seen_ids.insert(id) {
                        return Err(ErrorKind::DuplicateId(id.to_string())
                            .at(ctx.path().child(child.path_token())));
                    }
                }
            }

            match child {
                NodeDefinition::Element(element) => self.validate_element(element, ctx)?,
                NodeDefinition::Attribute(attribute) => self.validate_attribute(attribute, ctx)?,
                NodeDefinition::Choice(choice) => self.validate_choice(choice, ctx)?,
                NodeDefinition::FormReference(reference) => {
                    let key = reference.key();
                    if !seen_references.insert(key.clone()) {
                        return Err(ErrorKind::DuplicateReference(key)
                            .at(ctx.path().child(reference.path_token())));
                    }
                    self.validate_form_reference(reference, ctx)?;
                }
                NodeDefinition::Extension(extension) => {
                    self.validate_extension(parent, extension, ctx)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cardinality;

    fn keys(pairs: &[(&str, &str)]) -> HashSet<FormKey> {
        pairs
            .iter()
            .map(|(group, id)| FormKey::new(*group, *id))
            .collect()
    }

    fn validate(form: &FormDefinition, known: &HashSet<FormKey>) -> Result<()> {
        DefinitionValidator::new(known).validate_form(form)
    }

    #[test]
    fn test_minimal_form_is_valid() {
        let form = FormDefinition::new("person", "people.json").with_group("hr");
        assert!(validate(&form, &keys(&[("hr", "person")])).is_ok());
    }

    #[test]
    fn test_minimal_ungrouped_form_is_valid() {
        let form = FormDefinition::new("_person-2", "people.json");
        assert!(validate(&form, &keys(&[("", "_person-2")])).is_ok());
    }

    #[test]
    fn test_form_without_source_is_rejected() {
        let form = FormDefinition::new("person", "  ");
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::MissingSource(FormKey::new("", "person"))
        );
    }

    #[test]
    fn test_leading_digit_id_is_rejected() {
        let form = FormDefinition::new("2person", "people.json");
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidId("2person".into()));
        assert_eq!(
            error.to_string(),
            "[ID is not valid: 2person], {people.json}form[@:2person]"
        );
    }

    #[test]
    fn test_leading_dash_id_is_rejected() {
        let form =
            FormDefinition::new("person", "people.json").with_child(ElementDefinition::new("-id", "x"));
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidId("-id".into()));
    }

    #[test]
    fn test_invalid_group_is_rejected() {
        let form = FormDefinition::new("person", "people.json").with_group("9to5");
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidGroup("9to5".into()));
    }

    #[test]
    fn test_element_requires_lookup() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(ElementDefinition::new("name", ""));
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::MissingLookup("element[@name]".into())
        );
        assert_eq!(
            error.to_string(),
            "[Lookup is not present: element[@name]], \
             {people.json}form[@:person]/element[@name]"
        );
    }

    #[test]
    fn test_duplicate_sibling_ids_are_rejected() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(ElementDefinition::new("name", "first"))
            .with_child(ElementDefinition::new("name", "last"));
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DuplicateId("name".into()));
    }

    #[test]
    fn test_element_and_choice_share_sibling_scope() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(ElementDefinition::new("contact", "contact"))
            .with_child(ChoiceDefinition::new(Some("contact")));
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DuplicateId("contact".into()));
    }

    #[test]
    fn test_choice_alternatives_may_share_ids() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ChoiceDefinition::new(Some("payment"))
                .with_child(ElementDefinition::new("account", "iban"))
                .with_child(ElementDefinition::new("account", "card")),
        );
        assert!(validate(&form, &keys(&[])).is_ok());
    }

    #[test]
    fn test_choice_branch_must_not_redeclare_ancestor_choice_id() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ChoiceDefinition::new(Some("payment"))
                .with_child(ElementDefinition::new("payment", "iban")),
        );
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DuplicateId("payment".into()));
    }

    #[test]
    fn test_nested_choice_redeclaring_outer_choice_id_is_rejected() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ChoiceDefinition::new(Some("outer")).with_child(
                ChoiceDefinition::new(Some("inner"))
                    .with_child(ElementDefinition::new("outer", "x")),
            ),
        );
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DuplicateId("outer".into()));
    }

    #[test]
    fn test_anonymous_choice_is_valid() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ChoiceDefinition::new(None).with_child(ElementDefinition::new("email", "email")),
        );
        assert!(validate(&form, &keys(&[])).is_ok());
    }

    #[test]
    fn test_attribute_cardinality_restricted_under_element() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ElementDefinition::new("name", "name").with_child(
                AttributeDefinition::new("lang", "lang").with_cardinality(Cardinality::Optional),
            ),
        );
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::InvalidCardinality("optional".into())
        );
        assert_eq!(
            error.to_string(),
            "[Cardinality is not valid: optional], \
             {people.json}form[@:person]/element[@name]/attribute[@lang]"
        );
    }

    #[test]
    fn test_attribute_prohibited_is_allowed() {
        let form = FormDefinition::new("person", "people.json").with_child(
            AttributeDefinition::new("legacy", "legacy").with_cardinality(Cardinality::Prohibited),
        );
        assert!(validate(&form, &keys(&[])).is_ok());
    }

    #[test]
    fn test_attribute_admits_extension_children_only() {
        let form = FormDefinition::new("person", "people.json").with_child(
            AttributeDefinition::new("age", "age")
                .with_child(ElementDefinition::new("inner", "inner")),
        );
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::ChildNotAllowed {
                kind: "Element",
                token: "element[@inner]".into(),
            }
        );
    }

    #[test]
    fn test_choice_rejects_attribute_alternative() {
        let form = FormDefinition::new("person", "people.json").with_child(
            ChoiceDefinition::new(Some("contact"))
                .with_child(AttributeDefinition::new("email", "email")),
        );
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::ChildNotAllowed {
                kind: "Attribute",
                token: "attribute[@email]".into(),
            }
        );
    }

    #[test]
    fn test_unresolved_reference_names_key() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(FormReferenceDefinition::new("group", "id2"));
        let error = validate(&form, &keys(&[("group", "id1")])).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Form reference can not be resolved: @group:id2], \
             {people.json}form[@:person]/form-reference[@group:id2]"
        );
    }

    #[test]
    fn test_duplicate_sibling_references_are_rejected() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(FormReferenceDefinition::new("hr", "address"))
            .with_child(FormReferenceDefinition::new("hr", "address"));
        let error = validate(&form, &keys(&[("hr", "address")])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::DuplicateReference(FormKey::new("hr", "address"))
        );
    }

    #[test]
    fn test_mutual_references_are_permitted() {
        let known = keys(&[("", "a"), ("", "b")]);
        let a = FormDefinition::new("a", "s").with_child(FormReferenceDefinition::new("", "b"));
        let b = FormDefinition::new("b", "s").with_child(FormReferenceDefinition::new("", "a"));
        assert!(validate(&a, &known).is_ok());
        assert!(validate(&b, &known).is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let known = keys(&[("", "other")]);
        let form = FormDefinition::new("person", "people.json")
            .with_child(ElementDefinition::new("name", "name"))
            .with_child(FormReferenceDefinition::new("", "other"));
        let first = validate(&form, &known);
        let second = validate(&form, &known);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let form = FormDefinition::new("person", "people.json")
            .with_child(ExtensionDefinition::new("grid"));
        let error = validate(&form, &keys(&[])).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Extension is not supported: grid], {people.json}form[@:person]/grid"
        );
    }

    /// Accepts `grid` nodes, relaxes the attribute rule for its children,
    /// and validates its standard-kind sub-nodes through the callback.
    struct GridValidator;

    impl ExtensionValidator for GridValidator {
        fn matches(&self, node: &ExtensionDefinition) -> bool {
            node.name == "grid"
        }

        fn validate(
            &self,
            _parent: ParentNode<'_>,
            node: &ExtensionDefinition,
            validator: &DefinitionValidator<'_>,
            ctx: &NodeContext,
        ) -> Result<()> {
            let path = ctx.path().child(node.path_token());
            let relaxed = NodeContext::custom(
                path,
                CardinalityRule::element_under_choice(),
                CardinalityRule::new(Some(Cardinality::Optional), crate::types::ALL_CARDINALITIES),
            );
            for child in &node.children {
                match child {
                    NodeDefinition::Element(element) => {
                        validator.validate_element(element, &relaxed)?
                    }
                    NodeDefinition::Attribute(attribute) => {
                        validator.validate_attribute(attribute, &relaxed)?
                    }
                    _ => {}
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_extension_delegation_first_match_wins() {
        let extensions: Vec<Box<dyn ExtensionValidator>> = vec![Box::new(GridValidator)];
        let known = keys(&[]);
        let validator = DefinitionValidator::with_extensions(&known, &extensions);

        // Optional attribute cardinality is invalid under a form but fine
        // under the grid's advertised rule.
        let form = FormDefinition::new("person", "people.json").with_child(
            ExtensionDefinition::new("grid").with_child(
                AttributeDefinition::new("width", "width")
                    .with_cardinality(Cardinality::Optional),
            ),
        );
        assert!(validator.validate_form(&form).is_ok());

        let unknown = FormDefinition::new("person", "people.json")
            .with_child(ExtensionDefinition::new("canvas"));
        let error = validator.validate_form(&unknown).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::UnsupportedExtension("canvas".into()));
    }

    /// Rejects every `legacy` node with an opaque extension failure.
    struct LegacyValidator;

    impl ExtensionValidator for LegacyValidator {
        fn matches(&self, node: &ExtensionDefinition) -> bool {
            node.name == "legacy"
        }

        fn validate(
            &self,
            _parent: ParentNode<'_>,
            node: &ExtensionDefinition,
            _validator: &DefinitionValidator<'_>,
            ctx: &NodeContext,
        ) -> Result<()> {
            let path = ctx.path().child(node.path_token());
            Err(ErrorKind::Extension("legacy nodes are no longer accepted".into()).at(path))
        }
    }

    #[test]
    fn test_extension_failure_propagates_unchanged() {
        let extensions: Vec<Box<dyn ExtensionValidator>> = vec![Box::new(LegacyValidator)];
        let known = keys(&[]);
        let validator = DefinitionValidator::with_extensions(&known, &extensions);

        let form = FormDefinition::new("person", "people.json")
            .with_child(ExtensionDefinition::new("legacy").with_id("signature"));
        let error = validator.validate_form(&form).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Extension failed: legacy nodes are no longer accepted], \
             {people.json}form[@:person]/legacy[@signature]"
        );
    }

    #[test]
    fn test_extension_callback_errors_keep_extension_path() {
        let extensions: Vec<Box<dyn ExtensionValidator>> = vec![Box::new(GridValidator)];
        let known = keys(&[]);
        let validator = DefinitionValidator::with_extensions(&known, &extensions);

        let form = FormDefinition::new("person", "people.json").with_child(
            ExtensionDefinition::new("grid")
                .with_child(ElementDefinition::new("cell", "")),
        );
        let error = validator.validate_form(&form).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Lookup is not present: element[@cell]], \
             {people.json}form[@:person]/grid/element[@cell]"
        );
    }
}
