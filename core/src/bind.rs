//! Instance binding.
//!
//! Walks a definition tree top-down against an external [`BindingSource`],
//! producing a multiplicity-checked [`FormInstance`]: elements fan out over
//! their matches, attributes bind at most once, choices keep the single
//! alternative actually present in the data, and form references expand the
//! referenced form's children in place. Binding is strictly sequential and
//! fail-fast; the first violation aborts the call with the accumulated
//! ancestry trail.

use crate::error::{ErrorKind, Result};
use crate::instance::{AttributeInstance, ElementInstance, FormInstance, InstanceNode};
use crate::path::NodePath;
use crate::registry::FormRegistry;
use crate::types::{
    AttributeDefinition, Cardinality, CardinalityRule, CardinalityViolation, ChoiceDefinition,
    ElementDefinition, ExtensionDefinition, FormKey, FormReferenceDefinition, NodeDefinition,
};

/// Bound on in-place form-reference expansion. A reference chain deeper
/// than this is reported as cyclic instead of overflowing the stack.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 64;

/// Opaque per-level token identifying where in the external source the
/// current node is being matched.
///
/// The binder never interprets the token; it passes the current context to
/// the source and descends into whatever contexts the source reports.
/// Sources typically hand out indices into their own node storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingContext(u64);

impl BindingContext {
    /// Sentinel context for a form root.
    pub const ROOT: BindingContext = BindingContext(0);

    /// Wraps a source-chosen token.
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    /// The raw token.
    pub fn token(&self) -> u64 {
        self.0
    }
}

/// The external data provider consulted during binding.
///
/// The binder treats the source as sequential and single-owner: each call
/// receives the current context token and must return deterministically.
pub trait BindingSource {
    /// Contexts matching `lookup` under `context`, one per occurrence.
    /// Each returned context becomes the binding context for the matched
    /// element's children.
    fn elements(&self, context: &BindingContext, lookup: &str) -> Vec<BindingContext>;

    /// The at-most-one value matching `lookup` under `context`.
    fn attribute(&self, context: &BindingContext, lookup: &str) -> Option<String>;

    /// Whether the root of the form keyed `key` is present under
    /// `context`. Consulted when a form is bound and when a form reference
    /// expands. Sources without a notion of form roots can rely on the
    /// default, which reports every form present.
    fn has_form(&self, context: &BindingContext, key: &FormKey) -> bool {
        let _ = (context, key);
        true
    }
}

/// Binding hook for one extension node kind, mirroring
/// [`ExtensionValidator`](crate::ExtensionValidator).
///
/// The first implementation in the caller-supplied list whose [`matches`]
/// accepts a node performs the matching logic and returns the bound
/// sub-instances; it may attach standard-kind sub-bindings by calling back
/// into the binder's per-kind operations.
///
/// [`matches`]: ExtensionBinder::matches
pub trait ExtensionBinder {
    /// Returns `true` when this implementation owns `node`.
    fn matches(&self, node: &ExtensionDefinition) -> bool;

    /// Binds `node` under `ctx`, returning the produced sub-instances.
    fn bind(
        &self,
        source: &dyn BindingSource,
        node: &ExtensionDefinition,
        binder: &InstanceBinder<'_>,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>>;
}

/// Per-level binding context: the source context token, the ancestry
/// trail, the cardinality rules of the enclosing kind, and the
/// reference-expansion depth.
#[derive(Debug, Clone)]
pub struct BindContext {
    context: BindingContext,
    path: NodePath,
    element_rule: CardinalityRule,
    attribute_rule: CardinalityRule,
    depth: usize,
}

impl BindContext {
    /// Context for the children of a form root bound at `context`.
    pub fn under_form(context: BindingContext, path: NodePath) -> Self {
        Self {
            context,
            path,
            element_rule: CardinalityRule::element_under_form(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            depth: 0,
        }
    }

    /// Context with caller-chosen rules; the entry point for extension
    /// binders that advertise a different allowed set.
    pub fn custom(
        context: BindingContext,
        path: NodePath,
        element_rule: CardinalityRule,
        attribute_rule: CardinalityRule,
    ) -> Self {
        Self {
            context,
            path,
            element_rule,
            attribute_rule,
            depth: 0,
        }
    }

    /// The current source context token.
    pub fn context(&self) -> BindingContext {
        self.context
    }

    /// The ancestry trail up to the current node.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    fn element_scope(&self, context: BindingContext, path: NodePath) -> Self {
        Self {
            context,
            path,
            element_rule: CardinalityRule::element_under_form(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            depth: self.depth,
        }
    }

    fn choice_scope(&self, path: NodePath) -> Self {
        Self {
            context: self.context,
            path,
            element_rule: CardinalityRule::element_under_choice(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            depth: self.depth,
        }
    }

    /// Same context, one reference-expansion level deeper, form rules.
    fn reference_scope(&self, path: NodePath) -> Self {
        Self {
            context: self.context,
            path,
            element_rule: CardinalityRule::element_under_form(),
            attribute_rule: CardinalityRule::attribute_under_form(),
            depth: self.depth + 1,
        }
    }

    /// Same context and depth, extended path. Used for attribute children.
    fn leaf_scope(&self, path: NodePath) -> Self {
        Self {
            context: self.context,
            path,
            element_rule: self.element_rule.clone(),
            attribute_rule: self.attribute_rule.clone(),
            depth: self.depth,
        }
    }
}

/// Reconciles definition trees against a [`BindingSource`].
///
/// # Examples
///
/// Binding a form whose source reports one `name` match:
///
/// ```
/// use form_schema_core::{
///     BindingContext, BindingSource, ElementDefinition, FormDefinition, FormKey,
///     FormRegistry, InstanceBinder,
/// };
///
/// struct SingleName;
///
/// impl BindingSource for SingleName {
///     fn elements(&self, context: &BindingContext, lookup: &str) -> Vec<BindingContext> {
///         if *context == BindingContext::ROOT && lookup == "name" {
///             vec![BindingContext::new(1)]
///         } else {
///             Vec::new()
///         }
///     }
///
///     fn attribute(&self, _context: &BindingContext, _lookup: &str) -> Option<String> {
///         None
///     }
/// }
///
/// let registry = FormRegistry::from_forms(vec![
///     FormDefinition::new("person", "people.json")
///         .with_child(ElementDefinition::new("name", "name")),
/// ])
/// .unwrap();
///
/// let binder = InstanceBinder::new(&registry, &SingleName);
/// let instance = binder.bind_form(&FormKey::new("", "person")).unwrap();
/// assert_eq!(instance.element_count("name"), 1);
/// ```
pub struct InstanceBinder<'a> {
    registry: &'a FormRegistry,
    source: &'a dyn BindingSource,
    extensions: &'a [Box<dyn ExtensionBinder>],
    max_reference_depth: usize,
}

impl<'a> InstanceBinder<'a> {
    /// Creates a binder with no extension support.
    pub fn new(registry: &'a FormRegistry, source: &'a dyn BindingSource) -> Self {
        Self {
            registry,
            source,
            extensions: &[],
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }

    /// Creates a binder delegating extension nodes to `extensions`, first
    /// match wins.
    pub fn with_extensions(
        registry: &'a FormRegistry,
        source: &'a dyn BindingSource,
        extensions: &'a [Box<dyn ExtensionBinder>],
    ) -> Self {
        Self {
            registry,
            source,
            extensions,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }

    /// Overrides the reference-expansion depth bound.
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// Binds the form keyed `key` against the source, starting from the
    /// root context sentinel.
    pub fn bind_form(&self, key: &FormKey) -> Result<FormInstance> {
        let Some(form) = self.registry.lookup(key) else {
            return Err(ErrorKind::UnresolvedReference(key.clone()).into());
        };
        let path = NodePath::root().child(form.root_token());
        if !self.source.has_form(&BindingContext::ROOT, key) {
            return Err(ErrorKind::FormMissing(key.clone()).at(path));
        }
        let ctx = BindContext::under_form(BindingContext::ROOT, path);
        let children = self.bind_children(&form.children, &ctx)?;
        Ok(FormInstance {
            key: key.clone(),
            children,
        })
    }

    /// Binds an element under `ctx`, producing one instance per match.
    pub fn bind_element(
        &self,
        element: &ElementDefinition,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        let token = element.path_token();
        let path = ctx.path().child(token.clone());
        let cardinality = match ctx.element_rule.resolve(element.cardinality) {
            Ok(cardinality) => cardinality,
            Err(kind) => return Err(kind.at(path)),
        };

        let matches = self.source.elements(&ctx.context, &element.lookup);
        if let Some(violation) = cardinality.check(matches.len()) {
            let kind = match violation {
                CardinalityViolation::Absent => ErrorKind::RequiredElementMissing(token),
                CardinalityViolation::Repeated if cardinality == Cardinality::Optional => {
                    ErrorKind::OptionalElementRepeated(token)
                }
                CardinalityViolation::Repeated => ErrorKind::RequiredElementRepeated(token),
                CardinalityViolation::Present => ErrorKind::ProhibitedElementPresent(token),
            };
            return Err(kind.at(path));
        }

        let mut instances = Vec::with_capacity(matches.len());
        for context in matches {
            let child_ctx = ctx.element_scope(context, path.clone());
            let children =
                self.bind_children(&element.children, &child_ctx)?;
            instances.push(InstanceNode::Element(ElementInstance {
                id: element.id.clone(),
                lookup: element.lookup.clone(),
                children,
            }));
        }
        Ok(instances)
    }

    /// Binds an attribute under `ctx`; the source matches at most once.
    pub fn bind_attribute(
        &self,
        attribute: &AttributeDefinition,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        let token = attribute.path_token();
        let path = ctx.path().child(token.clone());
        let cardinality = match ctx.attribute_rule.resolve(attribute.cardinality) {
            Ok(cardinality) => cardinality,
            Err(kind) => return Err(kind.at(path)),
        };

        let value = self.source.attribute(&ctx.context, &attribute.lookup);
        match cardinality {
            Cardinality::Required | Cardinality::RequiredMultiple if value.is_none() => {
                return Err(ErrorKind::RequiredAttributeMissing(token).at(path));
            }
            Cardinality::Prohibited if value.is_some() => {
                return Err(ErrorKind::ProhibitedAttributePresent(token).at(path));
            }
            _ => {}
        }
        let Some(value) = value else {
            return Ok(Vec::new());
        };

        let child_ctx = ctx.leaf_scope(path);
        let children =
            self.bind_children(&attribute.children, &child_ctx)?;
        Ok(vec![InstanceNode::Attribute(AttributeInstance {
            id: attribute.id.clone(),
            lookup: attribute.lookup.clone(),
            value,
            children,
        })])
    }

    /// Binds a choice under `ctx`: every alternative is bound
    /// independently, and exactly the single alternative that produced
    /// instances survives.
    ///
    /// More than one producing alternative is ambiguous; zero is an error
    /// only when the choice's cardinality demands presence. The surviving
    /// subtree is returned as-is, so the choice contributes no wrapper
    /// node of its own.
    pub fn bind_choice(
        &self,
        choice: &ChoiceDefinition,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        let token = choice.path_token();
        let path = ctx.path().child(token.clone());
        let cardinality = match ctx.element_rule.resolve(choice.cardinality) {
            Ok(cardinality) => cardinality,
            Err(kind) => return Err(kind.at(path)),
        };

        let alternative_ctx = ctx.choice_scope(path.clone());
        let mut survivors: Vec<Vec<InstanceNode>> = Vec::new();
        for alternative in &choice.children {
            let nodes = self.bind_node(alternative, &alternative_ctx)?;
            if !nodes.is_empty() {
                survivors.push(nodes);
            }
        }

        if survivors.len() > 1 {
            return Err(ErrorKind::AmbiguousChoice(token).at(path));
        }
        match survivors.pop() {
            Some(subtree) => {
                if cardinality == Cardinality::Prohibited {
                    return Err(ErrorKind::ProhibitedChoicePresent(token).at(path));
                }
                Ok(subtree)
            }
            None => {
                if matches!(
                    cardinality,
                    Cardinality::Required | Cardinality::RequiredMultiple
                ) {
                    return Err(ErrorKind::RequiredChoiceMissing(token).at(path));
                }
                Ok(Vec::new())
            }
        }
    }

    /// Expands a form reference in place: the referenced form's children
    /// are bound under the same binding context as the reference's parent
    /// and spliced into the output without a wrapper node.
    pub fn bind_form_reference(
        &self,
        reference: &FormReferenceDefinition,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        let token = reference.path_token();
        let path = ctx.path().child(token);
        let cardinality = match ctx.element_rule.resolve(reference.cardinality) {
            Ok(cardinality) => cardinality,
            Err(kind) => return Err(kind.at(path)),
        };

        let key = reference.key();
        if !self.source.has_form(&ctx.context, &key) {
            if matches!(
                cardinality,
                Cardinality::Required | Cardinality::RequiredMultiple
            ) {
                return Err(ErrorKind::FormMissing(key).at(path));
            }
            return Ok(Vec::new());
        }
        if cardinality == Cardinality::Prohibited {
            return Err(ErrorKind::ProhibitedFormPresent(key).at(path));
        }
        if ctx.depth >= self.max_reference_depth {
            return Err(ErrorKind::CyclicReference(key).at(path));
        }
        let Some(form) = self.registry.lookup(&key) else {
            return Err(ErrorKind::UnresolvedReference(key).at(path));
        };

        let child_ctx = ctx.reference_scope(path);
        self.bind_children(&form.children, &child_ctx)
    }

    /// Delegates an extension node to the first matching implementation.
    pub fn bind_extension(
        &self,
        node: &ExtensionDefinition,
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        for extension in self.extensions {
            if extension.matches(node) {
                return extension.bind(self.source, node, self, ctx);
            }
        }
        let path = ctx.path().child(node.path_token());
        Err(ErrorKind::UnsupportedExtension(node.name.clone()).at(path))
    }

    fn bind_node(&self, node: &NodeDefinition, ctx: &BindContext) -> Result<Vec<InstanceNode>> {
        match node {
            NodeDefinition::Element(element) => self.bind_element(element, ctx),
            NodeDefinition::Attribute(attribute) => self.bind_attribute(attribute, ctx),
            NodeDefinition::Choice(choice) => self.bind_choice(choice, ctx),
            NodeDefinition::FormReference(reference) => self.bind_form_reference(reference, ctx),
            NodeDefinition::Extension(extension) => self.bind_extension(extension, ctx),
        }
    }

    fn bind_children(
        &self,
        children: &[NodeDefinition],
        ctx: &BindContext,
    ) -> Result<Vec<InstanceNode>> {
        let mut instances = Vec::new();
        for child in children {
            instances.extend(self.bind_node(child, ctx)?);
        }
        Ok(instances)
    }
}
