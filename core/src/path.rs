//! Ancestry trails for diagnostics.

use std::fmt;
use std::rc::Rc;

/// An immutable, append-only chain of ancestor tokens.
///
/// Paths are built bottom-up as traversal descends: [`NodePath::child`]
/// returns a new path sharing the existing chain, so a caller can hold a
/// path while recursion continues without aliasing hazards. Rendering joins
/// the tokens root-first with `/`.
///
/// # Examples
///
/// ```
/// use form_schema_core::NodePath;
///
/// let form = NodePath::root().child("{people.json}form[@hr:person]");
/// let name = form.child("element[@name]");
/// let phone = form.child("element[@phone]");
///
/// assert_eq!(name.to_string(), "{people.json}form[@hr:person]/element[@name]");
/// assert_eq!(phone.to_string(), "{people.json}form[@hr:person]/element[@phone]");
/// assert_eq!(form.depth(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    head: Option<Rc<Segment>>,
}

#[derive(Debug, PartialEq, Eq)]
struct Segment {
    token: String,
    parent: Option<Rc<Segment>>,
}

impl NodePath {
    /// The empty path at the top of a traversal.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `token` appended; `self` is unchanged.
    pub fn child(&self, token: impl Into<String>) -> Self {
        Self {
            head: Some(Rc::new(Segment {
                token: token.into(),
                parent: self.head.clone(),
            })),
        }
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of tokens in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut segment = self.head.as_deref();
        while let Some(current) = segment {
            depth += 1;
            segment = current.parent.as_deref();
        }
        depth
    }

    /// The tokens in root-first order.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens = Vec::with_capacity(self.depth());
        let mut segment = self.head.as_deref();
        while let Some(current) = segment {
            tokens.push(current.token.as_str());
            segment = current.parent.as_deref();
        }
        tokens.reverse();
        tokens
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_empty() {
        let root = NodePath::root();
        assert!(root.is_empty());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn test_child_appends_without_mutating() {
        let form = NodePath::root().child("form[@:a]");
        let left = form.child("element[@left]");
        let right = form.child("element[@right]");

        assert_eq!(form.to_string(), "form[@:a]");
        assert_eq!(left.to_string(), "form[@:a]/element[@left]");
        assert_eq!(right.to_string(), "form[@:a]/element[@right]");
        assert_eq!(left.tokens(), vec!["form[@:a]", "element[@left]"]);
    }

    #[test]
    fn test_held_path_survives_deeper_appends() {
        let held = NodePath::root().child("form[@:a]").child("element[@b]");
        let _deeper = held.child("element[@c]").child("attribute[@d]");
        assert_eq!(held.to_string(), "form[@:a]/element[@b]");
        assert_eq!(held.depth(), 2);
    }
}
