// Classification policies consumed by diagram extraction
//
// Whether a class is drawn as an interface, and which member names make it
// into an entity, are decisions owned by the caller. The diagram layer only
// sees the predicates defined here.

use crate::error::Result;
use crate::syntax::{NodeId, SyntaxSource};
use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Decides whether a class node represents an interface
pub trait InterfacePolicy: Send + Sync {
    fn is_interface(&self, source: &dyn SyntaxSource, node: NodeId) -> bool;
}

impl<F> InterfacePolicy for F
where
    F: Fn(&dyn SyntaxSource, NodeId) -> bool + Send + Sync,
{
    fn is_interface(&self, source: &dyn SyntaxSource, node: NodeId) -> bool {
        self(source, node)
    }
}

/// Policy that never reports an interface
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterface;

impl InterfacePolicy for NeverInterface {
    fn is_interface(&self, _source: &dyn SyntaxSource, _node: NodeId) -> bool {
        false
    }
}

/// Class-name pattern used when nothing else is configured
pub const DEFAULT_INTERFACE_PATTERN: &str = "*Interface";

/// Interface detection by class-name patterns and explicit annotations
#[derive(Debug, Clone)]
pub struct NamingPolicy {
    patterns: Vec<Pattern>,
    honor_annotations: bool,
}

impl NamingPolicy {
    /// Build a policy from glob patterns matched against class names
    pub fn new<S: AsRef<str>>(patterns: &[S], honor_annotations: bool) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            honor_annotations,
        })
    }

    /// Check a bare class name against the patterns
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            patterns: Pattern::new(DEFAULT_INTERFACE_PATTERN).into_iter().collect(),
            honor_annotations: true,
        }
    }
}

impl InterfacePolicy for NamingPolicy {
    fn is_interface(&self, source: &dyn SyntaxSource, node: NodeId) -> bool {
        if !source.is_class(node) {
            return false;
        }
        if self.honor_annotations && source.is_annotated_interface(node) {
            return true;
        }
        source.name(node).is_some_and(|name| self.matches_name(name))
    }
}

/// Visibility class of a member name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `__name__`
    Special,
    /// `__name`
    Private,
    /// `_name`
    Protected,
    Public,
}

impl Visibility {
    pub fn of(name: &str) -> Self {
        if name.len() > 4 && name.starts_with("__") && name.ends_with("__") {
            Visibility::Special
        } else if name.starts_with("__") {
            Visibility::Private
        } else if name.starts_with('_') {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

/// Which member names an entity shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Show everything
    All,
    /// Hide special, private and protected names
    #[default]
    PublicOnly,
    /// Hide special names only
    NoSpecial,
    /// Hide private and protected names
    NoPrivate,
}

impl FilterMode {
    fn hides(self, visibility: Visibility) -> bool {
        use Visibility::*;
        match self {
            FilterMode::All => false,
            FilterMode::PublicOnly => visibility != Public,
            FilterMode::NoSpecial => visibility == Special,
            FilterMode::NoPrivate => matches!(visibility, Private | Protected),
        }
    }
}

/// Member-name predicate handed to `add_object`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    mode: FilterMode,
}

impl AttributeFilter {
    pub fn new(mode: FilterMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Whether a member with this name is shown
    pub fn show(&self, name: &str) -> bool {
        !self.mode.hides(Visibility::of(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn tree_with(names: &[&str]) -> (SyntaxTree, Vec<NodeId>) {
        let mut tree = SyntaxTree::new();
        let module = tree.add_module("m");
        let ids = names.iter().map(|n| tree.add_class(module, n)).collect();
        (tree, ids)
    }

    #[test]
    fn test_visibility_of() {
        assert_eq!(Visibility::of("__init__"), Visibility::Special);
        assert_eq!(Visibility::of("__secret"), Visibility::Private);
        assert_eq!(Visibility::of("_helper"), Visibility::Protected);
        assert_eq!(Visibility::of("name"), Visibility::Public);
        assert_eq!(Visibility::of("____"), Visibility::Private);
    }

    #[test]
    fn test_filter_public_only() {
        let filter = AttributeFilter::default();
        assert_eq!(filter.mode(), FilterMode::PublicOnly);
        assert!(filter.show("name"));
        assert!(!filter.show("_helper"));
        assert!(!filter.show("__secret"));
        assert!(!filter.show("__init__"));
    }

    #[test]
    fn test_filter_modes() {
        let all = AttributeFilter::new(FilterMode::All);
        assert!(all.show("__init__") && all.show("_helper"));

        let no_special = AttributeFilter::new(FilterMode::NoSpecial);
        assert!(!no_special.show("__init__"));
        assert!(no_special.show("_helper"));
        assert!(no_special.show("__secret"));

        let no_private = AttributeFilter::new(FilterMode::NoPrivate);
        assert!(no_private.show("__init__"));
        assert!(!no_private.show("_helper"));
        assert!(!no_private.show("__secret"));
        assert!(no_private.show("name"));
    }

    #[test]
    fn test_filter_mode_parsing() {
        let mode: FilterMode = serde_json::from_str("\"no-special\"").unwrap();
        assert_eq!(mode, FilterMode::NoSpecial);
    }

    #[test]
    fn test_naming_policy_default() {
        let (tree, ids) = tree_with(&["FeedInterface", "Dog"]);
        let policy = NamingPolicy::default();
        assert!(policy.is_interface(&tree, ids[0]));
        assert!(!policy.is_interface(&tree, ids[1]));
    }

    #[test]
    fn test_naming_policy_patterns() {
        let (tree, ids) = tree_with(&["IFeedable", "Index", "Dog"]);
        let policy = NamingPolicy::new(&["I[A-Z]*"], false).unwrap();
        assert!(policy.is_interface(&tree, ids[0]));
        assert!(!policy.is_interface(&tree, ids[1]));
        assert!(!policy.is_interface(&tree, ids[2]));
    }

    #[test]
    fn test_naming_policy_annotations() {
        let (mut tree, ids) = tree_with(&["Feeder"]);
        tree.mark_interface(ids[0]);

        let honoring = NamingPolicy::new::<&str>(&[], true).unwrap();
        let ignoring = NamingPolicy::new::<&str>(&[], false).unwrap();
        assert!(honoring.is_interface(&tree, ids[0]));
        assert!(!ignoring.is_interface(&tree, ids[0]));
    }

    #[test]
    fn test_naming_policy_ignores_modules() {
        let mut tree = SyntaxTree::new();
        let module = tree.add_module("ZooInterface");
        assert!(!NamingPolicy::default().is_interface(&tree, module));
    }

    #[test]
    fn test_naming_policy_invalid_pattern() {
        assert!(NamingPolicy::new(&["[unclosed"], true).is_err());
    }

    #[test]
    fn test_closure_policy() {
        let (tree, ids) = tree_with(&["Dog"]);
        let policy = |source: &dyn SyntaxSource, node: NodeId| source.name(node) == Some("Dog");
        assert!(policy.is_interface(&tree, ids[0]));
        assert!(!NeverInterface.is_interface(&tree, ids[0]));
    }
}
