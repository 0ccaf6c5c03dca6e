// Linker: turns parsed per-file records into a resolved syntax tree
//
// Names written in the source (base classes, `__implements__` entries,
// attribute annotations) are resolved against the classes of the whole
// project. A dotted name only matches classes of the module it names; a
// bare name prefers the defining module. A class never resolves to itself.

use crate::syntax::ast::{Class, ParsedFile, IMPLEMENTS_ATTR};
use crate::syntax::tree::{Inferred, NodeId, SyntaxSource, SyntaxTree};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds a `SyntaxTree` from parsed files
#[derive(Debug, Default)]
pub struct Linker {
    /// Short class name -> (module node, class node), in link order
    classes: HashMap<String, Vec<(NodeId, NodeId)>>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a set of parsed files into one tree
    pub fn link(mut self, files: &[ParsedFile]) -> SyntaxTree {
        let mut tree = SyntaxTree::new();

        // Pass 1: create every node so references can point forward
        let mut linked: Vec<(NodeId, Vec<(NodeId, &Class)>)> = Vec::with_capacity(files.len());
        for file in files {
            let module = tree.add_module(&file.module_name);
            for name in file.imported_modules() {
                tree.add_dependency(module, name);
            }
            for function in &file.functions {
                let id = tree.add_function(module, &function.name);
                for decorator in &function.decorators {
                    tree.add_decorator(id, decorator);
                }
            }

            let mut classes = Vec::with_capacity(file.classes.len());
            for class in &file.classes {
                let id = tree.add_class(module, &class.name);
                for method in &class.methods {
                    let method_id = tree.add_function(id, &method.name);
                    for decorator in &method.decorators {
                        tree.add_decorator(method_id, decorator);
                    }
                }
                if class.is_annotated_interface() {
                    tree.mark_interface(id);
                }
                self.classes
                    .entry(class.name.clone())
                    .or_default()
                    .push((module, id));
                classes.push((id, class));
            }
            linked.push((module, classes));
        }

        // Pass 2: resolve names
        for (module, classes) in &linked {
            for &(id, class) in classes {
                for base in &class.bases {
                    match self.resolve(&tree, *module, id, base) {
                        Some(base_id) => tree.add_base(id, base_id),
                        None => debug!(class = %class.name, base = %base, "base class outside project"),
                    }
                }

                for name in class.declared_interfaces() {
                    match self.resolve(&tree, *module, id, &name) {
                        Some(iface) => tree.add_implements(id, iface),
                        None => warn!(class = %class.name, interface = %name, "unresolved interface"),
                    }
                }

                for attribute in &class.attributes {
                    if attribute.name == IMPLEMENTS_ATTR {
                        continue;
                    }
                    if attribute.type_hint.is_none() {
                        tree.infer_attr(id, &attribute.name, Inferred::Unknown);
                        continue;
                    }
                    tree.declare_attr(id, &attribute.name);
                    for type_name in attribute.hinted_types() {
                        if let Some(target) = self.resolve(&tree, *module, id, &type_name) {
                            tree.infer_attr(id, &attribute.name, Inferred::Instance(target));
                        }
                    }
                }
            }
        }

        debug!(files = files.len(), nodes = tree.len(), "linked syntax tree");
        tree
    }

    /// Resolve a possibly dotted class name written inside `class` of `module`
    fn resolve(&self, tree: &SyntaxTree, module: NodeId, class: NodeId, name: &str) -> Option<NodeId> {
        let (qualifier, short) = match name.rsplit_once('.') {
            Some((qualifier, short)) => (Some(qualifier), short),
            None => (None, name),
        };
        let mut candidates = self
            .classes
            .get(short)?
            .iter()
            .filter(|&&(_, candidate)| candidate != class);

        match qualifier {
            Some(qualifier) => candidates
                .find(|&&(owner, _)| {
                    tree.name(owner)
                        .map(|owner| module_matches(owner, qualifier))
                        .unwrap_or(false)
                })
                .map(|&(_, found)| found),
            None => {
                let candidates: Vec<_> = candidates.collect();
                candidates
                    .iter()
                    .find(|(owner, _)| *owner == module)
                    .or_else(|| candidates.first())
                    .map(|&&(_, found)| found)
            }
        }
    }
}

/// Whether a module name is the one a qualifier refers to
fn module_matches(module: &str, qualifier: &str) -> bool {
    module == qualifier
        || module
            .strip_suffix(qualifier)
            .map(|prefix| prefix.ends_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::{Attribute, Import};
    use crate::syntax::tree::{NodeKind, SyntaxSource};
    use std::path::PathBuf;

    fn make_parsed_file(name: &str) -> ParsedFile {
        ParsedFile::new(PathBuf::from(format!("{}.py", name)), name.to_string())
    }

    #[test]
    fn test_link_empty() {
        let tree = Linker::new().link(&[]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_link_modules_and_dependencies() {
        let mut zoo = make_parsed_file("zoo");
        zoo.imports.push(Import::simple("food", 1));
        zoo.imports.push(Import::from_import("food", &["Meat"], 2));
        let food = make_parsed_file("food");

        let tree = Linker::new().link(&[zoo, food]);
        let zoo_id = tree.find(NodeKind::Module, "zoo").unwrap();
        assert_eq!(tree.depends(zoo_id), &["food".to_string()]);
        assert!(tree.find(NodeKind::Module, "food").is_some());
    }

    #[test]
    fn test_link_resolves_bases_across_files() {
        let mut base = make_parsed_file("base");
        base.classes.push(Class::new("Animal", 1));
        let mut zoo = make_parsed_file("zoo");
        zoo.classes
            .push(Class::new("Dog", 1).with_base("base.Animal").with_base("object"));

        let tree = Linker::new().link(&[zoo, base]);
        let animal = tree.find(NodeKind::Class, "Animal").unwrap();
        let dog = tree.find(NodeKind::Class, "Dog").unwrap();
        assert_eq!(tree.ancestors(dog, false), vec![animal]);
    }

    #[test]
    fn test_link_prefers_same_module() {
        let mut a = make_parsed_file("a");
        a.classes.push(Class::new("Base", 1));
        let mut b = make_parsed_file("b");
        b.classes.push(Class::new("Base", 1));
        b.classes.push(Class::new("Child", 5).with_base("Base"));

        let tree = Linker::new().link(&[a, b]);
        let b_module = tree.find(NodeKind::Module, "b").unwrap();
        let child = tree.find(NodeKind::Class, "Child").unwrap();
        let parent = tree.ancestors(child, false)[0];
        assert_eq!(tree.root(parent), b_module);
    }

    #[test]
    fn test_link_qualified_base_with_same_short_name() {
        let mut base = make_parsed_file("base");
        base.classes.push(Class::new("Animal", 1));
        let mut zoo = make_parsed_file("zoo");
        zoo.classes.push(Class::new("Animal", 1).with_base("base.Animal"));

        let tree = Linker::new().link(&[base, zoo]);
        let zoo_module = tree.find(NodeKind::Module, "zoo").unwrap();
        let base_module = tree.find(NodeKind::Module, "base").unwrap();
        let zoo_animal = tree.members(zoo_module)[0];
        let base_animal = tree.members(base_module)[0];

        assert_eq!(tree.ancestors(zoo_animal, false), vec![base_animal]);
        assert!(tree.ancestors(base_animal, false).is_empty());
    }

    #[test]
    fn test_link_qualified_name_picks_named_module() {
        let mut first = make_parsed_file("pkg.first");
        first.classes.push(Class::new("Foo", 1));
        let mut other = make_parsed_file("pkg.other");
        other.classes.push(Class::new("Foo", 1));
        let mut zoo = make_parsed_file("zoo");
        zoo.classes.push(Class::new("Bar", 1).with_base("other.Foo"));
        zoo.classes.push(Class::new("Baz", 2).with_base("missing.Foo"));

        let tree = Linker::new().link(&[first, other, zoo]);
        let other_module = tree.find(NodeKind::Module, "pkg.other").unwrap();
        let bar = tree.find(NodeKind::Class, "Bar").unwrap();
        let baz = tree.find(NodeKind::Class, "Baz").unwrap();

        assert_eq!(tree.ancestors(bar, false), vec![tree.members(other_module)[0]]);
        assert!(tree.ancestors(baz, false).is_empty());
    }

    #[test]
    fn test_link_never_resolves_class_to_itself() {
        let mut zoo = make_parsed_file("zoo");
        zoo.classes.push(
            Class::new("Node", 1)
                .with_base("Node")
                .with_attribute(Attribute::with_type("next", "Optional[Node]", 2)),
        );

        let tree = Linker::new().link(&[zoo]);
        let node = tree.find(NodeKind::Class, "Node").unwrap();
        assert!(tree.ancestors(node, false).is_empty());
        assert_eq!(tree.instance_attrs_type(node), vec![("next", &[][..])]);
    }

    #[test]
    fn test_module_matches_qualifier() {
        assert!(module_matches("base", "base"));
        assert!(module_matches("zoo.base", "base"));
        assert!(module_matches("zoo.base", "zoo.base"));
        assert!(!module_matches("zoo.database", "base"));
        assert!(!module_matches("base", "zoo.base"));
    }

    #[test]
    fn test_link_methods_and_interfaces() {
        let mut implements = Attribute::new(IMPLEMENTS_ATTR, 3);
        implements.default = Some("(IFeedable,)".to_string());
        let mut iface = Class::new("IFeedable", 1);
        iface.decorators.push("interface".to_string());

        let mut zoo = make_parsed_file("zoo");
        zoo.classes.push(iface);
        zoo.classes
            .push(Class::new("Dog", 2).with_method("bark").with_attribute(implements));

        let tree = Linker::new().link(&[zoo]);
        let feedable = tree.find(NodeKind::Class, "IFeedable").unwrap();
        let dog = tree.find(NodeKind::Class, "Dog").unwrap();
        assert!(tree.is_annotated_interface(feedable));
        assert_eq!(tree.implements(dog), &[feedable]);
        assert_eq!(tree.members(dog).len(), 1);
        assert!(tree.is_function(tree.members(dog)[0]));
        assert!(tree.instance_attrs_type(dog).is_empty());
    }

    #[test]
    fn test_link_attribute_inference() {
        let mut zoo = make_parsed_file("zoo");
        zoo.classes.push(Class::new("Keeper", 1));
        zoo.classes.push(
            Class::new("Dog", 5)
                .with_attribute(Attribute::with_type("keeper", "Optional[Keeper]", 6))
                .with_attribute(Attribute::with_type("age", "int", 7))
                .with_attribute(Attribute::new("mood", 8)),
        );

        let tree = Linker::new().link(&[zoo]);
        let keeper = tree.find(NodeKind::Class, "Keeper").unwrap();
        let dog = tree.find(NodeKind::Class, "Dog").unwrap();
        let attrs = tree.instance_attrs_type(dog);
        assert_eq!(
            attrs,
            vec![
                ("age", &[][..]),
                ("keeper", &[Inferred::Instance(keeper)][..]),
                ("mood", &[Inferred::Unknown][..]),
            ]
        );
    }
}
