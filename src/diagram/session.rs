// Diagram-building session
//
// Bundles what the diagrams of one generation pass share: the figure id
// generator, the interface policy and the member filter.

use crate::config::Config;
use crate::diagram::class_diagram::ClassDiagram;
use crate::diagram::figure::IdGenerator;
use crate::diagram::package_diagram::PackageDiagram;
use crate::error::Result;
use crate::policy::{AttributeFilter, InterfacePolicy, NamingPolicy};
use crate::syntax::{NodeId, SyntaxSource};
use std::sync::Arc;
use tracing::debug;

/// Shared state for the diagrams of one generation pass
#[derive(Clone)]
pub struct DiagramSession {
    title: String,
    ids: Arc<IdGenerator>,
    policy: Arc<dyn InterfacePolicy>,
    filter: AttributeFilter,
}

impl DiagramSession {
    /// Session with default settings
    pub fn new() -> Self {
        Self {
            title: Config::default().diagram.title,
            ids: Arc::new(IdGenerator::new()),
            policy: Arc::new(NamingPolicy::default()),
            filter: AttributeFilter::default(),
        }
    }

    /// Session configured from a validated config
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            title: config.diagram.title.clone(),
            ids: Arc::new(config.id_generator()),
            policy: Arc::new(config.interface_policy()?),
            filter: config.attribute_filter(),
        })
    }

    /// Replace the interface predicate for diagrams created afterwards
    pub fn with_interface_policy(mut self, policy: Arc<dyn InterfacePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Reset figure numbering for every diagram of this session
    pub fn set_counter(&self, value: u64) {
        self.ids.set_counter(value);
    }

    pub fn filter(&self) -> AttributeFilter {
        self.filter
    }

    /// Empty class diagram; `None` uses the configured title
    pub fn class_diagram<'s>(
        &self,
        title: Option<&str>,
        source: &'s dyn SyntaxSource,
    ) -> ClassDiagram<'s> {
        ClassDiagram::with_ids(self.title_or_default(title), source, Arc::clone(&self.ids))
            .with_interface_policy(Arc::clone(&self.policy))
    }

    /// Empty package diagram; `None` uses the configured title
    pub fn package_diagram<'s>(
        &self,
        title: Option<&str>,
        source: &'s dyn SyntaxSource,
    ) -> PackageDiagram<'s> {
        PackageDiagram::with_ids(self.title_or_default(title), source, Arc::clone(&self.ids))
            .with_interface_policy(Arc::clone(&self.policy))
    }

    /// Register `nodes` (titled by node name, members filtered) and extract
    pub fn build_class_diagram<'s>(
        &self,
        title: Option<&str>,
        source: &'s dyn SyntaxSource,
        nodes: &[NodeId],
    ) -> Result<ClassDiagram<'s>> {
        let mut diagram = self.class_diagram(title, source);
        let filter = self.filter;
        let show = move |name: &str| filter.show(name);
        for &node in nodes {
            let name = source.name(node).unwrap_or_default();
            diagram.add_object(name, node, Some(&show))?;
        }
        diagram.extract_relationships();
        debug!(
            objects = diagram.objects().len(),
            relationships = diagram.relationship_count(),
            "built class diagram"
        );
        Ok(diagram)
    }

    /// Register `nodes` (titled by node name, members filtered) and extract
    pub fn build_package_diagram<'s>(
        &self,
        title: Option<&str>,
        source: &'s dyn SyntaxSource,
        nodes: &[NodeId],
    ) -> Result<PackageDiagram<'s>> {
        let mut diagram = self.package_diagram(title, source);
        let filter = self.filter;
        let show = move |name: &str| filter.show(name);
        for &node in nodes {
            let name = source.name(node).unwrap_or_default();
            diagram.add_object(name, node, Some(&show))?;
        }
        diagram.extract_relationships();
        debug!(
            objects = diagram.objects().len(),
            relationships = diagram.relationship_count(),
            "built package diagram"
        );
        Ok(diagram)
    }

    fn title_or_default(&self, title: Option<&str>) -> String {
        title.unwrap_or(&self.title).to_string()
    }
}

impl Default for DiagramSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Figure, FigureId, RelationKind, Shape};
    use crate::policy::FilterMode;
    use crate::syntax::SyntaxTree;

    #[test]
    fn test_default_session() {
        let session = DiagramSession::new();
        let tree = SyntaxTree::new();
        let diagram = session.class_diagram(None, &tree);
        assert_eq!(diagram.title, "No name");
        assert_eq!(session.filter().mode(), FilterMode::PublicOnly);
    }

    #[test]
    fn test_ids_shared_between_diagrams() {
        let session = DiagramSession::new();
        let tree = SyntaxTree::new();
        session.set_counter(0);
        let classes = session.class_diagram(Some("classes"), &tree);
        let packages = session.package_diagram(Some("packages"), &tree);
        assert_eq!(classes.fig_id(), FigureId(1));
        assert_eq!(packages.fig_id(), FigureId(2));
        assert_eq!(packages.title, "packages");
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.diagram.title = "Zoo".to_string();
        config.diagram.first_id = 100;
        config.filter.mode = FilterMode::All;
        config.interfaces.patterns = vec!["I*".to_string()];

        let session = DiagramSession::from_config(&config).unwrap();
        let mut tree = SyntaxTree::new();
        let module = tree.add_module("zoo");
        let feeder = tree.add_class(module, "IFeeder");

        let diagram = session
            .build_class_diagram(None, &tree, &[feeder])
            .unwrap();
        assert_eq!(diagram.title, "Zoo");
        assert_eq!(diagram.fig_id(), FigureId(101));
        assert_eq!(diagram.objects()[0].shape, Some(Shape::Interface));
        assert_eq!(session.filter().mode(), FilterMode::All);
    }

    #[test]
    fn test_from_invalid_config() {
        let mut config = Config::default();
        config.interfaces.patterns = vec!["[oops".to_string()];
        assert!(DiagramSession::from_config(&config).is_err());
    }

    #[test]
    fn test_build_package_diagram() {
        let mut tree = SyntaxTree::new();
        let zoo = tree.add_module("zoo");
        let food = tree.add_module("food");
        let dog = tree.add_class(zoo, "Dog");
        tree.add_function(dog, "bark");
        tree.add_function(dog, "_sniff");
        tree.add_dependency(zoo, "food");

        let session = DiagramSession::new();
        let diagram = session
            .build_package_diagram(Some("zoo"), &tree, &[zoo, food, dog])
            .unwrap();
        assert_eq!(diagram.relationships_of(RelationKind::Ownership).len(), 1);
        assert_eq!(diagram.relationships_of(RelationKind::Depends).len(), 1);
        assert_eq!(diagram.classe("Dog").unwrap().methods.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_build_rejects_duplicate_nodes() {
        let mut tree = SyntaxTree::new();
        let zoo = tree.add_module("zoo");
        let session = DiagramSession::new();
        let err = session
            .build_package_diagram(None, &tree, &[zoo, zoo])
            .unwrap_err();
        assert!(matches!(err, crate::Error::AlreadyRegistered(_)));
    }
}
