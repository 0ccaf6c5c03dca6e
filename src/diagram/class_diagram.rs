// Class diagram model
//
// Holds the entities registered by the caller and the relationships found
// between them. Extraction consults the syntax source for each class's
// ancestry, declared interfaces and inferred attribute types; references to
// nodes that were not registered are skipped, so partial diagrams are fine.

use crate::diagram::entity::{DiagramEntity, EntityId, Shape};
use crate::diagram::figure::{Figure, FigureId, IdGenerator};
use crate::diagram::relationship::{RelationKind, Relationship};
use crate::error::{Error, Result};
use crate::policy::{InterfacePolicy, NamingPolicy};
use crate::syntax::{NodeId, SyntaxSource};
use petgraph::graph::DiGraph;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A class diagram over the nodes of one syntax source
pub struct ClassDiagram<'s> {
    id: FigureId,
    pub title: String,
    source: &'s dyn SyntaxSource,
    ids: Arc<IdGenerator>,
    policy: Arc<dyn InterfacePolicy>,
    objects: Vec<DiagramEntity>,
    relationships: BTreeMap<RelationKind, Vec<Relationship>>,
    nodes: HashMap<NodeId, EntityId>,
}

impl fmt::Debug for ClassDiagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDiagram")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("objects", &self.objects.len())
            .field("relationships", &self.relationship_count())
            .finish()
    }
}

impl<'s> ClassDiagram<'s> {
    pub const TYPE: &'static str = "class";

    /// Create a diagram with its own id generator and the default interface policy
    pub fn new(title: impl Into<String>, source: &'s dyn SyntaxSource) -> Self {
        Self::with_ids(title, source, Arc::new(IdGenerator::new()))
    }

    /// Create a diagram drawing figure ids from a shared generator
    pub fn with_ids(
        title: impl Into<String>,
        source: &'s dyn SyntaxSource,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            id: ids.next_id(),
            title: title.into(),
            source,
            ids,
            policy: Arc::new(NamingPolicy::default()),
            objects: Vec::new(),
            relationships: BTreeMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Replace the interface predicate used by extraction
    pub fn with_interface_policy(mut self, policy: Arc<dyn InterfacePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Diagram type name
    pub fn diagram_type(&self) -> &'static str {
        Self::TYPE
    }

    /// The syntax source this diagram reads from
    pub fn source(&self) -> &'s dyn SyntaxSource {
        self.source
    }

    /// Generator shared with other diagrams of the session
    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// All entities, in registration order
    pub fn objects(&self) -> &[DiagramEntity] {
        &self.objects
    }

    /// Entity by position
    pub fn entity(&self, id: EntityId) -> Option<&DiagramEntity> {
        self.objects.get(id.0)
    }

    /// All relationships grouped by kind
    pub fn relationships(&self) -> &BTreeMap<RelationKind, Vec<Relationship>> {
        &self.relationships
    }

    /// Relationships of one kind, in creation order
    pub fn relationships_of(&self, kind: RelationKind) -> &[Relationship] {
        self.relationships
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.values().map(Vec::len).sum()
    }

    /// Append a relationship; duplicates are kept
    pub fn add_relationship(
        &mut self,
        from: EntityId,
        to: EntityId,
        kind: RelationKind,
        name: Option<String>,
    ) -> FigureId {
        let id = self.ids.next_id();
        self.relationships
            .entry(kind)
            .or_default()
            .push(Relationship::new(id, from, to, kind, name));
        id
    }

    /// First relationship of `kind` leaving `from`.
    ///
    /// Several relationships of one kind may share a source (a class with
    /// two associations, say); only the earliest is returned.
    pub fn get_relationship(&self, from: EntityId, kind: RelationKind) -> Result<&Relationship> {
        self.relationships_of(kind)
            .iter()
            .find(|rel| rel.from == from)
            .ok_or_else(|| Error::not_found("relationship", format!("{} from entity {}", kind, from.0)))
    }

    /// Register a node as a new entity.
    ///
    /// With a filter, class entities also get their function members and
    /// inferred instance attribute names that pass it.
    pub fn add_object(
        &mut self,
        title: impl Into<String>,
        node: NodeId,
        attribute_filter: Option<&dyn Fn(&str) -> bool>,
    ) -> Result<EntityId> {
        if self.nodes.contains_key(&node) {
            return Err(Error::AlreadyRegistered(node));
        }

        let mut entity = DiagramEntity::new(self.ids.next_id(), title, node);
        if let Some(show) = attribute_filter {
            if self.source.is_class(node) {
                let source = self.source;
                entity.methods = Some(
                    source
                        .members(node)
                        .iter()
                        .copied()
                        .filter(|&m| source.is_function(m))
                        .filter(|&m| source.name(m).is_some_and(show))
                        .collect(),
                );
                entity.attrs = Some(
                    source
                        .instance_attrs_type(node)
                        .into_iter()
                        .map(|(name, _)| name)
                        .filter(|&name| show(name))
                        .map(str::to_string)
                        .collect(),
                );
            }
        }

        let id = EntityId(self.objects.len());
        debug!(title = %entity.title, node = %node, "registered diagram object");
        self.nodes.insert(node, id);
        self.objects.push(entity);
        Ok(id)
    }

    /// Every registered syntax node
    pub fn nodes(&self) -> HashSet<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Whether a node is registered
    pub fn has_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Entity registered for a node
    pub fn object_from_node(&self, node: NodeId) -> Result<&DiagramEntity> {
        self.lookup(node)
            .map(|id| &self.objects[id.0])
            .ok_or_else(|| Error::not_found("node", node))
    }

    /// Entity id registered for a node, if any
    pub fn lookup(&self, node: NodeId) -> Option<EntityId> {
        self.nodes.get(&node).copied()
    }

    /// Class entities, in registration order
    pub fn classes(&self) -> Vec<&DiagramEntity> {
        self.objects
            .iter()
            .filter(|o| self.source.is_class(o.node))
            .collect()
    }

    /// Class entity whose node has the given name; first match wins
    pub fn classe(&self, name: &str) -> Result<&DiagramEntity> {
        self.classes()
            .into_iter()
            .find(|o| self.source.name(o.node) == Some(name))
            .ok_or_else(|| Error::not_found("class", name))
    }

    /// Ids of the entities whose node satisfies `pred`
    pub(crate) fn entity_ids_where(&self, pred: impl Fn(NodeId) -> bool) -> Vec<EntityId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| pred(o.node))
            .map(|(i, _)| EntityId(i))
            .collect()
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut DiagramEntity {
        &mut self.objects[id.0]
    }

    /// Populate shapes and class-level relationships.
    ///
    /// Adds edges on every call; run it once per diagram.
    pub fn extract_relationships(&mut self) {
        let source = self.source;
        let policy = Arc::clone(&self.policy);
        let before = self.relationship_count();

        for obj in self.entity_ids_where(|n| source.is_class(n)) {
            let node = self.objects[obj.0].node;

            let shape = if policy.is_interface(source, node) {
                Shape::Interface
            } else {
                Shape::Class
            };
            self.entity_mut(obj).shape = Some(shape);

            for parent in source.ancestors(node, false) {
                match self.lookup(parent) {
                    Some(target) => {
                        self.add_relationship(obj, target, RelationKind::Specialization, None);
                    }
                    None => trace!(node = %node, parent = %parent, "ancestor not in diagram"),
                }
            }

            for &iface in source.implements(node) {
                match self.lookup(iface) {
                    Some(target) => {
                        self.add_relationship(obj, target, RelationKind::Implements, None);
                    }
                    None => trace!(node = %node, interface = %iface, "interface not in diagram"),
                }
            }

            for (name, values) in source.instance_attrs_type(node) {
                // Unknown values have no target and are dropped here
                for target in values.iter().filter_map(|v| v.target()) {
                    if let Some(target) = self.lookup(target) {
                        self.add_relationship(
                            obj,
                            target,
                            RelationKind::Association,
                            Some(name.to_string()),
                        );
                    }
                }
            }
        }

        debug!(
            diagram = %self.title,
            added = self.relationship_count() - before,
            "extracted class relationships"
        );
    }

    /// Directed graph of entities and relationships.
    ///
    /// Node index `i` holds `EntityId(i)`.
    pub fn to_graph(&self) -> DiGraph<EntityId, RelationKind> {
        let mut graph = DiGraph::with_capacity(self.objects.len(), self.relationship_count());
        let indices: Vec<_> = (0..self.objects.len())
            .map(|i| graph.add_node(EntityId(i)))
            .collect();
        for rel in self.relationships.values().flatten() {
            if let (Some(&from), Some(&to)) = (indices.get(rel.from.0), indices.get(rel.to.0)) {
                graph.add_edge(from, to, rel.kind);
            }
        }
        graph
    }
}

impl Figure for ClassDiagram<'_> {
    fn fig_id(&self) -> FigureId {
        self.id
    }
}
