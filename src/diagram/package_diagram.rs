// Package diagram model
//
// A class diagram that also holds module entities. Extraction runs the
// class-level pass first, then links classes to their modules and modules
// to the modules they depend on.

use crate::diagram::class_diagram::ClassDiagram;
use crate::diagram::entity::{DiagramEntity, EntityId, Shape};
use crate::diagram::figure::{Figure, FigureId, IdGenerator};
use crate::diagram::relationship::RelationKind;
use crate::error::{Error, Result};
use crate::policy::InterfacePolicy;
use crate::syntax::SyntaxSource;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, trace};

/// Class diagram extended with modules
#[derive(Debug)]
pub struct PackageDiagram<'s> {
    inner: ClassDiagram<'s>,
}

impl<'s> PackageDiagram<'s> {
    pub const TYPE: &'static str = "package";

    /// Create a diagram with its own id generator and the default interface policy
    pub fn new(title: impl Into<String>, source: &'s dyn SyntaxSource) -> Self {
        Self {
            inner: ClassDiagram::new(title, source),
        }
    }

    /// Create a diagram drawing figure ids from a shared generator
    pub fn with_ids(
        title: impl Into<String>,
        source: &'s dyn SyntaxSource,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            inner: ClassDiagram::with_ids(title, source, ids),
        }
    }

    /// Replace the interface predicate used by extraction
    pub fn with_interface_policy(self, policy: Arc<dyn InterfacePolicy>) -> Self {
        Self {
            inner: self.inner.with_interface_policy(policy),
        }
    }

    /// Diagram type name
    pub fn diagram_type(&self) -> &'static str {
        Self::TYPE
    }

    /// The class-level view of this diagram
    pub fn as_class_diagram(&self) -> &ClassDiagram<'s> {
        &self.inner
    }

    /// Module entities, in registration order
    pub fn modules(&self) -> Vec<&DiagramEntity> {
        let source = self.inner.source();
        self.inner
            .objects()
            .iter()
            .filter(|o| source.is_module(o.node))
            .collect()
    }

    /// Module entity whose node has the given name; first match wins
    pub fn module(&self, name: &str) -> Result<&DiagramEntity> {
        self.find_module(name)
            .and_then(|id| self.inner.entity(id))
            .ok_or_else(|| Error::not_found("module", name))
    }

    fn find_module(&self, name: &str) -> Option<EntityId> {
        let source = self.inner.source();
        self.inner
            .entity_ids_where(|n| source.is_module(n))
            .into_iter()
            .find(|&id| {
                self.inner
                    .entity(id)
                    .is_some_and(|o| source.name(o.node) == Some(name))
            })
    }

    /// Populate shapes and all class- and package-level relationships.
    ///
    /// Adds edges on every call; run it once per diagram.
    pub fn extract_relationships(&mut self) {
        self.inner.extract_relationships();

        let source = self.inner.source();
        let before = self.inner.relationship_count();

        for obj in self.inner.entity_ids_where(|n| source.is_class(n)) {
            let node = self.inner.objects()[obj.0].node;
            let root = source.root(node);
            match self.inner.lookup(root) {
                Some(module) => {
                    self.inner
                        .add_relationship(obj, module, RelationKind::Ownership, None);
                }
                None => trace!(node = %node, module = %root, "owning module not in diagram"),
            }
        }

        for obj in self.inner.entity_ids_where(|n| source.is_module(n)) {
            self.inner.entity_mut(obj).shape = Some(Shape::Package);
            let node = self.inner.objects()[obj.0].node;
            for dep in source.depends(node) {
                match self.find_module(dep) {
                    Some(target) => {
                        self.inner
                            .add_relationship(obj, target, RelationKind::Depends, None);
                    }
                    None => trace!(module = %node, dependency = %dep, "dependency not in diagram"),
                }
            }
        }

        debug!(
            diagram = %self.inner.title,
            added = self.inner.relationship_count() - before,
            "extracted package relationships"
        );
    }
}

impl<'s> Deref for PackageDiagram<'s> {
    type Target = ClassDiagram<'s>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PackageDiagram<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Figure for PackageDiagram<'_> {
    fn fig_id(&self) -> FigureId {
        self.inner.fig_id()
    }
}
