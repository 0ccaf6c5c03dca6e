use crate::diagram::figure::{Figure, FigureId};
use crate::syntax::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an entity in its diagram's `objects`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// How a writer should draw an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Class,
    Interface,
    Package,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Class => "class",
            Shape::Interface => "interface",
            Shape::Package => "package",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled wrapper around one syntax node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEntity {
    id: FigureId,
    pub title: String,
    pub node: NodeId,
    /// Filtered method nodes, set when registered with a filter
    pub methods: Option<Vec<NodeId>>,
    /// Filtered instance attribute names, set when registered with a filter
    pub attrs: Option<Vec<String>>,
    /// Assigned by relationship extraction
    pub shape: Option<Shape>,
}

impl DiagramEntity {
    pub fn new(id: FigureId, title: impl Into<String>, node: NodeId) -> Self {
        Self {
            id,
            title: title.into(),
            node,
            methods: None,
            attrs: None,
            shape: None,
        }
    }
}

impl Figure for DiagramEntity {
    fn fig_id(&self) -> FigureId {
        self.id
    }
}
