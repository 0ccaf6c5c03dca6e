use crate::diagram::entity::EntityId;
use crate::diagram::figure::{Figure, FigureId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship between two diagram entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Class inherits from class
    Specialization,
    /// Class realizes interface
    Implements,
    /// Class holds an attribute typed by another entity
    Association,
    /// Class is defined in module
    Ownership,
    /// Module references module
    Depends,
}

impl RelationKind {
    pub const ALL: [RelationKind; 5] = [
        RelationKind::Specialization,
        RelationKind::Implements,
        RelationKind::Association,
        RelationKind::Ownership,
        RelationKind::Depends,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Specialization => "specialization",
            RelationKind::Implements => "implements",
            RelationKind::Association => "association",
            RelationKind::Ownership => "ownership",
            RelationKind::Depends => "depends",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge between two entities of the same diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    id: FigureId,
    pub from: EntityId,
    pub to: EntityId,
    pub kind: RelationKind,
    /// Label; association edges carry the attribute name
    pub name: Option<String>,
}

impl Relationship {
    /// Plain construction; the owning diagram guarantees both ends exist
    pub fn new(
        id: FigureId,
        from: EntityId,
        to: EntityId,
        kind: RelationKind,
        name: Option<String>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            kind,
            name,
        }
    }
}

impl Figure for Relationship {
    fn fig_id(&self) -> FigureId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_display() {
        let names: Vec<String> = RelationKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec!["specialization", "implements", "association", "ownership", "depends"]
        );
    }

    #[test]
    fn test_relation_kind_serde_matches_display() {
        for kind in RelationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_relationship_new() {
        let rel = Relationship::new(
            FigureId(3),
            EntityId(0),
            EntityId(1),
            RelationKind::Association,
            Some("owner".to_string()),
        );
        assert_eq!(rel.fig_id(), FigureId(3));
        assert_eq!(rel.from, EntityId(0));
        assert_eq!(rel.to, EntityId(1));
        assert_eq!(rel.name.as_deref(), Some("owner"));
    }
}
