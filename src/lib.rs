//! Classmap - Class and package diagram models from analyzed code
//!
//! Registers the classes and modules of an analyzed codebase as diagram
//! entities and extracts the relationships between them (inheritance,
//! interface realization, association, ownership, module dependency) for a
//! diagram writer to render.

pub mod config;
pub mod diagram;
pub mod error;
pub mod policy;
pub mod syntax;

// Re-export main types
pub use config::Config;
pub use diagram::{
    ClassDiagram, DiagramEntity, DiagramSession, EntityId, Figure, FigureId, IdGenerator,
    PackageDiagram, RelationKind, Relationship, Shape,
};
pub use error::{Error, Result};
pub use policy::{AttributeFilter, FilterMode, InterfacePolicy, NamingPolicy, NeverInterface};
pub use syntax::{Inferred, Linker, NodeId, NodeKind, ParsedFile, SyntaxSource, SyntaxTree};
