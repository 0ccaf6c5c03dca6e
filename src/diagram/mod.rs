// Diagram model: entities, relationships and their extraction

pub mod class_diagram;
pub mod entity;
pub mod figure;
pub mod package_diagram;
pub mod relationship;
pub mod session;

pub use class_diagram::ClassDiagram;
pub use entity::{DiagramEntity, EntityId, Shape};
pub use figure::{Figure, FigureId, IdGenerator};
pub use package_diagram::PackageDiagram;
pub use relationship::{RelationKind, Relationship};
pub use session::DiagramSession;
