// Syntax node model consumed by the diagram layer

pub mod ast;
pub mod linker;
pub mod tree;

pub use ast::{Attribute, Class, Function, Import, ParsedFile};
pub use linker::Linker;
pub use tree::*;
