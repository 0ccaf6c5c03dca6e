// Parsed source records
//
// Per-file records as handed over by a language parser. They carry names
// as written in the source; the linker resolves them into a `SyntaxTree`.
// Serializable so parser output can be cached and replayed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed source file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParsedFile {
    /// File path relative to project root
    pub path: PathBuf,
    /// Module name derived from path
    pub module_name: String,
    /// All imports in the file
    pub imports: Vec<Import>,
    /// All classes defined in the file
    pub classes: Vec<Class>,
    /// Top-level functions (not methods)
    pub functions: Vec<Function>,
}

impl ParsedFile {
    /// Create a new parsed file with basic info
    pub fn new(path: PathBuf, module_name: String) -> Self {
        Self {
            path,
            module_name,
            ..Self::default()
        }
    }

    /// Check if file has any definitions
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty()
    }

    /// Modules referenced by import statements, first occurrence order
    pub fn imported_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for import in &self.imports {
            if !modules.contains(&import.module.as_str()) {
                modules.push(&import.module);
            }
        }
        modules
    }
}

/// An import statement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Import {
    /// The module being imported
    pub module: String,
    /// Specific names imported (for `from x import y`)
    pub names: Vec<String>,
    /// Line number
    pub line: usize,
}

impl Import {
    /// Create a simple `import x` style import
    pub fn simple(module: &str, line: usize) -> Self {
        Self {
            module: module.to_string(),
            names: Vec::new(),
            line,
        }
    }

    /// Create a `from x import y` style import
    pub fn from_import(module: &str, names: &[&str], line: usize) -> Self {
        Self {
            module: module.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            line,
        }
    }
}

/// A class definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Class {
    /// Class name
    pub name: String,
    /// Base classes (as written, not resolved)
    pub bases: Vec<String>,
    /// Decorators applied to the class
    pub decorators: Vec<String>,
    /// Methods defined in the class
    pub methods: Vec<Function>,
    /// Instance attributes
    pub attributes: Vec<Attribute>,
    /// Starting line number
    pub line_start: usize,
}

impl Class {
    pub fn new(name: &str, line_start: usize) -> Self {
        Self {
            name: name.to_string(),
            line_start,
            ..Self::default()
        }
    }

    /// Add a base class name
    pub fn with_base(mut self, base: &str) -> Self {
        self.bases.push(base.to_string());
        self
    }

    /// Add a method
    pub fn with_method(mut self, name: &str) -> Self {
        self.methods.push(Function::new(name, self.line_start + 1));
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Check if a decorator marks this class as an interface
    pub fn is_annotated_interface(&self) -> bool {
        self.decorators
            .iter()
            .any(|d| d == "interface" || d.ends_with(".interface"))
    }

    /// Interface names listed in a `__implements__` class attribute
    pub fn declared_interfaces(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| a.name == IMPLEMENTS_ATTR)
            .filter_map(|a| a.default.as_deref())
            .flat_map(|value| {
                value
                    .split(|c: char| matches!(c, '(' | ')' | '[' | ']' | ','))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Class attribute that lists implemented interfaces
pub const IMPLEMENTS_ATTR: &str = "__implements__";

/// An attribute assignment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Type annotation if present
    pub type_hint: Option<String>,
    /// Assigned value as written (if present)
    pub default: Option<String>,
    /// Line number
    pub line: usize,
}

impl Attribute {
    pub fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            line,
            ..Self::default()
        }
    }

    pub fn with_type(name: &str, type_hint: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            type_hint: Some(type_hint.to_string()),
            line,
            ..Self::default()
        }
    }

    /// Type names mentioned by the annotation, with wrappers unpacked.
    ///
    /// `Optional[Foo]`, `list[Foo]`, `Union[Foo, Bar]` and `Foo | Bar` all
    /// yield the inner names; `None` is dropped.
    pub fn hinted_types(&self) -> Vec<String> {
        let Some(hint) = self.type_hint.as_deref() else {
            return Vec::new();
        };

        let mut names = Vec::new();
        for token in hint.split(|c: char| matches!(c, '[' | ']' | ',' | '|')) {
            let token = token.trim().trim_matches(|c| c == '"' || c == '\'');
            if token.is_empty() || token == "None" || is_type_wrapper(token) {
                continue;
            }
            if !names.iter().any(|n: &String| n == token) {
                names.push(token.to_string());
            }
        }
        names
    }
}

fn is_type_wrapper(name: &str) -> bool {
    let short = name.rsplit('.').next().unwrap_or(name);
    matches!(
        short,
        "Optional" | "Union" | "List" | "list" | "Set" | "set" | "FrozenSet" | "frozenset"
            | "Sequence" | "Iterable" | "Tuple" | "tuple" | "Type" | "type" | "ClassVar"
            | "Final"
    )
}

/// A function or method definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Decorators applied
    pub decorators: Vec<String>,
    /// Starting line number
    pub line_start: usize,
}

impl Function {
    pub fn new(name: &str, line_start: usize) -> Self {
        Self {
            name: name.to_string(),
            line_start,
            ..Self::default()
        }
    }
}
