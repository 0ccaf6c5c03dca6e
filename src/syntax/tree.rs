// Syntax node arena
//
// The diagram layer only ever talks to syntax nodes through `SyntaxSource`.
// `SyntaxTree` is the in-memory implementation: nodes live in a flat arena
// and refer to each other by `NodeId`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Stable handle of a syntax node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    Module,
    Function,
    Other,
}

/// One statically inferred value of an instance attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inferred {
    /// Inference gave up or was ambiguous
    Unknown,
    /// An instance of the given class
    Instance(NodeId),
    /// The node itself (a class object, a module, a function...)
    Node(NodeId),
}

impl Inferred {
    /// The node this value points at, if any
    pub fn target(&self) -> Option<NodeId> {
        match *self {
            Inferred::Unknown => None,
            Inferred::Instance(class) => Some(class),
            Inferred::Node(node) => Some(node),
        }
    }
}

/// Class payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassData {
    /// Direct base classes, in declaration order
    pub bases: Vec<NodeId>,
    /// Interfaces the class declares implementing
    pub implements: Vec<NodeId>,
    /// Functions and nested definitions in the class body
    pub members: Vec<NodeId>,
    /// Instance attribute name -> inferred values
    pub instance_attrs: BTreeMap<String, Vec<Inferred>>,
    /// Explicitly annotated as an interface
    pub interface: bool,
}

/// Module payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleData {
    /// Names of the modules this module references
    pub depends: Vec<String>,
    /// Top-level definitions
    pub members: Vec<NodeId>,
}

/// Function payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionData {
    pub decorators: Vec<String>,
}

/// Per-kind node data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    Class(ClassData),
    Module(ModuleData),
    Function(FunctionData),
    Other,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Class(_) => NodeKind::Class,
            NodeData::Module(_) => NodeKind::Module,
            NodeData::Function(_) => NodeKind::Function,
            NodeData::Other => NodeKind::Other,
        }
    }
}

/// A syntax node stored in a `SyntaxTree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub name: String,
    /// Enclosing node, `None` for top-level modules
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(flatten)]
    pub data: NodeData,
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Read-only capabilities the diagram layer needs from a syntax-node service.
///
/// Queries on a node of the wrong kind (or an unknown node) return an empty
/// answer rather than failing.
pub trait SyntaxSource {
    /// Kind of the node, `None` if the node is unknown
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Identifier of the node
    fn name(&self, node: NodeId) -> Option<&str>;

    /// Definitions directly contained in a class or module
    fn members(&self, node: NodeId) -> &[NodeId];

    /// Base classes of a class; all transitive bases when `recursive`
    fn ancestors(&self, node: NodeId, recursive: bool) -> Vec<NodeId>;

    /// Interfaces a class declares implementing
    fn implements(&self, node: NodeId) -> &[NodeId];

    /// Inferred instance attributes of a class, ordered by name
    fn instance_attrs_type(&self, node: NodeId) -> Vec<(&str, &[Inferred])>;

    /// Top-level module enclosing the node
    fn root(&self, node: NodeId) -> NodeId;

    /// Names of the modules a module depends on
    fn depends(&self, node: NodeId) -> &[String];

    /// Whether the class carries an explicit interface annotation
    fn is_annotated_interface(&self, node: NodeId) -> bool;

    fn is_class(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Class)
    }

    fn is_module(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Module)
    }

    fn is_function(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Function)
    }
}

/// Arena of syntax nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tree from JSON and check its references
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: SyntaxTree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Load a tree from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Serialize the tree as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check references, parent kinds and that parent chains terminate
    pub fn validate(&self) -> Result<()> {
        let check = |owner: usize, what: &str, id: NodeId| -> Result<()> {
            if id.0 < self.nodes.len() {
                Ok(())
            } else {
                Err(Error::invalid_tree(format!(
                    "node #{} has unknown {} {}",
                    owner, what, id
                )))
            }
        };

        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                check(index, "parent", parent)?;
                if parent.0 == index {
                    return Err(Error::invalid_tree(format!("node #{} is its own parent", index)));
                }
                if !matches!(self.nodes[parent.0].kind(), NodeKind::Module | NodeKind::Class) {
                    return Err(Error::invalid_tree(format!(
                        "node #{} has parent {} which is neither a module nor a class",
                        index, parent
                    )));
                }
            }
            match &node.data {
                NodeData::Class(class) => {
                    for &id in class.bases.iter().chain(&class.implements).chain(&class.members) {
                        check(index, "reference", id)?;
                    }
                    for value in class.instance_attrs.values().flatten() {
                        if let Some(target) = value.target() {
                            check(index, "attribute value", target)?;
                        }
                    }
                }
                NodeData::Module(module) => {
                    for &id in &module.members {
                        check(index, "member", id)?;
                    }
                }
                NodeData::Function(_) | NodeData::Other => {}
            }
        }

        // Every parent chain must end at a parentless node
        for index in 0..self.nodes.len() {
            let mut current = index;
            let mut steps = 0;
            while let Some(parent) = self.nodes[current].parent {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(Error::invalid_tree(format!(
                        "node #{} sits on a parent cycle",
                        index
                    )));
                }
                current = parent.0;
            }
        }

        Ok(())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0)
    }

    /// Iterate over all nodes
    pub fn all_nodes(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Find the first node of a kind with the given name
    pub fn find(&self, kind: NodeKind, name: &str) -> Option<NodeId> {
        self.all_nodes()
            .find(|(_, node)| node.kind() == kind && node.name == name)
            .map(|(id, _)| id)
    }

    /// Add a top-level module
    pub fn add_module(&mut self, name: &str) -> NodeId {
        self.push(name, None, NodeData::Module(ModuleData::default()))
    }

    /// Add a class inside a module or another class
    pub fn add_class(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.push(name, Some(parent), NodeData::Class(ClassData::default()));
        self.attach(parent, id);
        id
    }

    /// Add a function inside a module or class
    pub fn add_function(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.push(name, Some(parent), NodeData::Function(FunctionData::default()));
        self.attach(parent, id);
        id
    }

    /// Add a node of no particular kind
    pub fn add_other(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        let id = self.push(name, parent, NodeData::Other);
        if let Some(parent) = parent {
            self.attach(parent, id);
        }
        id
    }

    /// Record a direct base class
    pub fn add_base(&mut self, class: NodeId, base: NodeId) {
        if let Some(data) = self.class_mut(class) {
            data.bases.push(base);
        }
    }

    /// Record an implemented interface
    pub fn add_implements(&mut self, class: NodeId, interface: NodeId) {
        if let Some(data) = self.class_mut(class) {
            data.implements.push(interface);
        }
    }

    /// Flag a class as explicitly annotated interface
    pub fn mark_interface(&mut self, class: NodeId) {
        if let Some(data) = self.class_mut(class) {
            data.interface = true;
        }
    }

    /// Declare an instance attribute without inferred values
    pub fn declare_attr(&mut self, class: NodeId, name: &str) {
        if let Some(data) = self.class_mut(class) {
            data.instance_attrs.entry(name.to_string()).or_default();
        }
    }

    /// Add an inferred value to an instance attribute; duplicates are ignored
    pub fn infer_attr(&mut self, class: NodeId, name: &str, value: Inferred) {
        if let Some(data) = self.class_mut(class) {
            let values = data.instance_attrs.entry(name.to_string()).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    /// Record that a module references another module by name
    pub fn add_dependency(&mut self, module: NodeId, name: &str) {
        if let Some(NodeData::Module(data)) = self.nodes.get_mut(module.0).map(|n| &mut n.data) {
            if !data.depends.iter().any(|d| d == name) {
                data.depends.push(name.to_string());
            }
        }
    }

    /// Attach a decorator to a function
    pub fn add_decorator(&mut self, function: NodeId, decorator: &str) {
        if let Some(NodeData::Function(data)) = self.nodes.get_mut(function.0).map(|n| &mut n.data) {
            data.decorators.push(decorator.to_string());
        }
    }

    fn push(&mut self, name: &str, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            name: name.to_string(),
            parent,
            data,
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        match self.nodes.get_mut(parent.0).map(|n| &mut n.data) {
            Some(NodeData::Class(data)) => data.members.push(child),
            Some(NodeData::Module(data)) => data.members.push(child),
            _ => {}
        }
    }

    fn class(&self, id: NodeId) -> Option<&ClassData> {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Class(data)) => Some(data),
            _ => None,
        }
    }

    fn class_mut(&mut self, id: NodeId) -> Option<&mut ClassData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Class(data)) => Some(data),
            _ => None,
        }
    }
}

impl SyntaxSource for SyntaxTree {
    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(SyntaxNode::kind)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn members(&self, node: NodeId) -> &[NodeId] {
        match self.node(node).map(|n| &n.data) {
            Some(NodeData::Class(data)) => &data.members,
            Some(NodeData::Module(data)) => &data.members,
            _ => &[],
        }
    }

    fn ancestors(&self, node: NodeId, recursive: bool) -> Vec<NodeId> {
        let Some(class) = self.class(node) else {
            return Vec::new();
        };
        if !recursive {
            return class.bases.clone();
        }

        // Depth-first in declaration order; each ancestor once, cycles cut
        let mut seen: HashSet<NodeId> = HashSet::from([node]);
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = class.bases.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(data) = self.class(current) {
                stack.extend(data.bases.iter().rev().copied());
            }
        }
        result
    }

    fn implements(&self, node: NodeId) -> &[NodeId] {
        self.class(node).map(|c| c.implements.as_slice()).unwrap_or(&[])
    }

    fn instance_attrs_type(&self, node: NodeId) -> Vec<(&str, &[Inferred])> {
        self.class(node)
            .map(|c| {
                c.instance_attrs
                    .iter()
                    .map(|(name, values)| (name.as_str(), values.as_slice()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        // Bounded walk so a malformed parent chain cannot loop forever
        for _ in 0..=self.nodes.len() {
            match self.node(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    fn depends(&self, node: NodeId) -> &[String] {
        match self.node(node).map(|n| &n.data) {
            Some(NodeData::Module(data)) => &data.depends,
            _ => &[],
        }
    }

    fn is_annotated_interface(&self, node: NodeId) -> bool {
        self.class(node).map(|c| c.interface).unwrap_or(false)
    }
}
