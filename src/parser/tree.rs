use serde::Serialize;
use std::fmt;

use super::{Location, Token};

/// Handle of a node inside a [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Leaf(Token),
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    /// Symbol index of the non-terminal in the grammar the tree was parsed with.
    pub symbol: usize,
    pub label: String,
    pub children: Vec<Child>,
}

/// Parse tree stored as an arena; the first node is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl ParseTree {
    pub(crate) fn with_root(symbol: usize, label: &str) -> Self {
        Self {
            nodes: vec![ParseNode {
                symbol,
                label: label.to_string(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn add_node(&mut self, parent: NodeId, symbol: usize, label: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ParseNode {
            symbol,
            label: label.to_string(),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(Child::Node(id));
        id
    }

    pub(crate) fn add_leaf(&mut self, parent: NodeId, token: Token) {
        self.nodes[parent.0].children.push(Child::Leaf(token));
    }

    /// Leaf tokens under `id`, left to right.
    pub fn leaves_of(&self, id: NodeId) -> Vec<&Token> {
        let mut ordered = Vec::new();
        self.collect_leaves(id, &mut ordered);
        ordered
    }

    fn collect_leaves<'a>(&'a self, id: NodeId, out: &mut Vec<&'a Token>) {
        for child in &self.node(id).children {
            match child {
                Child::Leaf(token) => out.push(token),
                Child::Node(child) => self.collect_leaves(*child, out),
            }
        }
    }

    pub fn leaves(&self) -> Vec<&Token> {
        self.leaves_of(self.root())
    }

    /// Location covering every leaf under `id`, `None` if it derived nothing.
    pub fn location(&self, id: NodeId) -> Option<Location> {
        self.leaves_of(id)
            .into_iter()
            .map(|token| token.location)
            .reduce(|a, b| a.merge(&b))
    }

    /// Concatenated text of every leaf under `id`.
    pub fn extract_literals(&self, id: NodeId) -> String {
        self.leaves_of(id)
            .into_iter()
            .map(|token| token.text.as_str())
            .collect()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        for child in &self.node(id).children {
            match child {
                Child::Leaf(token) => {
                    writeln!(f, "{:indent$}{:?}", "", token.text, indent = level * 2)?
                }
                Child::Node(child) => {
                    let label = &self.node(*child).label;
                    writeln!(f, "{:indent$}{}", "", label, indent = level * 2)?;
                    self.fmt_node(f, *child, level + 1)?;
                }
            }
        }
        Ok(())
    }

    pub fn to_output(&self) -> NodeOutput {
        self.node_output(self.root())
    }

    fn node_output(&self, id: NodeId) -> NodeOutput {
        let node = self.node(id);
        NodeOutput {
            label: node.label.as_str(),
            children: node
                .children
                .iter()
                .map(|child| match child {
                    Child::Leaf(token) => ChildOutput::Leaf(token),
                    Child::Node(child) => ChildOutput::Node(self.node_output(*child)),
                })
                .collect(),
        }
    }
}

/// Prints the tree one symbol per line, children indented under their parent.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.node(self.root()).label)?;
        self.fmt_node(f, self.root(), 1)
    }
}

/// Nested view of a [`ParseTree`] for serialization.
#[derive(Serialize)]
pub struct NodeOutput<'a> {
    label: &'a str,
    children: Vec<ChildOutput<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ChildOutput<'a> {
    Leaf(&'a Token),
    Node(NodeOutput<'a>),
}
