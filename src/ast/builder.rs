//! # Tree Builder
//!
//! Builds command trees in code, for hosts that want to contribute nodes
//! without a command file and for tests.
//!
//! ```rust
//! use commodore::ast::builder::NodeBuilder;
//! use commodore::ArgumentTypeSpec;
//!
//! let tree = NodeBuilder::literal("root")
//!     .then(NodeBuilder::argument("count", ArgumentTypeSpec::integer()))
//!     .then(NodeBuilder::literal("help"))
//!     .build()
//!     .unwrap();
//! assert_eq!(tree.node_count(), 3);
//! ```
//!
//! ## Invariants
//! - Sibling names are unique; [`NodeBuilder::build`] rejects duplicates.
//!   Deserialized trees go through the same check.
//! - A built tree is immutable like a parsed one.

use std::collections::HashSet;

use im::Vector;
use serde::Deserialize;
use thiserror::Error;

use crate::ast::{ArgumentTypeSpec, CommandNode};

/// Two children of the same node share a name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate child node '{name}' under '{parent}'")]
pub struct DuplicateChild {
    pub parent: String,
    pub name: String,
}

/// Incrementally assembles one node and its subtree.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawNode")]
pub struct NodeBuilder {
    name: String,
    argument_type: Option<ArgumentTypeSpec>,
    children: Vec<NodeBuilder>,
}

impl NodeBuilder {
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument_type: None,
            children: Vec::new(),
        }
    }

    pub fn argument(name: impl Into<String>, argument_type: ArgumentTypeSpec) -> Self {
        Self {
            name: name.into(),
            argument_type: Some(argument_type),
            children: Vec::new(),
        }
    }

    /// Appends a child.
    pub fn then(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn build(self) -> Result<CommandNode, DuplicateChild> {
        let mut seen = HashSet::new();
        let mut children = Vector::new();
        for child in self.children {
            if !seen.insert(child.name.clone()) {
                return Err(DuplicateChild {
                    parent: self.name,
                    name: child.name,
                });
            }
            children.push_back(child.build()?);
        }
        Ok(match self.argument_type {
            Some(argument_type) => CommandNode::argument(self.name, argument_type, children),
            None => CommandNode::literal(self.name, children),
        })
    }
}

/// The serialized form of a [`CommandNode`], read before sibling names are
/// checked.
#[derive(Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum RawNode {
    Literal {
        name: String,
        children: Vec<RawNode>,
    },
    Argument {
        name: String,
        #[serde(rename = "type")]
        argument_type: ArgumentTypeSpec,
        children: Vec<RawNode>,
    },
}

impl From<RawNode> for NodeBuilder {
    fn from(raw: RawNode) -> Self {
        let (name, argument_type, children) = match raw {
            RawNode::Literal { name, children } => (name, None, children),
            RawNode::Argument {
                name,
                argument_type,
                children,
            } => (name, Some(argument_type), children),
        };
        Self {
            name,
            argument_type,
            children: children.into_iter().map(NodeBuilder::from).collect(),
        }
    }
}

impl From<&CommandNode> for NodeBuilder {
    fn from(node: &CommandNode) -> Self {
        Self {
            name: node.name().to_string(),
            argument_type: node.argument_type().cloned(),
            children: node.children().iter().map(NodeBuilder::from).collect(),
        }
    }
}
