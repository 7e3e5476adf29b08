//! Command tree module
//!
//! This module provides the tree produced by parsing a command file: a single
//! root [`CommandNode`] owning its children, and the [`ArgumentTypeSpec`]
//! describing what an argument node captures.
//!
//! Trees are plain values. Children are kept in an [`im::Vector`], so cloning a
//! node (for example to register it under an alias) shares the subtree instead
//! of copying it.

use std::fmt;

use im::Vector;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::types::NamespacedKey;

pub mod alias;
pub mod builder;
pub mod format;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// How a string argument consumes input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMode {
    /// A single word with no whitespace.
    SingleWord,
    /// A single word, or a quoted phrase.
    QuotablePhrase,
    /// The rest of the input.
    GreedyPhrase,
}

impl StringMode {
    pub const ALL: [StringMode; 3] = [
        StringMode::SingleWord,
        StringMode::QuotablePhrase,
        StringMode::GreedyPhrase,
    ];

    /// The word selecting this mode in a command file.
    pub fn keyword(self) -> &'static str {
        match self {
            StringMode::SingleWord => "single_word",
            StringMode::QuotablePhrase => "quotable_phrase",
            StringMode::GreedyPhrase => "greedy_phrase",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.keyword() == word)
    }
}

/// A fully resolved argument type.
///
/// Numeric bounds are always present; omitted bounds take the natural
/// minimum/maximum of the numeric kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArgumentTypeSpec {
    Bool,
    String {
        mode: StringMode,
    },
    Integer {
        min: i32,
        max: i32,
    },
    Long {
        min: i64,
        max: i64,
    },
    Float {
        min: f32,
        max: f32,
    },
    Double {
        min: f64,
        max: f64,
    },
    /// A type supplied by an extension resolver.
    Extension {
        namespace: String,
        name: String,
        /// Parameter words the resolver consumed after the type name.
        payload: Vec<String>,
    },
}

impl ArgumentTypeSpec {
    pub fn integer() -> Self {
        ArgumentTypeSpec::Integer {
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    pub fn long() -> Self {
        ArgumentTypeSpec::Long {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub fn float() -> Self {
        ArgumentTypeSpec::Float {
            min: f32::MIN,
            max: f32::MAX,
        }
    }

    pub fn double() -> Self {
        ArgumentTypeSpec::Double {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    pub fn extension(key: &NamespacedKey, payload: Vec<String>) -> Self {
        ArgumentTypeSpec::Extension {
            namespace: key.namespace().to_string(),
            name: key.name().to_string(),
            payload,
        }
    }

    /// The type name as written in a command file (`integer`, `minecraft:entity`, ...).
    pub fn type_name(&self) -> String {
        match self {
            ArgumentTypeSpec::Bool => "bool".to_string(),
            ArgumentTypeSpec::String { .. } => "string".to_string(),
            ArgumentTypeSpec::Integer { .. } => "integer".to_string(),
            ArgumentTypeSpec::Long { .. } => "long".to_string(),
            ArgumentTypeSpec::Float { .. } => "float".to_string(),
            ArgumentTypeSpec::Double { .. } => "double".to_string(),
            ArgumentTypeSpec::Extension {
                namespace, name, ..
            } => format!("{}:{}", namespace, name),
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, ArgumentTypeSpec::Extension { .. })
    }
}

/// A node of a command tree.
///
/// Sibling names are unique. The parser guarantees it for parsed trees and
/// [`builder::NodeBuilder`] checks it for hand-built and deserialized ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum CommandNode {
    /// Matches an exact keyword.
    Literal {
        name: String,
        children: Vector<CommandNode>,
    },
    /// Matches and captures a typed value.
    Argument {
        name: String,
        #[serde(rename = "type")]
        argument_type: ArgumentTypeSpec,
        children: Vector<CommandNode>,
    },
}

impl<'de> Deserialize<'de> for CommandNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        builder::NodeBuilder::deserialize(deserializer)?
            .build()
            .map_err(de::Error::custom)
    }
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl CommandNode {
    pub fn literal(name: impl Into<String>, children: Vector<CommandNode>) -> Self {
        CommandNode::Literal {
            name: name.into(),
            children,
        }
    }

    pub fn argument(
        name: impl Into<String>,
        argument_type: ArgumentTypeSpec,
        children: Vector<CommandNode>,
    ) -> Self {
        CommandNode::Argument {
            name: name.into(),
            argument_type,
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CommandNode::Literal { name, .. } | CommandNode::Argument { name, .. } => name,
        }
    }

    pub fn children(&self) -> &Vector<CommandNode> {
        match self {
            CommandNode::Literal { children, .. } | CommandNode::Argument { children, .. } => {
                children
            }
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, CommandNode::Literal { .. })
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, CommandNode::Argument { .. })
    }

    pub fn argument_type(&self) -> Option<&ArgumentTypeSpec> {
        match self {
            CommandNode::Argument { argument_type, .. } => Some(argument_type),
            CommandNode::Literal { .. } => None,
        }
    }

    /// Looks up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children().iter().find(|child| child.name() == name)
    }

    /// Follows a path of child names starting below this node.
    ///
    /// An empty path returns the node itself.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        path.iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Returns a copy of this node under a new name, sharing its children.
    pub fn renamed(&self, new_name: impl Into<String>) -> CommandNode {
        match self {
            CommandNode::Literal { children, .. } => CommandNode::literal(new_name, children.clone()),
            CommandNode::Argument {
                argument_type,
                children,
                ..
            } => CommandNode::argument(new_name, argument_type.clone(), children.clone()),
        }
    }

    /// Every node in pre-order, paired with its path of names from this node.
    pub fn walk(&self) -> Vec<(Vec<&str>, &CommandNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(vec![self.name()], self)];
        while let Some((path, node)) = stack.pop() {
            for child in node.children().iter().rev() {
                let mut child_path = path.clone();
                child_path.push(child.name());
                stack.push((child_path, child));
            }
            out.push((path, node));
        }
        out
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(CommandNode::node_count)
            .sum::<usize>()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(CommandNode::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}
