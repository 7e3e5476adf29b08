//! Registering one tree under several command labels.
//!
//! A host usually exposes a command under its label, its aliases, and a
//! prefixed form of each (`plugin:label`). The parsed tree stays untouched;
//! every label gets a renamed copy sharing the same children.

use im::Vector;

use crate::ast::CommandNode;

/// Lists every label a command is reachable under, without repeats.
///
/// The label comes first, then the aliases in order. With a fallback prefix,
/// each name is directly followed by its `prefix:name` form. The prefix is
/// trimmed and lowercased first; a blank prefix is ignored.
pub fn alias_labels(label: &str, aliases: &[&str], fallback_prefix: Option<&str>) -> Vec<String> {
    let prefix = fallback_prefix
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty());

    let mut labels: Vec<String> = Vec::with_capacity((aliases.len() + 1) * 2);
    let mut push = |name: String| {
        if !labels.contains(&name) {
            labels.push(name);
        }
    };
    for name in std::iter::once(label).chain(aliases.iter().copied()) {
        push(name.to_string());
        if let Some(prefix) = &prefix {
            push(format!("{}:{}", prefix, name));
        }
    }
    labels
}

/// One renamed copy of `node` per label from [`alias_labels`].
pub fn expand_aliases(
    node: &CommandNode,
    label: &str,
    aliases: &[&str],
    fallback_prefix: Option<&str>,
) -> Vector<CommandNode> {
    alias_labels(label, aliases, fallback_prefix)
        .into_iter()
        .map(|name| node.renamed(name))
        .collect()
}
