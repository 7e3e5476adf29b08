//! Canonical text rendering of command trees.
//!
//! The output uses the same surface grammar the parser reads, so for any tree
//! whose extension types re-consume their payload words, parsing the rendered
//! text gives back an equal tree.
//!
//! ```text
//! root {
//!     count integer 0 10;
//!     target minecraft:entity single;
//!     help;
//! }
//! ```

use crate::ast::{ArgumentTypeSpec, CommandNode};
use crate::types::builtin::Bound;

const INDENT: &str = "    ";

impl CommandNode {
    /// Renders this tree in canonical form, ending with a newline.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self, 0);
        out
    }
}

impl ArgumentTypeSpec {
    /// The words declaring this type, as they appear after an argument name.
    pub fn to_words(&self) -> Vec<String> {
        match self {
            ArgumentTypeSpec::Bool => vec!["bool".to_string()],
            ArgumentTypeSpec::String { mode } => {
                vec!["string".to_string(), mode.keyword().to_string()]
            }
            ArgumentTypeSpec::Integer { min, max } => bound_words("integer", *min, *max),
            ArgumentTypeSpec::Long { min, max } => bound_words("long", *min, *max),
            ArgumentTypeSpec::Float { min, max } => bound_words("float", *min, *max),
            ArgumentTypeSpec::Double { min, max } => bound_words("double", *min, *max),
            ArgumentTypeSpec::Extension { payload, .. } => std::iter::once(self.type_name())
                .chain(payload.iter().cloned())
                .collect(),
        }
    }
}

fn write_node(out: &mut String, node: &CommandNode, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
    out.push_str(&quote_word(node.name()));
    if let Some(argument_type) = node.argument_type() {
        for word in argument_type.to_words() {
            out.push(' ');
            out.push_str(&quote_word(&word));
        }
    }

    if node.children().is_empty() {
        out.push_str(";\n");
        return;
    }

    out.push_str(" {\n");
    for child in node.children() {
        write_node(out, child, level + 1);
    }
    for _ in 0..level {
        out.push_str(INDENT);
    }
    out.push_str("}\n");
}

/// Omits bounds at their natural extremes; an explicit extreme lower bound is
/// written as `min` when an upper bound follows.
fn bound_words<B: Bound>(kind: &str, min: B, max: B) -> Vec<String> {
    let mut words = vec![kind.to_string()];
    let min_is_default = min == B::MIN;
    let max_is_default = max == B::MAX;
    if min_is_default && max_is_default {
        return words;
    }
    words.push(if min_is_default {
        "min".to_string()
    } else {
        min.to_string()
    });
    if !max_is_default {
        words.push(max.to_string());
    }
    words
}

/// Quotes a word when it would not lex back as the same single bare word.
pub fn quote_word(word: &str) -> String {
    let bare = !word.is_empty()
        && word
            .chars()
            .all(|c| matches!(c, '!'..='~') && !matches!(c, '{' | '}' | ';' | '"'))
        && !word.contains("//")
        && !word.contains("/*");
    if bare {
        return word.to_string();
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
