//! Parser for `.commodore` command tree files.
//!
//! ```rust
//! use commodore::{parse_str, ArgumentTypeSpec, ResolverRegistry};
//!
//! let tree = parse_str("root { count integer 0 10; help; }", &ResolverRegistry::new()).unwrap();
//! assert_eq!(
//!     tree.child("count").and_then(|n| n.argument_type()),
//!     Some(&ArgumentTypeSpec::Integer { min: 0, max: 10 })
//! );
//! ```

pub use crate::ast::{ArgumentTypeSpec, CommandNode, StringMode};
pub use crate::config::{ParserConfig, TypesConfig};
pub use crate::diagnostics::{CommodoreError, ErrorContext, ErrorType};
pub use crate::syntax::parser::{parse, parse_file, parse_reader, parse_str, Parser};
pub use crate::types::{ArgumentTypeResolver, NamespacedKey, ResolveError, ResolverRegistry};

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod syntax;
pub mod types;
