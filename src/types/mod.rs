//! # Argument Type Resolution
//!
//! Turns the type word of an argument node into an [`ArgumentTypeSpec`].
//!
//! ## Module Structure
//!
//! - **`builtin`**: the six built-in types (`bool`, `string`, `integer`, `long`,
//!   `float`, `double`) and their trailing parameters
//! - **`resolvers`**: ready-made [`ArgumentTypeResolver`] implementations
//!
//! ## Resolution Order
//!
//! 1. Built-in names are matched exactly (case-sensitive) and always win.
//! 2. Any other word is read as a [`NamespacedKey`] (`namespace:name`, or a bare
//!    name in the default namespace) and offered to the registered resolvers in
//!    registration order. The first one whose `can_resolve` returns true
//!    resolves it and may consume further tokens as parameters.
//! 3. If no resolver claims the key, resolution fails with a type error.
//!
//! The registry is populated before parsing and only read while parsing.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ast::ArgumentTypeSpec;
use crate::diagnostics::BoxedCause;
use crate::err_at;
use crate::syntax::lexer::TokenStream;
use crate::syntax::Spanned;
use crate::CommodoreError;

pub mod builtin;
pub mod resolvers;

// ============================================================================
// NAMESPACED KEYS
// ============================================================================

static NAMESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("namespace pattern is valid"));
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9/._-]+$").expect("name pattern is valid"));

/// Why a word is not a valid namespaced key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidKey {
    #[error("'{0}' has more than one ':' separator")]
    TooManyParts(String),
    #[error("'{0}' has an empty namespace or name")]
    EmptyPart(String),
    #[error("namespace '{0}' may only contain [a-z0-9._-]")]
    InvalidNamespace(String),
    #[error("name '{0}' may only contain [a-z0-9/._-]")]
    InvalidName(String),
}

/// A `namespace:name` pair identifying an extension argument type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespacedKey {
    namespace: String,
    name: String,
}

impl NamespacedKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, InvalidKey> {
        let namespace = namespace.into();
        let name = name.into();
        if namespace.is_empty() || name.is_empty() {
            return Err(InvalidKey::EmptyPart(format!("{}:{}", namespace, name)));
        }
        if !NAMESPACE_PATTERN.is_match(&namespace) {
            return Err(InvalidKey::InvalidNamespace(namespace));
        }
        if !NAME_PATTERN.is_match(&name) {
            return Err(InvalidKey::InvalidName(name));
        }
        Ok(Self { namespace, name })
    }

    /// Parses `namespace:name`; a word without `:` is placed in `default_namespace`.
    pub fn parse(text: &str, default_namespace: &str) -> Result<Self, InvalidKey> {
        let mut parts = text.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, _) => Self::new(default_namespace, name),
            (Some(namespace), Some(name), None) => Self::new(namespace, name),
            _ => Err(InvalidKey::TooManyParts(text.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

// ============================================================================
// RESOLVER CAPABILITY
// ============================================================================

/// Failure reported by an [`ArgumentTypeResolver`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A lexing or parsing problem met while consuming parameters; passed
    /// through unchanged.
    #[error(transparent)]
    Syntax(#[from] CommodoreError),
    /// Any resolver-internal failure; wrapped into a type error naming the key.
    #[error("{0}")]
    Failed(BoxedCause),
}

impl ResolveError {
    pub fn failed(cause: impl Into<BoxedCause>) -> Self {
        ResolveError::Failed(cause.into())
    }
}

/// Interprets extension argument type names.
///
/// `resolve` is only called after `can_resolve` returned true for the same
/// key. It receives the token stream positioned right after the type word and
/// may consume further tokens as parameters; it must leave the `{` or `;` that
/// ends the node in place.
pub trait ArgumentTypeResolver: Send + Sync {
    /// A short label for logs.
    fn name(&self) -> &str {
        "resolver"
    }

    fn can_resolve(&self, key: &NamespacedKey) -> bool;

    fn resolve(
        &self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError>;
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Ordered set of extension resolvers, consulted after the built-in table.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn ArgumentTypeResolver>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver; earlier registrations take precedence.
    pub fn register(&mut self, resolver: impl ArgumentTypeResolver + 'static) -> &mut Self {
        self.register_shared(Arc::new(resolver))
    }

    pub fn register_shared(&mut self, resolver: Arc<dyn ArgumentTypeResolver>) -> &mut Self {
        debug!(
            resolver = resolver.name(),
            position = self.resolvers.len(),
            "registered argument type resolver"
        );
        self.resolvers.push(resolver);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, resolver: impl ArgumentTypeResolver + 'static) -> Self {
        self.register(resolver);
        self
    }

    /// The first resolver claiming `key`.
    pub fn find(&self, key: &NamespacedKey) -> Option<&dyn ArgumentTypeResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.can_resolve(key))
            .map(|resolver| &**resolver)
    }

    pub fn can_resolve(&self, key: &NamespacedKey) -> bool {
        self.find(key).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolves the type word of an argument node, consuming any parameters.
    pub fn resolve(
        &self,
        type_word: &Spanned<String>,
        tokens: &mut dyn TokenStream,
        default_namespace: &str,
    ) -> Result<ArgumentTypeSpec, CommodoreError> {
        if let Some(kind) = builtin::BuiltinKind::from_name(&type_word.value) {
            return builtin::parse_builtin(kind, tokens);
        }

        let key = NamespacedKey::parse(&type_word.value, default_namespace).map_err(|e| {
            err_at!(
                Type,
                type_word.span,
                "invalid key for argument type '{}'",
                type_word.value
            )
            .with_cause(e)
        })?;

        let Some(resolver) = self.find(&key) else {
            return Err(err_at!(
                Type,
                type_word.span,
                "unknown argument type '{}': not a built-in type and no resolver claims it",
                key
            )
            .with_help(format!(
                "built-in types are {}; register a resolver for '{}'",
                builtin::BUILTIN_TYPE_NAMES.join(", "),
                key
            )));
        };

        debug!(%key, resolver = resolver.name(), "resolving extension argument type");
        resolver.resolve(&key, tokens).map_err(|e| match e {
            ResolveError::Syntax(err) => err,
            ResolveError::Failed(cause) => err_at!(
                Type,
                type_word.span,
                "argument type '{}' could not be resolved by {}",
                key,
                resolver.name()
            )
            .with_cause(cause),
        })
    }
}
