//! Ready-made [`ArgumentTypeResolver`] implementations.
//!
//! - [`NamespaceResolver`]: a fixed set of names in one namespace, each with a
//!   [`ParamRule`] saying how many trailing parameter words it takes.
//! - [`MinecraftResolver`]: `minecraft:entity` and `minecraft:score_holder`,
//!   whose parameter words are checked rather than passed through.
//! - [`BrigadierResolver`]: the `brigadier:*` spellings of the built-in types.
//! - [`FnResolver`]: closures, for one-off host integrations and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::ArgumentTypeSpec;
use crate::err_at;
use crate::syntax::lexer::TokenStream;
use crate::types::builtin::{self, BuiltinKind};
use crate::types::{ArgumentTypeResolver, NamespacedKey, ResolveError};

/// How many parameter words an extension type consumes after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawParamRule", into = "RawParamRule")]
pub enum ParamRule {
    /// No parameters.
    #[default]
    None,
    /// Exactly this many words; fewer is an error.
    Exactly(usize),
    /// Zero or one word.
    Optional,
    /// Every word up to the `{` or `;` ending the node.
    Trailing,
}

/// The YAML spelling of a [`ParamRule`]: a count, `none`, `optional` or
/// `trailing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawParamRule {
    Count(usize),
    Keyword(String),
}

impl TryFrom<RawParamRule> for ParamRule {
    type Error = String;

    fn try_from(raw: RawParamRule) -> Result<Self, Self::Error> {
        match raw {
            RawParamRule::Count(0) => Ok(ParamRule::None),
            RawParamRule::Count(n) => Ok(ParamRule::Exactly(n)),
            RawParamRule::Keyword(word) => match word.as_str() {
                "none" => Ok(ParamRule::None),
                "optional" => Ok(ParamRule::Optional),
                "trailing" => Ok(ParamRule::Trailing),
                other => Err(format!(
                    "unknown params rule '{}', expected a count, 'none', 'optional' or 'trailing'",
                    other
                )),
            },
        }
    }
}

impl From<ParamRule> for RawParamRule {
    fn from(rule: ParamRule) -> Self {
        match rule {
            ParamRule::None => RawParamRule::Count(0),
            ParamRule::Exactly(n) => RawParamRule::Count(n),
            ParamRule::Optional => RawParamRule::Keyword("optional".to_string()),
            ParamRule::Trailing => RawParamRule::Keyword("trailing".to_string()),
        }
    }
}

impl ParamRule {
    /// Consumes the parameter words for `key` according to this rule.
    pub fn consume(
        self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<Vec<String>, ResolveError> {
        let mut payload = Vec::new();
        match self {
            ParamRule::None => {}
            ParamRule::Exactly(count) => {
                while payload.len() < count {
                    match tokens.next_word_if_present()? {
                        Some(word) => payload.push(word.value),
                        None => {
                            let found = tokens.peek_token()?;
                            return Err(err_at!(
                                Type,
                                found.span,
                                "argument type '{}' expects {} parameter(s), found {} before {}",
                                key,
                                count,
                                payload.len(),
                                found.value.describe()
                            )
                            .into());
                        }
                    }
                }
            }
            ParamRule::Optional => {
                if let Some(word) = tokens.next_word_if_present()? {
                    payload.push(word.value);
                }
            }
            ParamRule::Trailing => {
                while let Some(word) = tokens.next_word_if_present()? {
                    payload.push(word.value);
                }
            }
        }
        Ok(payload)
    }
}

// ============================================================================
// NAMESPACE RESOLVER
// ============================================================================

/// Resolves a declared set of names within one namespace.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    label: String,
    namespace: String,
    types: BTreeMap<String, ParamRule>,
}

impl NamespaceResolver {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            label: format!("namespace:{}", namespace),
            namespace,
            types: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, name: impl Into<String>, params: ParamRule) -> Self {
        self.declare(name, params);
        self
    }

    pub fn declare(&mut self, name: impl Into<String>, params: ParamRule) {
        self.types.insert(name.into(), params);
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ArgumentTypeResolver for NamespaceResolver {
    fn name(&self) -> &str {
        &self.label
    }

    fn can_resolve(&self, key: &NamespacedKey) -> bool {
        key.namespace() == self.namespace && self.types.contains_key(key.name())
    }

    fn resolve(
        &self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        let rule = self
            .types
            .get(key.name())
            .copied()
            .ok_or_else(|| ResolveError::failed(format!("'{}' is not declared", key)))?;
        let payload = rule.consume(key, tokens)?;
        Ok(ArgumentTypeSpec::extension(key, payload))
    }
}

// ============================================================================
// MINECRAFT SELECTORS
// ============================================================================

/// Which entities a `minecraft:entity` argument may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitySelection {
    Entity,
    Entities,
    Player,
    Players,
}

impl EntitySelection {
    pub const ALL: [EntitySelection; 4] = [
        EntitySelection::Entity,
        EntitySelection::Entities,
        EntitySelection::Player,
        EntitySelection::Players,
    ];

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.keyword() == word)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            EntitySelection::Entity => "entity",
            EntitySelection::Entities => "entities",
            EntitySelection::Player => "player",
            EntitySelection::Players => "players",
        }
    }

    /// At most one target.
    pub fn is_single(self) -> bool {
        matches!(self, EntitySelection::Entity | EntitySelection::Player)
    }

    pub fn is_players_only(self) -> bool {
        matches!(self, EntitySelection::Player | EntitySelection::Players)
    }

    /// The selection recorded in a resolved `minecraft:entity` type.
    pub fn of(spec: &ArgumentTypeSpec) -> Option<Self> {
        match spec {
            ArgumentTypeSpec::Extension {
                namespace,
                name,
                payload,
            } if namespace == MinecraftResolver::NAMESPACE && name == "entity" => {
                payload.first().and_then(|word| Self::from_keyword(word))
            }
            _ => None,
        }
    }
}

/// Checks the parameters of the two vanilla argument types that take any.
///
/// - `minecraft:entity <entity|entities|player|players>`
/// - `minecraft:score_holder [true|false]`, where the flag allows multiple
///   holders and defaults to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinecraftResolver;

impl MinecraftResolver {
    pub const NAMESPACE: &'static str = "minecraft";

    fn resolve_entity(
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        let token = tokens.next_token()?;
        let word = match token.value.as_word() {
            Some(word) => word,
            None => {
                return Err(err_at!(
                    Type,
                    token.span,
                    "expected an entity selection type for '{}', found {}",
                    key,
                    token.value.describe()
                )
                .with_help(selection_help())
                .into())
            }
        };
        match EntitySelection::from_keyword(word) {
            Some(selection) => Ok(ArgumentTypeSpec::extension(
                key,
                vec![selection.keyword().to_string()],
            )),
            None => Err(err_at!(Type, token.span, "unknown entity selection type '{}'", word)
                .with_help(selection_help())
                .into()),
        }
    }

    fn resolve_score_holder(
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        let mut payload = Vec::new();
        if let Some(word) = tokens.next_word_if_present()? {
            match word.value.as_str() {
                "true" | "false" => payload.push(word.value),
                other => {
                    return Err(err_at!(
                        Type,
                        word.span,
                        "expected true or false for '{}', found '{}'",
                        key,
                        other
                    )
                    .into())
                }
            }
        }
        Ok(ArgumentTypeSpec::extension(key, payload))
    }
}

fn selection_help() -> String {
    let words: Vec<&str> = EntitySelection::ALL.iter().map(|s| s.keyword()).collect();
    format!("use one of: {}", words.join(", "))
}

impl ArgumentTypeResolver for MinecraftResolver {
    fn name(&self) -> &str {
        "minecraft"
    }

    fn can_resolve(&self, key: &NamespacedKey) -> bool {
        key.namespace() == Self::NAMESPACE && matches!(key.name(), "entity" | "score_holder")
    }

    fn resolve(
        &self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        match key.name() {
            "entity" => Self::resolve_entity(key, tokens),
            "score_holder" => Self::resolve_score_holder(key, tokens),
            _ => Err(ResolveError::failed(format!("'{}' is not handled here", key))),
        }
    }
}

// ============================================================================
// BRIGADIER ALIASES
// ============================================================================

/// Accepts `brigadier:bool`, `brigadier:string`, ... as the built-in types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrigadierResolver;

impl BrigadierResolver {
    pub const NAMESPACE: &'static str = "brigadier";
}

impl ArgumentTypeResolver for BrigadierResolver {
    fn name(&self) -> &str {
        "brigadier"
    }

    fn can_resolve(&self, key: &NamespacedKey) -> bool {
        key.namespace() == Self::NAMESPACE && BuiltinKind::from_name(key.name()).is_some()
    }

    fn resolve(
        &self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        let kind = BuiltinKind::from_name(key.name())
            .ok_or_else(|| ResolveError::failed(format!("'{}' is not a brigadier type", key)))?;
        Ok(builtin::parse_builtin(kind, tokens)?)
    }
}

// ============================================================================
// CLOSURE RESOLVER
// ============================================================================

/// A resolver built from two closures.
pub struct FnResolver<P, F> {
    label: String,
    predicate: P,
    resolve_fn: F,
}

impl<P, F> FnResolver<P, F>
where
    P: Fn(&NamespacedKey) -> bool + Send + Sync,
    F: Fn(&NamespacedKey, &mut dyn TokenStream) -> Result<ArgumentTypeSpec, ResolveError>
        + Send
        + Sync,
{
    pub fn new(label: impl Into<String>, predicate: P, resolve_fn: F) -> Self {
        Self {
            label: label.into(),
            predicate,
            resolve_fn,
        }
    }
}

impl<P, F> ArgumentTypeResolver for FnResolver<P, F>
where
    P: Fn(&NamespacedKey) -> bool + Send + Sync,
    F: Fn(&NamespacedKey, &mut dyn TokenStream) -> Result<ArgumentTypeSpec, ResolveError>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.label
    }

    fn can_resolve(&self, key: &NamespacedKey) -> bool {
        (self.predicate)(key)
    }

    fn resolve(
        &self,
        key: &NamespacedKey,
        tokens: &mut dyn TokenStream,
    ) -> Result<ArgumentTypeSpec, ResolveError> {
        (self.resolve_fn)(key, tokens)
    }
}
