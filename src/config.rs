//! Parser settings and YAML-declared extension types.
//!
//! A types file lets the command line tools check files that use extension
//! argument types without any Rust code:
//!
//! ```yaml
//! max_depth: 64
//! default_namespace: minecraft
//! brigadier_aliases: true
//! minecraft_types: true
//! namespaces:
//!   minecraft:
//!     message: { params: trailing }
//!     block_pos: {}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::ErrorContext;
use crate::types::resolvers::{BrigadierResolver, MinecraftResolver, NamespaceResolver, ParamRule};
use crate::types::{NamespacedKey, ResolverRegistry};
use crate::CommodoreError;

/// Fits the parser's recursion on a default 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_NAMESPACE: &str = "minecraft";
pub const DEFAULT_SOURCE_NAME: &str = "<input>";

/// Settings for a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest allowed node nesting, counting the root as depth 1. `None`
    /// disables the check.
    pub max_depth: Option<usize>,
    /// Namespace given to extension type names written without one.
    pub default_namespace: String,
    /// Name shown in rendered diagnostics.
    pub source_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }
}

impl ParserConfig {
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// One declared extension type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeDecl {
    pub params: ParamRule,
}

/// The contents of a types file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypesConfig {
    pub max_depth: Option<usize>,
    pub default_namespace: Option<String>,
    /// Also accept `brigadier:bool`, `brigadier:string`, ... for the built-ins.
    pub brigadier_aliases: bool,
    /// Check the parameters of `minecraft:entity` and `minecraft:score_holder`.
    pub minecraft_types: bool,
    pub namespaces: BTreeMap<String, BTreeMap<String, TypeDecl>>,
}

impl TypesConfig {
    /// Reads and validates a types file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommodoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read types file {}", path.display()), e))?;
        debug!(path = %path.display(), "loading types file");
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CommodoreError> {
        let config: TypesConfig = serde_yaml::from_str(text)
            .map_err(|e| config_error("invalid types file".to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CommodoreError> {
        if let Some(namespace) = &self.default_namespace {
            NamespacedKey::new(namespace.as_str(), "x").map_err(|e| {
                config_error(format!("invalid default_namespace '{}'", namespace), e)
            })?;
        }
        for (namespace, types) in &self.namespaces {
            for name in types.keys() {
                NamespacedKey::new(namespace.as_str(), name.as_str()).map_err(|e| {
                    config_error(format!("invalid type '{}:{}'", namespace, name), e)
                })?;
            }
        }
        Ok(())
    }

    /// Parser settings with this file's overrides applied.
    pub fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig::default();
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if let Some(namespace) = &self.default_namespace {
            config.default_namespace = namespace.clone();
        }
        config
    }

    /// A registry with the minecraft selector types when enabled, then one
    /// resolver per declared namespace in name order, then the brigadier
    /// aliases when enabled.
    pub fn registry(&self) -> ResolverRegistry {
        let mut registry = ResolverRegistry::new();
        if self.minecraft_types {
            registry.register(MinecraftResolver);
        }
        for (namespace, types) in &self.namespaces {
            let mut resolver = NamespaceResolver::new(namespace.as_str());
            for (name, decl) in types {
                resolver.declare(name.as_str(), decl.params);
            }
            registry.register(resolver);
        }
        if self.brigadier_aliases {
            registry.register(BrigadierResolver);
        }
        registry
    }

    pub fn into_parts(self) -> (ResolverRegistry, ParserConfig) {
        (self.registry(), self.parser_config())
    }
}

fn config_error(
    message: String,
    cause: impl Into<crate::diagnostics::BoxedCause>,
) -> CommodoreError {
    CommodoreError::Type {
        message,
        line: 1,
        ctx: ErrorContext::none(),
        source: Some(cause.into()),
    }
}
