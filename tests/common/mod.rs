//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use commodore::types::resolvers::{MinecraftResolver, NamespaceResolver, ParamRule};
use commodore::{parse_str, CommandNode, CommodoreError, ResolverRegistry};
use walkdir::WalkDir;

/// A registry with the checked selector types and a handful of other
/// `minecraft:` extension types.
pub fn minecraft_registry() -> ResolverRegistry {
    ResolverRegistry::new().with(MinecraftResolver).with(
        NamespaceResolver::new("minecraft")
            .with_type("player_name", ParamRule::Trailing)
            .with_type("block_pos", ParamRule::None)
            .with_type("item_stack", ParamRule::None),
    )
}

pub fn parse_ok(source: &str) -> CommandNode {
    match parse_str(source, &minecraft_registry()) {
        Ok(tree) => tree,
        Err(err) => panic!("expected {:?} to parse, got: {}", source, err),
    }
}

pub fn parse_err(source: &str) -> CommodoreError {
    match parse_str(source, &minecraft_registry()) {
        Ok(tree) => panic!("expected {:?} to fail, got:\n{}", source, tree),
        Err(err) => err,
    }
}

/// Every `.commodore` file below `tests/fixtures/<group>`, sorted.
pub fn fixtures(group: &str) -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(group);
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().map_or(false, |ext| ext == "commodore")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
