//! Shared fixtures for cosmogen-gen tests.
//!
//! The schema fixtures live under `fixtures/` as real files so they stay
//! readable and diffable; the helpers here copy them into per-test
//! temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

/// Combined-layout schema for a royalty-splitting contract: instantiate
/// with contributors, two unit execute variants, and paginated queries.
pub fn royalties_schema() -> &'static str {
    include_str!("../fixtures/royalties/royalties.json")
}

/// Combined-layout schema for an account marketplace: execute variants
/// with record payloads and a nullable response field.
pub fn marketplace_schema() -> &'static str {
    include_str!("../fixtures/marketplace/marketplace.json")
}

/// Sample configuration mirroring the upstream invocation surface.
pub fn sample_config() -> &'static str {
    include_str!("../fixtures/cosmogen.json")
}

/// Writes `content` as `<base>/<dir>/<dir>.json` and returns the schema
/// directory.
pub fn write_schema(base: &Path, dir: &str, content: &str) -> PathBuf {
    let schema_dir = base.join(dir);
    fs::create_dir_all(&schema_dir).unwrap();
    fs::write(schema_dir.join(format!("{dir}.json")), content).unwrap();
    schema_dir
}
