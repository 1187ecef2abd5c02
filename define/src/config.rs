//! Generation configuration supplied by the caller.
//!
//! The configuration mirrors the invocation surface of the upstream tooling:
//! an ordered list of contracts, an output path, and a set of feature
//! toggles. It deserializes from a camelCase JSON document, so an existing
//! `codegen`-style config file can be pointed at `cosmogen` unchanged.
//! Option keys the generator does not implement (reactive-query or
//! state-management hook generators, for example) are tolerated and ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One contract module to generate bindings for.
///
/// Multiple specs with the same `name` are rejected during validation
/// rather than silently overwriting one module's output with another's.
///
/// ## Examples
///
/// ```
/// use cosmogen_define::ContractSpec;
///
/// // `dir` is accepted as an alias for `schemaDir`
/// let spec: ContractSpec =
///     serde_json::from_str(r#"{ "name": "Bs721Royalties", "dir": "schema/royalties" }"#).unwrap();
/// assert_eq!(spec.name, "Bs721Royalties");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSpec {
    /// Contract name; becomes the generated module's name.
    pub name: String,
    /// Directory containing the contract's schema document set.
    #[serde(alias = "dir")]
    pub schema_dir: PathBuf,
}

impl ContractSpec {
    /// Creates a spec from a name and schema directory.
    pub fn new(name: impl Into<String>, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            schema_dir: schema_dir.into(),
        }
    }
}

/// Top-level generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenConfig {
    /// Ordered list of contract modules to generate.
    pub contracts: Vec<ContractSpec>,
    /// Directory the generated crate source is written to.
    pub out_path: PathBuf,
    /// Synthesizer toggles and bundling options.
    #[serde(default)]
    pub options: GenerateOptions,
}

impl CodegenConfig {
    /// Creates a config with default options.
    pub fn new(contracts: Vec<ContractSpec>, out_path: impl Into<PathBuf>) -> Self {
        Self {
            contracts,
            out_path: out_path.into(),
            options: GenerateOptions::default(),
        }
    }
}

/// Which synthesizers run, plus bundling and concurrency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Type Synthesizer toggle (on by default).
    #[serde(default)]
    pub types: TypesOptions,
    /// Client Synthesizer toggle (on by default; requires `types`).
    #[serde(default)]
    pub client: ClientOptions,
    /// Message Composer Synthesizer toggle (off by default; requires `types`).
    #[serde(default)]
    pub message_composer: ComposerOptions,
    /// Bundler output location and scope. `None` falls back to a flat
    /// `lib.rs` bundle with no top-level scope.
    #[serde(default)]
    pub bundle: Option<BundleOptions>,
    /// Upper bound on concurrently generated modules.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

// Derived `Default` would zero `concurrency`; the field defaults the same
// way whether `options` is absent or spelled out.
impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            types: TypesOptions::default(),
            client: ClientOptions::default(),
            message_composer: ComposerOptions::default(),
            bundle: None,
            concurrency: default_concurrency(),
        }
    }
}

/// Type Synthesizer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesOptions {
    #[serde(default = "enabled_true")]
    pub enabled: bool,
}

impl Default for TypesOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Client Synthesizer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default = "enabled_true")]
    pub enabled: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Message Composer Synthesizer options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerOptions {
    #[serde(default)]
    pub enabled: bool,
    /// Also emit an `instantiate_msg` builder alongside the execute builders.
    #[serde(default)]
    pub include_instantiate: bool,
}

/// Bundler options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    /// File name of the aggregate bundle inside the output directory.
    #[serde(default = "default_bundle_file")]
    pub bundle_file: String,
    /// Top-level scope module grouping the per-module re-exports. Without a
    /// scope the bundle re-exports every module's surface flatly, and name
    /// conflicts between incompatible shapes abort the run.
    #[serde(default)]
    pub scope: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            bundle_file: default_bundle_file(),
            scope: None,
        }
    }
}

fn default_bundle_file() -> String {
    "lib.rs".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn enabled_true() -> bool {
    true
}
