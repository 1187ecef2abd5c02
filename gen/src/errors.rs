//! Error types for the cosmogen generator.

use cosmogen_define::MessageKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a generation run.
///
/// Every variant carries the offending module where one exists; the first
/// error encountered on any branch aborts the whole run before output is
/// written. Nothing here is ever downgraded to a warning.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Schema directory missing or containing no schema files.
    #[error("schema directory for module '{module}' not found or empty: {}", dir.display())]
    SchemaNotFound { module: String, dir: PathBuf },

    /// A schema file failed to parse.
    #[error("failed to parse schema file '{file}' for module '{module}': {message}")]
    SchemaParse {
        module: String,
        file: String,
        message: String,
    },

    /// A `$ref` did not resolve within the document's definitions.
    #[error("unresolved schema reference '{reference}' in module '{module}'")]
    UnresolvedReference { module: String, reference: String },

    /// Two message variants in one module map to the same method name.
    #[error(
        "duplicate method '{method}' in module '{module}': declared by both the {first} and {second} message"
    )]
    DuplicateMethod {
        module: String,
        method: String,
        first: MessageKind,
        second: MessageKind,
    },

    /// Two modules export the same symbol with incompatible shapes and no
    /// scope was supplied to disambiguate them.
    #[error(
        "bundle conflict: symbol '{symbol}' is declared with incompatible shapes by modules '{first_module}' and '{second_module}'; supply a bundle scope to disambiguate"
    )]
    BundleConflict {
        symbol: String,
        first_module: String,
        second_module: String,
    },

    /// The contract list names the same module twice.
    #[error("duplicate module name '{name}' in contract list")]
    DuplicateModuleName { name: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generated code failed validation or an internal invariant broke.
    #[error("code generation failed: {0}")]
    CodeGen(String),

    /// Failed to write output.
    #[error("failed to write output '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
