//! Contract schema and generation data model for cosmogen.
//!
//! This crate defines the vocabulary shared between the generator and its
//! callers:
//!
//! - [`config`] - Caller-supplied contract list, output path, and toggles
//! - [`schema`] - The JSON Schema subset read from contract schema files
//! - [`ir`] - The language-neutral type representation used during a run
//! - [`module`] - Per-module generation plans and the aggregate bundle
//!
//! No I/O and no code generation happens here; the `cosmogen-gen` crate
//! consumes these types to load schemas, synthesize bindings, and write the
//! bundled output.

pub mod config;
pub mod ir;
pub mod module;
pub mod schema;

pub use config::{
    BundleOptions, ClientOptions, CodegenConfig, ComposerOptions, ContractSpec, GenerateOptions,
    TypesOptions,
};
pub use ir::{FieldIr, PrimitiveIr, TypeDecl, TypeIr, VariantIr, VariantPayload};
pub use module::{
    Bundle, BundleEntry, ClientPlan, ComposerPlan, GeneratedModule, MessageKind, MethodPlan,
};
pub use schema::{AdditionalProperties, SchemaDocument, SchemaNode, SchemaType, TypeName};
