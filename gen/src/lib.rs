//! cosmogen code generator library.
//!
//! This crate turns contract message schemas (a constrained JSON Schema
//! dialect) into strongly-typed Rust client bindings: one module per
//! contract with its message types, a typed client over a caller-supplied
//! querier, optional message-composer helpers, and an aggregate bundle
//! that deduplicates identical type shapes across modules.
//!
//! ## Modules
//!
//! - [`loader`] - Reads a schema directory into a [`cosmogen_define::SchemaDocument`]
//! - [`lower`] - Lowers schema nodes into the IR declaration set
//! - [`codegen`] - Plans and renders per-module types, clients, and composers
//! - [`bundle`] - Cross-module deduplication and the bundle root file
//! - [`output`] - Validation, formatting, and all-or-nothing writing
//! - [`pipeline`] - Concurrent per-module fan-out with a join barrier
//! - [`validation`] - Configuration checks run before any schema is read
//! - [`naming`] - Identifier conversion between schema and Rust names
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use cosmogen_define::{CodegenConfig, ContractSpec};
//! use cosmogen_gen::pipeline;
//!
//! # async fn example() -> Result<(), cosmogen_gen::errors::GeneratorError> {
//! let config = CodegenConfig::new(
//!     vec![ContractSpec::new("Bs721Royalties", "schema/royalties")],
//!     "generated/src",
//! );
//!
//! // dry_run=true prints the rendered files instead of writing them
//! let summary = pipeline::run(&config, Path::new("."), true).await?;
//! println!("{} modules generated", summary.modules);
//! # Ok(())
//! # }
//! ```
//!
//! ## Generated Output Structure
//!
//! For contracts `Bs721Royalties` and `Bs721AccountMarketplace`:
//!
//! ```text
//! out/
//! ├── lib.rs                        # bundle root: module decls + re-exports
//! ├── shared.rs                     # querier trait, envelopes, hoisted types
//! ├── bs721_royalties.rs            # types + client + composer
//! └── bs721_account_marketplace.rs
//! ```

pub mod bundle;
pub mod codegen;
pub mod errors;
pub mod loader;
pub mod lower;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod test_utils;
pub mod validation;
