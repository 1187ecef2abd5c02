//! Renders the generated `shared` module.
//!
//! Every bundle ships one `shared.rs` holding the serde helpers the typed
//! messages rely on and whatever declarations the Bundler hoisted because
//! two or more modules synthesized them identically. When clients or
//! composers are generated it also carries their runtime support surface
//! (a querier trait, message envelopes, the client error type).

use cosmogen_define::TypeDecl;
use proc_macro2::TokenStream;
use quote::quote;

use super::types::render_decl;

/// Declaration names the support surface claims for itself. Contract
/// declarations with these names stay module-local rather than being
/// hoisted, so they can never shadow the support types.
pub const RESERVED_SUPPORT_NAMES: &[&str] = &[
    "Coin",
    "ContractClientError",
    "ContractQuerier",
    "ExecuteEnvelope",
    "InstantiateEnvelope",
];

/// Renders the complete `shared` module: serde helpers, then the runtime
/// support surface (when any client or composer was generated), then the
/// hoisted declarations in name order.
pub fn render_shared_module(hoisted: &[TypeDecl], with_support: bool) -> TokenStream {
    let serde_import = if with_support || hoisted.iter().any(|decl| decl.ir.is_nominal()) {
        quote! { use serde::{Deserialize, Serialize}; }
    } else {
        TokenStream::new()
    };
    let helpers = serde_helper_tokens();
    let support = if with_support {
        support_tokens()
    } else {
        TokenStream::new()
    };
    let hoisted: Vec<TokenStream> = hoisted.iter().map(render_decl).collect();
    quote! {
        #![doc = " Support types and declarations shared across contract modules."]

        #serde_import

        #helpers

        #support

        #(#hoisted)*
    }
}

fn serde_helper_tokens() -> TokenStream {
    quote! {
        /// Deserializes a doubly optional field, keeping an explicit `null`
        /// distinct from an absent key.
        pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
        where
            T: serde::Deserialize<'de>,
            D: serde::Deserializer<'de>,
        {
            serde::Deserialize::deserialize(deserializer).map(Some)
        }
    }
}

fn support_tokens() -> TokenStream {
    quote! {
        /// Abstraction over the chain connection used for smart queries.
        ///
        /// Implement this once for your RPC or test double; every generated
        /// client is generic over it.
        pub trait ContractQuerier {
            /// Performs a smart query against `contract_addr` with an
            /// already-serialized query message.
            fn query_json(
                &self,
                contract_addr: &str,
                msg: serde_json::Value,
            ) -> Result<serde_json::Value, ContractClientError>;
        }

        /// A native token amount. The amount stays a string to preserve
        /// 128-bit precision.
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        pub struct Coin {
            pub denom: String,
            pub amount: String,
        }

        /// A fully addressed execute message, ready for signing and
        /// broadcast by whatever transaction layer the caller uses.
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        pub struct ExecuteEnvelope {
            pub contract_addr: String,
            pub msg: serde_json::Value,
            pub funds: Vec<Coin>,
        }

        impl ExecuteEnvelope {
            pub fn new(contract_addr: impl Into<String>, msg: serde_json::Value) -> Self {
                Self {
                    contract_addr: contract_addr.into(),
                    msg,
                    funds: Vec::new(),
                }
            }

            pub fn with_funds(mut self, funds: Vec<Coin>) -> Self {
                self.funds = funds;
                self
            }
        }

        /// A fully specified instantiate message for a stored code id.
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        pub struct InstantiateEnvelope {
            pub code_id: u64,
            pub label: String,
            pub msg: serde_json::Value,
            pub funds: Vec<Coin>,
            pub admin: Option<String>,
        }

        impl InstantiateEnvelope {
            pub fn new(code_id: u64, label: impl Into<String>, msg: serde_json::Value) -> Self {
                Self {
                    code_id,
                    label: label.into(),
                    msg,
                    funds: Vec::new(),
                    admin: None,
                }
            }

            pub fn with_admin(mut self, admin: impl Into<String>) -> Self {
                self.admin = Some(admin.into());
                self
            }

            pub fn with_funds(mut self, funds: Vec<Coin>) -> Self {
                self.funds = funds;
                self
            }
        }

        /// Errors surfaced by generated clients and composers.
        #[derive(Debug, thiserror::Error)]
        pub enum ContractClientError {
            #[error("message serialization failed: {0}")]
            Json(#[from] serde_json::Error),
            #[error("query failed: {0}")]
            Query(String),
        }
    }
}
