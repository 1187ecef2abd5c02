//! Per-module generation plans and the aggregate bundle.
//!
//! Module synthesis runs on parallel branches, so everything a branch
//! returns is plain data: type declarations plus IR-level *plans* for the
//! client and composer surfaces. Token rendering happens later, in the
//! single-writer bundling phase (`proc_macro2` token streams are not
//! `Send`, and deduplication needs every module's declarations in one
//! place anyway).

use crate::ir::{FieldIr, TypeDecl, VariantPayload};

/// The message kind a method plan originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Instantiate,
    Execute,
    Query,
    Migrate,
}

/// One generated entry point: a client method or a composer function.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodPlan {
    /// Rust method name (snake_case of the variant tag).
    pub method_name: String,
    /// Variant tag exactly as authored.
    pub tag: String,
    pub kind: MessageKind,
    /// The variant's payload; its field set becomes the parameter list.
    pub payload: VariantPayload,
    /// Response declaration name for query methods. `None` falls back to a
    /// raw JSON value.
    pub response: Option<String>,
}

impl MethodPlan {
    /// The plan's parameter fields, empty for unit payloads.
    pub fn fields(&self) -> &[FieldIr] {
        self.payload.fields()
    }
}

/// Typed client surface for one module.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientPlan {
    /// Declaration name of the query message union, when present.
    pub query_enum: Option<String>,
    /// Declaration name of the execute message union, when present.
    pub execute_enum: Option<String>,
    pub queries: Vec<MethodPlan>,
    pub executes: Vec<MethodPlan>,
}

/// Message composer surface for one module.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposerPlan {
    pub execute_enum: Option<String>,
    /// Declaration name of the instantiate message type, when the
    /// instantiate builder is enabled.
    pub instantiate_type: Option<String>,
    pub functions: Vec<MethodPlan>,
}

/// Everything synthesized for one contract module; immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedModule {
    /// Contract name as supplied by the caller.
    pub name: String,
    /// snake_case module identifier derived from the name.
    pub module_ident: String,
    pub type_decls: Vec<TypeDecl>,
    pub client: Option<ClientPlan>,
    pub composer: Option<ComposerPlan>,
}

/// One module's slot in the bundle, after deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    /// The module with shared declarations removed from `type_decls`.
    pub module: GeneratedModule,
    /// Names of declarations this module now re-exports from the shared
    /// module instead of declaring itself.
    pub shared_reexports: Vec<String>,
}

/// The aggregate output of one generation run: an ordered set of modules
/// plus the declarations they share.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Top-level scope module name, when the caller supplied one.
    pub scope: Option<String>,
    /// Declarations hoisted into the shared module because at least two
    /// modules synthesized them identically.
    pub shared: Vec<TypeDecl>,
    /// Modules in caller-supplied order.
    pub entries: Vec<BundleEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_kind_displays_as_snake_case() {
        assert_eq!(MessageKind::Instantiate.to_string(), "instantiate");
        assert_eq!(MessageKind::Execute.to_string(), "execute");
        assert_eq!(MessageKind::Query.to_string(), "query");
    }

    #[test]
    fn unit_plan_has_no_fields() {
        let plan = MethodPlan {
            method_name: "withdraw_for_all".to_string(),
            tag: "withdraw_for_all".to_string(),
            kind: MessageKind::Execute,
            payload: VariantPayload::Unit,
            response: None,
        };
        assert!(plan.fields().is_empty());
    }
}
