//! Renders the message composer for one module.
//!
//! Composer functions are free functions that build addressed envelopes
//! without holding a connection: one `<method>_msg` per execute variant,
//! plus an `instantiate_msg` builder when the caller opted in.

use cosmogen_define::{ComposerPlan, MethodPlan, TypeIr};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::client::message_construction;
use super::types::field_storage_ty;
use crate::naming::field_ident;

/// Renders the composer function set.
pub fn render_composer(
    plan: &ComposerPlan,
    instantiate_shape: Option<&TypeIr>,
) -> TokenStream {
    let functions: Vec<TokenStream> = plan
        .functions
        .iter()
        .filter_map(|method| {
            plan.execute_enum
                .as_ref()
                .map(|execute_enum| render_execute_fn(execute_enum, method))
        })
        .collect();

    let instantiate = plan
        .instantiate_type
        .as_ref()
        .zip(instantiate_shape)
        .map(|(ty, shape)| render_instantiate_fn(ty, shape))
        .unwrap_or_default();

    quote! {
        #(#functions)*

        #instantiate
    }
}

fn render_execute_fn(execute_enum: &str, method: &MethodPlan) -> TokenStream {
    let fn_ident = format_ident!("{}_msg", method.method_name);
    let doc = format!(" Builds the `{}` execute message for `contract_addr`.", method.tag);
    let (params, construction) = message_construction(execute_enum, method);

    quote! {
        #[doc = #doc]
        pub fn #fn_ident(
            contract_addr: impl Into<String>
            #params
        ) -> Result<ExecuteEnvelope, ContractClientError> {
            let msg = #construction;
            Ok(ExecuteEnvelope::new(contract_addr, serde_json::to_value(&msg)?))
        }
    }
}

/// Renders the instantiate builder. Only record-shaped instantiate messages
/// get one; the message's fields become the trailing parameters.
fn render_instantiate_fn(type_name: &str, shape: &TypeIr) -> TokenStream {
    let TypeIr::Record(fields) = shape else {
        return TokenStream::new();
    };
    let msg_ident = format_ident!("{type_name}");

    let params: Vec<TokenStream> = fields
        .iter()
        .map(|field| {
            let ident = field_ident(&field.name);
            let ty = field_storage_ty(field);
            quote! { #ident: #ty }
        })
        .collect();
    let names: Vec<_> = fields.iter().map(|field| field_ident(&field.name)).collect();

    quote! {
        /// Builds an instantiate message for a stored code id.
        pub fn instantiate_msg(
            code_id: u64,
            label: impl Into<String>,
            #(#params),*
        ) -> Result<InstantiateEnvelope, ContractClientError> {
            let msg = #msg_ident { #(#names),* };
            Ok(InstantiateEnvelope::new(code_id, label, serde_json::to_value(&msg)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmogen_define::{FieldIr, MessageKind, PrimitiveIr, VariantPayload};

    fn make_plan(with_instantiate: bool) -> ComposerPlan {
        ComposerPlan {
            execute_enum: Some("ExecuteMsg".to_string()),
            instantiate_type: with_instantiate.then(|| "InstantiateMsg".to_string()),
            functions: vec![
                MethodPlan {
                    method_name: "withdraw_for_all".to_string(),
                    tag: "withdraw_for_all".to_string(),
                    kind: MessageKind::Execute,
                    payload: VariantPayload::Unit,
                    response: None,
                },
                MethodPlan {
                    method_name: "transfer".to_string(),
                    tag: "transfer".to_string(),
                    kind: MessageKind::Execute,
                    payload: VariantPayload::Record(vec![FieldIr::required(
                        "recipient",
                        TypeIr::Primitive(PrimitiveIr::Str),
                    )]),
                    response: None,
                },
            ],
        }
    }

    fn instantiate_shape() -> TypeIr {
        TypeIr::Record(vec![FieldIr::required(
            "denom",
            TypeIr::Primitive(PrimitiveIr::Str),
        )])
    }

    fn rendered(plan: &ComposerPlan, shape: Option<&TypeIr>) -> String {
        let tokens = render_composer(plan, shape);
        let wrapped = quote! {
            use crate::shared::{ContractClientError, ExecuteEnvelope, InstantiateEnvelope};
            #tokens
        };
        prettyplease::unparse(&syn::parse2::<syn::File>(wrapped).unwrap())
    }

    #[test]
    fn execute_variants_become_suffixed_free_functions() {
        let code = rendered(&make_plan(false), None);
        assert!(code.contains("pub fn withdraw_for_all_msg("));
        assert!(code.contains("contract_addr: impl Into<String>"));
        assert!(code.contains("pub fn transfer_msg("));
        assert!(code.contains("recipient: String"));
        assert!(!code.contains("instantiate_msg"));
    }

    #[test]
    fn instantiate_builder_takes_code_id_and_label() {
        let shape = instantiate_shape();
        let code = rendered(&make_plan(true), Some(&shape));
        assert!(code.contains("pub fn instantiate_msg("));
        assert!(code.contains("code_id: u64"));
        assert!(code.contains("label: impl Into<String>"));
        assert!(code.contains("denom: String"));
        assert!(code.contains("InstantiateEnvelope::new(code_id, label,"));
    }
}
