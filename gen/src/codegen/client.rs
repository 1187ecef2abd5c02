//! Renders the typed client for one module.
//!
//! The client is a thin struct over a caller-supplied [`ContractQuerier`]
//! implementation: query methods serialize the message variant, run it
//! through the querier, and decode the module's response type; execute
//! methods build addressed [`ExecuteEnvelope`] values without performing
//! any I/O themselves.
//!
//! [`ContractQuerier`]: super::support
//! [`ExecuteEnvelope`]: super::support

use cosmogen_define::{ClientPlan, MethodPlan, VariantPayload};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::types::field_storage_ty;
use crate::naming::{field_ident, to_upper_camel};

/// Renders the client struct and its method impl.
pub fn render_client(contract_name: &str, plan: &ClientPlan) -> TokenStream {
    let client_ident = format_ident!("{}Client", to_upper_camel(contract_name));
    let doc = format!(" Typed client for the `{contract_name}` contract.");

    let queries: Vec<TokenStream> = plan
        .queries
        .iter()
        .filter_map(|method| {
            plan.query_enum
                .as_ref()
                .map(|query_enum| render_query_method(query_enum, method))
        })
        .collect();
    let executes: Vec<TokenStream> = plan
        .executes
        .iter()
        .filter_map(|method| {
            plan.execute_enum
                .as_ref()
                .map(|execute_enum| render_execute_method(execute_enum, method))
        })
        .collect();

    quote! {
        #[doc = #doc]
        pub struct #client_ident<Q> {
            querier: Q,
            contract_addr: String,
        }

        impl<Q: ContractQuerier> #client_ident<Q> {
            pub fn new(querier: Q, contract_addr: impl Into<String>) -> Self {
                Self {
                    querier,
                    contract_addr: contract_addr.into(),
                }
            }

            pub fn contract_addr(&self) -> &str {
                &self.contract_addr
            }

            #(#queries)*

            #(#executes)*
        }
    }
}

fn render_query_method(query_enum: &str, method: &MethodPlan) -> TokenStream {
    let method_ident = format_ident!("{}", method.method_name);
    let (params, construction) = message_construction(query_enum, method);
    let response_ty = match &method.response {
        Some(name) => {
            let ident = format_ident!("{name}");
            quote! { #ident }
        }
        None => quote! { serde_json::Value },
    };

    quote! {
        pub fn #method_ident(&self #params) -> Result<#response_ty, ContractClientError> {
            let msg = #construction;
            let value = self
                .querier
                .query_json(&self.contract_addr, serde_json::to_value(&msg)?)?;
            Ok(serde_json::from_value(value)?)
        }
    }
}

fn render_execute_method(execute_enum: &str, method: &MethodPlan) -> TokenStream {
    let method_ident = format_ident!("{}", method.method_name);
    let (params, construction) = message_construction(execute_enum, method);

    quote! {
        pub fn #method_ident(&self #params) -> Result<ExecuteEnvelope, ContractClientError> {
            let msg = #construction;
            Ok(ExecuteEnvelope::new(
                self.contract_addr.clone(),
                serde_json::to_value(&msg)?,
            ))
        }
    }
}

/// Builds the parameter list tail and the message-construction expression
/// for one method. Shared with the composer renderer, which prepends its
/// own leading parameters.
pub fn message_construction(
    enum_name: &str,
    method: &MethodPlan,
) -> (TokenStream, TokenStream) {
    let enum_ident = format_ident!("{enum_name}");
    let variant_ident = format_ident!("{}", to_upper_camel(&method.tag));

    match &method.payload {
        VariantPayload::Unit => (TokenStream::new(), quote! { #enum_ident::#variant_ident }),
        VariantPayload::Record(fields) => {
            let params: Vec<TokenStream> = fields
                .iter()
                .map(|field| {
                    let ident = field_ident(&field.name);
                    let ty = field_storage_ty(field);
                    quote! { #ident: #ty }
                })
                .collect();
            let names: Vec<_> = fields.iter().map(|field| field_ident(&field.name)).collect();
            (
                quote! { , #(#params),* },
                quote! { #enum_ident::#variant_ident { #(#names),* } },
            )
        }
        VariantPayload::NewType(inner) => {
            let ty = super::types::type_tokens(inner);
            (
                quote! { , msg: #ty },
                quote! { #enum_ident::#variant_ident(msg) },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmogen_define::{FieldIr, MessageKind, PrimitiveIr, TypeIr};

    fn make_plan() -> ClientPlan {
        ClientPlan {
            query_enum: Some("QueryMsg".to_string()),
            execute_enum: Some("ExecuteMsg".to_string()),
            queries: vec![MethodPlan {
                method_name: "list_contributors".to_string(),
                tag: "list_contributors".to_string(),
                kind: MessageKind::Query,
                payload: VariantPayload::Record(vec![
                    FieldIr::optional(
                        "limit",
                        TypeIr::optional(TypeIr::Primitive(PrimitiveIr::U32)),
                    ),
                    FieldIr::optional("start_after", TypeIr::Primitive(PrimitiveIr::Str)),
                ]),
                response: Some("ContributorListResponse".to_string()),
            }],
            executes: vec![MethodPlan {
                method_name: "withdraw_for_all".to_string(),
                tag: "withdraw_for_all".to_string(),
                kind: MessageKind::Execute,
                payload: VariantPayload::Unit,
                response: None,
            }],
        }
    }

    fn rendered(plan: &ClientPlan) -> String {
        let tokens = render_client("bs721-royalties", plan);
        let wrapped = quote! {
            use crate::shared::{ContractClientError, ContractQuerier, ExecuteEnvelope};
            #tokens
        };
        prettyplease::unparse(&syn::parse2::<syn::File>(wrapped).unwrap())
    }

    #[test]
    fn client_struct_is_generic_over_the_querier() {
        let code = rendered(&make_plan());
        assert!(code.contains("pub struct Bs721RoyaltiesClient<Q>"));
        assert!(code.contains("impl<Q: ContractQuerier> Bs721RoyaltiesClient<Q>"));
        assert!(code.contains("pub fn new(querier: Q, contract_addr: impl Into<String>)"));
    }

    #[test]
    fn query_method_decodes_the_response_type() {
        let code = rendered(&make_plan());
        assert!(code.contains("pub fn list_contributors("));
        assert!(code.contains("limit: Option<Option<u32>>"));
        assert!(code.contains("start_after: Option<String>"));
        assert!(code.contains("Result<ContributorListResponse, ContractClientError>"));
        assert!(code.contains("serde_json::from_value(value)"));
    }

    #[test]
    fn unit_execute_method_builds_an_envelope() {
        let code = rendered(&make_plan());
        assert!(code.contains("pub fn withdraw_for_all(&self)"));
        assert!(code.contains("Result<ExecuteEnvelope, ContractClientError>"));
        assert!(code.contains("ExecuteMsg::WithdrawForAll"));
        assert!(code.contains("ExecuteEnvelope::new"));
    }

    #[test]
    fn untyped_query_falls_back_to_raw_json() {
        let mut plan = make_plan();
        plan.queries[0].response = None;
        let code = rendered(&plan);
        assert!(code.contains("Result<serde_json::Value, ContractClientError>"));
    }
}
