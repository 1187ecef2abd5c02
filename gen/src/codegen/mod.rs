//! Module synthesis: plans from lowered schemas, then Rust tokens.
//!
//! [`generate_module`] runs on the parallel branches and returns plain-data
//! plans; [`render_module_file`] runs later on the single bundling thread
//! and turns one deduplicated module into its output file's tokens.

pub mod client;
pub mod composer;
pub mod support;
pub mod types;

use std::collections::HashMap;

use cosmogen_define::{
    BundleEntry, ClientPlan, ComposerPlan, GenerateOptions, GeneratedModule, MessageKind,
    MethodPlan, TypeIr,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::errors::GeneratorError;
use crate::lower::LoweredDocument;
use crate::naming::to_snake_case;

/// Builds the generation plan for one contract module.
///
/// ## Errors
///
/// Returns [`GeneratorError::DuplicateMethod`] when two message variants
/// (or a variant and the instantiate builder) would claim the same method
/// name in one generated surface.
pub fn generate_module(
    contract_name: &str,
    module_ident: &str,
    lowered: &LoweredDocument,
    options: &GenerateOptions,
) -> Result<GeneratedModule, GeneratorError> {
    let client = if options.client.enabled {
        Some(plan_client(module_ident, lowered)?)
    } else {
        None
    };
    let composer = if options.message_composer.enabled {
        Some(plan_composer(
            module_ident,
            lowered,
            options.message_composer.include_instantiate,
        )?)
    } else {
        None
    };

    Ok(GeneratedModule {
        name: contract_name.to_string(),
        module_ident: module_ident.to_string(),
        type_decls: lowered.decls.clone(),
        client,
        composer,
    })
}

fn plan_client(
    module_ident: &str,
    lowered: &LoweredDocument,
) -> Result<ClientPlan, GeneratorError> {
    let queries = lowered
        .query
        .as_ref()
        .map(|shape| method_plans(&shape.ir, MessageKind::Query, &lowered.responses))
        .unwrap_or_default();
    let executes = lowered
        .execute
        .as_ref()
        .map(|shape| method_plans(&shape.ir, MessageKind::Execute, &lowered.responses))
        .unwrap_or_default();

    // Query and execute methods share one impl block, so the name check
    // spans both lists.
    check_method_names(module_ident, queries.iter().chain(executes.iter()), None)?;

    Ok(ClientPlan {
        query_enum: lowered.query.as_ref().map(|s| s.decl_name.clone()),
        execute_enum: lowered.execute.as_ref().map(|s| s.decl_name.clone()),
        queries,
        executes,
    })
}

fn plan_composer(
    module_ident: &str,
    lowered: &LoweredDocument,
    include_instantiate: bool,
) -> Result<ComposerPlan, GeneratorError> {
    let functions = lowered
        .execute
        .as_ref()
        .map(|shape| method_plans(&shape.ir, MessageKind::Execute, &lowered.responses))
        .unwrap_or_default();

    let instantiate_type = if include_instantiate {
        lowered.instantiate.as_ref().map(|s| s.decl_name.clone())
    } else {
        None
    };
    // The instantiate builder occupies the `instantiate` slot in the
    // composer's function namespace.
    let reserved = instantiate_type.as_ref().map(|_| "instantiate");
    check_method_names(module_ident, functions.iter(), reserved)?;

    Ok(ComposerPlan {
        execute_enum: lowered.execute.as_ref().map(|s| s.decl_name.clone()),
        instantiate_type,
        functions,
    })
}

fn method_plans(
    ir: &TypeIr,
    kind: MessageKind,
    responses: &std::collections::BTreeMap<String, String>,
) -> Vec<MethodPlan> {
    let TypeIr::Union(variants) = ir else {
        return Vec::new();
    };
    variants
        .iter()
        .map(|variant| MethodPlan {
            method_name: to_snake_case(&variant.tag),
            tag: variant.tag.clone(),
            kind,
            payload: variant.payload.clone(),
            response: match kind {
                MessageKind::Query => responses.get(&variant.tag).cloned(),
                _ => None,
            },
        })
        .collect()
}

fn check_method_names<'a>(
    module_ident: &str,
    plans: impl Iterator<Item = &'a MethodPlan>,
    reserved: Option<&str>,
) -> Result<(), GeneratorError> {
    let mut seen: HashMap<&str, MessageKind> = HashMap::new();
    if let Some(name) = reserved {
        seen.insert(name, MessageKind::Instantiate);
    }
    for plan in plans {
        if let Some(first) = seen.insert(plan.method_name.as_str(), plan.kind) {
            return Err(GeneratorError::DuplicateMethod {
                module: module_ident.to_string(),
                method: plan.method_name.clone(),
                first,
                second: plan.kind,
            });
        }
    }
    Ok(())
}

/// Renders one module's output file.
pub fn render_module_file(entry: &BundleEntry) -> TokenStream {
    let module = &entry.module;
    let file_doc = format!(" Generated bindings for the `{}` contract.", module.name);

    let serde_import = if module.type_decls.iter().any(|decl| decl.ir.is_nominal()) {
        quote! { use serde::{Deserialize, Serialize}; }
    } else {
        TokenStream::new()
    };
    let shared_import = shared_import(module);

    let reexports: Vec<TokenStream> = entry
        .shared_reexports
        .iter()
        .map(|name| {
            let ident = format_ident!("{name}");
            quote! { pub use crate::shared::#ident; }
        })
        .collect();

    let decls: Vec<TokenStream> = module.type_decls.iter().map(types::render_decl).collect();
    let client = module
        .client
        .as_ref()
        .map(|plan| client::render_client(&module.name, plan))
        .unwrap_or_default();
    let instantiate_shape = module.type_decls.iter().find_map(|decl| {
        module
            .composer
            .as_ref()
            .and_then(|plan| plan.instantiate_type.as_ref())
            .filter(|name| **name == decl.name)
            .map(|_| &decl.ir)
    });
    let composer = module
        .composer
        .as_ref()
        .map(|plan| composer::render_composer(plan, instantiate_shape))
        .unwrap_or_default();

    quote! {
        #![doc = #file_doc]

        #serde_import
        #shared_import

        #(#reexports)*

        #(#decls)*

        #client

        #composer
    }
}

/// Builds the `use crate::shared::{...}` import covering exactly the
/// support names this module's surfaces mention.
fn shared_import(module: &GeneratedModule) -> TokenStream {
    let client = module.client.as_ref();
    let composer = module.composer.as_ref();

    let client_has_methods =
        client.is_some_and(|p| !p.queries.is_empty() || !p.executes.is_empty());
    let composer_has_fns =
        composer.is_some_and(|p| !p.functions.is_empty() || p.instantiate_type.is_some());

    let mut names = Vec::new();
    if client_has_methods || composer_has_fns {
        names.push("ContractClientError");
    }
    if client.is_some() {
        names.push("ContractQuerier");
    }
    if client.is_some_and(|p| !p.executes.is_empty())
        || composer.is_some_and(|p| !p.functions.is_empty())
    {
        names.push("ExecuteEnvelope");
    }
    if composer.is_some_and(|p| p.instantiate_type.is_some()) {
        names.push("InstantiateEnvelope");
    }

    if names.is_empty() {
        return TokenStream::new();
    }
    names.sort_unstable();
    let idents: Vec<_> = names.iter().map(|name| format_ident!("{name}")).collect();
    quote! { use crate::shared::{#(#idents),*}; }
}
