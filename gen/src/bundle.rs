//! Bundler: cross-module deduplication and the bundle root file.
//!
//! After every branch has produced its [`GeneratedModule`], the bundler
//! compares declarations *structurally* across modules. A declaration
//! synthesized identically by two or more modules is hoisted into the
//! shared module and re-exported from each declaring module, so the bundle
//! exposes one type instead of N spellings of it. Declarations that merely
//! share a name while differing in shape stay module-local; without a
//! scope module to namespace them, the flat re-export surface would make
//! that name ambiguous, which is a [`GeneratorError::BundleConflict`].

use std::collections::{BTreeMap, HashSet};

use cosmogen_define::{Bundle, BundleEntry, GeneratedModule, TypeDecl};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::support::RESERVED_SUPPORT_NAMES;
use crate::errors::GeneratorError;

/// Deduplicates declarations across modules and assembles the bundle.
///
/// Module order is preserved as supplied by the caller.
///
/// ## Errors
///
/// Returns [`GeneratorError::BundleConflict`] when two modules declare the
/// same symbol with different shapes and no scope was configured.
pub fn build_bundle(
    modules: Vec<GeneratedModule>,
    scope: Option<String>,
) -> Result<Bundle, GeneratorError> {
    // Symbol name to the (module, declaration) pairs claiming it, in
    // module order.
    let mut by_name: BTreeMap<&str, Vec<(&str, &TypeDecl)>> = BTreeMap::new();
    for module in &modules {
        for decl in &module.type_decls {
            by_name
                .entry(decl.name.as_str())
                .or_default()
                .push((module.module_ident.as_str(), decl));
        }
    }

    let mut shared: Vec<TypeDecl> = Vec::new();
    let mut hoisted: HashSet<String> = HashSet::new();
    for (name, claims) in &by_name {
        if claims.len() < 2 {
            continue;
        }
        let (first_module, first_decl) = claims[0];
        if let Some((second_module, _)) = claims
            .iter()
            .find(|(_, decl)| *decl != first_decl)
        {
            if scope.is_none() {
                return Err(GeneratorError::BundleConflict {
                    symbol: (*name).to_string(),
                    first_module: first_module.to_string(),
                    second_module: (*second_module).to_string(),
                });
            }
            // Scoped bundles namespace the clash away; both stay local.
            tracing::debug!(symbol = name, "scoped bundle keeps divergent declarations local");
            continue;
        }
        if RESERVED_SUPPORT_NAMES.contains(name) {
            continue;
        }
        shared.push(first_decl.clone());
        hoisted.insert((*name).to_string());
    }
    // BTreeMap iteration already yields shared in name order.

    let entries = modules
        .into_iter()
        .map(|mut module| {
            let mut reexports: Vec<String> = module
                .type_decls
                .iter()
                .filter(|decl| hoisted.contains(&decl.name))
                .map(|decl| decl.name.clone())
                .collect();
            reexports.sort_unstable();
            module.type_decls.retain(|decl| !hoisted.contains(&decl.name));
            BundleEntry {
                module,
                shared_reexports: reexports,
            }
        })
        .collect();

    Ok(Bundle {
        scope,
        shared,
        entries,
    })
}

/// Renders the bundle root file: module declarations plus either a flat
/// re-export surface or a scope module namespacing each contract.
pub fn render_bundle_file(bundle: &Bundle) -> TokenStream {
    let module_idents: Vec<_> = bundle
        .entries
        .iter()
        .map(|entry| format_ident!("{}", entry.module.module_ident))
        .collect();

    let surface = match &bundle.scope {
        Some(scope) => {
            let scope_ident = format_ident!("{scope}");
            let scoped: Vec<TokenStream> = module_idents
                .iter()
                .map(|ident| {
                    quote! {
                        pub mod #ident {
                            pub use crate::#ident::*;
                        }
                    }
                })
                .collect();
            quote! {
                pub mod #scope_ident {
                    #(#scoped)*
                }
            }
        }
        None => quote! {
            #(pub use #module_idents::*;)*
        },
    };

    quote! {
        #![doc = " Generated contract bindings."]

        pub mod shared;

        #(pub mod #module_idents;)*

        #surface
    }
}
