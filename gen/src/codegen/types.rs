//! Renders IR declarations as Rust type declarations.
//!
//! Records become serde-derived structs, unions become externally tagged
//! enums with an explicit `#[serde(rename = "...")]` per variant so the
//! authored tag survives byte-for-byte, and everything else becomes a type
//! alias. Optionality renders as the three distinct states the schema can
//! express: `T`, `Option<T>`, and `Option<Option<T>>` for a field that is
//! both absent-able and nullable.

use cosmogen_define::{FieldIr, TypeDecl, TypeIr, VariantPayload};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::naming::{field_ident, needs_rename, to_upper_camel};

/// Renders one declaration: a struct, an enum, or a type alias.
pub fn render_decl(decl: &TypeDecl) -> TokenStream {
    let doc = doc_attrs(decl.doc.as_deref());
    let name = format_ident!("{}", decl.name);

    match &decl.ir {
        TypeIr::Record(fields) => {
            let rendered: Vec<TokenStream> = fields.iter().map(render_field).collect();
            quote! {
                #doc
                #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
                pub struct #name {
                    #(#rendered)*
                }
            }
        }
        TypeIr::Union(variants) => {
            let rendered: Vec<TokenStream> = variants
                .iter()
                .map(|variant| {
                    let tag = &variant.tag;
                    let ident = format_ident!("{}", to_upper_camel(tag));
                    match &variant.payload {
                        VariantPayload::Unit => quote! {
                            #[serde(rename = #tag)]
                            #ident,
                        },
                        VariantPayload::Record(fields) => {
                            let fields: Vec<TokenStream> =
                                fields.iter().map(render_variant_field).collect();
                            quote! {
                                #[serde(rename = #tag)]
                                #ident {
                                    #(#fields)*
                                },
                            }
                        }
                        VariantPayload::NewType(inner) => {
                            let ty = type_tokens(inner);
                            quote! {
                                #[serde(rename = #tag)]
                                #ident(#ty),
                            }
                        }
                    }
                })
                .collect();
            quote! {
                #doc
                #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
                pub enum #name {
                    #(#rendered)*
                }
            }
        }
        other => {
            let ty = type_tokens(other);
            quote! {
                #doc
                pub type #name = #ty;
            }
        }
    }
}

fn render_field(field: &FieldIr) -> TokenStream {
    let attrs = field_attrs(field);
    let ident = field_ident(&field.name);
    let ty = field_storage_ty(field);
    quote! {
        #attrs
        pub #ident: #ty,
    }
}

fn render_variant_field(field: &FieldIr) -> TokenStream {
    let attrs = field_attrs(field);
    let ident = field_ident(&field.name);
    let ty = field_storage_ty(field);
    quote! {
        #attrs
        #ident: #ty,
    }
}

fn field_attrs(field: &FieldIr) -> TokenStream {
    let mut attrs = TokenStream::new();
    if needs_rename(&field.name) {
        let name = &field.name;
        attrs.extend(quote! { #[serde(rename = #name)] });
    }
    if !field.required {
        // A doubly optional field must keep an explicit `null` distinct
        // from an absent key, which plain `Option` deserialization
        // collapses; those fields go through the shared helper.
        if matches!(field.ty, TypeIr::Optional(_)) {
            attrs.extend(quote! {
                #[serde(
                    default,
                    deserialize_with = "crate::shared::double_option",
                    skip_serializing_if = "Option::is_none"
                )]
            });
        } else {
            attrs.extend(quote! {
                #[serde(default, skip_serializing_if = "Option::is_none")]
            });
        }
    }
    attrs
}

/// The storage type for a field: an extra `Option` layer when the schema
/// marks the field absent-able, on top of whatever nullability the value
/// type itself carries.
pub fn field_storage_ty(field: &FieldIr) -> TokenStream {
    let base = type_tokens(&field.ty);
    if field.required {
        base
    } else {
        quote! { Option<#base> }
    }
}

/// Renders an IR shape as a Rust type expression.
pub fn type_tokens(ir: &TypeIr) -> TokenStream {
    use cosmogen_define::PrimitiveIr::*;
    match ir {
        TypeIr::Primitive(prim) => match prim {
            Bool => quote! { bool },
            Str => quote! { String },
            U8 => quote! { u8 },
            U16 => quote! { u16 },
            U32 => quote! { u32 },
            U64 => quote! { u64 },
            I8 => quote! { i8 },
            I16 => quote! { i16 },
            I32 => quote! { i32 },
            I64 => quote! { i64 },
            F32 => quote! { f32 },
            F64 => quote! { f64 },
        },
        TypeIr::Array(element) => {
            let inner = type_tokens(element);
            quote! { Vec<#inner> }
        }
        TypeIr::Optional(inner) => {
            let inner = type_tokens(inner);
            quote! { Option<#inner> }
        }
        TypeIr::Map(value) => {
            let value = type_tokens(value);
            quote! { std::collections::BTreeMap<String, #value> }
        }
        TypeIr::Reference { name, boxed } => {
            let ident = format_ident!("{name}");
            if *boxed {
                quote! { Box<#ident> }
            } else {
                quote! { #ident }
            }
        }
        // Anonymous nominal shapes only occur at declaration roots; an
        // inline occurrence degrades to a raw JSON value.
        TypeIr::Record(_) | TypeIr::Union(_) => quote! { serde_json::Value },
    }
}

/// Builds `#[doc = "..."]` attributes, one per line of documentation.
pub fn doc_attrs(doc: Option<&str>) -> TokenStream {
    let Some(doc) = doc else {
        return TokenStream::new();
    };
    let lines = doc.lines().map(|line| {
        let text = if line.is_empty() {
            String::new()
        } else {
            format!(" {line}")
        };
        quote! { #[doc = #text] }
    });
    quote! { #(#lines)* }
}
