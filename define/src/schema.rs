//! The JSON Schema subset read from contract schema files.
//!
//! Contract schemas describe message shapes with a constrained JSON Schema
//! dialect: objects with `properties`/`required`, externally tagged unions
//! via `oneOf`/`anyOf`, string enums, arrays, nullable types spelled as
//! `["T", "null"]`, and `$ref` pointers into a document-local `definitions`
//! map. Everything the generator consumes is captured here; unknown keywords
//! are ignored during deserialization.
//!
//! All maps are `BTreeMap` so that iteration order, and therefore generated
//! output, is deterministic across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single schema node.
///
/// ## Examples
///
/// ```
/// use cosmogen_define::{SchemaNode, TypeName};
///
/// let node: SchemaNode = serde_json::from_str(
///     r#"{ "type": ["string", "null"], "description": "optional label" }"#,
/// ).unwrap();
/// assert!(node.is_nullable());
/// assert_eq!(node.primary_type(), Some(TypeName::String));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// `$ref` pointer, e.g. `#/definitions/Uint128`.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `type` keyword; a single name or a `["T", "null"]` pair.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Numeric width hint, e.g. `uint64` or `int32`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// String enum values for unit-variant unions.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, SchemaNode>,
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SchemaNode {
    /// Returns true when the `type` keyword includes `null`.
    pub fn is_nullable(&self) -> bool {
        match &self.schema_type {
            Some(SchemaType::Many(names)) => names.contains(&TypeName::Null),
            _ => false,
        }
    }

    /// Returns the first non-`null` type name, if any.
    pub fn primary_type(&self) -> Option<TypeName> {
        match &self.schema_type {
            Some(SchemaType::One(name)) => Some(*name),
            Some(SchemaType::Many(names)) => {
                names.iter().copied().find(|n| *n != TypeName::Null)
            }
            None => None,
        }
    }

    /// Returns the union arms, preferring `oneOf` over `anyOf`.
    pub fn union_arms(&self) -> &[SchemaNode] {
        if !self.one_of.is_empty() {
            &self.one_of
        } else {
            &self.any_of
        }
    }

    /// Whether this node declares a tagged or string-enum union.
    pub fn is_union(&self) -> bool {
        !self.union_arms().is_empty()
            || (!self.enum_values.is_empty() && self.primary_type() == Some(TypeName::String))
    }
}

/// `type` keyword value: one name, or several (used for nullability).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    One(TypeName),
    Many(Vec<TypeName>),
}

/// JSON Schema primitive type names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TypeName {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

/// `additionalProperties`: a bare boolean or a value schema (maps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

/// One contract's complete message schema, assembled by the Schema Loader.
///
/// `definitions` is the merge of every source file's `definitions` map;
/// `responses` is keyed by query variant tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    /// Contract name as recorded in the schema (or the module name).
    pub name: String,
    pub instantiate: Option<SchemaNode>,
    pub execute: Option<SchemaNode>,
    pub query: Option<SchemaNode>,
    pub migrate: Option<SchemaNode>,
    pub responses: BTreeMap<String, SchemaNode>,
    pub definitions: BTreeMap<String, SchemaNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_externally_tagged_union() {
        let json = r#"{
            "title": "ExecuteMsg",
            "oneOf": [
                {
                    "type": "object",
                    "required": ["withdraw_for_all"],
                    "properties": { "withdraw_for_all": { "type": "object" } },
                    "additionalProperties": false
                }
            ]
        }"#;

        let node: SchemaNode = serde_json::from_str(json).unwrap();
        assert!(node.is_union());
        assert_eq!(node.union_arms().len(), 1);
        assert_eq!(node.union_arms()[0].required, vec!["withdraw_for_all"]);
        assert_eq!(
            node.union_arms()[0].additional_properties,
            Some(AdditionalProperties::Allowed(false))
        );
    }

    #[test]
    fn parses_nullable_types() {
        let node: SchemaNode =
            serde_json::from_str(r#"{ "type": ["integer", "null"], "format": "uint32" }"#).unwrap();
        assert!(node.is_nullable());
        assert_eq!(node.primary_type(), Some(TypeName::Integer));
        assert_eq!(node.format.as_deref(), Some("uint32"));
    }

    #[test]
    fn parses_references_and_definitions() {
        let json = r##"{
            "type": "object",
            "required": ["amount"],
            "properties": { "amount": { "$ref": "#/definitions/Uint128" } },
            "definitions": { "Uint128": { "type": "string" } }
        }"##;

        let node: SchemaNode = serde_json::from_str(json).unwrap();
        let amount = node.properties.get("amount").unwrap();
        assert_eq!(amount.reference.as_deref(), Some("#/definitions/Uint128"));
        assert!(node.definitions.contains_key("Uint128"));
    }

    #[test]
    fn string_enum_is_a_union() {
        let node: SchemaNode =
            serde_json::from_str(r#"{ "type": "string", "enum": ["open", "closed"] }"#).unwrap();
        assert!(node.is_union());
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let node: SchemaNode = serde_json::from_str(
            r#"{ "type": "string", "$schema": "http://json-schema.org/draft-07/schema#" }"#,
        )
        .unwrap();
        assert_eq!(node.primary_type(), Some(TypeName::String));
    }
}
