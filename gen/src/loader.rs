//! Schema Loader: reads one schema directory into a [`SchemaDocument`].
//!
//! Two on-disk layouts are supported:
//!
//! - **Combined**: a single JSON file holding `instantiate`, `execute`,
//!   `query`, and a `responses` map (the modern schema export layout).
//! - **Per-file**: `instantiate_msg.json`, `execute_msg.json`,
//!   `query_msg.json`, and one `<variant>_response.json` per query variant
//!   (the legacy layout).
//!
//! Either way the loader merges every file's `definitions` into one
//! document-level map and verifies that each `$ref` in the document
//! resolves against it. Loading has no side effects beyond reading the
//! filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::path::Path;

use cosmogen_define::{SchemaDocument, SchemaNode};
use serde::Deserialize;

use crate::errors::GeneratorError;

/// The combined single-file schema layout.
#[derive(Debug, Deserialize)]
struct CombinedSchema {
    contract_name: Option<String>,
    instantiate: Option<SchemaNode>,
    execute: Option<SchemaNode>,
    query: Option<SchemaNode>,
    migrate: Option<SchemaNode>,
    #[serde(default)]
    responses: BTreeMap<String, SchemaNode>,
    /// Document-level definitions shared by every root in the file.
    #[serde(default)]
    definitions: BTreeMap<String, SchemaNode>,
}

/// Returns the definition name a `#/definitions/...` pointer targets.
pub fn ref_name(reference: &str) -> Option<&str> {
    reference.strip_prefix("#/definitions/")
}

/// Loads and validates the schema document set for one module.
///
/// ## Errors
///
/// - [`GeneratorError::SchemaNotFound`] - directory missing or without
///   schema files
/// - [`GeneratorError::SchemaParse`] - malformed JSON, naming the file
/// - [`GeneratorError::UnresolvedReference`] - a `$ref` with no matching
///   definition, naming the reference path
pub fn load_schema(module: &str, dir: &Path) -> Result<SchemaDocument, GeneratorError> {
    let not_found = || GeneratorError::SchemaNotFound {
        module: module.to_string(),
        dir: dir.to_path_buf(),
    };

    let entries = fs::read_dir(dir).map_err(|_| not_found())?;
    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Deterministic load order regardless of directory enumeration order.
    files.sort();

    if files.is_empty() {
        return Err(not_found());
    }

    let mut doc = SchemaDocument {
        name: module.to_string(),
        ..SchemaDocument::default()
    };

    for path in &files {
        load_file(module, path, &mut doc)?;
    }

    resolve_references(module, &doc)?;
    Ok(doc)
}

fn load_file(module: &str, path: &Path, doc: &mut SchemaDocument) -> Result<(), GeneratorError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let parse_err = |message: String| GeneratorError::SchemaParse {
        module: module.to_string(),
        file: file_name.clone(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;

    if is_combined_layout(&value) {
        let combined: CombinedSchema =
            serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;
        if let Some(name) = combined.contract_name {
            doc.name = name;
        }
        merge_definitions(module, &file_name, &mut doc.definitions, combined.definitions)?;
        set_root(module, &file_name, "instantiate", &mut doc.instantiate, combined.instantiate, &mut doc.definitions)?;
        set_root(module, &file_name, "execute", &mut doc.execute, combined.execute, &mut doc.definitions)?;
        set_root(module, &file_name, "query", &mut doc.query, combined.query, &mut doc.definitions)?;
        set_root(module, &file_name, "migrate", &mut doc.migrate, combined.migrate, &mut doc.definitions)?;
        for (variant, mut node) in combined.responses {
            let defs = mem::take(&mut node.definitions);
            merge_definitions(module, &file_name, &mut doc.definitions, defs)?;
            doc.responses.insert(variant, node);
        }
        return Ok(());
    }

    let node: SchemaNode = serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.as_str() {
        "instantiate_msg" | "instantiate" => {
            set_root(module, &file_name, "instantiate", &mut doc.instantiate, Some(node), &mut doc.definitions)?
        }
        "execute_msg" | "execute" => {
            set_root(module, &file_name, "execute", &mut doc.execute, Some(node), &mut doc.definitions)?
        }
        "query_msg" | "query" => {
            set_root(module, &file_name, "query", &mut doc.query, Some(node), &mut doc.definitions)?
        }
        "migrate_msg" | "migrate" => {
            set_root(module, &file_name, "migrate", &mut doc.migrate, Some(node), &mut doc.definitions)?
        }
        other if other.ends_with("_response") => {
            let variant = other.trim_end_matches("_response").to_string();
            let mut node = node;
            let defs = mem::take(&mut node.definitions);
            merge_definitions(module, &file_name, &mut doc.definitions, defs)?;
            doc.responses.insert(variant, node);
        }
        other => {
            tracing::debug!(module, file = other, "ignoring unrecognized schema file");
        }
    }

    Ok(())
}

/// A file is the combined layout when it carries message-kind roots rather
/// than being a schema node itself.
fn is_combined_layout(value: &serde_json::Value) -> bool {
    value.as_object().is_some_and(|obj| {
        ["instantiate", "execute", "query", "responses"]
            .iter()
            .any(|key| obj.contains_key(*key))
    })
}

fn set_root(
    module: &str,
    file: &str,
    kind: &str,
    slot: &mut Option<SchemaNode>,
    node: Option<SchemaNode>,
    definitions: &mut BTreeMap<String, SchemaNode>,
) -> Result<(), GeneratorError> {
    let Some(mut node) = node else {
        return Ok(());
    };
    if slot.is_some() {
        return Err(GeneratorError::SchemaParse {
            module: module.to_string(),
            file: file.to_string(),
            message: format!("duplicate '{kind}' schema in document set"),
        });
    }
    let defs = mem::take(&mut node.definitions);
    merge_definitions(module, file, definitions, defs)?;
    *slot = Some(node);
    Ok(())
}

/// Hoists incoming `definitions` into the document map. Re-declaring a
/// definition is fine as long as the shapes agree; structurally conflicting
/// duplicates are a parse error rather than a silent last-wins merge.
fn merge_definitions(
    module: &str,
    file: &str,
    definitions: &mut BTreeMap<String, SchemaNode>,
    incoming: BTreeMap<String, SchemaNode>,
) -> Result<(), GeneratorError> {
    for (name, def) in incoming {
        match definitions.get(&name) {
            Some(existing) if *existing != def => {
                return Err(GeneratorError::SchemaParse {
                    module: module.to_string(),
                    file: file.to_string(),
                    message: format!("conflicting definitions for '{name}'"),
                });
            }
            Some(_) => {}
            None => {
                definitions.insert(name, def);
            }
        }
    }
    Ok(())
}

/// Verifies every `$ref` in the document resolves to a merged definition.
fn resolve_references(module: &str, doc: &SchemaDocument) -> Result<(), GeneratorError> {
    let roots = doc
        .instantiate
        .iter()
        .chain(doc.execute.iter())
        .chain(doc.query.iter())
        .chain(doc.migrate.iter())
        .chain(doc.responses.values())
        .chain(doc.definitions.values());

    for root in roots {
        check_refs(module, root, &doc.definitions)?;
    }
    Ok(())
}

fn check_refs(
    module: &str,
    node: &SchemaNode,
    definitions: &BTreeMap<String, SchemaNode>,
) -> Result<(), GeneratorError> {
    if let Some(reference) = &node.reference {
        let resolved = ref_name(reference).is_some_and(|name| definitions.contains_key(name));
        if !resolved {
            return Err(GeneratorError::UnresolvedReference {
                module: module.to_string(),
                reference: reference.clone(),
            });
        }
    }

    let children = node
        .properties
        .values()
        .chain(node.one_of.iter())
        .chain(node.any_of.iter())
        .chain(node.all_of.iter())
        .chain(node.items.as_deref())
        .chain(node.definitions.values());
    for child in children {
        check_refs(module, child, definitions)?;
    }
    if let Some(cosmogen_define::AdditionalProperties::Schema(extra)) = &node.additional_properties
    {
        check_refs(module, extra, definitions)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn missing_directory_is_schema_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_schema("counter", &temp.path().join("nope"));

        match result.unwrap_err() {
            GeneratorError::SchemaNotFound { module, .. } => assert_eq!(module, "counter"),
            other => panic!("expected SchemaNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn empty_directory_is_schema_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_schema("counter", temp.path());
        assert!(matches!(
            result.unwrap_err(),
            GeneratorError::SchemaNotFound { .. }
        ));
    }

    #[test]
    fn loads_the_combined_layout() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "counter.json",
            r#"{
                "contract_name": "counter",
                "instantiate": {
                    "title": "InstantiateMsg",
                    "type": "object",
                    "required": ["count"],
                    "properties": { "count": { "type": "integer", "format": "uint64" } }
                },
                "query": {
                    "title": "QueryMsg",
                    "oneOf": [{
                        "type": "object",
                        "required": ["count"],
                        "properties": { "count": { "type": "object" } }
                    }]
                },
                "responses": {
                    "count": {
                        "title": "CountResponse",
                        "type": "object",
                        "required": ["count"],
                        "properties": { "count": { "type": "integer", "format": "uint64" } }
                    }
                }
            }"#,
        );

        let doc = load_schema("counter", temp.path()).unwrap();
        assert_eq!(doc.name, "counter");
        assert!(doc.instantiate.is_some());
        assert!(doc.query.is_some());
        assert!(doc.execute.is_none());
        assert!(doc.responses.contains_key("count"));
    }

    #[test]
    fn combined_layout_document_definitions_resolve_references() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "counter.json",
            r##"{
                "contract_name": "counter",
                "instantiate": {
                    "title": "InstantiateMsg",
                    "type": "object",
                    "required": ["owner"],
                    "properties": { "owner": { "$ref": "#/definitions/Addr" } }
                },
                "responses": {
                    "owner": {
                        "title": "OwnerResponse",
                        "type": "object",
                        "required": ["owner"],
                        "properties": { "owner": { "$ref": "#/definitions/Addr" } }
                    }
                },
                "definitions": { "Addr": { "type": "string" } }
            }"##,
        );

        let doc = load_schema("counter", temp.path()).unwrap();
        assert!(doc.definitions.contains_key("Addr"));
        assert!(doc.instantiate.is_some());
        assert!(doc.responses.contains_key("owner"));
    }

    #[test]
    fn loads_the_per_file_layout_and_merges_definitions() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "instantiate_msg.json",
            r##"{
                "type": "object",
                "required": ["owner"],
                "properties": { "owner": { "$ref": "#/definitions/Addr" } },
                "definitions": { "Addr": { "type": "string" } }
            }"##,
        );
        write(
            temp.path(),
            "execute_msg.json",
            r##"{
                "oneOf": [{
                    "type": "object",
                    "required": ["transfer"],
                    "properties": {
                        "transfer": {
                            "type": "object",
                            "required": ["recipient"],
                            "properties": { "recipient": { "$ref": "#/definitions/Addr" } }
                        }
                    }
                }],
                "definitions": { "Addr": { "type": "string" } }
            }"##,
        );
        write(
            temp.path(),
            "owner_response.json",
            r#"{
                "title": "OwnerResponse",
                "type": "object",
                "required": ["owner"],
                "properties": { "owner": { "type": "string" } }
            }"#,
        );

        let doc = load_schema("counter", temp.path()).unwrap();
        assert!(doc.instantiate.is_some());
        assert!(doc.execute.is_some());
        assert!(doc.responses.contains_key("owner"));
        // Identical Addr definitions from two files merge into one entry.
        assert_eq!(doc.definitions.len(), 1);
        assert!(doc.definitions.contains_key("Addr"));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "execute_msg.json", "{ not json");

        match load_schema("broken", temp.path()).unwrap_err() {
            GeneratorError::SchemaParse { module, file, .. } => {
                assert_eq!(module, "broken");
                assert_eq!(file, "execute_msg.json");
            }
            other => panic!("expected SchemaParse, got: {other:?}"),
        }
    }

    #[test]
    fn unresolved_reference_names_the_path() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "instantiate_msg.json",
            r##"{
                "type": "object",
                "required": ["owner"],
                "properties": { "owner": { "$ref": "#/definitions/Missing" } }
            }"##,
        );

        match load_schema("counter", temp.path()).unwrap_err() {
            GeneratorError::UnresolvedReference { module, reference } => {
                assert_eq!(module, "counter");
                assert_eq!(reference, "#/definitions/Missing");
            }
            other => panic!("expected UnresolvedReference, got: {other:?}"),
        }
    }

    #[test]
    fn conflicting_definitions_are_a_parse_error() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "instantiate_msg.json",
            r##"{
                "type": "object",
                "properties": { "a": { "$ref": "#/definitions/Token" } },
                "definitions": { "Token": { "type": "string" } }
            }"##,
        );
        write(
            temp.path(),
            "query_msg.json",
            r#"{
                "oneOf": [{
                    "type": "object",
                    "required": ["token"],
                    "properties": { "token": { "type": "object" } }
                }],
                "definitions": { "Token": { "type": "integer", "format": "uint64" } }
            }"#,
        );

        match load_schema("counter", temp.path()).unwrap_err() {
            GeneratorError::SchemaParse { message, .. } => {
                assert!(message.contains("Token"));
            }
            other => panic!("expected SchemaParse, got: {other:?}"),
        }
    }

    #[test]
    fn non_definition_reference_is_unresolved() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "instantiate_msg.json",
            r#"{
                "type": "object",
                "properties": { "a": { "$ref": "http://example.com/schema.json" } }
            }"#,
        );

        assert!(matches!(
            load_schema("counter", temp.path()).unwrap_err(),
            GeneratorError::UnresolvedReference { .. }
        ));
    }
}
