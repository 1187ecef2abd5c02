//! Type Synthesizer: lowers a [`SchemaDocument`] into IR declarations.
//!
//! Lowering is where the schema dialect's conventions get normalized:
//! externally tagged `oneOf` unions become [`TypeIr::Union`], `["T", "null"]`
//! and the two-arm `anyOf`-with-null spelling both become
//! [`TypeIr::Optional`], `allOf` wrappers are unwrapped, and
//! arbitrary-precision numeric wrappers declared as `{"type": "string"}`
//! stay string-shaped rather than being "helpfully" widened to a float.
//!
//! References to definitions that sit on a dependency cycle are marked
//! `boxed` so the rendered types have finite size.

use std::collections::{BTreeMap, HashMap, HashSet};

use cosmogen_define::{
    AdditionalProperties, FieldIr, PrimitiveIr, SchemaDocument, SchemaNode, TypeDecl, TypeIr,
    TypeName, VariantIr, VariantPayload,
};

use crate::errors::GeneratorError;
use crate::loader::ref_name;
use crate::naming::to_upper_camel;

/// One lowered message root: the declaration carrying it plus its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageShape {
    pub decl_name: String,
    pub ir: TypeIr,
}

/// The complete lowered form of one module's schema document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoweredDocument {
    /// Declarations in emission order: message roots first, then responses
    /// and definitions alphabetically.
    pub decls: Vec<TypeDecl>,
    pub instantiate: Option<MessageShape>,
    pub execute: Option<MessageShape>,
    pub query: Option<MessageShape>,
    pub migrate: Option<MessageShape>,
    /// Query variant tag to response declaration name.
    pub responses: BTreeMap<String, String>,
}

/// Lowers a loaded schema document into IR declarations.
///
/// ## Errors
///
/// - [`GeneratorError::UnresolvedReference`] - a `$ref` outside the
///   document's definitions (the loader normally catches these first)
/// - [`GeneratorError::CodeGen`] - a schema construct the dialect does not
///   cover, or two declarations claiming one name with different shapes
pub fn lower_document(
    module: &str,
    doc: &SchemaDocument,
) -> Result<LoweredDocument, GeneratorError> {
    let lowerer = Lowerer {
        module,
        cyclic: cyclic_definitions(&doc.definitions),
    };

    let mut lowered = LoweredDocument::default();

    lowered.instantiate = lowerer.lower_root(
        doc.instantiate.as_ref(),
        "InstantiateMsg",
        &mut lowered.decls,
    )?;
    lowered.execute = lowerer.lower_root(doc.execute.as_ref(), "ExecuteMsg", &mut lowered.decls)?;
    lowered.query = lowerer.lower_root(doc.query.as_ref(), "QueryMsg", &mut lowered.decls)?;
    lowered.migrate = lowerer.lower_root(doc.migrate.as_ref(), "MigrateMsg", &mut lowered.decls)?;

    for (tag, node) in &doc.responses {
        let name = node
            .title
            .clone()
            .unwrap_or_else(|| format!("{}Response", to_upper_camel(tag)));
        let name = to_upper_camel(&name);
        let ir = lowerer.lower_node(node)?;
        push_decl(module, &mut lowered.decls, decl_with_doc(&name, ir, node))?;
        lowered.responses.insert(tag.clone(), name);
    }

    for (key, node) in &doc.definitions {
        let name = to_upper_camel(key);
        let ir = lowerer.lower_node(node)?;
        push_decl(module, &mut lowered.decls, decl_with_doc(&name, ir, node))?;
    }

    Ok(lowered)
}

fn decl_with_doc(name: &str, ir: TypeIr, node: &SchemaNode) -> TypeDecl {
    let decl = TypeDecl::new(name, ir);
    match &node.description {
        Some(doc) => decl.with_doc(doc.clone()),
        None => decl,
    }
}

/// Adds a declaration, merging byte-identical duplicates and rejecting
/// same-name declarations with different shapes.
fn push_decl(
    module: &str,
    decls: &mut Vec<TypeDecl>,
    decl: TypeDecl,
) -> Result<(), GeneratorError> {
    match decls.iter().find(|existing| existing.name == decl.name) {
        Some(existing) if *existing == decl => Ok(()),
        Some(_) => Err(GeneratorError::CodeGen(format!(
            "module '{module}' declares '{}' twice with different shapes",
            decl.name
        ))),
        None => {
            decls.push(decl);
            Ok(())
        }
    }
}

struct Lowerer<'a> {
    module: &'a str,
    /// Definition names participating in a reference cycle.
    cyclic: HashSet<String>,
}

impl Lowerer<'_> {
    fn lower_root(
        &self,
        node: Option<&SchemaNode>,
        default_name: &str,
        decls: &mut Vec<TypeDecl>,
    ) -> Result<Option<MessageShape>, GeneratorError> {
        let Some(node) = node else {
            return Ok(None);
        };
        let name = to_upper_camel(node.title.as_deref().unwrap_or(default_name));
        let ir = self.lower_node(node)?;
        push_decl(self.module, decls, decl_with_doc(&name, ir.clone(), node))?;
        Ok(Some(MessageShape {
            decl_name: name,
            ir,
        }))
    }

    fn lower_node(&self, node: &SchemaNode) -> Result<TypeIr, GeneratorError> {
        if let Some(reference) = &node.reference {
            let name = ref_name(reference).ok_or_else(|| GeneratorError::UnresolvedReference {
                module: self.module.to_string(),
                reference: reference.clone(),
            })?;
            return Ok(TypeIr::Reference {
                name: to_upper_camel(name),
                boxed: self.cyclic.contains(name),
            });
        }

        // `allOf` with a single arm is a documentation wrapper around the arm.
        if node.all_of.len() == 1 {
            return self.lower_node(&node.all_of[0]);
        }

        if node.is_nullable() {
            let mut inner = node.clone();
            inner.schema_type = node.primary_type().map(cosmogen_define::SchemaType::One);
            return Ok(TypeIr::optional(self.lower_node(&inner)?));
        }

        // `anyOf` of a value arm and a bare-null arm spells an optional value.
        if let Some(value_arm) = nullable_any_of(node) {
            return Ok(TypeIr::optional(self.lower_node(value_arm)?));
        }

        if !node.union_arms().is_empty() {
            return self.lower_union(node);
        }

        if !node.enum_values.is_empty() {
            return self.lower_string_enum(node);
        }

        match node.primary_type() {
            Some(TypeName::Object) | None => {
                if let Some(AdditionalProperties::Schema(value)) = &node.additional_properties {
                    if node.properties.is_empty() {
                        return Ok(TypeIr::map(self.lower_node(value)?));
                    }
                }
                Ok(TypeIr::Record(self.lower_fields(node)?))
            }
            Some(TypeName::Array) => {
                let items = node.items.as_deref().ok_or_else(|| {
                    GeneratorError::CodeGen(format!(
                        "module '{}' has an array schema without items",
                        self.module
                    ))
                })?;
                Ok(TypeIr::array(self.lower_node(items)?))
            }
            Some(TypeName::String) => Ok(TypeIr::Primitive(PrimitiveIr::Str)),
            Some(TypeName::Boolean) => Ok(TypeIr::Primitive(PrimitiveIr::Bool)),
            Some(TypeName::Integer) => Ok(TypeIr::Primitive(integer_width(node))),
            Some(TypeName::Number) => Ok(TypeIr::Primitive(
                if node.format.as_deref() == Some("float") {
                    PrimitiveIr::F32
                } else {
                    PrimitiveIr::F64
                },
            )),
            // A bare-null schema carries no value.
            Some(TypeName::Null) => Ok(TypeIr::optional(TypeIr::Record(Vec::new()))),
        }
    }

    fn lower_fields(&self, node: &SchemaNode) -> Result<Vec<FieldIr>, GeneratorError> {
        let mut fields = Vec::with_capacity(node.properties.len());
        for (name, prop) in &node.properties {
            let ty = self.lower_node(prop)?;
            let required = node.required.iter().any(|r| r == name);
            fields.push(FieldIr {
                name: name.clone(),
                ty,
                required,
            });
        }
        Ok(fields)
    }

    /// Lowers an externally tagged union: each arm is an object with exactly
    /// one required property naming the variant, or a single-value string
    /// enum.
    fn lower_union(&self, node: &SchemaNode) -> Result<TypeIr, GeneratorError> {
        let mut variants = Vec::new();
        for arm in node.union_arms() {
            if !arm.enum_values.is_empty() {
                for value in &arm.enum_values {
                    variants.push(VariantIr {
                        tag: enum_tag(self.module, value)?,
                        payload: VariantPayload::Unit,
                    });
                }
                continue;
            }

            let tag = single_tag(arm).ok_or_else(|| {
                GeneratorError::CodeGen(format!(
                    "module '{}' has a union arm that is not a single-tag object",
                    self.module
                ))
            })?;
            let payload_node = &arm.properties[&tag];
            variants.push(VariantIr {
                payload: self.lower_payload(payload_node)?,
                tag,
            });
        }
        Ok(TypeIr::Union(variants))
    }

    /// An object payload stays a record even when it has no fields: the
    /// wire format is `{"tag": {}}`, which only an empty struct variant
    /// round-trips. Unit variants are reserved for string enums, which
    /// serialize as bare tag strings.
    fn lower_payload(&self, node: &SchemaNode) -> Result<VariantPayload, GeneratorError> {
        if node.reference.is_some() {
            return Ok(VariantPayload::NewType(Box::new(self.lower_node(node)?)));
        }
        match self.lower_node(node)? {
            TypeIr::Record(fields) => Ok(VariantPayload::Record(fields)),
            other => Ok(VariantPayload::NewType(Box::new(other))),
        }
    }

    fn lower_string_enum(&self, node: &SchemaNode) -> Result<TypeIr, GeneratorError> {
        let mut variants = Vec::with_capacity(node.enum_values.len());
        for value in &node.enum_values {
            variants.push(VariantIr {
                tag: enum_tag(self.module, value)?,
                payload: VariantPayload::Unit,
            });
        }
        Ok(TypeIr::Union(variants))
    }
}

fn enum_tag(module: &str, value: &serde_json::Value) -> Result<String, GeneratorError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            GeneratorError::CodeGen(format!(
                "module '{module}' has a non-string enum value: {value}"
            ))
        })
}

/// The tag of a single-required-property union arm, when the arm has one.
fn single_tag(arm: &SchemaNode) -> Option<String> {
    if arm.required.len() == 1 && arm.properties.contains_key(&arm.required[0]) {
        Some(arm.required[0].clone())
    } else if arm.required.is_empty() && arm.properties.len() == 1 {
        arm.properties.keys().next().cloned()
    } else {
        None
    }
}

/// Matches the two-arm `anyOf` spelling of an optional value, returning the
/// non-null arm.
fn nullable_any_of(node: &SchemaNode) -> Option<&SchemaNode> {
    if !node.one_of.is_empty() || node.any_of.len() != 2 {
        return None;
    }
    let is_null = |arm: &SchemaNode| arm.primary_type() == Some(TypeName::Null);
    match (is_null(&node.any_of[0]), is_null(&node.any_of[1])) {
        (false, true) => Some(&node.any_of[0]),
        (true, false) => Some(&node.any_of[1]),
        _ => None,
    }
}

fn integer_width(node: &SchemaNode) -> PrimitiveIr {
    match node.format.as_deref() {
        Some("uint8") => PrimitiveIr::U8,
        Some("uint16") => PrimitiveIr::U16,
        Some("uint32") => PrimitiveIr::U32,
        Some("uint64") => PrimitiveIr::U64,
        Some("int8") => PrimitiveIr::I8,
        Some("int16") => PrimitiveIr::I16,
        Some("int32") => PrimitiveIr::I32,
        _ => PrimitiveIr::I64,
    }
}

/// Returns the definition names that participate in a `$ref` cycle.
fn cyclic_definitions(definitions: &BTreeMap<String, SchemaNode>) -> HashSet<String> {
    let mut graph: HashMap<&str, Vec<String>> = HashMap::new();
    for (name, node) in definitions {
        let mut targets = Vec::new();
        collect_refs(node, &mut targets);
        graph.insert(name.as_str(), targets);
    }

    // A definition is cyclic when it can reach itself.
    let mut cyclic = HashSet::new();
    for start in definitions.keys() {
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = graph
            .get(start.as_str())
            .map(|targets| targets.iter().map(String::as_str).collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if current == start {
                cyclic.insert(start.clone());
                break;
            }
            if seen.insert(current) {
                if let Some(targets) = graph.get(current) {
                    stack.extend(targets.iter().map(String::as_str));
                }
            }
        }
    }
    cyclic
}

fn collect_refs(node: &SchemaNode, out: &mut Vec<String>) {
    if let Some(reference) = &node.reference {
        if let Some(name) = ref_name(reference) {
            out.push(name.to_string());
        }
    }
    let children = node
        .properties
        .values()
        .chain(node.one_of.iter())
        .chain(node.any_of.iter())
        .chain(node.all_of.iter())
        .chain(node.items.as_deref());
    for child in children {
        collect_refs(child, out);
    }
    if let Some(AdditionalProperties::Schema(extra)) = &node.additional_properties {
        collect_refs(extra, out);
    }
}
