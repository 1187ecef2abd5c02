//! Language-neutral type representation.
//!
//! The Type Synthesizer lowers schema nodes into [`TypeIr`] trees; the
//! renderers turn them into Rust declarations, and the Bundler deduplicates
//! declarations by structural equality over this representation (not by
//! comparing emitted text). `TypeIr` therefore implements `Eq` and `Hash`
//! structurally, and lives only for the duration of one generation run.

/// A shape in the intermediate representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeIr {
    Primitive(PrimitiveIr),
    /// Ordered record fields. Field order is canonical (schema property
    /// order after the loader's `BTreeMap` normalization), so equal records
    /// compare equal field-for-field.
    Record(Vec<FieldIr>),
    /// Closed tagged union; one variant per authored tag.
    Union(Vec<VariantIr>),
    Array(Box<TypeIr>),
    /// Explicitly nullable value (`["T", "null"]` in the schema). Distinct
    /// from a field missing its `required` entry.
    Optional(Box<TypeIr>),
    /// String-keyed map (`additionalProperties` with a value schema).
    Map(Box<TypeIr>),
    /// Reference to a named declaration. `boxed` is set when the target
    /// participates in a definition cycle and needs pointer indirection.
    Reference { name: String, boxed: bool },
}

impl TypeIr {
    pub fn array(element: TypeIr) -> Self {
        TypeIr::Array(Box::new(element))
    }

    pub fn optional(inner: TypeIr) -> Self {
        TypeIr::Optional(Box::new(inner))
    }

    pub fn map(value: TypeIr) -> Self {
        TypeIr::Map(Box::new(value))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeIr::Reference {
            name: name.into(),
            boxed: false,
        }
    }

    /// Whether rendering this shape produces a struct or enum (and thus
    /// needs serde derives), as opposed to a type alias.
    pub fn is_nominal(&self) -> bool {
        matches!(self, TypeIr::Record(_) | TypeIr::Union(_))
    }
}

/// Primitive shapes. Sized integers come from the schema's `format` hint.
/// Arbitrary-precision numerics never reach this enum; they stay `Str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveIr {
    Bool,
    Str,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

/// One record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIr {
    /// Field name exactly as authored in the schema.
    pub name: String,
    pub ty: TypeIr,
    /// Whether the schema lists the field in `required`. An optional field
    /// is a distinct state from a required-but-nullable one.
    pub required: bool,
}

impl FieldIr {
    pub fn required(name: impl Into<String>, ty: TypeIr) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeIr) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }
}

/// One union variant, identified by its authored tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantIr {
    /// Tag value exactly as authored; preserved byte-for-byte in output.
    pub tag: String,
    pub payload: VariantPayload,
}

/// Variant payload shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantPayload {
    /// No payload (string-enum variants).
    Unit,
    /// Named fields.
    Record(Vec<FieldIr>),
    /// Single unnamed payload (a `$ref` or other non-object payload).
    NewType(Box<TypeIr>),
}

impl VariantPayload {
    /// The variant's field set, empty for unit variants.
    pub fn fields(&self) -> &[FieldIr] {
        match self {
            VariantPayload::Record(fields) => fields,
            _ => &[],
        }
    }
}

/// A named declaration produced for one module.
///
/// Equality covers the documentation string as well: the Bundler only merges
/// declarations that would render byte-identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDecl {
    pub name: String,
    pub ir: TypeIr,
    pub doc: Option<String>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, ir: TypeIr) -> Self {
        Self {
            name: name.into(),
            ir,
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}
