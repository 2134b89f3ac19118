//! Serializable description of resolved schemas.
//!
//! [SchemaDef] mirrors a [StructSchema] as plain data, for example to ship a
//! JSON description of a wire format next to an application or to diff two
//! versions of a record layout.

use serde::{Deserialize, Serialize};

use crate::{
    field::{ElementKind, FieldDescriptor, FieldKind},
    primitive::PrimitiveKind,
    schema::StructSchema,
};

/// Fields of one record type, in wire order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SchemaDef {
    pub type_name: String,
    pub fields: Vec<FieldDef>,
}

/// Description of a single marshalled field.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub nullable: bool,
    pub kind: FieldKindDef,
}

/// Kind of field in the schema.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    Primitive {
        primitive: PrimitiveKind,
    },
    Array {
        element: ElementDef,
        dimensions: usize,
    },
    /// A record inlined by value or through an optional reference.
    Nested {
        type_name: String,
    },
}

/// Innermost element of an array field.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ElementDef {
    Primitive { primitive: PrimitiveKind },
    Nested { type_name: String },
}

impl From<&StructSchema> for SchemaDef {
    fn from(schema: &StructSchema) -> Self {
        SchemaDef {
            type_name: schema.type_name().to_string(),
            fields: schema.fields().iter().map(FieldDef::from).collect(),
        }
    }
}

impl From<&FieldDescriptor> for FieldDef {
    fn from(field: &FieldDescriptor) -> Self {
        FieldDef {
            name: field.name.to_string(),
            index: field.index,
            skip: field.skip,
            limit: field.limit,
            reverse: field.reverse,
            nullable: field.nullable,
            kind: FieldKindDef::from(&field.kind),
        }
    }
}

impl From<&FieldKind> for FieldKindDef {
    fn from(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Primitive(primitive) => FieldKindDef::Primitive {
                primitive: *primitive,
            },
            FieldKind::Array {
                element,
                dimensions,
            } => FieldKindDef::Array {
                element: ElementDef::from(element),
                dimensions: *dimensions,
            },
            FieldKind::Nested(nested) => FieldKindDef::Nested {
                type_name: nested.type_name().to_string(),
            },
        }
    }
}

impl From<&ElementKind> for ElementDef {
    fn from(element: &ElementKind) -> Self {
        match element {
            ElementKind::Primitive(primitive) => ElementDef::Primitive {
                primitive: *primitive,
            },
            ElementKind::Nested(nested) => ElementDef::Nested {
                type_name: nested.type_name().to_string(),
            },
        }
    }
}
