//! Schema: ordered field descriptors for one record type, plus the traits records implement.

use crate::{field::FieldDescriptor, value::FieldValue};

/// Resolved, immutable field list of a record type. Use [StructSchema::resolve]
/// or [StructSchema::builder] to build one; both sort fields by index.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl StructSchema {
    /// Orders `fields` by ascending index. The sort is stable: fields sharing
    /// an index keep the order they were given in.
    pub fn resolve(type_name: &'static str, mut fields: Vec<FieldDescriptor>) -> Self {
        fields.sort_by_key(|field| field.index);
        Self { type_name, fields }
    }

    pub fn builder(type_name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            type_name,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects descriptors in declaration order.
#[derive(Debug)]
pub struct SchemaBuilder {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> StructSchema {
        StructSchema::resolve(self.type_name, self.fields)
    }
}

/// A value the engine can measure, pack and unpack.
///
/// Only fields named by the schema take part in marshalling; anything else on
/// the type is invisible to the wire format.
pub trait Struct {
    fn schema(&self) -> &'static StructSchema;

    fn field(&self, name: &str) -> Option<&dyn FieldValue>;

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldValue>;
}

/// A [Struct] type with a cached schema and a default value, which is what
/// lets the engine fill in unset nested references.
pub trait Record: Struct + Default + 'static {
    /// The schema of this type, resolved once and shared afterwards.
    fn resolve() -> &'static StructSchema;
}
