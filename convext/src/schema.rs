//! Document schemas
//!
//! A schema tells the engine the declared type of every slot in a document
//! and which converter, if any, handles it.

use convext_core::{DeclaredType, TypeKind};

/// Declared type of a leaf slot plus its explicit converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub declared: DeclaredType,
    pub converter: Option<String>,
}

impl FieldSpec {
    pub fn new(declared: DeclaredType) -> Self {
        Self { declared, converter: None }
    }

    pub fn with_converter(mut self, name: impl Into<String>) -> Self {
        self.converter = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Leaf(FieldSpec),
    /// Every element shares the item schema
    List { item: Box<Schema> },
    /// String-keyed entries sharing the item schema
    Map { item: Box<Schema> },
    /// Named fields in declaration order. `item_converter` applies to leaf
    /// fields that name no converter of their own.
    Object {
        item_converter: Option<String>,
        fields: Vec<(String, Schema)>,
    },
}

impl Schema {
    pub fn leaf(declared: DeclaredType) -> Self {
        Schema::Leaf(FieldSpec::new(declared))
    }

    pub fn converted(declared: DeclaredType, converter: impl Into<String>) -> Self {
        Schema::Leaf(FieldSpec::new(declared).with_converter(converter))
    }

    /// Untyped leaf, the shape of a field declared as a plain object
    pub fn any() -> Self {
        Self::leaf(DeclaredType::of(TypeKind::Any))
    }

    pub fn list(item: Schema) -> Self {
        Schema::List { item: Box::new(item) }
    }

    pub fn map(item: Schema) -> Self {
        Schema::Map { item: Box::new(item) }
    }

    pub fn object() -> Self {
        Schema::Object { item_converter: None, fields: Vec::new() }
    }

    /// Sets the item converter of an object schema; other schemas are unchanged
    pub fn with_item_converter(mut self, name: impl Into<String>) -> Self {
        if let Schema::Object { item_converter, .. } = &mut self {
            *item_converter = Some(name.into());
        }
        self
    }

    /// Appends a field to an object schema; other schemas are unchanged
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let Schema::Object { fields, .. } = &mut self {
            fields.push((name.into(), schema));
        }
        self
    }

    /// Shape name used in mismatch errors
    pub fn shape_name(&self) -> String {
        match self {
            Schema::Leaf(spec) => spec.declared.to_string(),
            Schema::List { .. } => "List".to_string(),
            Schema::Map { .. } => "Map".to_string(),
            Schema::Object { .. } => "Object".to_string(),
        }
    }
}
