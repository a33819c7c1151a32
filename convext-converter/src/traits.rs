//! Converter traits

use crate::{ConvertContext, TokenReader, TokenWriter};
use convext_core::{DateTime, DateTimeOffset, DeclaredType, DomainError, TypeKind, Value};
use serde::Serialize;

/// Metadata for a converter
#[derive(Debug, Clone, Serialize)]
pub struct ConverterMeta {
    pub name: &'static str,
    pub description: &'static str,
    /// Declared kinds the converter accepts
    pub handles: &'static [TypeKind],
    /// Wire token kinds the converter emits
    pub emits: &'static [&'static str],
    pub examples: &'static [&'static str],
}

/// Object-typed converter invoked by the host once per field or element
pub trait ValueConverter: Send + Sync {
    fn meta(&self) -> ConverterMeta;

    fn can_convert(&self, declared: &DeclaredType) -> bool {
        self.meta().handles.contains(&declared.kind())
    }

    fn write(
        &self,
        writer: &mut dyn TokenWriter,
        value: &Value,
        ctx: &ConvertContext,
    ) -> Result<(), DomainError>;

    fn read(
        &self,
        reader: &dyn TokenReader,
        declared: &DeclaredType,
        existing: Option<&Value>,
        ctx: &ConvertContext,
    ) -> Result<Value, DomainError>;
}

/// Rust type a strictly-typed converter works on
pub trait ValueShape: Sized {
    const KIND: TypeKind;

    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

impl ValueShape for String {
    const KIND: TypeKind = TypeKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl ValueShape for i64 {
    const KIND: TypeKind = TypeKind::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl ValueShape for bool {
    const KIND: TypeKind = TypeKind::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ValueShape for DateTime {
    const KIND: TypeKind = TypeKind::DateTime;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_datetime().copied()
    }

    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl ValueShape for DateTimeOffset {
    const KIND: TypeKind = TypeKind::DateTimeOffset;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_datetime_offset().copied()
    }

    fn into_value(self) -> Value {
        Value::DateTimeOffset(self)
    }
}

/// Converter working on one concrete Rust type.
///
/// `None` stands for null in both directions. On read, `has_existing` tells
/// whether the host supplied a prior value for the slot.
pub trait TypedConverter: Send + Sync {
    type Target: ValueShape;

    fn meta(&self) -> ConverterMeta;

    fn write_typed(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&Self::Target>,
        ctx: &ConvertContext,
    ) -> Result<(), DomainError>;

    fn read_typed(
        &self,
        reader: &dyn TokenReader,
        declared: &DeclaredType,
        existing: Option<&Self::Target>,
        has_existing: bool,
        ctx: &ConvertContext,
    ) -> Result<Option<Self::Target>, DomainError>;
}

/// Exposes a `TypedConverter` through the object-typed contract.
///
/// Non-null values and existing values must have the converter's target
/// shape; anything else is rejected before the typed converter runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Typed<C>(pub C);

impl<C: TypedConverter> Typed<C> {
    pub fn inner(&self) -> &C {
        &self.0
    }
}

impl<C: TypedConverter> ValueConverter for Typed<C> {
    fn meta(&self) -> ConverterMeta {
        self.0.meta()
    }

    fn can_convert(&self, declared: &DeclaredType) -> bool {
        declared.kind() == C::Target::KIND
    }

    fn write(
        &self,
        writer: &mut dyn TokenWriter,
        value: &Value,
        ctx: &ConvertContext,
    ) -> Result<(), DomainError> {
        if value.is_null() {
            return self.0.write_typed(writer, None, ctx);
        }
        let typed = C::Target::from_value(value).ok_or(DomainError::UnexpectedValueType {
            required: Some(C::Target::KIND),
        })?;
        self.0.write_typed(writer, Some(&typed), ctx)
    }

    fn read(
        &self,
        reader: &dyn TokenReader,
        declared: &DeclaredType,
        existing: Option<&Value>,
        ctx: &ConvertContext,
    ) -> Result<Value, DomainError> {
        let existing = match existing {
            None | Some(Value::Null) => None,
            Some(v) => Some(C::Target::from_value(v).ok_or(
                DomainError::UnexpectedExistingValueType { required: C::Target::KIND },
            )?),
        };
        let has_existing = existing.is_some();
        let result = self
            .0
            .read_typed(reader, declared, existing.as_ref(), has_existing, ctx)?;
        Ok(result.map_or(Value::Null, ValueShape::into_value))
    }
}
