//! Schema-driven document walker
//!
//! Walks a document alongside its schema and hands each leaf slot to the
//! converter that owns it. Slots without a converter map naturally.

use crate::json::{json_kind, json_to_value, token_from_json, token_to_json, value_to_json};
use crate::{FieldSpec, Schema, SerializeError};
use convext_converter::{
    ConvertContext, ConverterRegistry, Direction, TokenBuffer, TokenCursor, ValueConverter,
};
use convext_core::{DateTime, DateTimeError, DateTimeOffset, TypeKind, Value};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Document walker
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Encode `value` to JSON
    pub fn write(
        &self,
        value: &Value,
        schema: &Schema,
        ctx: &mut ConvertContext,
    ) -> Result<JsonValue, SerializeError> {
        self.write_slot(value, schema, None, ctx)
    }

    /// Decode `json`, handing `existing` slot values to converters
    pub fn read(
        &self,
        json: &JsonValue,
        schema: &Schema,
        existing: Option<&Value>,
        ctx: &mut ConvertContext,
    ) -> Result<Value, SerializeError> {
        self.read_slot(json, schema, None, existing, ctx)
    }

    fn write_slot(
        &self,
        value: &Value,
        schema: &Schema,
        inherited: Option<&str>,
        ctx: &mut ConvertContext,
    ) -> Result<JsonValue, SerializeError> {
        // Nulls never reach a converter on write
        if value.is_null() {
            return Ok(JsonValue::Null);
        }

        match schema {
            Schema::Leaf(spec) => self.write_leaf(value, spec, inherited, ctx),
            Schema::List { item } => {
                let items = value.as_list().ok_or_else(|| mismatch(ctx, schema, value.type_name()))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, v) in items.iter().enumerate() {
                    ctx.push_path(format!("[{}]", i));
                    let written = self.write_slot(v, item, None, ctx);
                    ctx.pop_path();
                    out.push(written?);
                }
                Ok(JsonValue::Array(out))
            }
            Schema::Map { item } => {
                let entries = value.as_object().ok_or_else(|| mismatch(ctx, schema, value.type_name()))?;
                let mut out = Map::new();
                for (key, v) in entries {
                    ctx.push_path(key.as_str());
                    let written = self.write_slot(v, item, None, ctx);
                    ctx.pop_path();
                    out.insert(key.clone(), written?);
                }
                Ok(JsonValue::Object(out))
            }
            Schema::Object { item_converter, fields } => {
                let entries = value.as_object().ok_or_else(|| mismatch(ctx, schema, value.type_name()))?;
                let mut out = Map::new();
                for (name, field) in fields {
                    let v = entries.get(name).unwrap_or(&Value::Null);
                    ctx.push_path(name.as_str());
                    let written = self.write_slot(v, field, item_converter.as_deref(), ctx);
                    ctx.pop_path();
                    out.insert(name.clone(), written?);
                }
                for key in entries.keys().filter(|k| !fields.iter().any(|(n, _)| n == *k)) {
                    debug!(field = %key, "skipping field missing from schema");
                }
                Ok(JsonValue::Object(out))
            }
        }
    }

    fn write_leaf(
        &self,
        value: &Value,
        spec: &FieldSpec,
        inherited: Option<&str>,
        ctx: &mut ConvertContext,
    ) -> Result<JsonValue, SerializeError> {
        let name = match spec.converter.as_deref().or(inherited) {
            Some(name) => name,
            None => return Ok(value_to_json(value)),
        };

        let registry = Arc::clone(&ctx.registry);
        let converter = lookup(&registry, name)?;
        let converter_name = converter.meta().name;

        let mut buf = TokenBuffer::new();
        if let Err(source) = converter.write(&mut buf, value, ctx) {
            ctx.record_trace(converter_name, Direction::Write, &source, false);
            return Err(SerializeError::Convert { path: ctx.path_string(), source });
        }

        let json = buf.into_single().and_then(token_to_json).ok_or_else(|| {
            SerializeError::MissingToken {
                path: ctx.path_string(),
                converter: converter_name.to_string(),
            }
        })?;
        trace!(path = %ctx.path_string(), converter = converter_name, output = %json, "converted");
        ctx.record_trace(converter_name, Direction::Write, &json, true);
        Ok(json)
    }

    fn read_slot(
        &self,
        json: &JsonValue,
        schema: &Schema,
        inherited: Option<&str>,
        existing: Option<&Value>,
        ctx: &mut ConvertContext,
    ) -> Result<Value, SerializeError> {
        match schema {
            Schema::Leaf(spec) => self.read_leaf(json, spec, inherited, existing, ctx),
            _ if json.is_null() => Ok(Value::Null),
            Schema::List { item } => {
                let items = json.as_array().ok_or_else(|| mismatch(ctx, schema, json_kind(json)))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, j) in items.iter().enumerate() {
                    ctx.push_path(format!("[{}]", i));
                    let read = self.read_slot(j, item, None, None, ctx);
                    ctx.pop_path();
                    out.push(read?);
                }
                Ok(Value::List(out))
            }
            Schema::Map { item } => {
                let entries = json.as_object().ok_or_else(|| mismatch(ctx, schema, json_kind(json)))?;
                let prior = existing.and_then(Value::as_object);
                let mut out = BTreeMap::new();
                for (key, j) in entries {
                    ctx.push_path(key.as_str());
                    let read = self.read_slot(j, item, None, prior.and_then(|p| p.get(key)), ctx);
                    ctx.pop_path();
                    out.insert(key.clone(), read?);
                }
                Ok(Value::Object(out))
            }
            Schema::Object { item_converter, fields } => {
                let entries = json.as_object().ok_or_else(|| mismatch(ctx, schema, json_kind(json)))?;
                // Fields absent from the input keep their existing value
                let mut out = existing.and_then(Value::as_object).cloned().unwrap_or_default();
                for (name, field) in fields {
                    let Some(j) = entries.get(name) else {
                        continue;
                    };
                    ctx.push_path(name.as_str());
                    let read = self.read_slot(j, field, item_converter.as_deref(), out.get(name), ctx);
                    ctx.pop_path();
                    out.insert(name.clone(), read?);
                }
                Ok(Value::Object(out))
            }
        }
    }

    fn read_leaf(
        &self,
        json: &JsonValue,
        spec: &FieldSpec,
        inherited: Option<&str>,
        existing: Option<&Value>,
        ctx: &mut ConvertContext,
    ) -> Result<Value, SerializeError> {
        let name = match spec.converter.as_deref().or(inherited) {
            Some(name) => name,
            None => return read_natural(json, spec, ctx),
        };

        let registry = Arc::clone(&ctx.registry);
        let converter = lookup(&registry, name)?;
        let converter_name = converter.meta().name;

        // Converters see nulls too, so they can enforce nullability
        let cursor = TokenCursor::single(token_from_json(json));
        match converter.read(&cursor, &spec.declared, existing, ctx) {
            Ok(value) => {
                trace!(path = %ctx.path_string(), converter = converter_name, output = %value, "converted");
                ctx.record_trace(converter_name, Direction::Read, &value, true);
                Ok(value)
            }
            Err(source) => {
                ctx.record_trace(converter_name, Direction::Read, &source, false);
                Err(SerializeError::Convert { path: ctx.path_string(), source })
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'r>(
    registry: &'r ConverterRegistry,
    name: &str,
) -> Result<&'r dyn ValueConverter, SerializeError> {
    registry.get(name).ok_or_else(|| SerializeError::UnknownConverter {
        name: name.to_string(),
        suggestions: registry.suggest(name),
    })
}

fn mismatch(ctx: &ConvertContext, schema: &Schema, found: &str) -> SerializeError {
    SerializeError::ShapeMismatch {
        path: ctx.path_string(),
        expected: schema.shape_name(),
        found: found.to_string(),
    }
}

/// Leaf read without a converter, driven by the declared kind
fn read_natural(json: &JsonValue, spec: &FieldSpec, ctx: &ConvertContext) -> Result<Value, SerializeError> {
    let declared = spec.declared;
    let wrong = || SerializeError::ShapeMismatch {
        path: ctx.path_string(),
        expected: declared.to_string(),
        found: json_kind(json).to_string(),
    };

    if json.is_null() {
        return if declared.is_nullable() { Ok(Value::Null) } else { Err(wrong()) };
    }

    let invalid_date = |source: DateTimeError| SerializeError::InvalidDate { path: ctx.path_string(), source };
    match declared.kind() {
        TypeKind::DateTime => {
            let s = json.as_str().ok_or_else(wrong)?;
            DateTime::parse(s).map(Value::DateTime).map_err(invalid_date)
        }
        TypeKind::DateTimeOffset => {
            let s = json.as_str().ok_or_else(wrong)?;
            DateTimeOffset::parse(s).map(Value::DateTimeOffset).map_err(invalid_date)
        }
        TypeKind::String => json.as_str().map(Value::from).ok_or_else(wrong),
        TypeKind::Integer => json.as_i64().map(Value::Integer).ok_or_else(wrong),
        TypeKind::Float => json.as_f64().map(Value::Float).ok_or_else(wrong),
        TypeKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(wrong),
        TypeKind::List if !json.is_array() => Err(wrong()),
        TypeKind::Object if !json.is_object() => Err(wrong()),
        TypeKind::List | TypeKind::Object | TypeKind::Any => Ok(json_to_value(json)),
    }
}
