//! Convext - Converter-aware JSON serialization
//!
//! Serializes host values to JSON and back, applying value converters per
//! element or per field as a `Schema` directs.

mod engine;
mod error;
pub mod json;
mod schema;

pub use engine::Engine;
pub use error::{codes, SerializeError};
pub use schema::{FieldSpec, Schema};

use convext_converter::{ConvertContext, ConverterRegistry, TraceStep};
use convext_core::Value;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a conversion together with its trace
#[derive(Debug)]
pub struct Traced<T> {
    pub result: Result<T, SerializeError>,
    /// Converter invocations, empty unless tracing is enabled
    pub trace: Vec<TraceStep>,
}

/// Main Convext engine
pub struct Convext {
    registry: Arc<ConverterRegistry>,
    tracing: bool,
}

impl Convext {
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            tracing: false,
        }
    }

    pub fn with_standard_converters() -> Self {
        Self::new(convext_std::standard_registry())
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    fn context(&self) -> ConvertContext {
        ConvertContext::new(Arc::clone(&self.registry)).with_tracing(self.tracing)
    }

    pub fn serialize(&self, value: &Value, schema: &Schema) -> Result<JsonValue, SerializeError> {
        self.serialize_traced(value, schema).result
    }

    pub fn serialize_traced(&self, value: &Value, schema: &Schema) -> Traced<JsonValue> {
        debug!(shape = %schema.shape_name(), "serialize");
        let mut ctx = self.context();
        let result = Engine::new().write(value, schema, &mut ctx);
        Traced { result, trace: ctx.take_trace() }
    }

    pub fn deserialize(&self, json: &JsonValue, schema: &Schema) -> Result<Value, SerializeError> {
        self.deserialize_traced(json, schema, None).result
    }

    /// Decode into an existing document. Converters receive the existing
    /// value of their slot; object fields absent from `json` are kept.
    pub fn populate(
        &self,
        json: &JsonValue,
        schema: &Schema,
        existing: &Value,
    ) -> Result<Value, SerializeError> {
        self.deserialize_traced(json, schema, Some(existing)).result
    }

    pub fn deserialize_traced(
        &self,
        json: &JsonValue,
        schema: &Schema,
        existing: Option<&Value>,
    ) -> Traced<Value> {
        debug!(shape = %schema.shape_name(), has_existing = existing.is_some(), "deserialize");
        let mut ctx = self.context();
        let result = Engine::new().read(json, schema, existing, &mut ctx);
        Traced { result, trace: ctx.take_trace() }
    }

    /// Serialize to compact JSON text
    pub fn to_string(&self, value: &Value, schema: &Schema) -> Result<String, SerializeError> {
        let json = self.serialize(value, schema)?;
        Ok(serde_json::to_string(&json)?)
    }

    pub fn from_str(&self, text: &str, schema: &Schema) -> Result<Value, SerializeError> {
        let json: JsonValue = serde_json::from_str(text)?;
        self.deserialize(&json, schema)
    }
}

impl Default for Convext {
    fn default() -> Self {
        Self::with_standard_converters()
    }
}
