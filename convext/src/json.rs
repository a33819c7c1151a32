//! Bridging between JSON, wire tokens and host values

use convext_core::{Token, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Token a JSON value presents to a converter positioned on it.
/// Containers present their opening token.
pub fn token_from_json(json: &JsonValue) -> Token {
    match json {
        JsonValue::Null => Token::Null,
        JsonValue::Bool(b) => Token::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Token::Integer(i),
            None => Token::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Token::String(s.clone()),
        JsonValue::Array(_) => Token::StartArray,
        JsonValue::Object(_) => Token::StartObject,
    }
}

/// JSON for a single value token; `None` for structural tokens
pub fn token_to_json(token: Token) -> Option<JsonValue> {
    match token {
        Token::Null => Some(JsonValue::Null),
        Token::Boolean(b) => Some(JsonValue::Bool(b)),
        Token::Integer(i) => Some(JsonValue::from(i)),
        Token::Float(x) => Some(float_to_json(x)),
        Token::String(s) => Some(JsonValue::String(s)),
        Token::StartObject
        | Token::PropertyName(_)
        | Token::EndObject
        | Token::StartArray
        | Token::EndArray => None,
    }
}

fn float_to_json(x: f64) -> JsonValue {
    Number::from_f64(x).map_or(JsonValue::Null, JsonValue::Number)
}

/// Natural JSON form of a value: date/times as ISO-8601 strings
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(x) => float_to_json(*x),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::DateTime(dt) => JsonValue::String(dt.to_iso_string()),
        Value::DateTimeOffset(dto) => JsonValue::String(dto.to_iso_string()),
        Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Object(map) => {
            let obj: Map<String, JsonValue> =
                map.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect();
            JsonValue::Object(obj)
        }
    }
}

/// Natural value for JSON. Strings stay strings; dates are only recognized
/// where a schema declares them.
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        JsonValue::Object(map) => Value::Object(
            map.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect(),
        ),
    }
}

/// JSON kind name for mismatch errors
pub fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "Null",
        JsonValue::Bool(_) => "Bool",
        JsonValue::Number(n) if n.is_i64() => "Integer",
        JsonValue::Number(_) => "Float",
        JsonValue::String(_) => "String",
        JsonValue::Array(_) => "List",
        JsonValue::Object(_) => "Object",
    }
}
