//! Host values handed to and produced by converters
//!
//! Values can be null, booleans, integers, floats, strings, plain or
//! offset-aware date/times, lists or objects. Object fields are kept in key
//! order so serialized output is stable.

use crate::{DateTime, DateTimeOffset, TypeKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime),
    DateTimeOffset(DateTimeOffset),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_datetime_offset(&self) -> Option<&DateTimeOffset> {
        match self {
            Value::DateTimeOffset(dto) => Some(dto),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Object field, or `None` if missing or not an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Kind of the value; `None` for null
    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeKind::Bool),
            Value::Integer(_) => Some(TypeKind::Integer),
            Value::Float(_) => Some(TypeKind::Float),
            Value::String(_) => Some(TypeKind::String),
            Value::DateTime(_) => Some(TypeKind::DateTime),
            Value::DateTimeOffset(_) => Some(TypeKind::DateTimeOffset),
            Value::List(_) => Some(TypeKind::List),
            Value::Object(_) => Some(TypeKind::Object),
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        self.kind().map_or("Null", |k| k.name())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::DateTimeOffset(dto) => write!(f, "{}", dto),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTimeOffset> for Value {
    fn from(dto: DateTimeOffset) -> Self {
        Value::DateTimeOffset(dto)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
