//! Wire tokens exchanged between converters and the host serializer

use serde::Serialize;
use std::fmt;

/// Kind of a wire token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Reader not positioned on any token
    None,
    StartObject,
    PropertyName,
    EndObject,
    StartArray,
    EndArray,
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::None => "None",
            TokenKind::StartObject => "StartObject",
            TokenKind::PropertyName => "PropertyName",
            TokenKind::EndObject => "EndObject",
            TokenKind::StartArray => "StartArray",
            TokenKind::EndArray => "EndArray",
            TokenKind::Integer => "Integer",
            TokenKind::Float => "Float",
            TokenKind::String => "String",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single wire token with its raw value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    StartObject,
    PropertyName(String),
    EndObject,
    StartArray,
    EndArray,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::PropertyName(_) => TokenKind::PropertyName,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::String(_) => TokenKind::String,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Token::Integer(i) => Some(*i),
            _ => None,
        }
    }
}
