//! Declared target types
//!
//! The host describes what it expects a converter to produce with a
//! `DeclaredType`: a kind plus at most one level of `Option` wrapping.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Shape of a declared value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    DateTime,
    DateTimeOffset,
    String,
    Integer,
    Float,
    Bool,
    List,
    Object,
    /// Untyped slot; accepts whatever the converter produces
    Any,
}

impl TypeKind {
    pub const ALL: [TypeKind; 9] = [
        TypeKind::DateTime,
        TypeKind::DateTimeOffset,
        TypeKind::String,
        TypeKind::Integer,
        TypeKind::Float,
        TypeKind::Bool,
        TypeKind::List,
        TypeKind::Object,
        TypeKind::Any,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::DateTime => "DateTime",
            TypeKind::DateTimeOffset => "DateTimeOffset",
            TypeKind::String => "String",
            TypeKind::Integer => "Integer",
            TypeKind::Float => "Float",
            TypeKind::Bool => "Bool",
            TypeKind::List => "List",
            TypeKind::Object => "Object",
            TypeKind::Any => "Any",
        }
    }

    /// Value kinds cannot hold null unless wrapped in `Option`.
    /// Strings, containers and `Any` always can.
    pub fn is_value_kind(&self) -> bool {
        matches!(
            self,
            TypeKind::DateTime
                | TypeKind::DateTimeOffset
                | TypeKind::Integer
                | TypeKind::Float
                | TypeKind::Bool
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statically declared target type of a field or element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeclaredType {
    kind: TypeKind,
    optional: bool,
}

impl DeclaredType {
    /// `T`
    pub const fn of(kind: TypeKind) -> Self {
        Self { kind, optional: false }
    }

    /// `Option<T>`
    pub const fn optional(kind: TypeKind) -> Self {
        Self { kind, optional: true }
    }

    /// Underlying kind with any `Option` wrapper looked through
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.optional || !self.kind.is_value_kind()
    }
}

impl From<TypeKind> for DeclaredType {
    fn from(kind: TypeKind) -> Self {
        Self::of(kind)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Option<{}>", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown type '{0}'. Expected one of: DateTime, DateTimeOffset, String, Integer, Float, Bool, List, Object, Any (optionally as T? or Option<T>)")]
pub struct TypeParseError(pub String);

impl FromStr for DeclaredType {
    type Err = TypeParseError;

    /// Accepts `T`, `T?` and `Option<T>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (inner, optional) = if let Some(inner) = trimmed.strip_suffix('?') {
            (inner, true)
        } else if let Some(inner) = trimmed
            .strip_prefix("Option<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            (inner, true)
        } else {
            (trimmed, false)
        };

        let kind = TypeKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(inner.trim()))
            .ok_or_else(|| TypeParseError(s.to_string()))?;

        Ok(Self { kind, optional })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability() {
        assert!(!DeclaredType::of(TypeKind::DateTime).is_nullable());
        assert!(DeclaredType::optional(TypeKind::DateTime).is_nullable());
        assert!(DeclaredType::of(TypeKind::String).is_nullable());
        assert!(DeclaredType::of(TypeKind::Any).is_nullable());
    }

    #[test]
    fn test_display() {
        assert_eq!(DeclaredType::of(TypeKind::DateTimeOffset).to_string(), "DateTimeOffset");
        assert_eq!(DeclaredType::optional(TypeKind::DateTime).to_string(), "Option<DateTime>");
    }

    #[test]
    fn test_parse() {
        assert_eq!("DateTime".parse::<DeclaredType>(), Ok(DeclaredType::of(TypeKind::DateTime)));
        assert_eq!("datetimeoffset?".parse::<DeclaredType>(), Ok(DeclaredType::optional(TypeKind::DateTimeOffset)));
        assert_eq!("Option<String>".parse::<DeclaredType>(), Ok(DeclaredType::optional(TypeKind::String)));
        assert!("Option<Option<DateTime>>".parse::<DeclaredType>().is_err());
        assert!("Instant".parse::<DeclaredType>().is_err());
    }
}
