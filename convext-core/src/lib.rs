//! Convext Core - Fundamental types
//!
//! This crate provides the core types used throughout Convext:
//! - `DateTime` / `DateTimeOffset`: proleptic Gregorian instants
//! - `Value`: host values handed to converters
//! - `Token`: wire tokens read and written by converters
//! - `DeclaredType`: statically declared conversion targets
//! - `DomainError`: terminal converter errors with stable codes

mod datetime;
mod error;
mod token;
mod types;
mod value;

pub use datetime::{
    days_in_month, is_leap_year, DateTime, DateTimeError, DateTimeOffset, MAX_OFFSET_SECS,
    NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MILLI, NANOS_PER_MINUTE, NANOS_PER_SECOND,
};
pub use error::{codes, DomainError};
pub use token::{Token, TokenKind};
pub use types::{DeclaredType, TypeKind, TypeParseError};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{
        DateTime, DateTimeOffset, DeclaredType, DomainError, Token, TokenKind, TypeKind, Value,
    };
}
