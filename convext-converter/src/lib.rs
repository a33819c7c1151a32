//! Convext Converter Contract
//!
//! Provides the seams between the host serializer and value converters:
//! - Token I/O (`TokenReader`, `TokenWriter`, `TokenCursor`, `TokenBuffer`)
//! - Converter traits (`ValueConverter`, `TypedConverter` via `Typed`)
//! - A name-indexed `ConverterRegistry`
//! - The per-call `ConvertContext`

mod context;
mod io;
mod registry;
mod traits;

pub use context::{ConvertContext, Direction, TraceStep};
pub use io::{TokenBuffer, TokenCursor, TokenReader, TokenWriter};
pub use registry::ConverterRegistry;
pub use traits::{ConverterMeta, Typed, TypedConverter, ValueConverter, ValueShape};

/// Re-export core types for converter authors
pub mod prelude {
    pub use crate::{
        ConvertContext, ConverterMeta, ConverterRegistry, TokenBuffer, TokenCursor, TokenReader,
        TokenWriter, TraceStep, Typed, TypedConverter, ValueConverter, ValueShape,
    };
    pub use convext_core::prelude::*;
}
