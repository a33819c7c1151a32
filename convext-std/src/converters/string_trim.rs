//! Trimming string converter

use convext_converter::prelude::*;
use tracing::trace;

/// Trims strings on write. On read, trims the incoming string and appends
/// the trimmed existing value when the host supplied one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTrimConverter;

static TRIM_HANDLES: [TypeKind; 1] = [TypeKind::String];
static TRIM_EMITS: [&str; 2] = ["String", "Null"];
static TRIM_EXAMPLES: [&str; 2] = [
    "\" String! \" -> \"String!\"",
    "read \" String! \" over \" Existing! \" -> \"String!Existing!\"",
];

impl TypedConverter for StringTrimConverter {
    type Target = String;

    fn meta(&self) -> ConverterMeta {
        ConverterMeta {
            name: "StringTrim",
            description: "Trim surrounding whitespace; reads append the trimmed existing value",
            handles: &TRIM_HANDLES,
            emits: &TRIM_EMITS,
            examples: &TRIM_EXAMPLES,
        }
    }

    fn write_typed(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&String>,
        _ctx: &ConvertContext,
    ) -> Result<(), DomainError> {
        match value {
            Some(s) => writer.write_string(s.trim()),
            None => writer.write_null(),
        }
        Ok(())
    }

    fn read_typed(
        &self,
        reader: &dyn TokenReader,
        _declared: &DeclaredType,
        existing: Option<&String>,
        has_existing: bool,
        _ctx: &ConvertContext,
    ) -> Result<Option<String>, DomainError> {
        // Non-string tokens read as empty
        let mut result = reader.token().and_then(Token::as_str).unwrap_or("").trim().to_string();
        if has_existing {
            result.push_str(existing.map_or("", |s| s.trim()));
        }
        trace!(has_existing, len = result.len(), "string trim read");
        Ok(Some(result))
    }
}
