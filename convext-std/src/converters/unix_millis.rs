//! Unix epoch millisecond converter
//!
//! Encodes `DateTime` and `DateTimeOffset` values as the integer number of
//! milliseconds elapsed since 1970-01-01T00:00:00Z, and decodes integer or
//! numeric-string tokens back into the declared date type.

use convext_converter::prelude::*;
use tracing::{debug, trace};

/// Plain vs offset-aware date target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Plain,
    OffsetAware,
}

/// Date target resolved from a declared type before any token is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTarget {
    pub shape: TargetShape,
    pub nullable: bool,
}

impl DateTarget {
    /// Only one level of `Option` is looked through.
    /// Every kind other than `DateTimeOffset` resolves to a plain instant.
    pub fn resolve(declared: &DeclaredType) -> Self {
        let shape = match declared.kind() {
            TypeKind::DateTimeOffset => TargetShape::OffsetAware,
            _ => TargetShape::Plain,
        };
        Self {
            shape,
            nullable: declared.is_nullable(),
        }
    }

    fn build(&self, utc: DateTime) -> Value {
        match self.shape {
            TargetShape::Plain => Value::DateTime(utc),
            TargetShape::OffsetAware => Value::DateTimeOffset(DateTimeOffset::from_utc(utc)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixMillisConverter;

static MILLIS_HANDLES: [TypeKind; 2] = [TypeKind::DateTime, TypeKind::DateTimeOffset];
static MILLIS_EMITS: [&str; 1] = ["Integer"];
static MILLIS_EXAMPLES: [&str; 3] = [
    "2018-01-01T21:01:16.149Z -> 1514840476149",
    "2018-01-01T16:01:16.155-05:00 -> 1514840476155",
    "\"1514840476147\" -> 2018-01-01T21:01:16.147Z",
];

/// Integer-only parse: optional sign, ASCII digits, surrounding whitespace
/// (vertical tab included)
fn parse_millis(s: &str) -> Option<i64> {
    s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B').parse().ok()
}

impl UnixMillisConverter {
    /// Milliseconds since the epoch for a date value, sub-millisecond
    /// precision truncated toward zero
    pub fn encode(value: &Value) -> Result<i64, DomainError> {
        let millis = match value {
            Value::DateTime(dt) => dt.unix_millis(),
            Value::DateTimeOffset(dto) => dto.unix_millis(),
            _ => return Err(DomainError::UnexpectedValueType { required: None }),
        };
        if millis < 0 {
            return Err(DomainError::PreEpochValue { target: None });
        }
        Ok(millis)
    }

    /// Date value for a millisecond count, shaped by `declared`
    pub fn decode(millis: i64, declared: &DeclaredType) -> Result<Value, DomainError> {
        if millis < 0 {
            return Err(DomainError::PreEpochValue { target: Some(*declared) });
        }
        let utc = DateTime::from_unix_millis(millis)
            .map_err(|_| DomainError::OutOfRange { target: *declared })?;
        Ok(DateTarget::resolve(declared).build(utc))
    }
}

impl ValueConverter for UnixMillisConverter {
    fn meta(&self) -> ConverterMeta {
        ConverterMeta {
            name: "UnixMillis",
            description: "Date/time as integer milliseconds since 1970-01-01T00:00:00Z",
            handles: &MILLIS_HANDLES,
            emits: &MILLIS_EMITS,
            examples: &MILLIS_EXAMPLES,
        }
    }

    fn write(
        &self,
        writer: &mut dyn TokenWriter,
        value: &Value,
        _ctx: &ConvertContext,
    ) -> Result<(), DomainError> {
        if value.is_null() {
            writer.write_null();
            return Ok(());
        }
        let millis = Self::encode(value)?;
        trace!(millis, "unix millis write");
        writer.write_integer(millis);
        Ok(())
    }

    fn read(
        &self,
        reader: &dyn TokenReader,
        declared: &DeclaredType,
        _existing: Option<&Value>,
        ctx: &ConvertContext,
    ) -> Result<Value, DomainError> {
        let target = DateTarget::resolve(declared);

        let millis = match reader.token() {
            Some(Token::Null) => {
                if !target.nullable {
                    return Err(DomainError::NullNotAllowed { target: *declared });
                }
                return Ok(Value::Null);
            }
            Some(Token::Integer(i)) => *i,
            Some(Token::String(s)) => parse_millis(s).ok_or_else(|| {
                debug!(path = %ctx.path_string(), value = %s, "unparseable millisecond string");
                DomainError::InvalidStringValue { target: *declared }
            })?,
            _ => {
                return Err(DomainError::UnexpectedToken {
                    found: reader.token_kind(),
                })
            }
        };

        Self::decode(millis, declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn ctx() -> ConvertContext {
        ConvertContext::new(Arc::new(ConverterRegistry::new()))
    }

    fn write(value: Value) -> Result<Vec<Token>, DomainError> {
        let mut buf = TokenBuffer::new();
        UnixMillisConverter.write(&mut buf, &value, &ctx())?;
        Ok(buf.into_tokens())
    }

    fn read(token: Token, declared: DeclaredType) -> Result<Value, DomainError> {
        UnixMillisConverter.read(&TokenCursor::single(token), &declared, None, &ctx())
    }

    fn plain() -> DeclaredType {
        DeclaredType::of(TypeKind::DateTime)
    }

    fn offset() -> DeclaredType {
        DeclaredType::of(TypeKind::DateTimeOffset)
    }

    fn dt(millis: i64) -> DateTime {
        DateTime::from_unix_millis(millis).unwrap()
    }

    // ========== Target resolution ==========

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            DateTarget::resolve(&plain()),
            DateTarget { shape: TargetShape::Plain, nullable: false }
        );
        assert_eq!(
            DateTarget::resolve(&DeclaredType::optional(TypeKind::DateTimeOffset)),
            DateTarget { shape: TargetShape::OffsetAware, nullable: true }
        );
        assert_eq!(
            DateTarget::resolve(&DeclaredType::of(TypeKind::Any)),
            DateTarget { shape: TargetShape::Plain, nullable: true }
        );
    }

    #[test]
    fn test_can_convert() {
        assert!(UnixMillisConverter.can_convert(&plain()));
        assert!(UnixMillisConverter.can_convert(&DeclaredType::optional(TypeKind::DateTimeOffset)));
        assert!(!UnixMillisConverter.can_convert(&DeclaredType::of(TypeKind::String)));
    }

    // ========== Write ==========

    #[test]
    fn test_write_epoch() {
        assert_eq!(write(Value::from(DateTime::UNIX_EPOCH)).unwrap(), vec![Token::Integer(0)]);
    }

    #[test]
    fn test_write_datetime() {
        let value = DateTime::from_ymd_hms_milli(2018, 1, 1, 21, 1, 16, 149).unwrap();
        assert_eq!(write(Value::from(value)).unwrap(), vec![Token::Integer(1514840476149)]);
    }

    #[test]
    fn test_write_offset_normalizes_to_utc() {
        let value = DateTimeOffset::from_ymd_hms_milli(2018, 1, 1, 16, 1, 16, 155, -5 * 3600).unwrap();
        assert_eq!(write(Value::from(value)).unwrap(), vec![Token::Integer(1514840476155)]);
    }

    #[test]
    fn test_write_truncates_sub_millisecond() {
        let value = DateTime::from_nanos(1_999_999).unwrap();
        assert_eq!(write(Value::from(value)).unwrap(), vec![Token::Integer(1)]);

        // Half a millisecond before the epoch still encodes as zero
        let value = DateTime::from_nanos(-500_000).unwrap();
        assert_eq!(write(Value::from(value)).unwrap(), vec![Token::Integer(0)]);
    }

    #[test]
    fn test_write_pre_epoch() {
        let value = DateTime::from_ymd_hms_milli(1969, 12, 31, 23, 59, 59, 999).unwrap();
        let err = write(Value::from(value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert date value that is before Unix epoch of 00:00:00 UTC on 1 January 1970."
        );
        assert_eq!(err.code(), codes::PRE_EPOCH_VALUE);
    }

    #[test]
    fn test_write_pre_epoch_emits_nothing() {
        let mut buf = TokenBuffer::new();
        let value = Value::from(DateTime::from_ymd(1900, 1, 1).unwrap());
        assert!(UnixMillisConverter.write(&mut buf, &value, &ctx()).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_write_non_date() {
        for value in [Value::from("2018-01-01"), Value::Integer(1), Value::Bool(false)] {
            let err = write(value).unwrap_err();
            assert_eq!(err.to_string(), "Expected date object value.");
        }
    }

    #[test]
    fn test_write_null() {
        assert_eq!(write(Value::Null).unwrap(), vec![Token::Null]);
    }

    #[test]
    fn test_write_max() {
        assert_eq!(
            write(Value::from(DateTime::MAX)).unwrap(),
            vec![Token::Integer(253_402_300_799_999)]
        );
    }

    // ========== Read ==========

    #[test]
    fn test_read_integer() {
        assert_eq!(read(Token::Integer(3789), plain()).unwrap(), Value::from(dt(3789)));
        assert_eq!(read(Token::Integer(0), plain()).unwrap(), Value::from(DateTime::UNIX_EPOCH));
    }

    #[test]
    fn test_read_string() {
        let v = read(Token::String("1514840476147".into()), offset()).unwrap();
        let expected = DateTimeOffset::from_ymd_hms_milli(2018, 1, 1, 21, 1, 16, 147, 0).unwrap();
        assert_eq!(v, Value::from(expected));
        assert_eq!(v.as_datetime_offset().map(|d| d.offset_secs()), Some(0));
    }

    #[test]
    fn test_read_string_integer_semantics() {
        assert_eq!(read(Token::String(" 42 ".into()), plain()).unwrap(), Value::from(dt(42)));
        assert_eq!(read(Token::String("+42".into()), plain()).unwrap(), Value::from(dt(42)));
        assert_eq!(read(Token::String("\x0B42\t\r\n".into()), plain()).unwrap(), Value::from(dt(42)));
        assert_eq!(read(Token::String("\x0C42\x0B".into()), plain()).unwrap(), Value::from(dt(42)));
        for bad in ["", "abc", "1.5", "1e3", "0x10", "99999999999999999999"] {
            let err = read(Token::String(bad.into()), plain()).unwrap_err();
            assert_eq!(err, DomainError::InvalidStringValue { target: plain() }, "input {bad:?}");
        }
    }

    #[test]
    fn test_read_invalid_string_message() {
        let err = read(Token::String("nope".into()), DeclaredType::optional(TypeKind::DateTime)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert invalid value to Option<DateTime>.");
    }

    #[test]
    fn test_read_offset_shape_has_zero_offset() {
        let v = read(Token::Integer(1514840476155), offset()).unwrap();
        let dto = v.as_datetime_offset().copied().unwrap();
        assert_eq!(dto.offset_secs(), 0);
        assert_eq!(dto.unix_millis(), 1514840476155);
    }

    #[test]
    fn test_read_null() {
        let err = read(Token::Null, plain()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert null value to DateTime.");
        assert_eq!(err.code(), codes::NULL_NOT_ALLOWED);

        let err = read(Token::Null, offset()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert null value to DateTimeOffset.");

        assert_eq!(read(Token::Null, DeclaredType::optional(TypeKind::DateTime)).unwrap(), Value::Null);
        assert_eq!(read(Token::Null, DeclaredType::optional(TypeKind::DateTimeOffset)).unwrap(), Value::Null);
    }

    #[test]
    fn test_read_unexpected_token() {
        let err = read(Token::Boolean(false), plain()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token parsing date. Expected Integer or String, got Boolean."
        );
        let err = read(Token::Float(1.5), plain()).unwrap_err();
        assert_eq!(err, DomainError::UnexpectedToken { found: TokenKind::Float });
        let err = read(Token::StartObject, plain()).unwrap_err();
        assert_eq!(err, DomainError::UnexpectedToken { found: TokenKind::StartObject });

        for declared in [
            offset(),
            DeclaredType::optional(TypeKind::DateTime),
            DeclaredType::optional(TypeKind::DateTimeOffset),
        ] {
            let err = read(Token::Boolean(true), declared).unwrap_err();
            assert_eq!(err, DomainError::UnexpectedToken { found: TokenKind::Boolean }, "target {declared}");
        }
    }

    #[test]
    fn test_read_without_token() {
        let err = UnixMillisConverter
            .read(&TokenCursor::default(), &plain(), None, &ctx())
            .unwrap_err();
        assert_eq!(err, DomainError::UnexpectedToken { found: TokenKind::None });
    }

    #[test]
    fn test_read_pre_epoch() {
        let err = read(Token::Integer(-1), plain()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert value that is before Unix epoch of 00:00:00 UTC on 1 January 1970 to DateTime."
        );
        let err = read(Token::String("-1".into()), DeclaredType::optional(TypeKind::DateTimeOffset)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert value that is before Unix epoch of 00:00:00 UTC on 1 January 1970 to Option<DateTimeOffset>."
        );
    }

    #[test]
    fn test_read_out_of_range() {
        assert!(read(Token::Integer(253_402_300_799_999), plain()).is_ok());
        let err = read(Token::Integer(253_402_300_800_000), plain()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert value that is after 23:59:59.999 UTC on 31 December 9999 to DateTime."
        );
        assert_eq!(err.code(), codes::OUT_OF_RANGE);
        let err = read(Token::Integer(i64::MAX), offset()).unwrap_err();
        assert_eq!(err, DomainError::OutOfRange { target: offset() });
    }

    #[test]
    fn test_read_ignores_existing() {
        let existing = Value::from(DateTime::MAX);
        let v = UnixMillisConverter
            .read(&TokenCursor::single(Token::Integer(5)), &plain(), Some(&existing), &ctx())
            .unwrap();
        assert_eq!(v, Value::from(dt(5)));
    }

    proptest! {
        #[test]
        fn prop_plain_round_trip(millis in 0i64..=253_402_300_799_999) {
            let tokens = write(Value::from(dt(millis))).unwrap();
            prop_assert_eq!(&tokens, &vec![Token::Integer(millis)]);
            let back = read(tokens[0].clone(), plain()).unwrap();
            prop_assert_eq!(back, Value::from(dt(millis)));
        }

        #[test]
        fn prop_offset_round_trip_keeps_instant(
            millis in 0i64..=253_402_300_799_999,
            offset_minutes in -600i32..=600,
        ) {
            let utc = dt(millis);
            // Offsets that push the local time out of range are skipped
            let local = match utc.add_millis(offset_minutes as i64 * 60_000) {
                Ok(local) => local,
                Err(_) => return Ok(()),
            };
            let dto = DateTimeOffset::new(local, offset_minutes * 60).unwrap();
            let tokens = write(Value::from(dto)).unwrap();
            prop_assert_eq!(&tokens, &vec![Token::Integer(millis)]);
            let back = read(tokens[0].clone(), offset()).unwrap();
            let back = back.as_datetime_offset().copied().unwrap();
            prop_assert!(back.same_instant(&dto));
            prop_assert_eq!(back.offset_secs(), 0);
        }

        #[test]
        fn prop_negative_always_rejected(millis in i64::MIN..0) {
            let err = read(Token::Integer(millis), plain()).unwrap_err();
            prop_assert_eq!(err.code(), codes::PRE_EPOCH_VALUE);
            let err = read(Token::String(millis.to_string()), offset()).unwrap_err();
            prop_assert_eq!(err.code(), codes::PRE_EPOCH_VALUE);
        }
    }
}
