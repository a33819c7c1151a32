//! Standard value converters

mod string_trim;
mod unix_millis;

pub use string_trim::StringTrimConverter;
pub use unix_millis::{DateTarget, TargetShape, UnixMillisConverter};
