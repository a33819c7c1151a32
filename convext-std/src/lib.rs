//! Convext Standard Converters

pub mod converters;

use convext_converter::ConverterRegistry;

/// Load standard converters into registry
pub fn load_standard_converters(registry: ConverterRegistry) -> ConverterRegistry {
    registry
        .with_converter(converters::UnixMillisConverter)
        .with_typed(converters::StringTrimConverter)
}

/// Create registry with standard converters
pub fn standard_registry() -> ConverterRegistry {
    load_standard_converters(ConverterRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use convext_core::{DeclaredType, TypeKind};

    #[test]
    fn test_standard_registry() {
        let reg = standard_registry();
        assert_eq!(reg.len(), 2);
        assert!(reg.get("unixmillis").is_some());
        assert!(reg.get("StringTrim").is_some());
        assert_eq!(
            reg.find_for(&DeclaredType::optional(TypeKind::DateTime)).map(|c| c.meta().name),
            Some("UnixMillis")
        );
        assert_eq!(
            reg.find_for(&DeclaredType::of(TypeKind::String)).map(|c| c.meta().name),
            Some("StringTrim")
        );
    }
}
