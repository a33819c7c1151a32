//! Converter Registry

use crate::{ConverterMeta, Typed, TypedConverter, ValueConverter};
use convext_core::DeclaredType;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Central converter registry.
///
/// Names are matched case-insensitively. Registration order is kept so
/// `find_for` resolves deterministically.
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn ValueConverter>>,
    by_name: HashMap<String, usize>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registers `c`, replacing any converter with the same name
    pub fn with_converter<C: ValueConverter + 'static>(mut self, c: C) -> Self {
        let name = c.meta().name.to_lowercase();
        debug!(converter = %name, "registering converter");
        let c: Arc<dyn ValueConverter> = Arc::new(c);
        match self.by_name.get(&name) {
            Some(&idx) => self.converters[idx] = c,
            None => {
                self.by_name.insert(name, self.converters.len());
                self.converters.push(c);
            }
        }
        self
    }

    pub fn with_typed<C: TypedConverter + 'static>(self, c: C) -> Self {
        self.with_converter(Typed(c))
    }

    pub fn get(&self, name: &str) -> Option<&dyn ValueConverter> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| self.converters[idx].as_ref())
    }

    /// First registered converter accepting `declared`
    pub fn find_for(&self, declared: &DeclaredType) -> Option<&dyn ValueConverter> {
        self.converters
            .iter()
            .find(|c| c.can_convert(declared))
            .map(|c| c.as_ref())
    }

    /// Metadata of all converters, sorted by name
    pub fn list(&self) -> Vec<ConverterMeta> {
        let mut metas: Vec<ConverterMeta> = self.converters.iter().map(|c| c.meta()).collect();
        metas.sort_by(|a, b| a.name.cmp(b.name));
        metas
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Registered names similar to `name`, best match first (for error suggestions)
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(&str, usize, String)> = self
            .converters
            .iter()
            .filter_map(|c| {
                let display = c.meta().name;
                let score = Self::similarity_score(&name_lower, &display.to_lowercase());
                (score > 0).then(|| (display, score, display.to_lowercase()))
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        matches.into_iter().take(5).map(|(n, _, _)| n.to_string()).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        // Single shared letters are noise
        if common >= 3 {
            score += common * 2;
        }

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
