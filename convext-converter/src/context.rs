//! Conversion Context

use crate::ConverterRegistry;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Context passed to converters.
///
/// The host owns it mutably and hands converters a shared borrow; only the
/// host moves the path or records trace steps.
pub struct ConvertContext {
    pub registry: Arc<ConverterRegistry>,
    pub path: Vec<String>,
    pub tracing: bool,
    pub trace: Vec<TraceStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Write,
    Read,
}

/// Single converter invocation in a conversion trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub path: String,
    pub converter: String,
    pub direction: Direction,
    /// Emitted or produced value on success, error message on failure
    pub outcome: String,
    pub ok: bool,
}

impl ConvertContext {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            path: Vec::new(),
            tracing: false,
            trace: Vec::new(),
        }
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn push_path(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    /// Dotted path of the current slot, with list indices in brackets
    /// (`Items[1]`, `Owner.Name`). Empty at the document root.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if segment.starts_with('[') || out.is_empty() {
                out.push_str(segment);
            } else {
                out.push('.');
                out.push_str(segment);
            }
        }
        out
    }

    pub fn record_trace(
        &mut self,
        converter: &str,
        direction: Direction,
        outcome: impl fmt::Display,
        ok: bool,
    ) {
        if self.tracing {
            let path = self.path_string();
            self.trace.push(TraceStep {
                path,
                converter: converter.to_string(),
                direction,
                outcome: outcome.to_string(),
                ok,
            });
        }
    }

    pub fn take_trace(&mut self) -> Vec<TraceStep> {
        std::mem::take(&mut self.trace)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Write => write!(f, "write"),
            Direction::Read => write!(f, "read"),
        }
    }
}
