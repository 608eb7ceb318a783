//! Conversion errors.
//!
//! Every error here is fatal to the current conversion call: no partial IR
//! is ever handed back. Callers converting a batch of independent recipes
//! isolate per-recipe failures themselves.

use std::fmt;

/// Error raised while parsing, merging, or compiling a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A particle declaration uses the legacy combined `bindings` field
    /// instead of separate `inputs`/`outputs` lists.
    Configuration(String),

    /// A binding value is neither a string nor a mapping of strings.
    MalformedBinding(String),

    /// Slot expansion requested under the legacy `bindings` shape.
    UnsupportedFeature(String),

    /// JSON syntax or structural shape failure in a recipe or IR fragment.
    Parse(String),

    /// Two fragments disagree on the shape or value of a merged field.
    MergeConflict(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Self::MalformedBinding(msg) => write!(f, "malformed binding: {}", msg),
            Self::UnsupportedFeature(msg) => write!(f, "unsupported feature: {}", msg),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::MergeConflict(msg) => write!(f, "merge conflict: {}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = ConvertError::Configuration("use inputs/outputs".to_string());
        assert_eq!(e.to_string(), "configuration error: use inputs/outputs");
        let e = ConvertError::MalformedBinding("42".to_string());
        assert_eq!(e.to_string(), "malformed binding: 42");
    }
}
