use serde::Serialize;
use thiserror::Error;

use crate::pattern::tokens::Position;

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Failure while building an output representation.
///
/// Malformed input never produces this error, it is recovered into a [`Diagnostic`] instead.
/// Seeing one of these means the output writer itself failed.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("writing formatted output failed")]
    Fmt(#[from] std::fmt::Error),

    #[error("`serde_json` failed with error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when building a custom [`crate::region::FixedRegionMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionMapError {
    #[error("range `{label}` is inverted (start 0x{start:x} > end 0x{end:x})")]
    InvertedRange {
        label: String,
        start: usize,
        end: usize,
    },

    #[error("range `{label}` starting at 0x{start:x} overlaps `{previous}` ending at 0x{previous_end:x}")]
    Overlap {
        label: String,
        start: usize,
        previous: String,
        previous_end: usize,
    },
}

/// A condition that was recovered from while parsing a pattern or resolving regions.
///
/// Highlighting is best effort: every one of these leaves the offending segment out (or
/// replaces it by a conservative default) and carries on with the rest of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("{position}: unexpected character `{character}`")]
    UnexpectedCharacter { character: char, position: Position },

    #[error("{position}: block comment is never closed")]
    UnterminatedComment { position: Position },

    #[error("{position}: skipped unsupported statement starting with `{found}`")]
    SkippedStatement { found: String, position: Position },

    #[error("{position}: skipped unsupported block")]
    SkippedBlock { position: Position },

    #[error("{position}: body of `{name}` is never closed, definition ignored")]
    UnterminatedBlock { name: String, position: Position },

    #[error("{position}: `{name}` is already defined, later definition ignored")]
    DuplicateStructure { name: String, position: Position },

    #[error("{position}: bitfield member `{member}` has no numeric width, ignored")]
    InvalidBitWidth { member: String, position: Position },

    #[error("{position}: array length `{length}` of `{structure}.{field}` is not a literal, using 1")]
    UnresolvedArrayLength {
        structure: String,
        field: String,
        length: String,
        position: Position,
    },

    #[error("structure `{structure}` contains itself through field `{field}`, sized as 1 byte")]
    RecursiveDefinition { structure: String, field: String },

    #[error("`{label}` at offset 0x{offset:x} re-enters `{structure}`, not expanded")]
    RecursiveExpansion {
        structure: String,
        label: String,
        offset: usize,
    },
}

impl Diagnostic {
    /// Source position of the diagnostic, if it refers to a place in the definition text.
    pub fn position(&self) -> Option<Position> {
        match self {
            Diagnostic::UnexpectedCharacter { position, .. }
            | Diagnostic::UnterminatedComment { position }
            | Diagnostic::SkippedStatement { position, .. }
            | Diagnostic::SkippedBlock { position }
            | Diagnostic::UnterminatedBlock { position, .. }
            | Diagnostic::DuplicateStructure { position, .. }
            | Diagnostic::InvalidBitWidth { position, .. }
            | Diagnostic::UnresolvedArrayLength { position, .. } => Some(*position),
            Diagnostic::RecursiveDefinition { .. } | Diagnostic::RecursiveExpansion { .. } => None,
        }
    }

    /// Whether this diagnostic reports a structure that (transitively) contains itself.
    pub fn is_recursion(&self) -> bool {
        matches!(
            self,
            Diagnostic::RecursiveDefinition { .. } | Diagnostic::RecursiveExpansion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_display_includes_position() {
        let d = Diagnostic::DuplicateStructure {
            name: "Header".to_string(),
            position: Position { line: 3, column: 8 },
        };

        assert_eq!(
            d.to_string(),
            "3:8: `Header` is already defined, later definition ignored"
        );
        assert_eq!(d.position(), Some(Position { line: 3, column: 8 }));
        assert!(!d.is_recursion());
    }

    #[test]
    fn test_fmt_error_converts_into_serialization_error() {
        let err: SerializationError = std::fmt::Error.into();
        assert!(matches!(err, SerializationError::Fmt(_)));
    }
}
