use std::io;

use thiserror::Error;

use crate::types::{TargetType, TypeTag};

/// A declared source type could not produce the requested target type.
///
/// Carries the failing column index, the driver's declared type, the
/// attempted target, and the raw text where one was involved. Conversion
/// failures are deterministic data-shape mismatches and are never retried;
/// a failing row aborts its whole conversion (no partial record or partial
/// JSON document ever surfaces).
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("column {column}: no conversion from declared type {declared} to {target}")]
    Unsupported {
        column: usize,
        declared: TypeTag,
        target: TargetType,
    },

    #[error("column {column}: cannot parse {raw:?} as {target} (declared type {declared})")]
    Parse {
        column: usize,
        declared: TypeTag,
        target: TargetType,
        raw: String,
    },

    #[error("column {column}: failed to drain large object")]
    Lob {
        column: usize,
        #[source]
        source: io::Error,
    },
}

impl ConversionError {
    /// Index of the column the conversion failed on.
    pub fn column(&self) -> usize {
        match self {
            ConversionError::Unsupported { column, .. }
            | ConversionError::Parse { column, .. }
            | ConversionError::Lob { column, .. } => *column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_column_and_types() {
        let err = ConversionError::Unsupported {
            column: 3,
            declared: TypeTag::Bytes,
            target: TargetType::Bool,
        };
        let msg = err.to_string();
        assert!(msg.contains("column 3"));
        assert!(msg.contains("bytes"));
        assert!(msg.contains("bool"));
        assert_eq!(err.column(), 3);
    }

    #[test]
    fn test_parse_error_carries_raw_text() {
        let err = ConversionError::Parse {
            column: 0,
            declared: TypeTag::Text,
            target: TargetType::Bool,
            raw: "maybe".into(),
        };
        assert!(err.to_string().contains("maybe"));
    }
}
