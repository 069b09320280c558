// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for structure generation.
//!
//! Only construction-time invariant violations and unsupported cursor
//! operations are errors. A sequence or dependency assignment without an
//! eligible combination, or a structure rejected by a filter, is a normal
//! state transition of the cursor.

use thiserror::Error;

/// Errors reported by the structure generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The template has no access positions.
    #[error("no memory access types given")]
    EmptyAccessTypes,

    /// Per-position constraints do not line up with the access types.
    #[error("{types} access types but {constraints} per-access constraint sets")]
    ConstraintCountMismatch { types: usize, constraints: usize },

    /// The path classifier returned nothing for one position.
    #[error("no path choosers for access {position} ({access_type})")]
    NoChoosers { position: usize, access_type: String },

    /// A hazard names a buffer access that is not on the access's path.
    #[error("hazard {hazard} references a buffer access absent from access {position}")]
    DanglingHazard { hazard: String, position: usize },

    /// The cursor does not support the requested operation.
    #[error("operation `{operation}` is not supported by {cursor}")]
    Unsupported {
        operation: &'static str,
        cursor: &'static str,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GeneratorError::ConstraintCountMismatch {
            types: 3,
            constraints: 2,
        };
        assert_eq!(err.to_string(), "3 access types but 2 per-access constraint sets");

        let err = GeneratorError::Unsupported {
            operation: "clone",
            cursor: "StructureIterator",
        };
        assert_eq!(
            err.to_string(),
            "operation `clone` is not supported by StructureIterator"
        );
    }
}
