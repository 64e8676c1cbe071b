//! Session-level error types.

use std::fmt;

use thiserror::Error;

use crate::model::AnnotationId;
use crate::store::StoreError;

/// The session operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadAnnotations,
    Create,
    Update,
    Delete,
    Import,
    Undo,
    Redo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::LoadAnnotations => "fetch annotations",
            Operation::Create => "create annotation",
            Operation::Update => "update annotation",
            Operation::Delete => "delete annotation",
            Operation::Import => "create annotations",
            Operation::Undo => "undo action",
            Operation::Redo => "redo action",
        })
    }
}

/// Errors surfaced by the annotation session.
///
/// Discarded geometry and calls made in the wrong state are not errors; they
/// are silent no-ops. Everything here ends up in the session's error field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// The target annotation is not in the local set
    #[error("Failed to {operation}: annotation {id} not found")]
    NotFound { operation: Operation, id: AnnotationId },

    /// An annotation was requested while no image is open
    #[error("Failed to {operation}: no image is open")]
    NoActiveImage { operation: Operation },

    /// The persistence collaborator rejected the request
    #[error("Failed to {operation}: {source}")]
    Store {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl EditorError {
    pub fn store(operation: Operation, source: StoreError) -> Self {
        Self::Store { operation, source }
    }

    /// The operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            EditorError::NotFound { operation, .. }
            | EditorError::NoActiveImage { operation }
            | EditorError::Store { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EditorError::store(Operation::Undo, StoreError::transport("timeout"));
        assert_eq!(err.to_string(), "Failed to undo action: timeout");

        let err = EditorError::NotFound {
            operation: Operation::Delete,
            id: 3,
        };
        assert_eq!(err.to_string(), "Failed to delete annotation: annotation 3 not found");
        assert_eq!(err.operation(), Operation::Delete);
    }
}
