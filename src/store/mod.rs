//! Persistence collaborator contract.
//!
//! The editing core never stores annotations durably itself. Every create,
//! update and delete goes through an [`AnnotationStore`], and local state only
//! changes after the store has accepted the request.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Annotation, AnnotationId, AnnotationPatch, ClassId, Geometry, ImageId, NewAnnotation};

pub use memory::MemoryStore;

/// Failure reported by the persistence collaborator.
///
/// The core treats these as opaque: it only reports the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The request was rejected or never reached the store
    #[error("{0}")]
    Transport(String),

    /// The store has no record with this id
    #[error("annotation {0} does not exist")]
    NotFound(AnnotationId),
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Durable storage for annotations.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Persist a new annotation; the store assigns its id.
    async fn create(
        &self,
        image_id: ImageId,
        class_id: ClassId,
        geometry: Geometry,
    ) -> Result<Annotation, StoreError>;

    /// All annotations of an image.
    async fn list(&self, image_id: ImageId) -> Result<Vec<Annotation>, StoreError>;

    /// Apply a partial update and return the stored record.
    async fn update(
        &self,
        id: AnnotationId,
        patch: AnnotationPatch,
    ) -> Result<Annotation, StoreError>;

    /// Remove an annotation.
    async fn delete(&self, id: AnnotationId) -> Result<(), StoreError>;

    /// Persist several annotations of one image in a single request.
    async fn batch_create(
        &self,
        image_id: ImageId,
        annotations: Vec<NewAnnotation>,
    ) -> Result<Vec<Annotation>, StoreError>;
}
