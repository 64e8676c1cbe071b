//! Persisted annotation entity and the partial updates applied to it.

use serde::{Deserialize, Serialize};

use super::geometry::{AnnotationKind, Geometry};

/// Identifier assigned by the persistence collaborator.
pub type AnnotationId = u64;

/// Identifier of the image an annotation belongs to.
pub type ImageId = u64;

/// Identifier of an annotation class (label).
pub type ClassId = u64;

/// A labeled marking on one image.
///
/// `id` is absent until the persistence collaborator has stored the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnnotationId>,
    pub image_id: ImageId,
    pub class_id: ClassId,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Annotation {
    /// Create an annotation that has not been persisted yet.
    pub fn new(image_id: ImageId, class_id: ClassId, geometry: Geometry) -> Self {
        Self {
            id: None,
            image_id,
            class_id,
            geometry,
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = Some(id);
        self
    }

    /// The annotation type, derived from the geometry payload.
    pub fn kind(&self) -> AnnotationKind {
        self.geometry.kind()
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &AnnotationPatch) {
        if let Some(class_id) = patch.class_id {
            self.class_id = class_id;
        }
        if let Some(geometry) = &patch.geometry {
            self.geometry = geometry.clone();
        }
    }

    /// Every non-identity field as a patch.
    ///
    /// Used to restore a snapshot through the persistence collaborator.
    pub fn to_patch(&self) -> AnnotationPatch {
        AnnotationPatch {
            class_id: Some(self.class_id),
            geometry: Some(self.geometry.clone()),
        }
    }

    /// Compare class and geometry, ignoring identity.
    pub fn same_content(&self, other: &Annotation) -> bool {
        self.image_id == other.image_id
            && self.class_id == other.class_id
            && self.geometry == other.geometry
    }
}

/// Partial update of an annotation's mutable fields.
///
/// Identity fields (`id`, `image_id`) are never part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl AnnotationPatch {
    pub fn class(class_id: ClassId) -> Self {
        Self {
            class_id: Some(class_id),
            geometry: None,
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            class_id: None,
            geometry: Some(geometry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.class_id.is_none() && self.geometry.is_none()
    }
}

/// One entry of a batch create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    pub class_id: ClassId,
    pub geometry: Geometry,
}

impl NewAnnotation {
    pub fn new(class_id: ClassId, geometry: Geometry) -> Self {
        Self { class_id, geometry }
    }
}
