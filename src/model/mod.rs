//! Annotation variant model.

mod annotation;
mod class;
mod geometry;
mod validation;

pub use annotation::{Annotation, AnnotationId, AnnotationPatch, ClassId, ImageId, NewAnnotation};
pub use class::{AnnotationClass, default_classes};
pub use geometry::{AnnotationKind, BoundingBox, BrushStroke, Geometry, Keypoint, Point, Skeleton};
pub use validation::{CommitRules, MIN_BBOX_SIZE, MIN_POLYGON_VERTICES, Rejection, validate};
