//! Geometry payloads for every annotation type.
//!
//! The payload shape is fully determined by the annotation type: [`Geometry`]
//! is a closed sum type, so a bounding box can never carry polygon vertices
//! and a classification carries nothing at all.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized bounding box from two corner points.
    ///
    /// Width and height are non-negative regardless of drag direction.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A keypoint, optionally named (e.g. "left_eye").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    /// A visible, unnamed keypoint at the given position.
    pub fn visible_at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            visible: true,
            name: None,
        }
    }
}

/// Freehand brush region: one or more strokes painted with a fixed width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushStroke {
    pub paths: Vec<Vec<Point>>,
    pub width: f32,
}

/// Keypoints joined by edges given as index pairs into `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub points: Vec<Keypoint>,
    pub connections: Vec<(usize, usize)>,
}

impl Skeleton {
    /// Check that every connection refers to an existing point.
    pub fn connections_in_range(&self) -> bool {
        let n = self.points.len();
        self.connections.iter().all(|&(a, b)| a < n && b < n)
    }
}

// ============================================================================
// Annotation Kind
// ============================================================================

/// The type tag of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    #[serde(rename = "bbox")]
    BoundingBox,
    Polygon,
    Keypoint,
    Brush,
    Skeleton,
    Classification,
}

impl AnnotationKind {
    /// Wire name of the annotation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoundingBox => "bbox",
            Self::Polygon => "polygon",
            Self::Keypoint => "keypoint",
            Self::Brush => "brush",
            Self::Skeleton => "skeleton",
            Self::Classification => "classification",
        }
    }


    /// Get all annotation kinds.
    pub fn all() -> &'static [AnnotationKind] {
        &[
            Self::BoundingBox,
            Self::Polygon,
            Self::Keypoint,
            Self::Brush,
            Self::Skeleton,
            Self::Classification,
        ]
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Type-specific geometry payload.
///
/// Serialized as `{"type": ..., "coordinates": ...}`; classification has no
/// `coordinates` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum Geometry {
    #[serde(rename = "bbox")]
    BoundingBox(BoundingBox),
    Polygon(Vec<Point>),
    Keypoint(Vec<Keypoint>),
    Brush(BrushStroke),
    Skeleton(Skeleton),
    Classification,
}

impl Geometry {
    /// The annotation type this payload belongs to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Geometry::BoundingBox(_) => AnnotationKind::BoundingBox,
            Geometry::Polygon(_) => AnnotationKind::Polygon,
            Geometry::Keypoint(_) => AnnotationKind::Keypoint,
            Geometry::Brush(_) => AnnotationKind::Brush,
            Geometry::Skeleton(_) => AnnotationKind::Skeleton,
            Geometry::Classification => AnnotationKind::Classification,
        }
    }
}
