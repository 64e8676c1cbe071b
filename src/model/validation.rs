//! Commit-time validity rules.
//!
//! These thresholds apply when a drawing is committed, never while it is being
//! drawn. Geometry that fails them is discarded silently: a box that is too
//! small is the normal "user didn't draw enough" outcome, not an error.

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;

/// Minimum width and height (exclusive) for a committed bounding box.
pub const MIN_BBOX_SIZE: f32 = 5.0;

/// Minimum number of vertices required for a committed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Why a candidate geometry was discarded at commit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("bounding box {width}x{height} is not larger than {min} in both dimensions")]
    BoxTooSmall { width: f32, height: f32, min: f32 },

    #[error("polygon has {count} vertices, at least {min} required")]
    TooFewVertices { count: usize, min: usize },
}

/// Thresholds a candidate must pass before it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitRules {
    /// Width and height must both exceed this value
    #[serde(default = "default_min_bbox_size")]
    pub min_bbox_size: f32,
    /// Polygons need at least this many vertices
    #[serde(default = "default_min_polygon_points")]
    pub min_polygon_points: usize,
}

fn default_min_bbox_size() -> f32 {
    MIN_BBOX_SIZE
}

fn default_min_polygon_points() -> usize {
    MIN_POLYGON_VERTICES
}

impl Default for CommitRules {
    fn default() -> Self {
        Self {
            min_bbox_size: MIN_BBOX_SIZE,
            min_polygon_points: MIN_POLYGON_VERTICES,
        }
    }
}

impl CommitRules {
    /// Check a candidate geometry, reporting why it would be discarded.
    pub fn check(&self, geometry: &Geometry) -> Result<(), Rejection> {
        match geometry {
            Geometry::BoundingBox(b) => {
                if b.width > self.min_bbox_size && b.height > self.min_bbox_size {
                    Ok(())
                } else {
                    Err(Rejection::BoxTooSmall {
                        width: b.width,
                        height: b.height,
                        min: self.min_bbox_size,
                    })
                }
            }
            Geometry::Polygon(points) => {
                if points.len() >= self.min_polygon_points {
                    Ok(())
                } else {
                    Err(Rejection::TooFewVertices {
                        count: points.len(),
                        min: self.min_polygon_points,
                    })
                }
            }
            // No minimum-size gate for the remaining types
            Geometry::Keypoint(_)
            | Geometry::Brush(_)
            | Geometry::Skeleton(_)
            | Geometry::Classification => Ok(()),
        }
    }

    /// Whether the geometry may be committed.
    pub fn validate(&self, geometry: &Geometry) -> bool {
        self.check(geometry).is_ok()
    }
}

/// Validate a geometry against the default commit rules.
pub fn validate(geometry: &Geometry) -> bool {
    CommitRules::default().validate(geometry)
}
