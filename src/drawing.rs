//! Drawing state machine.
//!
//! Turns pointer input for the active tool into a candidate geometry. The state
//! is either idle or drawing; the preview shown while drawing is recomputed from
//! the buffer on every change and is never a state of its own.
//!
//! All operations here are synchronous buffer mutations. Validation against the
//! commit thresholds and persistence happen in the session.

use crate::model::{BoundingBox, Geometry, Keypoint, Point};
use crate::tool::Tool;

/// State for the current drawing operation.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    /// Whether a pointer-down started a drawing that is not finished yet.
    is_drawing: bool,
    /// The active tool, if any.
    current_tool: Option<Tool>,
    /// Points collected during the current drawing operation.
    points: Vec<Point>,
    /// Where the current drawing started.
    start_point: Option<Point>,
    /// Pointer position trailing the last polygon vertex.
    cursor: Option<Point>,
    /// Preview of what would be committed right now.
    temporary: Option<Geometry>,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn current_tool(&self) -> Option<Tool> {
        self.current_tool
    }

    /// Buffered points: bbox corners, polygon vertices, or the keypoint.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn start_point(&self) -> Option<Point> {
        self.start_point
    }

    /// The temporary annotation preview.
    pub fn preview(&self) -> Option<&Geometry> {
        self.temporary.as_ref()
    }

    /// Switch tools. Any uncommitted buffer is discarded.
    pub fn set_current_tool(&mut self, tool: Option<Tool>) {
        if self.is_drawing && self.current_tool != tool {
            log::debug!(
                "Discarding unfinished {} drawing on tool change",
                self.tool_name()
            );
        }
        self.current_tool = tool;
        self.reset();
    }

    /// Start a new drawing operation.
    pub fn start(&mut self, point: Point) {
        self.is_drawing = true;
        self.start_point = Some(point);
        self.points.clear();
        self.points.push(point);
        self.cursor = None;
        self.temporary = None;
    }

    /// Track the pointer while drawing.
    pub fn update(&mut self, point: Point) {
        if !self.is_drawing {
            return;
        }

        match self.current_tool {
            Some(Tool::BoundingBox) => {
                // Exactly two points: start and current
                self.points.truncate(1);
                self.points.push(point);
                if let Some(start) = self.start_point {
                    self.temporary = Some(Geometry::BoundingBox(BoundingBox::from_corners(
                        start, point,
                    )));
                }
            }
            Some(Tool::Polygon) => {
                self.cursor = Some(point);
                self.refresh_polygon_preview();
            }
            Some(Tool::Keypoint) => {
                self.points.clear();
                self.points.push(point);
                self.temporary = Some(Geometry::Keypoint(vec![Keypoint::visible_at(point)]));
            }
            // Brush and skeleton geometry arrives finished via `supply_geometry`
            _ => {}
        }
    }

    /// Append a permanent polygon vertex.
    ///
    /// Returns `false` (and does nothing) for any other tool.
    pub fn add_point(&mut self, point: Point) -> bool {
        if self.current_tool != Some(Tool::Polygon) {
            log::debug!("Ignoring vertex for {} tool", self.tool_name());
            return false;
        }
        self.points.push(point);
        self.cursor = None;
        self.refresh_polygon_preview();
        true
    }

    /// Accept a finished geometry computed by the renderer.
    ///
    /// Only brush and skeleton drawings take geometry this way, and only while
    /// drawing with the matching tool. A skeleton whose connections name a
    /// missing point is refused. Returns whether it was accepted.
    pub fn supply_geometry(&mut self, geometry: Geometry) -> bool {
        let accepts = matches!(
            (self.current_tool, &geometry),
            (Some(Tool::Brush), Geometry::Brush(_)) | (Some(Tool::Skeleton), Geometry::Skeleton(_))
        );
        if !self.is_drawing || !accepts {
            log::debug!(
                "Ignoring supplied {} geometry for {} tool",
                geometry.kind(),
                self.tool_name()
            );
            return false;
        }
        if let Geometry::Skeleton(skeleton) = &geometry {
            if !skeleton.connections_in_range() {
                log::debug!(
                    "Ignoring skeleton with a connection outside its {} points",
                    skeleton.points.len()
                );
                return false;
            }
        }
        self.temporary = Some(geometry);
        true
    }

    /// Whether `finish` would consider building a candidate.
    ///
    /// Classification needs no pointer interaction at all.
    pub fn can_finish(&self) -> bool {
        self.is_drawing || self.current_tool == Some(Tool::Classification)
    }

    /// Finish the current drawing and return the candidate geometry.
    ///
    /// The buffer is always reset afterwards. The candidate has not been
    /// checked against the commit thresholds yet.
    pub fn finish(&mut self) -> Option<Geometry> {
        if !self.can_finish() {
            return None;
        }

        let candidate = match self.current_tool {
            Some(Tool::BoundingBox) => match (self.points.first(), self.points.last()) {
                (Some(start), Some(end)) => Some(Geometry::BoundingBox(
                    BoundingBox::from_corners(*start, *end),
                )),
                _ => None,
            },
            Some(Tool::Polygon) => Some(Geometry::Polygon(self.points.clone())),
            Some(Tool::Keypoint) => Some(Geometry::Keypoint(
                self.points.iter().copied().map(Keypoint::visible_at).collect(),
            )),
            Some(Tool::Brush) | Some(Tool::Skeleton) => self.temporary.take(),
            Some(Tool::Classification) => Some(Geometry::Classification),
            _ => None,
        };

        self.reset();
        candidate
    }

    /// Cancel the current drawing.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Clear the buffer, keeping the active tool.
    pub fn reset(&mut self) {
        self.is_drawing = false;
        self.points.clear();
        self.start_point = None;
        self.cursor = None;
        self.temporary = None;
    }

    fn refresh_polygon_preview(&mut self) {
        let mut preview = self.points.clone();
        preview.extend(self.cursor);
        self.temporary = Some(Geometry::Polygon(preview));
    }

    fn tool_name(&self) -> &'static str {
        self.current_tool.map_or("no", |t| t.name())
    }
}
