//! Editing tools and the tool sets offered per project type.

use serde::{Deserialize, Serialize};

use crate::model::AnnotationKind;

/// Interaction modes available in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Select existing annotations
    Select,
    /// Move existing annotations
    Move,
    /// Pan the canvas
    Pan,
    /// Zoom the canvas
    Zoom,
    /// Drag out a bounding box
    #[serde(rename = "bbox")]
    BoundingBox,
    /// Click vertices of a polygon
    Polygon,
    /// Place a keypoint
    Keypoint,
    /// Paint a freehand region
    Brush,
    /// Erase part of a painted region
    Eraser,
    /// Select a region by similarity
    MagicWand,
    /// Place a connected set of keypoints
    Skeleton,
    /// Tag the whole image
    Classification,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Move => "Move Annotation",
            Tool::Pan => "Pan Canvas",
            Tool::Zoom => "Zoom",
            Tool::BoundingBox => "Bounding Box",
            Tool::Polygon => "Polygon",
            Tool::Keypoint => "Keypoint",
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::MagicWand => "Magic Wand",
            Tool::Skeleton => "Skeleton",
            Tool::Classification => "Classification",
        }
    }

    /// Get all tools.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Select,
            Tool::Move,
            Tool::Pan,
            Tool::Zoom,
            Tool::BoundingBox,
            Tool::Polygon,
            Tool::Keypoint,
            Tool::Brush,
            Tool::Eraser,
            Tool::MagicWand,
            Tool::Skeleton,
            Tool::Classification,
        ]
    }

    /// Check if this tool turns pointer input into geometry.
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, Tool::Select | Tool::Move | Tool::Pan | Tool::Zoom)
    }

    /// The annotation type a finished drawing with this tool commits.
    ///
    /// Eraser and magic wand edit regions computed by the renderer and never
    /// commit an annotation of their own.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        match self {
            Tool::BoundingBox => Some(AnnotationKind::BoundingBox),
            Tool::Polygon => Some(AnnotationKind::Polygon),
            Tool::Keypoint => Some(AnnotationKind::Keypoint),
            Tool::Brush => Some(AnnotationKind::Brush),
            Tool::Skeleton => Some(AnnotationKind::Skeleton),
            Tool::Classification => Some(AnnotationKind::Classification),
            Tool::Select
            | Tool::Move
            | Tool::Pan
            | Tool::Zoom
            | Tool::Eraser
            | Tool::MagicWand => None,
        }
    }
}

/// Kind of labeling project; decides which drawing tools are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    ObjectDetection,
    InstanceSegmentation,
    SemanticSegmentation,
    KeypointDetection,
    Classification,
}

/// Navigation tools available in every project type.
const COMMON_TOOLS: [Tool; 4] = [Tool::Select, Tool::Move, Tool::Zoom, Tool::Pan];

impl ProjectType {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::ObjectDetection => "Object Detection",
            ProjectType::InstanceSegmentation => "Instance Segmentation",
            ProjectType::SemanticSegmentation => "Semantic Segmentation",
            ProjectType::KeypointDetection => "Keypoint Detection",
            ProjectType::Classification => "Classification",
        }
    }

    /// Drawing tools for this project type followed by the common tools.
    pub fn tools(&self) -> Vec<Tool> {
        let drawing: &[Tool] = match self {
            ProjectType::ObjectDetection => &[Tool::BoundingBox],
            ProjectType::InstanceSegmentation => {
                &[Tool::Polygon, Tool::Brush, Tool::Eraser, Tool::MagicWand]
            }
            ProjectType::SemanticSegmentation => &[Tool::Brush, Tool::Eraser, Tool::MagicWand],
            ProjectType::KeypointDetection => &[Tool::Keypoint, Tool::Skeleton],
            ProjectType::Classification => &[Tool::Classification],
        };
        drawing.iter().chain(COMMON_TOOLS.iter()).copied().collect()
    }

    /// Check whether a tool is offered for this project type.
    pub fn allows(&self, tool: Tool) -> bool {
        self.tools().contains(&tool)
    }
}
