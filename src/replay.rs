//! Scripted replay of editor events.
//!
//! A script is a JSON array of events such as
//! `{"event": "pointer_down", "x": 10, "y": 20}`. Each event is fed to a
//! [`Session`] the way a UI layer would; session errors are collected and the
//! replay carries on with the next event.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::keybindings::{KeyBindings, KeyCode, Modifiers};
use crate::model::{Annotation, AnnotationId, AnnotationPatch, ClassId, Geometry, ImageId, NewAnnotation, Point};
use crate::session::Session;
use crate::store::AnnotationStore;
use crate::tool::Tool;

/// One input event of a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    OpenImage {
        image_id: ImageId,
    },
    SelectClass {
        class_id: ClassId,
    },
    SelectAnnotation {
        id: Option<AnnotationId>,
    },
    SetTool {
        tool: Option<Tool>,
    },
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    /// Adds a polygon vertex
    Click {
        x: f32,
        y: f32,
    },
    /// Geometry computed by the renderer (brush, skeleton)
    Supply {
        geometry: Geometry,
    },
    Finish,
    Cancel,
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        text_focus: bool,
    },
    Undo,
    Redo,
    Update {
        id: AnnotationId,
        patch: AnnotationPatch,
    },
    Delete {
        id: AnnotationId,
    },
    Import {
        annotations: Vec<NewAnnotation>,
    },
}

/// An ordered list of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayScript {
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        log::info!("Loaded {} events from {:?}", script.events.len(), path);
        Ok(script)
    }
}

/// Result of a replay: the final annotation set and every error on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub events: usize,
    pub errors: Vec<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub annotations: Vec<Annotation>,
}

/// Errors that stop a replay before it starts.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to parse replay script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Feed every event of a script to a session.
pub async fn replay<S: AnnotationStore>(
    session: &mut Session<S>,
    bindings: &KeyBindings,
    script: &ReplayScript,
) -> ReplayReport {
    let mut errors = Vec::new();
    for (index, event) in script.events.iter().enumerate() {
        log::trace!("Event {index}: {event:?}");
        if let Err(message) = apply(session, bindings, event).await {
            log::warn!("Event {index} failed: {message}");
            errors.push(format!("event {index}: {message}"));
        }
    }

    ReplayReport {
        events: script.events.len(),
        errors,
        can_undo: session.can_undo(),
        can_redo: session.can_redo(),
        annotations: session.annotations().to_vec(),
    }
}

async fn apply<S: AnnotationStore>(
    session: &mut Session<S>,
    bindings: &KeyBindings,
    event: &ReplayEvent,
) -> Result<(), String> {
    let result = match event {
        ReplayEvent::OpenImage { image_id } => session.open_image(*image_id).await,
        ReplayEvent::SelectClass { class_id } => {
            session.select_class(*class_id);
            Ok(())
        }
        ReplayEvent::SelectAnnotation { id } => {
            session.select_annotation(*id);
            Ok(())
        }
        ReplayEvent::SetTool { tool } => {
            session.set_current_tool(*tool);
            Ok(())
        }
        ReplayEvent::PointerDown { x, y } => {
            session.start_drawing(Point::new(*x, *y));
            Ok(())
        }
        ReplayEvent::PointerMove { x, y } => {
            session.update_drawing(Point::new(*x, *y));
            Ok(())
        }
        ReplayEvent::Click { x, y } => {
            session.add_point(Point::new(*x, *y));
            Ok(())
        }
        ReplayEvent::Supply { geometry } => {
            session.supply_geometry(geometry.clone());
            Ok(())
        }
        ReplayEvent::Finish => session.finish_drawing().await.map(|_| ()),
        ReplayEvent::Cancel => {
            session.cancel_drawing();
            Ok(())
        }
        ReplayEvent::Key {
            key,
            modifiers,
            text_focus,
        } => {
            let code = KeyCode::parse(key).ok_or_else(|| format!("unknown key {key:?}"))?;
            match bindings.resolve(code, *modifiers, *text_focus) {
                Some(command) => session.handle_input(command).await,
                None => Ok(()),
            }
        }
        ReplayEvent::Undo => session.undo().await,
        ReplayEvent::Redo => session.redo().await,
        ReplayEvent::Update { id, patch } => session.update_annotation(*id, patch.clone()).await,
        ReplayEvent::Delete { id } => session.delete_annotation(*id).await,
        ReplayEvent::Import { annotations } => {
            session.import_annotations(annotations.clone()).await.map(|_| ())
        }
    };
    result.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, default_classes};
    use crate::store::MemoryStore;
    use pollster::block_on;

    fn run(json: &str) -> ReplayReport {
        let script = ReplayScript::from_json(json).unwrap();
        let mut session = Session::new(MemoryStore::new());
        session.set_classes(default_classes());
        block_on(replay(&mut session, &KeyBindings::default(), &script))
    }

    #[test]
    fn test_draw_and_undo_via_keys() {
        let report = run(r#"[
            {"event": "open_image", "image_id": 1},
            {"event": "key", "key": "b"},
            {"event": "pointer_down", "x": 150, "y": 140},
            {"event": "pointer_move", "x": 100, "y": 100},
            {"event": "finish"},
            {"event": "key", "key": "c"},
            {"event": "finish"},
            {"event": "key", "key": "z", "modifiers": {"ctrl": true}}
        ]"#);

        assert!(report.errors.is_empty());
        assert_eq!(report.events, 8);
        assert!(report.can_redo);
        assert_eq!(report.annotations.len(), 1);
        assert_eq!(
            report.annotations[0].geometry,
            Geometry::BoundingBox(BoundingBox::new(100.0, 100.0, 50.0, 40.0))
        );
    }

    #[test]
    fn test_polygon_clicks() {
        let report = run(r#"[
            {"event": "open_image", "image_id": 3},
            {"event": "set_tool", "tool": "polygon"},
            {"event": "pointer_down", "x": 0, "y": 0},
            {"event": "click", "x": 10, "y": 0},
            {"event": "click", "x": 10, "y": 10},
            {"event": "finish"}
        ]"#);

        assert_eq!(report.annotations.len(), 1);
        assert_eq!(report.annotations[0].image_id, 3);
        assert_eq!(
            report.annotations[0].geometry,
            Geometry::Polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0)
            ])
        );
    }

    #[test]
    fn test_errors_are_collected() {
        let report = run(r#"[
            {"event": "open_image", "image_id": 1},
            {"event": "delete", "id": 12},
            {"event": "key", "key": "F13"},
            {"event": "set_tool", "tool": "classification"},
            {"event": "finish"}
        ]"#);

        assert_eq!(
            report.errors,
            vec![
                "event 1: Failed to delete annotation: annotation 12 not found".to_string(),
                "event 2: unknown key \"F13\"".to_string(),
            ]
        );
        assert_eq!(report.annotations.len(), 1);
    }

    #[test]
    fn test_text_focus_blocks_keys() {
        let report = run(r#"[
            {"event": "open_image", "image_id": 1},
            {"event": "key", "key": "c", "text_focus": true},
            {"event": "finish"}
        ]"#);
        assert!(report.annotations.is_empty());
    }

    #[test]
    fn test_import_event() {
        let report = run(r#"[
            {"event": "open_image", "image_id": 1},
            {"event": "import", "annotations": [
                {"classId": 2, "geometry": {"type": "bbox", "coordinates": {"x": 0, "y": 0, "width": 30, "height": 30}}},
                {"classId": 1, "geometry": {"type": "classification"}}
            ]}
        ]"#);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(report.annotations.len(), 2);
        assert_eq!(report.annotations[0].class_id, 2);
    }

    #[test]
    fn test_bad_script() {
        assert!(matches!(
            ReplayScript::from_json(r#"[{"event": "jump"}]"#),
            Err(ReplayError::Parse(_))
        ));
    }
}
