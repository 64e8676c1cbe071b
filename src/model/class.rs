//! Annotation class (label) model.

use serde::{Deserialize, Serialize};

use super::annotation::ClassId;

/// A label that annotations are tied to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotationClass {
    /// Unique identifier for the class
    pub id: ClassId,
    /// Display name of the class
    pub name: String,
    /// RGB color for the class
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_color() -> [u8; 3] {
    [0, 0, 0]
}

impl AnnotationClass {
    /// Create a new class with the given ID, name, and color.
    pub fn new(id: ClassId, name: &str, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
        }
    }
}

/// Default classes for a new configuration.
pub fn default_classes() -> Vec<AnnotationClass> {
    vec![
        AnnotationClass::new(1, "Object", [100, 140, 180]),
        AnnotationClass::new(2, "Background", [100, 180, 100]),
    ]
}
