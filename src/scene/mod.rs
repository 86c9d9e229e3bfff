//! Read-only scene graph consumed by traversal and draw submission.
//!
//! A document is produced once by the loader, validated, and then shared by
//! the device upload and every rendered frame.

mod bounds;
mod document;
mod traverse;
mod validate;

pub use bounds::{scene_bounds, SceneFraming, FALLBACK_MAX_DISTANCE, FIELD_OF_VIEW_Y};
pub use document::*;
pub use traverse::{visit_node, visit_scene};
pub use validate::SceneError;
