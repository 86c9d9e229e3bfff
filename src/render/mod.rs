//! Device-independent draw submission: walks the active scene and feeds
//! uniforms and draws to any `GraphicsContext`.

mod draw;
mod lighting;
mod recording;

pub use draw::{count_draws, draw_node, draw_scene, DrawCommand, FrameUniforms, NodeMatrices};
pub use lighting::{scene_light, LightSettings};
pub use recording::{GraphicsCall, RecordingContext};
