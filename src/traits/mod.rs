pub mod camera;
pub mod graphics;
pub mod input;

pub use camera::*;
pub use graphics::*;
pub use input::*;
