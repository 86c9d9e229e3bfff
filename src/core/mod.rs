pub mod clock;
pub mod gpu_context;
pub mod input_adapter;

pub use clock::Clock;
pub use gpu_context::GpuContext;
pub use input_adapter::{InputSnapshot, WinitInput};
