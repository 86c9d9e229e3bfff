//! Device upload and wgpu implementation of `GraphicsContext`.

mod buffers;
mod capture;
mod renderer;
mod vertex_arrays;

pub use buffers::{create_buffer_objects, GpuScene};
pub use capture::{padded_bytes_per_row, save_image, strip_row_padding, OffscreenTarget, CAPTURE_FORMAT};
pub use renderer::{SceneRenderer, DEPTH_FORMAT};
pub use vertex_arrays::{
    create_vertex_arrays, vertex_format, widen_u8_indices, AttributeSource, IndexSource, VaoRange, VertexArray,
    VertexAttribute, VERTEX_SLOTS,
};
