use glam::{Mat4, Vec3, Vec4};

use crate::scene::{ComponentType, PrimitiveMode};

/// Per-draw shader inputs written by the scene traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    ModelViewProjMatrix,
    ModelViewMatrix,
    NormalMatrix,
    LightingEnabled,
    LightDirection,
    LightIntensity,
    BaseColorFactor,
    MetallicFactor,
    RoughnessFactor,
    EmissiveFactor,
}

/// Immediate-style device capability consumed by draw submission.
///
/// Uniform writes persist until overwritten and apply to every draw issued
/// after them, so the order of calls is part of the contract.
pub trait GraphicsContext {
    fn set_uniform_mat4(&mut self, uniform: Uniform, value: Mat4);

    fn set_uniform_vec3(&mut self, uniform: Uniform, value: Vec3);

    fn set_uniform_vec4(&mut self, uniform: Uniform, value: Vec4);

    fn set_uniform_f32(&mut self, uniform: Uniform, value: f32);

    /// Select the vertex array (index into the uploaded vertex array list)
    /// used by the following draws
    fn bind_vertex_array(&mut self, vertex_array: usize);

    /// Draw `count` indices of `index_type` starting `byte_offset` bytes
    /// into the bound index buffer
    fn draw_indexed(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        index_type: ComponentType,
        byte_offset: u64,
    );

    /// Draw `count` vertices starting at `first`
    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32);
}
