use glam::{Mat4, Vec3, Vec4};
use std::fmt;

use crate::scene::{ComponentType, PrimitiveMode};
use crate::traits::{GraphicsContext, Uniform};

/// One call made on a `GraphicsContext`
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCall {
    Mat4(Uniform, Mat4),
    Vec3(Uniform, Vec3),
    Vec4(Uniform, Vec4),
    F32(Uniform, f32),
    BindVertexArray(usize),
    DrawIndexed {
        mode: PrimitiveMode,
        count: u32,
        index_type: ComponentType,
        byte_offset: u64,
    },
    DrawArrays {
        mode: PrimitiveMode,
        first: u32,
        count: u32,
    },
}

impl GraphicsCall {
    pub fn is_draw(&self) -> bool {
        matches!(self, GraphicsCall::DrawIndexed { .. } | GraphicsCall::DrawArrays { .. })
    }
}

impl fmt::Display for GraphicsCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsCall::Mat4(uniform, value) => write!(f, "uniform {:?} = {:?}", uniform, value.to_cols_array()),
            GraphicsCall::Vec3(uniform, value) => write!(f, "uniform {:?} = {}", uniform, value),
            GraphicsCall::Vec4(uniform, value) => write!(f, "uniform {:?} = {}", uniform, value),
            GraphicsCall::F32(uniform, value) => write!(f, "uniform {:?} = {}", uniform, value),
            GraphicsCall::BindVertexArray(index) => write!(f, "bind vertex array {}", index),
            GraphicsCall::DrawIndexed {
                mode,
                count,
                index_type,
                byte_offset,
            } => write!(
                f,
                "draw indexed {:?} count={} type={:?} offset={}",
                mode, count, index_type, byte_offset
            ),
            GraphicsCall::DrawArrays { mode, first, count } => {
                write!(f, "draw arrays {:?} first={} count={}", mode, first, count)
            }
        }
    }
}

/// `GraphicsContext` that keeps every call in order instead of drawing
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<GraphicsCall>,
}

impl RecordingContext {
    pub fn calls(&self) -> &[GraphicsCall] {
        &self.calls
    }

    pub fn draw_count(&self) -> usize {
        self.calls.iter().filter(|call| call.is_draw()).count()
    }

    /// Value of a matrix uniform at the time of the `draw`-th draw call
    pub fn mat4_at_draw(&self, uniform: Uniform, draw: usize) -> Option<Mat4> {
        let mut current = None;
        let mut draws = 0;
        for call in &self.calls {
            match call {
                GraphicsCall::Mat4(u, value) if *u == uniform => current = Some(*value),
                call if call.is_draw() => {
                    if draws == draw {
                        return current;
                    }
                    draws += 1;
                }
                _ => {}
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl GraphicsContext for RecordingContext {
    fn set_uniform_mat4(&mut self, uniform: Uniform, value: Mat4) {
        self.calls.push(GraphicsCall::Mat4(uniform, value));
    }

    fn set_uniform_vec3(&mut self, uniform: Uniform, value: Vec3) {
        self.calls.push(GraphicsCall::Vec3(uniform, value));
    }

    fn set_uniform_vec4(&mut self, uniform: Uniform, value: Vec4) {
        self.calls.push(GraphicsCall::Vec4(uniform, value));
    }

    fn set_uniform_f32(&mut self, uniform: Uniform, value: f32) {
        self.calls.push(GraphicsCall::F32(uniform, value));
    }

    fn bind_vertex_array(&mut self, vertex_array: usize) {
        self.calls.push(GraphicsCall::BindVertexArray(vertex_array));
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, index_type: ComponentType, byte_offset: u64) {
        self.calls.push(GraphicsCall::DrawIndexed {
            mode,
            count,
            index_type,
            byte_offset,
        });
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) {
        self.calls.push(GraphicsCall::DrawArrays { mode, first, count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_uniform_value_per_draw() {
        let mut context = RecordingContext::default();
        context.set_uniform_mat4(Uniform::ModelViewMatrix, Mat4::IDENTITY);
        context.draw_arrays(PrimitiveMode::Triangles, 0, 3);
        let shifted = Mat4::from_translation(Vec3::X);
        context.set_uniform_mat4(Uniform::ModelViewMatrix, shifted);
        context.draw_arrays(PrimitiveMode::Triangles, 0, 3);

        assert_eq!(context.draw_count(), 2);
        assert_eq!(context.mat4_at_draw(Uniform::ModelViewMatrix, 0), Some(Mat4::IDENTITY));
        assert_eq!(context.mat4_at_draw(Uniform::ModelViewMatrix, 1), Some(shifted));
        assert_eq!(context.mat4_at_draw(Uniform::ModelViewMatrix, 2), None);
    }

    #[test]
    fn display_is_one_line_per_call() {
        let call = GraphicsCall::DrawArrays {
            mode: PrimitiveMode::Points,
            first: 0,
            count: 9,
        };
        assert_eq!(call.to_string(), "draw arrays Points first=0 count=9");
    }
}
