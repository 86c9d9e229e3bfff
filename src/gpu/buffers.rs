use std::collections::HashMap;
use wgpu::util::DeviceExt;

use super::vertex_arrays::{
    create_vertex_arrays, default_attribute_data, widen_u8_indices, IndexSource, VaoRange, VertexArray,
};
use crate::scene::SceneDocument;

/// Copy of `data` padded with zeros to a multiple of 4 bytes
fn padded(data: &[u8]) -> Vec<u8> {
    let mut bytes = data.to_vec();
    let len = bytes.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize).max(4);
    bytes.resize(len, 0);
    bytes
}

/// One device buffer per scene buffer, usable as vertex and index source
pub fn create_buffer_objects(device: &wgpu::Device, document: &SceneDocument) -> Vec<wgpu::Buffer> {
    document
        .buffers
        .iter()
        .enumerate()
        .map(|(i, buffer)| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Scene Buffer {}", i)),
                contents: &padded(&buffer.data),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX,
            })
        })
        .collect()
}

/// Everything uploaded for a scene, created once after loading
pub struct GpuScene {
    pub buffers: Vec<wgpu::Buffer>,
    /// `u16` copies of `u8` index accessors, keyed by accessor
    pub widened_indices: HashMap<usize, wgpu::Buffer>,
    pub default_attributes: wgpu::Buffer,
    pub vertex_arrays: Vec<VertexArray>,
    pub ranges: Vec<VaoRange>,
}

impl GpuScene {
    pub fn upload(device: &wgpu::Device, document: &SceneDocument) -> Self {
        let buffers = create_buffer_objects(device, document);
        let (vertex_arrays, ranges) = create_vertex_arrays(document);

        let mut widened_indices = HashMap::new();
        for vertex_array in &vertex_arrays {
            let Some(IndexSource::Widened { accessor }) = vertex_array.indices else {
                continue;
            };
            widened_indices.entry(accessor).or_insert_with(|| {
                let indices = widen_u8_indices(document, accessor);
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Widened Indices {}", accessor)),
                    contents: &padded(bytemuck::cast_slice(&indices)),
                    usage: wgpu::BufferUsages::INDEX,
                })
            });
        }

        let default_attributes = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Default Attributes"),
            contents: bytemuck::cast_slice(&default_attribute_data()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::info!(
            "Uploaded {} buffers, {} vertex arrays, {} widened index buffers",
            buffers.len(),
            vertex_arrays.len(),
            widened_indices.len()
        );

        Self {
            buffers,
            widened_indices,
            default_attributes,
            vertex_arrays,
            ranges,
        }
    }
}
