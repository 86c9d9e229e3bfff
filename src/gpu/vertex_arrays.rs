use crate::scene::{Accessor, ComponentType, ElementType, SceneDocument, NORMAL, POSITION, TEXCOORD_0};

/// Semantics bound to vertex slots 0, 1 and 2
pub const VERTEX_SLOTS: [&str; 3] = [POSITION, NORMAL, TEXCOORD_0];

/// Byte offset of each slot's fallback value inside the default attribute buffer
const DEFAULT_ATTRIBUTE_OFFSETS: [u64; 3] = [0, 16, 32];

/// Contents of the buffer read by slots whose attribute is missing:
/// position `(0,0,0)`, normal `(0,0,1)`, texcoord `(0,0)`
pub fn default_attribute_data() -> [f32; 12] {
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]
}

/// Contiguous block of vertex arrays belonging to one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaoRange {
    /// Index of the mesh's first primitive in the vertex array list
    pub offset: usize,
    pub count: usize,
}

/// Where a vertex slot reads from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeSource {
    /// Scene buffer `buffer`, starting `byte_offset` bytes in
    Buffer { buffer: usize, byte_offset: u64, stride: u64 },
    /// Constant value from the default attribute buffer
    Default { byte_offset: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub source: AttributeSource,
    pub format: wgpu::VertexFormat,
}

impl VertexAttribute {
    fn fallback(slot: usize) -> Self {
        let format = if slot == 2 {
            wgpu::VertexFormat::Float32x2
        } else {
            wgpu::VertexFormat::Float32x3
        };
        Self {
            source: AttributeSource::Default {
                byte_offset: DEFAULT_ATTRIBUTE_OFFSETS[slot],
            },
            format,
        }
    }

    /// Distance between consecutive vertices; zero repeats one value
    pub fn stride(&self) -> u64 {
        match self.source {
            AttributeSource::Buffer { stride, .. } => stride,
            AttributeSource::Default { .. } => 0,
        }
    }
}

/// Where indexed draws of a primitive read their indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSource {
    /// Scene buffer read in place
    Buffer { buffer: usize, format: wgpu::IndexFormat },
    /// `u8` indices copied to their own `u16` buffer at upload
    Widened { accessor: usize },
}

/// Vertex input state of one primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexArray {
    pub attributes: [VertexAttribute; 3],
    pub indices: Option<IndexSource>,
}

/// Pipeline-relevant part of a vertex array
pub type VertexLayoutKey = [(u64, wgpu::VertexFormat); 3];

impl VertexArray {
    pub fn layout_key(&self) -> VertexLayoutKey {
        self.attributes.map(|attribute| (attribute.stride(), attribute.format))
    }
}

/// Device format for an attribute accessor, `None` when the shader has no
/// floating point view of it
pub fn vertex_format(accessor: &Accessor) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    let components = accessor.element_type.component_count();
    let format = match (accessor.component_type, accessor.normalized, components) {
        (ComponentType::F32, _, 1) => F::Float32,
        (ComponentType::F32, _, 2) => F::Float32x2,
        (ComponentType::F32, _, 3) => F::Float32x3,
        (ComponentType::F32, _, 4) => F::Float32x4,
        (ComponentType::U8, true, 2) => F::Unorm8x2,
        (ComponentType::U8, true, 4) => F::Unorm8x4,
        (ComponentType::I8, true, 2) => F::Snorm8x2,
        (ComponentType::I8, true, 4) => F::Snorm8x4,
        (ComponentType::U16, true, 2) => F::Unorm16x2,
        (ComponentType::U16, true, 4) => F::Unorm16x4,
        (ComponentType::I16, true, 2) => F::Snorm16x2,
        (ComponentType::I16, true, 4) => F::Snorm16x4,
        _ => return None,
    };
    if matches!(accessor.element_type, ElementType::Mat2 | ElementType::Mat3 | ElementType::Mat4) {
        return None;
    }
    Some(format)
}

fn index_source(document: &SceneDocument, accessor_index: usize) -> Option<IndexSource> {
    let accessor = &document.accessors[accessor_index];
    let buffer = document.buffer_views[accessor.buffer_view?].buffer;
    match accessor.component_type {
        ComponentType::U8 => Some(IndexSource::Widened {
            accessor: accessor_index,
        }),
        ComponentType::U16 => Some(IndexSource::Buffer {
            buffer,
            format: wgpu::IndexFormat::Uint16,
        }),
        ComponentType::U32 => Some(IndexSource::Buffer {
            buffer,
            format: wgpu::IndexFormat::Uint32,
        }),
        other => {
            log::warn!("Accessor {} has unsupported index type {:?}", accessor_index, other);
            None
        }
    }
}

/// One vertex array per primitive, in mesh order, plus the range each mesh
/// occupies in that list
pub fn create_vertex_arrays(document: &SceneDocument) -> (Vec<VertexArray>, Vec<VaoRange>) {
    let mut vertex_arrays = Vec::with_capacity(document.primitive_count());
    let mut ranges = Vec::with_capacity(document.meshes.len());

    for (m, mesh) in document.meshes.iter().enumerate() {
        ranges.push(VaoRange {
            offset: vertex_arrays.len(),
            count: mesh.primitives.len(),
        });

        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let mut attributes = [0, 1, 2].map(VertexAttribute::fallback);
            for (slot, semantic) in VERTEX_SLOTS.iter().enumerate() {
                let Some(accessor_index) = primitive.attribute(semantic) else {
                    continue;
                };
                let accessor = &document.accessors[accessor_index];
                let (Some(view), Some(format)) = (accessor.buffer_view, vertex_format(accessor)) else {
                    log::warn!(
                        "Mesh {} primitive {}: {} uses an unsupported layout, using a constant",
                        m,
                        p,
                        semantic
                    );
                    continue;
                };
                let byte_offset = document.accessor_buffer_offset(accessor_index) as u64;
                let stride = document.accessor_stride(accessor_index) as u64;
                // vertex buffer offsets and strides must be 4-byte aligned
                if byte_offset % 4 != 0 || stride % 4 != 0 {
                    log::warn!("Mesh {} primitive {}: {} is not 4-byte aligned, using a constant", m, p, semantic);
                    continue;
                }
                attributes[slot] = VertexAttribute {
                    source: AttributeSource::Buffer {
                        buffer: document.buffer_views[view].buffer,
                        byte_offset,
                        stride,
                    },
                    format,
                };
            }

            vertex_arrays.push(VertexArray {
                attributes,
                indices: primitive.indices.and_then(|indices| index_source(document, indices)),
            });
        }
    }

    log::debug!("Created {} vertex arrays for {} meshes", vertex_arrays.len(), ranges.len());
    (vertex_arrays, ranges)
}

/// Read a `u8` index accessor as `u16` values
pub fn widen_u8_indices(document: &SceneDocument, accessor_index: usize) -> Vec<u16> {
    let accessor = &document.accessors[accessor_index];
    let Some(view) = accessor.buffer_view else {
        return Vec::new();
    };
    let data = &document.buffers[document.buffer_views[view].buffer].data;
    let start = document.accessor_buffer_offset(accessor_index);
    let stride = document.accessor_stride(accessor_index);

    (0..accessor.count)
        .map(|i| u16::from(data[start + i * stride]))
        .collect()
}
