//! Vertex and index buffers for one drawable shape.

use arrayvec::ArrayVec;
use std::mem;

use crate::buffer::{self, Accessor};
use crate::draw_call::{DrawCall, Primitive};
use crate::factory::{Attribute, Factory};
use crate::gl::Context;
use crate::{Buffer, Error};

/// Interleaved vertex layout shared by every mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

impl Vertex {
    /// Byte distance between consecutive vertices.
    pub const STRIDE: usize = mem::size_of::<Vertex>();

    pub const POSITION_OFFSET: usize = mem::offset_of!(Vertex, position);
    pub const NORMAL_OFFSET: usize = mem::offset_of!(Vertex, normal);
    pub const TEXCOORD_OFFSET: usize = mem::offset_of!(Vertex, texcoord);
}

/// CPU-side mesh data, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,

    /// Pairs of vertex indices, one pair per line segment.
    pub line_indices: Vec<u16>,

    /// Triples of vertex indices, one triple per triangle.
    pub triangle_indices: Vec<u16>,
}

/// Attribute locations a mesh feeds, in vertex layout order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttributeLocations {
    pub position: u32,
    pub normal: u32,
    pub texcoord: u32,
}

/// GPU buffers for one shape: a shared vertex stream drawn once as lines
/// and once as triangles.
///
/// A released mesh reports `0` for every buffer name and count.
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: Option<Buffer>,
    line_index_buffer: Option<Buffer>,
    triangle_index_buffer: Option<Buffer>,
    vertex_size: usize,
    line_index_count: usize,
    triangle_index_count: usize,
}

impl Mesh {
    /// Upload geometry into three new buffers.
    pub fn new<C: Context>(factory: &Factory<C>, geometry: &Geometry) -> Result<Self, Error> {
        let vertex_count = geometry.vertices.len();
        if vertex_count > u16::MAX as usize + 1 {
            return Err(Error::IndexOverflow(vertex_count));
        }

        let mut vertex_buffer = factory.buffer(buffer::Kind::Array);
        factory.initialize_buffer(&mut vertex_buffer, &geometry.vertices);

        let mut line_index_buffer = factory.buffer(buffer::Kind::Index);
        factory.initialize_buffer(&mut line_index_buffer, &geometry.line_indices);

        let mut triangle_index_buffer = factory.buffer(buffer::Kind::Index);
        factory.initialize_buffer(&mut triangle_index_buffer, &geometry.triangle_indices);

        Ok(Self {
            vertex_buffer: Some(vertex_buffer),
            line_index_buffer: Some(line_index_buffer),
            triangle_index_buffer: Some(triangle_index_buffer),
            vertex_size: Vertex::STRIDE,
            line_index_count: geometry.line_indices.len(),
            triangle_index_count: geometry.triangle_indices.len(),
        })
    }

    /// Drop the three buffers.
    ///
    /// Their names are deleted at the factory's next collection. Calling
    /// this again does nothing.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }
        self.vertex_buffer = None;
        self.line_index_buffer = None;
        self.triangle_index_buffer = None;
        self.line_index_count = 0;
        self.triangle_index_count = 0;
    }

    /// Returns `true` once `release` has been called.
    pub fn is_released(&self) -> bool {
        self.vertex_buffer.is_none()
    }

    /// Returns the vertex buffer name, or `0` if released.
    pub fn vertex_buffer(&self) -> u32 {
        self.vertex_buffer.as_ref().map_or(0, Buffer::id)
    }

    /// Returns the line index buffer name, or `0` if released.
    pub fn line_index_buffer(&self) -> u32 {
        self.line_index_buffer.as_ref().map_or(0, Buffer::id)
    }

    /// Returns the triangle index buffer name, or `0` if released.
    pub fn triangle_index_buffer(&self) -> u32 {
        self.triangle_index_buffer.as_ref().map_or(0, Buffer::id)
    }

    /// Returns the byte stride of one vertex.
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    pub fn line_index_count(&self) -> usize {
        self.line_index_count
    }

    pub fn triangle_index_count(&self) -> usize {
        self.triangle_index_count
    }

    /// Draw call covering every line index.
    pub fn lines(&self) -> DrawCall {
        DrawCall {
            offset: 0,
            count: self.line_index_count,
            primitive: Primitive::Lines,
        }
    }

    /// Draw call covering every triangle index.
    pub fn triangles(&self) -> DrawCall {
        DrawCall {
            offset: 0,
            count: self.triangle_index_count,
            primitive: Primitive::Triangles,
        }
    }

    /// Vertex attributes feeding the given locations, or nothing once
    /// released.
    pub(crate) fn attributes(&self, locations: &AttributeLocations) -> ArrayVec<Attribute, 3> {
        let mut attributes = ArrayVec::new();
        if let Some(buffer) = self.vertex_buffer.as_ref() {
            let stride = self.vertex_size;
            attributes.push((
                locations.position,
                Accessor::new(buffer.clone(), 3, Vertex::POSITION_OFFSET, stride),
            ));
            attributes.push((
                locations.normal,
                Accessor::new(buffer.clone(), 3, Vertex::NORMAL_OFFSET, stride),
            ));
            attributes.push((
                locations.texcoord,
                Accessor::new(buffer.clone(), 2, Vertex::TEXCOORD_OFFSET, stride),
            ));
        }
        attributes
    }

    pub(crate) fn line_indices(&self) -> Option<&Buffer> {
        self.line_index_buffer.as_ref()
    }

    pub(crate) fn triangle_indices(&self) -> Option<&Buffer> {
        self.triangle_index_buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl;
    use crate::record::{Call, Recorder};

    fn quad() -> Geometry {
        let vertex = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            texcoord: [x, y],
        };
        Geometry {
            vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(1.0, 1.0), vertex(0.0, 1.0)],
            line_indices: vec![0, 1, 1, 2, 2, 3, 3, 0],
            triangle_indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn interleaved_layout_offsets() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(Vertex::POSITION_OFFSET, 0);
        assert_eq!(Vertex::NORMAL_OFFSET, 12);
        assert_eq!(Vertex::TEXCOORD_OFFSET, 24);
    }

    #[test]
    fn new_uploads_three_buffers() {
        let recorder = Recorder::new();
        let factory = Factory::new(recorder.clone());
        let mesh = Mesh::new(&factory, &quad()).unwrap();

        assert_eq!(mesh.vertex_size(), 32);
        assert_eq!(mesh.line_index_count(), 8);
        assert_eq!(mesh.triangle_index_count(), 6);
        assert!(mesh.vertex_buffer() != 0);
        assert!(mesh.line_index_buffer() != 0);
        assert!(mesh.triangle_index_buffer() != 0);

        let uploads: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BufferData { target, len, .. } => Some((target, len)),
                _ => None,
            })
            .collect();
        assert_eq!(
            uploads,
            vec![
                (gl::ARRAY_BUFFER, 4 * 32),
                (gl::ELEMENT_ARRAY_BUFFER, 8 * 2),
                (gl::ELEMENT_ARRAY_BUFFER, 6 * 2),
            ],
        );
    }

    #[test]
    fn release_is_idempotent() {
        let recorder = Recorder::new();
        let factory = Factory::new(recorder.clone());
        let mut mesh = Mesh::new(&factory, &quad()).unwrap();
        let names = [mesh.vertex_buffer(), mesh.line_index_buffer(), mesh.triangle_index_buffer()];

        mesh.release();
        assert!(mesh.is_released());
        assert_eq!(mesh.vertex_buffer(), 0);
        assert_eq!(mesh.line_index_buffer(), 0);
        assert_eq!(mesh.triangle_index_buffer(), 0);
        assert_eq!(mesh.line_index_count(), 0);
        assert_eq!(mesh.triangle_index_count(), 0);
        assert_eq!(factory.collect_garbage(), 3);

        mesh.release();
        assert_eq!(factory.collect_garbage(), 0);

        let deleted: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteBuffer(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(deleted.len(), 3);
        for name in &names {
            assert!(deleted.contains(name));
        }
    }

    #[test]
    fn released_mesh_has_no_attributes() {
        let factory = Factory::new(Recorder::new());
        let mut mesh = Mesh::new(&factory, &quad()).unwrap();
        let locations = AttributeLocations { position: 0, normal: 1, texcoord: 2 };
        assert_eq!(mesh.attributes(&locations).len(), 3);
        mesh.release();
        assert!(mesh.attributes(&locations).is_empty());
    }

    #[test]
    fn too_many_vertices_for_u16_indices() {
        let factory = Factory::new(Recorder::new());
        let geometry = Geometry {
            vertices: vec![Vertex::default(); 65537],
            ..Geometry::default()
        };
        assert!(matches!(Mesh::new(&factory, &geometry), Err(Error::IndexOverflow(65537))));
    }
}
