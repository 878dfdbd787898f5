//! Draw call dispatch.

use crate::gl;

/// Primitive topology.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
    /// List of triangle points.
    Triangles,

    /// List of line segments.
    Lines,
}

impl Primitive {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Primitive::Triangles => gl::TRIANGLES,
            Primitive::Lines => gl::LINES,
        }
    }
}

/// An indexed draw call command.
///
/// Indices are always unsigned 16-bit integers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DrawCall {
    /// Byte offset into the index buffer where the elements begin.
    pub offset: usize,

    /// Number of elements to draw.
    pub count: usize,

    /// The primitive topology.
    pub primitive: Primitive,
}
