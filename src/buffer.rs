//! Vertex and index buffers.

use crate::gl;
use crate::queue;
use std::{cmp, fmt, hash, ops, sync};

/// OpenGL buffer ID type.
pub(crate) type Id = u32;

/// Binding target of a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// Interleaved vertex data, `GL_ARRAY_BUFFER`.
    Array,

    /// 16-bit vertex indices, `GL_ELEMENT_ARRAY_BUFFER`.
    Index,
}

impl Kind {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Kind::Array => gl::ARRAY_BUFFER,
            Kind::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Sends the buffer name to the factory when the last clone drops.
pub(crate) struct Destructor {
    id: Id,
    tx: queue::Sender<Id>,
}

impl ops::Drop for Destructor {
    fn drop(&mut self) {
        let _ = self.tx.send(self.id);
    }
}

/// A GPU buffer holding data uploaded once with `GL_STATIC_DRAW`.
///
/// Clones share the same GL name.
#[derive(Clone)]
pub struct Buffer {
    id: Id,
    kind: Kind,

    /// Bytes uploaded so far.
    size: usize,

    _destructor: sync::Arc<Destructor>,
}

impl Buffer {
    pub(crate) fn new(id: Id, kind: Kind, tx: queue::Sender<Id>) -> Self {
        Self {
            _destructor: sync::Arc::new(Destructor { id, tx }),
            id,
            kind,
            size: 0,
        }
    }

    /// Returns the OpenGL buffer ID.
    pub fn id(&self) -> Id {
        self.id
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the number of bytes uploaded.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl cmp::PartialEq<Self> for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl cmp::Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .finish()
    }
}

impl hash::Hash for Buffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A float vertex attribute read out of an interleaved [`Buffer`].
///
/// [`Buffer`]: struct.Buffer.html
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accessor {
    buffer: Buffer,

    /// Number of `f32` components per vertex, between one and four.
    components: u32,

    /// Bytes from the start of a vertex to the attribute.
    offset: usize,

    /// Bytes between consecutive vertices.
    stride: usize,
}

impl Accessor {
    pub fn new(buffer: Buffer, components: u32, offset: usize, stride: usize) -> Self {
        debug_assert!((1..=4).contains(&components));
        Self {
            buffer,
            components,
            offset,
            stride,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Queue;

    #[test]
    fn name_is_returned_after_the_last_clone() {
        let queue = Queue::new();
        let buffer = Buffer::new(7, Kind::Array, queue.tx());
        let clone = buffer.clone();
        drop(buffer);
        assert!(queue.is_empty());
        drop(clone);
        assert_eq!(queue.next(), Some(7));
        assert!(queue.is_empty());
    }

    #[test]
    fn accessors_share_their_buffer() {
        let queue = Queue::new();
        let buffer = Buffer::new(3, Kind::Array, queue.tx());
        let normal = Accessor::new(buffer.clone(), 3, 12, 32);
        drop(buffer);
        assert_eq!(normal.buffer().id(), 3);
        assert!(queue.is_empty());
        drop(normal);
        assert_eq!(queue.next(), Some(3));
    }
}
