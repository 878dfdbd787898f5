//! GPU-visible pixel container optimized as a render target.

use crate::gl;
use crate::queue;
use std::{cmp, fmt, hash, ops, sync};

pub(crate) type Id = u32;

/// Renderbuffer storage format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// Color storage provided by the display layer.
    Display,

    /// Corresponds to `GL_DEPTH_COMPONENT16`.
    Depth16,
}

impl Format {
    /// Returns the internal format, or `None` when the storage comes from
    /// outside the GL.
    pub(crate) fn as_gl_enum(self) -> Option<u32> {
        match self {
            Format::Display => None,
            Format::Depth16 => Some(gl::DEPTH_COMPONENT16),
        }
    }
}

struct Destructor {
    id: Id,
    tx: queue::Sender<Id>,
}

impl ops::Drop for Destructor {
    fn drop(&mut self) {
        let _ = self.tx.send(self.id);
    }
}

/// Buffer optimized as a render target.
#[derive(Clone)]
pub struct Renderbuffer {
    id: Id,
    width: u32,
    height: u32,
    format: Format,
    _destructor: sync::Arc<Destructor>,
}

impl Renderbuffer {
    /// Constructor.
    pub(crate) fn new(
        id: Id,
        width: u32,
        height: u32,
        format: Format,
        tx: queue::Sender<Id>,
    ) -> Self {
        Self {
            id,
            width,
            height,
            format,
            _destructor: sync::Arc::new(Destructor { id, tx }),
        }
    }

    /// Returns the OpenGL renderbuffer ID.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the storage dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the storage format.
    pub fn format(&self) -> Format {
        self.format
    }
}

impl fmt::Debug for Renderbuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Renderbuffer {
            id: Id,
            width: u32,
            height: u32,
            format: Format,
        }

        Renderbuffer {
            id: self.id,
            width: self.width,
            height: self.height,
            format: self.format,
        }.fmt(f)
    }
}

impl cmp::PartialEq<Self> for Renderbuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl cmp::Eq for Renderbuffer {}

impl hash::Hash for Renderbuffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
