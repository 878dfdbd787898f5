//! Framebuffer objects and clear operations.

use crate::queue;
use std::{cmp, fmt, hash, ops};

use crate::renderbuffer::Renderbuffer;

pub(crate) type Id = u32;

/// Specifies whether the color buffer is cleared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClearColor {
    /// Clear to the given color.
    Yes { r: f32, g: f32, b: f32, a: f32 },

    /// Leave the color buffer untouched.
    No,
}

/// Specifies whether the depth buffer is cleared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClearDepth {
    /// Clear to the given depth.
    Yes { z: f32 },

    /// Leave the depth buffer untouched.
    No,
}

/// A single `glClear` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearOp {
    pub color: ClearColor,
    pub depth: ClearDepth,
}

impl ClearOp {
    /// Clears color to `rgba` and depth to the far plane.
    pub fn color_and_depth(rgba: [f32; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Self {
            color: ClearColor::Yes { r, g, b, a },
            depth: ClearDepth::Yes { z: 1.0 },
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

/// A framebuffer object with one color and one depth attachment.
///
/// Holding the attachments keeps their names alive for as long as the
/// framebuffer is.
pub struct Framebuffer {
    /// The OpenGL framebuffer ID.
    id: Id,

    color: Renderbuffer,
    depth: Renderbuffer,

    _destructor: Destructor,
}

impl Framebuffer {
    /// Constructor.
    ///
    /// The caller is responsible for setting up the framebuffer.
    pub(crate) fn new(
        id: Id,
        color: Renderbuffer,
        depth: Renderbuffer,
        tx: queue::Sender<Id>,
    ) -> Self {
        Self {
            id,
            color,
            depth,
            _destructor: Destructor { id, tx },
        }
    }

    /// Returns the OpenGL framebuffer ID.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the color attachment.
    pub fn color(&self) -> &Renderbuffer {
        &self.color
    }

    /// Returns the depth attachment.
    pub fn depth(&self) -> &Renderbuffer {
        &self.depth
    }

    /// Returns the dimensions of the color attachment.
    pub fn dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Framebuffer<'a> {
            id: Id,
            color: &'a Renderbuffer,
            depth: &'a Renderbuffer,
        }

        Framebuffer {
            id: self.id,
            color: &self.color,
            depth: &self.depth,
        }.fmt(f)
    }
}

impl cmp::PartialEq<Self> for Framebuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl cmp::Eq for Framebuffer {}

impl hash::Hash for Framebuffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
