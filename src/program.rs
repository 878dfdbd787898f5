//! GLSL programs.

use crate::gl;
use crate::queue;
use std::{cmp, fmt, hash, ops, sync};

use crate::sampler::Sampler2;
use crate::texture::Texture2;

/// Specifies the maximum number of samplers permitted by the crate.
pub const MAX_SAMPLERS: usize = 2;

/// Shader stage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Corresponds to `GL_VERTEX_SHADER`.
    Vertex,

    /// Corresponds to `GL_FRAGMENT_SHADER`.
    Fragment,
}

impl Kind {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Kind::Vertex => gl::VERTEX_SHADER,
            Kind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// Specifies whether the destroyed item was an object or a program.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Destroyed {
    /// A shader object.
    Object(u32),

    /// A compiled and linked program.
    Program(u32),
}

/// Pushes the shader/program ID onto the factory program queue when
/// destroyed.
struct Destructor {
    item: Destroyed,
    tx: queue::Sender<Destroyed>,
}

impl ops::Drop for Destructor {
    fn drop(&mut self) {
        let _ = self.tx.send(self.item);
    }
}

/// A compiled shader object.
///
/// Objects are only needed until the program they are attached to has
/// been linked.
pub struct Object {
    id: u32,
    kind: Kind,
    _destructor: Destructor,
}

impl Object {
    pub(crate) fn new(id: u32, kind: Kind, tx: queue::Sender<Destroyed>) -> Self {
        Self {
            id,
            kind,
            _destructor: Destructor { item: Destroyed::Object(id), tx },
        }
    }

    /// Returns the GLSL shader ID.
    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// Returns the shader stage.
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Object(u32, Kind);

        Object(self.id, self.kind).fmt(f)
    }
}

/// A texture plus the sampling properties to apply when binding it.
#[derive(Clone, Copy, Debug)]
pub struct SamplerBinding<'a> {
    /// Location of the `sampler2D` uniform.
    pub location: u32,

    /// The texture to bind.
    pub texture: &'a Texture2,

    /// Texture parameters written at bind time.
    pub sampler: Sampler2,
}

/// A compiled and linked shader program.
#[derive(Clone)]
pub struct Program {
    /// The OpenGL program ID.
    id: u32,

    /// Returns the program back to the factory upon destruction.
    _destructor: sync::Arc<Destructor>,
}

impl Program {
    /// Constructor.
    pub(crate) fn new(
        id: u32,
        tx: queue::Sender<Destroyed>,
    ) -> Self {
        Self {
            id,
            _destructor: sync::Arc::new(
                Destructor {
                    item: Destroyed::Program(id),
                    tx,
                },
            ),
        }
    }

    /// Returns the GLSL program ID.
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl cmp::Eq for Program {}

impl cmp::PartialEq<Self> for Program {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Program(u32);

        Program(self.id).fmt(f)
    }
}

impl hash::Hash for Program {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
