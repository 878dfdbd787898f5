//! An OpenGL ES 2.0 render surface for lit, textured parametric shapes.
//!
//! A [`Surface`] owns a [`Context`], a [`Drawable`] display layer and
//! every GPU object needed to draw one of the demonstration [`Shape`]s
//! per frame. GPU objects are reference counted handles whose names are
//! deleted by their [`Factory`] once the last handle is dropped.

#[macro_use]
extern crate log;

mod queue;
pub mod gl;

pub mod buffer;
pub mod config;
pub mod draw_call;
pub mod drawable;
pub mod error;
pub mod factory;
pub mod framebuffer;
pub mod mesh;
pub mod pipeline;
pub mod program;
pub mod record;
pub mod renderbuffer;
pub mod sampler;
pub mod shader;
pub mod shape;
pub mod surface;
pub mod texture;

#[doc(inline)]
pub use buffer::Buffer;

#[doc(inline)]
pub use config::{Config, Lighting};

#[doc(inline)]
pub use draw_call::{DrawCall, Primitive};

#[doc(inline)]
pub use drawable::Drawable;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use factory::Factory;

#[doc(inline)]
pub use framebuffer::Framebuffer;

#[doc(inline)]
pub use gl::{Backend, Context};

#[doc(inline)]
pub use mesh::{Geometry, Mesh, Vertex};

#[doc(inline)]
pub use pipeline::State;

#[doc(inline)]
pub use program::Program;

#[doc(inline)]
pub use record::{Layer, Recorder};

#[doc(inline)]
pub use renderbuffer::Renderbuffer;

#[doc(inline)]
pub use sampler::{Filter, Sampler2, Wrap};

#[doc(inline)]
pub use shape::Shape;

#[doc(inline)]
pub use surface::Surface;

#[doc(inline)]
pub use texture::Texture2;
