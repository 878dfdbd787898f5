use thiserror::Error;

use crate::program;

/// Failures raised while setting up GPU resources.
///
/// Nothing per-frame is fallible; every variant means the surface never
/// became ready (or was torn down on resize).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind:?} shader failed to compile: {log}")]
    Compile { kind: program::Kind, log: String },

    #[error("program failed to link: {0}")]
    Link(String),

    #[error("program has no active `{0}`")]
    MissingLocation(&'static str),

    #[error("framebuffer incomplete (status 0x{0:x})")]
    IncompleteFramebuffer(u32),

    #[error("display layer refused color storage: {0}")]
    Storage(String),

    #[error("failed to load texture: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0} vertices exceed the 16-bit index range")]
    IndexOverflow(usize),
}
