//! Texture sampling properties.

use crate::gl;

/// Texture filtering mode.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Filter {
    /// Nearest texel.
    Nearest,

    /// Linear filter.
    #[default]
    Linear,

    /// Linear filter between linearly filtered mip levels.
    ///
    /// Falls back to `Linear` on textures without mipmaps.
    Trilinear,
}

impl Filter {
    /// Returns the `GL_TEXTURE_MIN_FILTER` value.
    pub(crate) fn min_gl_enum(self, mipmap: bool) -> u32 {
        match self {
            Filter::Nearest => gl::NEAREST,
            Filter::Linear => gl::LINEAR,
            Filter::Trilinear if mipmap => gl::LINEAR_MIPMAP_LINEAR,
            Filter::Trilinear => gl::LINEAR,
        }
    }

    /// Returns the `GL_TEXTURE_MAG_FILTER` value.
    pub(crate) fn mag_gl_enum(self) -> u32 {
        match self {
            Filter::Nearest => gl::NEAREST,
            Filter::Linear | Filter::Trilinear => gl::LINEAR,
        }
    }
}

/// Texture co-ordinate wrapping mode.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Wrap {
    /// Repeat.
    #[default]
    Repeat,

    /// Clamp to the edge texels.
    ClampToEdge,

    /// Repeat, mirroring every other tile.
    MirroredRepeat,
}

impl Wrap {
    /// Returns the `GL_TEXTURE_WRAP_*` value.
    ///
    /// Textures with a non-power-of-two side only support clamping.
    pub(crate) fn as_gl_enum(self, power_of_two: bool) -> u32 {
        match self {
            _ if !power_of_two => gl::CLAMP_TO_EDGE,
            Wrap::Repeat => gl::REPEAT,
            Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        }
    }
}

/// Sampling properties for a 2D texture.
///
/// ES 2.0 has no sampler objects, so these are written as texture
/// parameters every time the texture is bound.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sampler2 {
    /// Specifies the filter for both minification and magnification.
    ///
    /// Default: `Linear`.
    pub filter: Filter,

    /// Specifies the wrapping mode for the S axis.
    ///
    /// Default: `Repeat`.
    pub wrap_s: Wrap,

    /// Specifies the wrapping mode for the T axis.
    ///
    /// Default: `Repeat`.
    pub wrap_t: Wrap,
}

impl Sampler2 {
    /// Same wrapping mode on both axes.
    pub fn new(wrap: Wrap, filter: Filter) -> Self {
        Self {
            filter,
            wrap_s: wrap,
            wrap_t: wrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trilinear_needs_mipmaps() {
        assert_eq!(Filter::Trilinear.min_gl_enum(true), gl::LINEAR_MIPMAP_LINEAR);
        assert_eq!(Filter::Trilinear.min_gl_enum(false), gl::LINEAR);
        assert_eq!(Filter::Trilinear.mag_gl_enum(), gl::LINEAR);
    }

    #[test]
    fn non_power_of_two_textures_clamp() {
        assert_eq!(Wrap::Repeat.as_gl_enum(true), gl::REPEAT);
        assert_eq!(Wrap::MirroredRepeat.as_gl_enum(true), gl::MIRRORED_REPEAT);
        for wrap in [Wrap::Repeat, Wrap::ClampToEdge, Wrap::MirroredRepeat] {
            assert_eq!(wrap.as_gl_enum(false), gl::CLAMP_TO_EDGE);
        }
    }

    #[test]
    fn sampler_uses_one_wrap_mode_for_both_axes() {
        let sampler = Sampler2::new(Wrap::MirroredRepeat, Filter::Nearest);
        assert_eq!(sampler.wrap_s, Wrap::MirroredRepeat);
        assert_eq!(sampler.wrap_t, Wrap::MirroredRepeat);
        assert_eq!(Sampler2::default(), Sampler2::new(Wrap::Repeat, Filter::Linear));
    }
}
