//! Fixed-function pipeline state.

use crate::gl;

/// Specifies depth buffer testing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DepthTest {
    /// Depth testing disabled.
    Off,

    /// Depth test passes if the incoming depth value is less than
    /// the stored depth value.
    #[default]
    LessThan,

    /// Depth test passes if the incoming depth value is less than or
    /// equal to the stored depth value.
    LessThanOrEqual,
}

impl DepthTest {
    pub(crate) fn as_gl_enum_if_enabled(self) -> Option<u32> {
        match self {
            DepthTest::Off => None,
            DepthTest::LessThan => Some(gl::LESS),
            DepthTest::LessThanOrEqual => Some(gl::LEQUAL),
        }
    }
}

/// Specifies the winding order of front facing triangles.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FrontFace {
    /// Front-facing triangles are clockwise wound.
    Clockwise,

    /// Front-facing triangles are counter-clockwise wound.
    #[default]
    CounterClockwise,
}

impl FrontFace {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            FrontFace::Clockwise => gl::CW,
            FrontFace::CounterClockwise => gl::CCW,
        }
    }
}

/// Hardware culling mode.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Culling {
    /// Disable culling.
    ///
    /// Parametric surfaces are open, so both faces are visible by default.
    #[default]
    None,

    /// Cull the front-facing triangles.
    Front,

    /// Cull the back-facing triangles.
    Back,
}

impl Culling {
    pub(crate) fn as_gl_enum_if_enabled(self) -> Option<u32> {
        match self {
            Culling::None => None,
            Culling::Front => Some(gl::FRONT),
            Culling::Back => Some(gl::BACK),
        }
    }
}

/// Fixed-function state parameters.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct State {
    /// Front face winding order.
    pub front_face: FrontFace,

    /// Hardware face culling mode.
    pub culling: Culling,

    /// Hardware depth testing mode.
    pub depth_test: DepthTest,
}
