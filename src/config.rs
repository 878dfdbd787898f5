//! Surface configuration.

use cgmath::Deg;
use std::path::Path;

use crate::pipeline::State;
use crate::sampler::{Filter, Wrap};
use crate::shape::Shape;
use crate::{texture, Error};

/// Light and material constants written each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// Direction towards the light in eye space.
    pub position: [f32; 3],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            ambient: [0.04, 0.04, 0.04, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
            shininess: 10.0,
        }
    }
}

/// Everything a [`Surface`] is built from.
///
/// [`Surface`]: ../surface/struct.Surface.html
#[derive(Clone, Debug)]
pub struct Config {
    /// Color the framebuffer is cleared to each frame.
    pub clear_color: [f32; 4],

    pub lighting: Lighting,

    /// The two textures, in texture index order.
    pub textures: [image::RgbaImage; 2],

    /// Shape drawn until the host selects another.
    pub shape: Shape,

    pub wrap_mode: Wrap,
    pub filter_mode: Filter,
    pub texture_index: usize,

    /// Vertical field of view of the default projection.
    pub field_of_view: Deg<f32>,
    pub near: f32,
    pub far: f32,

    /// Distance from the eye to the shape in the default model-view.
    pub eye_distance: f32,

    pub state: State,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.5, 0.5, 1.0],
            lighting: Lighting::default(),
            textures: [texture::rings(256), texture::checker(256, 8)],
            shape: Shape::default(),
            wrap_mode: Wrap::default(),
            filter_mode: Filter::default(),
            texture_index: 0,
            field_of_view: Deg(60.0),
            near: 1.0,
            far: 20.0,
            eye_distance: 7.0,
            state: State::default(),
        }
    }
}

impl Config {
    /// Replace both textures with decoded image files.
    pub fn load_textures<P: AsRef<Path>>(&mut self, paths: [P; 2]) -> Result<(), Error> {
        let [first, second] = paths;
        self.textures = [texture::load(first)?, texture::load(second)?];
        Ok(())
    }
}
