//! A render surface drawing one lit, textured shape per frame.

use arrayvec::ArrayVec;
use cgmath::{Deg, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use crate::config::{Config, Lighting};
use crate::drawable::Drawable;
use crate::factory::Factory;
use crate::framebuffer::{ClearOp, Framebuffer};
use crate::gl::Context;
use crate::mesh::Mesh;
use crate::pipeline::State;
use crate::program::{SamplerBinding, MAX_SAMPLERS};
use crate::sampler::{Filter, Sampler2, Wrap};
use crate::shader::{self, Locations};
use crate::shape::Shape;
use crate::{Error, Program, Texture2};

/// GPU objects that live exactly as long as the surface is ready.
struct Scene {
    /// Absent only while a resize swaps the attachments.
    framebuffer: Option<Framebuffer>,
    program: Program,
    locations: Locations,
    textures: [Texture2; 2],
}

/// Owns a context, a display layer and everything needed to draw the
/// demonstration shapes into it.
///
/// A surface is ready from construction until [`cleanup`], which also
/// runs on drop. Rendering after cleanup does nothing.
///
/// [`cleanup`]: #method.cleanup
pub struct Surface<C: Context, D: Drawable> {
    factory: Factory<C>,
    drawable: D,
    scene: Option<Scene>,

    /// One mesh per shape, in `Shape::ALL` order.
    meshes: Vec<Mesh>,

    shape: Shape,
    wrap_mode: Wrap,
    filter_mode: Filter,
    texture_index: usize,
    model_view: Matrix4<f32>,
    projection: Matrix4<f32>,

    clear_color: [f32; 4],
    lighting: Lighting,
    state: State,
    field_of_view: Deg<f32>,
    near: f32,
    far: f32,
}

impl<C: Context, D: Drawable> Surface<C, D> {
    /// Build every GPU object the surface needs.
    ///
    /// On failure everything created so far is deleted again.
    pub fn new(context: C, mut drawable: D, config: Config) -> Result<Self, Error> {
        let factory = Factory::new(context);
        let (width, height) = drawable.dimensions();
        info!("setting up {}x{} surface", width, height);

        let built = Scene::new(&factory, &mut drawable, &config).and_then(|scene| {
            let meshes = Shape::ALL
                .iter()
                .map(|shape| Mesh::new(&factory, &shape.geometry()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((scene, meshes))
        });
        let (scene, meshes) = match built {
            Ok(built) => built,
            Err(error) => {
                error!("surface setup failed: {}", error);
                factory.collect_garbage();
                return Err(error);
            }
        };

        // Shader objects are no longer needed once linked.
        factory.collect_garbage();

        Ok(Self {
            factory,
            drawable,
            scene: Some(scene),
            meshes,
            shape: config.shape,
            wrap_mode: config.wrap_mode,
            filter_mode: config.filter_mode,
            texture_index: config.texture_index,
            model_view: Matrix4::from_translation(Vector3::new(0.0, 0.0, -config.eye_distance)),
            projection: perspective(config.field_of_view, width, height, config.near, config.far),
            clear_color: config.clear_color,
            lighting: config.lighting,
            state: config.state,
            field_of_view: config.field_of_view,
            near: config.near,
            far: config.far,
        })
    }

    /// Draw the current shape and present it.
    pub fn render(&mut self) {
        let scene = match self.scene.as_ref() {
            Some(scene) => scene,
            None => {
                warn!("render called on a surface that was cleaned up");
                return;
            }
        };
        let framebuffer = match scene.framebuffer.as_ref() {
            Some(framebuffer) => framebuffer,
            None => return,
        };
        if self.factory.has_garbage() {
            self.factory.collect_garbage();
        }

        self.factory.apply_state(framebuffer, &self.state);
        self.factory.clear(framebuffer, ClearOp::color_and_depth(self.clear_color));
        self.factory.use_program(&scene.program);

        let gl = self.factory.context();
        let locations = &scene.locations;
        let projection: [[f32; 4]; 4] = self.projection.into();
        let model_view: [[f32; 4]; 4] = self.model_view.into();
        let normal: [[f32; 3]; 3] = normal_matrix(&self.model_view).into();
        gl.uniform_matrix_4f(locations.projection, &bytemuck::cast(projection));
        gl.uniform_matrix_4f(locations.model_view, &bytemuck::cast(model_view));
        gl.uniform_matrix_3f(locations.normal_matrix, &bytemuck::cast(normal));
        gl.uniform_3f(locations.light_position, self.lighting.position);
        gl.uniform_4f(locations.ambient, self.lighting.ambient);
        gl.uniform_4f(locations.diffuse, self.lighting.diffuse);
        gl.uniform_4f(locations.specular, self.lighting.specular);
        gl.uniform_1f(locations.shininess, self.lighting.shininess);

        // Wrap and filter modes are read here, at bind time, every frame.
        let sampler = Sampler2::new(self.wrap_mode, self.filter_mode);
        let first = self.texture_index % scene.textures.len();
        let mut samplers: ArrayVec<SamplerBinding, MAX_SAMPLERS> = ArrayVec::new();
        for (slot, index) in [first, 1 - first].into_iter().enumerate() {
            samplers.push(SamplerBinding {
                location: locations.samplers[slot],
                texture: &scene.textures[index],
                sampler,
            });
        }
        self.factory.bind_samplers(&samplers);

        let mesh = &self.meshes[self.shape.index()];
        let attributes = mesh.attributes(&locations.attributes);
        self.factory.bind_attributes(&attributes);
        if let (Some(lines), Some(triangles)) = (mesh.line_indices(), mesh.triangle_indices()) {
            self.factory.draw(lines, &mesh.lines());
            self.factory.draw(triangles, &mesh.triangles());
        }
        self.factory.unbind_attributes(&attributes);

        gl.bind_renderbuffer(framebuffer.color().id());
        self.drawable.present();
    }

    /// Recreate the framebuffer attachments at the drawable's current
    /// size and reset the projection to its aspect ratio.
    ///
    /// The program, textures and meshes are kept. If the attachments
    /// cannot be recreated the surface is cleaned up.
    pub fn resize(&mut self) -> Result<(), Error> {
        let (width, height) = self.drawable.dimensions();
        let scene = match self.scene.as_mut() {
            Some(scene) => scene,
            None => return Ok(()),
        };
        let current = scene.framebuffer.as_ref().map(Framebuffer::dimensions);
        if current == Some((width, height)) {
            return Ok(());
        }
        info!("resizing surface to {}x{}", width, height);

        // The display layer backs one color renderbuffer at a time.
        scene.framebuffer = None;
        self.factory.collect_garbage();

        match targets(&self.factory, &mut self.drawable, width, height) {
            Ok(framebuffer) => {
                scene.framebuffer = Some(framebuffer);
                self.projection = perspective(self.field_of_view, width, height, self.near, self.far);
                Ok(())
            }
            Err(error) => {
                error!("resize failed: {}", error);
                self.cleanup();
                Err(error)
            }
        }
    }

    /// Delete the framebuffer attachments, textures, program and every
    /// mesh's buffers.
    ///
    /// Must run while the context is still alive. Later calls do nothing.
    pub fn cleanup(&mut self) {
        let scene = match self.scene.take() {
            Some(scene) => scene,
            None => return,
        };
        info!("cleaning up surface");
        drop(scene);
        for mesh in &mut self.meshes {
            mesh.release();
        }
        let deleted = self.factory.collect_garbage();
        debug!("deleted {} objects", deleted);
    }

    /// Select the shape drawn from the next frame on.
    pub fn set_current_surface(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn current_surface(&self) -> Shape {
        self.shape
    }

    /// Takes effect at the next texture bind.
    pub fn set_wrap_mode(&mut self, wrap_mode: Wrap) {
        self.wrap_mode = wrap_mode;
    }

    pub fn wrap_mode(&self) -> Wrap {
        self.wrap_mode
    }

    /// Takes effect at the next texture bind.
    pub fn set_filter_mode(&mut self, filter_mode: Filter) {
        self.filter_mode = filter_mode;
    }

    pub fn filter_mode(&self) -> Filter {
        self.filter_mode
    }

    /// Selects which texture is bound to unit 0; the other goes to unit 1.
    ///
    /// Taken modulo the number of textures.
    pub fn set_texture_index(&mut self, texture_index: usize) {
        self.texture_index = texture_index;
    }

    pub fn texture_index(&self) -> usize {
        self.texture_index
    }

    pub fn set_model_view(&mut self, model_view: Matrix4<f32>) {
        self.model_view = model_view;
    }

    pub fn model_view(&self) -> Matrix4<f32> {
        self.model_view
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// Returns `true` until the surface has been cleaned up.
    pub fn is_ready(&self) -> bool {
        self.scene.is_some()
    }

    /// Returns the mesh drawn for a shape.
    pub fn mesh(&self, shape: Shape) -> &Mesh {
        &self.meshes[shape.index()]
    }

    /// Returns the framebuffer being rendered to, if ready.
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.scene.as_ref().and_then(|scene| scene.framebuffer.as_ref())
    }

    /// Returns the shader program, if ready.
    pub fn program(&self) -> Option<&Program> {
        self.scene.as_ref().map(|scene| &scene.program)
    }

    /// Returns the textures in texture index order, if ready.
    pub fn textures(&self) -> Option<&[Texture2; 2]> {
        self.scene.as_ref().map(|scene| &scene.textures)
    }

    pub fn drawable(&self) -> &D {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut D {
        &mut self.drawable
    }
}

impl<C: Context, D: Drawable> Drop for Surface<C, D> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl Scene {
    fn new<C: Context, D: Drawable>(
        factory: &Factory<C>,
        drawable: &mut D,
        config: &Config,
    ) -> Result<Self, Error> {
        let (width, height) = drawable.dimensions();
        let framebuffer = targets(factory, drawable, width, height)?;
        let (program, locations) = shader::build(factory)?;
        let textures = [
            factory.texture2(&config.textures[0]),
            factory.texture2(&config.textures[1]),
        ];
        Ok(Self {
            framebuffer: Some(framebuffer),
            program,
            locations,
            textures,
        })
    }
}

/// Depth buffer, then color buffer, then the framebuffer joining them.
///
/// The color renderbuffer is left bound, ready to present.
fn targets<C: Context, D: Drawable>(
    factory: &Factory<C>,
    drawable: &mut D,
    width: u32,
    height: u32,
) -> Result<Framebuffer, Error> {
    let depth = factory.depth_renderbuffer(width, height);
    let color = factory.color_renderbuffer(drawable, width, height)?;
    let color_id = color.id();
    let framebuffer = factory.framebuffer(color, depth)?;
    factory.context().bind_renderbuffer(color_id);
    Ok(framebuffer)
}

fn perspective(field_of_view: Deg<f32>, width: u32, height: u32, near: f32, far: f32) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    cgmath::perspective(field_of_view, aspect, near, far)
}

/// Inverse transpose of the upper 3x3 of the model-view.
fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(
        model_view.x.truncate(),
        model_view.y.truncate(),
        model_view.z.truncate(),
    );
    upper.invert().map(|inverse| inverse.transpose()).unwrap_or(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Rad;

    #[test]
    fn normal_matrix_of_a_rotation_is_the_rotation() {
        let rotation = Matrix4::from_angle_y(Rad(0.7));
        let normal = normal_matrix(&(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)) * rotation));
        let normal: [[f32; 3]; 3] = normal.into();
        let expected: [[f32; 3]; 3] = Matrix3::from_angle_y(Rad(0.7)).into();
        for (a, b) in normal.iter().flatten().zip(expected.iter().flatten()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let scale = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let normal = normal_matrix(&scale);
        assert!((normal.x.x - 0.5).abs() < 1e-6);
        assert!((normal.y.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_height_does_not_divide_by_zero() {
        let projection = perspective(Deg(60.0), 320, 0, 1.0, 20.0);
        assert!(projection.x.x.is_finite());
    }
}
