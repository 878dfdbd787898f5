//! Factory.

use crate::buffer;
use crate::framebuffer;
use crate::gl::{self, Context};
use crate::program;
use crate::renderbuffer;
use crate::texture;
use std::ffi;

use crate::buffer::Accessor;
use crate::draw_call::DrawCall;
use crate::drawable::Drawable;
use crate::framebuffer::{ClearColor, ClearDepth, ClearOp, Framebuffer};
use crate::pipeline::State;
use crate::program::{Destroyed, SamplerBinding};
use crate::queue::Queue;
use crate::renderbuffer::Renderbuffer;
use crate::{Buffer, Error, Program, Texture2};

/// A vertex attribute location paired with the data that feeds it.
pub type Attribute = (u32, Accessor);

/// OpenGL memory manager.
///
/// Handles created by the factory return their names to it when the last
/// clone is dropped; the names are deleted on the next call to
/// [`collect_garbage`](#method.collect_garbage).
pub struct Factory<C> {
    /// The OpenGL backend.
    context: C,

    /// Destroyed buffers arrive here to be deleted.
    buffer_queue: Queue<buffer::Id>,

    /// Destroyed textures arrive here to be deleted.
    texture_queue: Queue<texture::Id>,

    /// Destroyed renderbuffers arrive here to be deleted.
    renderbuffer_queue: Queue<renderbuffer::Id>,

    /// Destroyed framebuffers arrive here to be deleted.
    framebuffer_queue: Queue<framebuffer::Id>,

    /// Destroyed GLSL shader objects and programs arrive here to be deleted.
    program_queue: Queue<Destroyed>,
}

impl<C: Context> Factory<C> {
    /// Constructor.
    pub fn new(context: C) -> Self {
        Self {
            context,
            buffer_queue: Queue::new(),
            texture_queue: Queue::new(),
            renderbuffer_queue: Queue::new(),
            framebuffer_queue: Queue::new(),
            program_queue: Queue::new(),
        }
    }

    /// Returns the OpenGL backend.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Clear the attachments of a framebuffer with a single `glClear`.
    pub fn clear(&self, framebuffer: &Framebuffer, op: ClearOp) {
        self.context.bind_framebuffer(framebuffer.id());
        let mut ops = 0;
        match op.color {
            ClearColor::Yes { r, g, b, a } => {
                self.context.clear_color(r, g, b, a);
                ops |= gl::COLOR_BUFFER_BIT;
            }
            ClearColor::No => {}
        }
        match op.depth {
            ClearDepth::Yes { z } => {
                self.context.clear_depth(z);
                ops |= gl::DEPTH_BUFFER_BIT;
            }
            ClearDepth::No => {}
        }
        self.context.clear(ops);
    }

    /// Apply fixed-function state and a viewport covering the whole
    /// framebuffer.
    pub fn apply_state(&self, framebuffer: &Framebuffer, state: &State) {
        let (w, h) = framebuffer.dimensions();
        self.context.viewport(0, 0, w, h);
        if let Some(face) = state.culling.as_gl_enum_if_enabled() {
            self.context.enable(gl::CULL_FACE);
            self.context.cull_face(face);
            self.context.front_face(state.front_face.as_gl_enum());
        } else {
            self.context.disable(gl::CULL_FACE);
        }
        if let Some(func) = state.depth_test.as_gl_enum_if_enabled() {
            self.context.enable(gl::DEPTH_TEST);
            self.context.depth_func(func);
        } else {
            self.context.disable(gl::DEPTH_TEST);
        }
    }

    /// Create an empty GPU buffer.
    pub fn buffer(&self, kind: buffer::Kind) -> Buffer {
        let id = self.context.gen_buffer();
        debug!("created buffer {} ({:?})", id, kind);
        Buffer::new(id, kind, self.buffer_queue.tx())
    }

    /// Upload the contents of a [`Buffer`].
    ///
    /// [`Buffer`]: buffer/struct.Buffer.html
    pub fn initialize_buffer<T: bytemuck::Pod>(&self, buffer: &mut Buffer, data: &[T]) {
        let target = buffer.kind().as_gl_enum();
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.context.bind_buffer(target, buffer.id());
        self.context.buffer_data(target, bytes, gl::STATIC_DRAW);
        self.context.bind_buffer(target, 0);
        buffer.set_size(bytes.len());
    }

    /// Compile GLSL shader code into a shader object.
    pub fn shader(
        &self,
        kind: program::Kind,
        source: &str,
    ) -> Result<program::Object, Error> {
        let id = self.context.create_shader(kind.as_gl_enum());
        let object = program::Object::new(id, kind, self.program_queue.tx());
        self.context.shader_source(id, source);
        if !self.context.compile_shader(id) {
            let log = self.context.shader_info_log(id);
            error!("{:?} shader {} failed to compile: {}", kind, id, log);
            return Err(Error::Compile { kind, log });
        }
        Ok(object)
    }

    /// Link GLSL objects to create a GLSL program.
    pub fn program(
        &self,
        vertex: &program::Object,
        fragment: &program::Object,
    ) -> Result<Program, Error> {
        let id = self.context.create_program();
        let program = Program::new(id, self.program_queue.tx());
        self.context.attach_shader(id, vertex.id());
        self.context.attach_shader(id, fragment.id());
        if !self.context.link_program(id) {
            let log = self.context.program_info_log(id);
            error!("program {} failed to link: {}", id, log);
            return Err(Error::Link(log));
        }
        debug!("linked program {}", id);
        Ok(program)
    }

    /// Retrieves the location of a named vertex attribute.
    pub fn query_attrib_location(
        &self,
        program: &Program,
        name: &ffi::CStr,
    ) -> Option<u32> {
        match self.context.get_attrib_location(program.id(), name) {
            x if x < 0 => None,
            x => Some(x as u32),
        }
    }

    /// Retrieves the location of a named uniform.
    pub fn query_uniform_location(
        &self,
        program: &Program,
        name: &ffi::CStr,
    ) -> Option<u32> {
        match self.context.get_uniform_location(program.id(), name) {
            x if x < 0 => None,
            x => Some(x as u32),
        }
    }

    /// Create a 2D texture from RGBA8 pixels.
    ///
    /// Mipmaps are generated when both sides are powers of two.
    pub fn texture2(&self, image: &image::RgbaImage) -> Texture2 {
        let (width, height) = image.dimensions();
        let mipmap = texture::is_power_of_two(width, height);
        let id = self.context.gen_texture();
        let tx = self.texture_queue.tx();
        self.context.bind_texture(gl::TEXTURE_2D, id);
        self.context.tex_image_2d(
            gl::TEXTURE_2D,
            gl::RGBA,
            width,
            height,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            image.as_raw(),
        );
        if mipmap {
            self.context.generate_mipmap(gl::TEXTURE_2D);
        }
        self.context.bind_texture(gl::TEXTURE_2D, 0);
        debug!("created texture {} ({}x{}, mipmap: {})", id, width, height, mipmap);
        Texture2::new(id, width, height, mipmap, tx)
    }

    /// Create a depth renderbuffer.
    pub fn depth_renderbuffer(&self, width: u32, height: u32) -> Renderbuffer {
        let format = renderbuffer::Format::Depth16;
        let id = self.context.gen_renderbuffer();
        let renderbuffer = Renderbuffer::new(id, width, height, format, self.renderbuffer_queue.tx());
        self.context.bind_renderbuffer(id);
        if let Some(internal) = format.as_gl_enum() {
            self.context.renderbuffer_storage(internal, width, height);
        }
        renderbuffer
    }

    /// Create a color renderbuffer whose storage is owned by the display
    /// layer.
    ///
    /// The renderbuffer is left bound.
    pub fn color_renderbuffer<D: Drawable>(
        &self,
        drawable: &mut D,
        width: u32,
        height: u32,
    ) -> Result<Renderbuffer, Error> {
        let id = self.context.gen_renderbuffer();
        let renderbuffer = Renderbuffer::new(
            id,
            width,
            height,
            renderbuffer::Format::Display,
            self.renderbuffer_queue.tx(),
        );
        self.context.bind_renderbuffer(id);
        drawable.allocate_color_storage(width, height)?;
        Ok(renderbuffer)
    }

    /// Create a framebuffer rendering into the given attachments.
    pub fn framebuffer(
        &self,
        color: Renderbuffer,
        depth: Renderbuffer,
    ) -> Result<Framebuffer, Error> {
        let id = self.context.gen_framebuffer();
        self.context.bind_framebuffer(id);
        self.context.framebuffer_renderbuffer(gl::COLOR_ATTACHMENT0, color.id());
        self.context.framebuffer_renderbuffer(gl::DEPTH_ATTACHMENT, depth.id());
        let framebuffer = Framebuffer::new(id, color, depth, self.framebuffer_queue.tx());
        match self.context.check_framebuffer_status() {
            gl::FRAMEBUFFER_COMPLETE => {
                debug!("created framebuffer {:?}", framebuffer);
                Ok(framebuffer)
            }
            status => {
                error!("framebuffer {} incomplete: 0x{:x}", id, status);
                Err(Error::IncompleteFramebuffer(status))
            }
        }
    }

    /// Bind a program for subsequent uniform writes and draw calls.
    pub fn use_program(&self, program: &Program) {
        self.context.use_program(program.id());
    }

    /// Bind textures to consecutive texture units, writing their sampling
    /// parameters and sampler uniforms.
    ///
    /// The program owning the sampler uniforms must be in use.
    pub fn bind_samplers(&self, samplers: &[SamplerBinding]) {
        for (unit, binding) in samplers.iter().enumerate() {
            let unit = unit as u32;
            let texture = binding.texture;
            let sampler = &binding.sampler;
            self.context.active_texture(unit);
            self.context.bind_texture(gl::TEXTURE_2D, texture.id());
            self.context.tex_parameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_S,
                sampler.wrap_s.as_gl_enum(texture.power_of_two()),
            );
            self.context.tex_parameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_T,
                sampler.wrap_t.as_gl_enum(texture.power_of_two()),
            );
            self.context.tex_parameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_MIN_FILTER,
                sampler.filter.min_gl_enum(texture.mipmap()),
            );
            self.context.tex_parameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_MAG_FILTER,
                sampler.filter.mag_gl_enum(),
            );
            self.context.uniform_1i(binding.location, unit as i32);
        }
    }

    /// Point vertex attributes at their buffers.
    pub fn bind_attributes(&self, attributes: &[Attribute]) {
        for (location, accessor) in attributes {
            self.context.bind_buffer(gl::ARRAY_BUFFER, accessor.buffer().id());
            self.context.enable_vertex_attrib_array(*location);
            self.context.vertex_attrib_pointer(
                *location,
                accessor.components(),
                gl::FLOAT,
                false,
                accessor.stride(),
                accessor.offset(),
            );
        }
    }

    /// Disable vertex attributes enabled by `bind_attributes`.
    pub fn unbind_attributes(&self, attributes: &[Attribute]) {
        for (location, _) in attributes {
            self.context.disable_vertex_attrib_array(*location);
        }
        self.context.bind_buffer(gl::ARRAY_BUFFER, 0);
    }

    /// Perform an indexed draw call.
    pub fn draw(&self, indices: &Buffer, draw_call: &DrawCall) {
        self.context.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, indices.id());
        self.context.draw_elements(
            draw_call.primitive.as_gl_enum(),
            draw_call.count,
            gl::UNSIGNED_SHORT,
            draw_call.offset,
        );
    }

    /// Returns `true` if some dropped object is waiting to be deleted.
    pub fn has_garbage(&self) -> bool {
        !(self.framebuffer_queue.is_empty()
            && self.renderbuffer_queue.is_empty()
            && self.texture_queue.is_empty()
            && self.buffer_queue.is_empty()
            && self.program_queue.is_empty())
    }

    /// Delete every object whose last handle has been dropped.
    ///
    /// Returns the number of objects deleted.
    pub fn collect_garbage(&self) -> usize {
        let mut count = 0;
        while let Some(id) = self.framebuffer_queue.next() {
            debug!("deleting framebuffer {}", id);
            self.context.delete_framebuffer(id);
            count += 1;
        }
        while let Some(id) = self.renderbuffer_queue.next() {
            debug!("deleting renderbuffer {}", id);
            self.context.delete_renderbuffer(id);
            count += 1;
        }
        while let Some(id) = self.texture_queue.next() {
            debug!("deleting texture {}", id);
            self.context.delete_texture(id);
            count += 1;
        }
        while let Some(id) = self.buffer_queue.next() {
            debug!("deleting buffer {}", id);
            self.context.delete_buffer(id);
            count += 1;
        }
        while let Some(item) = self.program_queue.next() {
            match item {
                Destroyed::Object(id) => {
                    debug!("deleting shader {}", id);
                    self.context.delete_shader(id);
                }
                Destroyed::Program(id) => {
                    debug!("deleting program {}", id);
                    self.context.delete_program(id);
                }
            }
            count += 1;
        }
        count
    }
}
