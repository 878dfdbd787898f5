//! A recording stand-in for a real OpenGL ES context and display layer.
//!
//! Every call is appended to a shared log so that the exact sequence a
//! surface issues can be inspected without a GPU.

use std::{cell, collections, ffi, rc};

use crate::drawable::Drawable;
use crate::gl::{self, Context};
use crate::Error;

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Clear(u32),
    ClearColor([f32; 4]),
    ClearDepth(f32),
    Enable(u32),
    Disable(u32),
    CullFace(u32),
    FrontFace(u32),
    DepthFunc(u32),
    Viewport { x: u32, y: u32, w: u32, h: u32 },
    GenBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer { target: u32, id: u32 },
    BufferData { target: u32, len: usize, usage: u32 },
    VertexAttribPointer { index: u32, size: u32, ty: u32, stride: usize, offset: usize },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    GenRenderbuffer(u32),
    DeleteRenderbuffer(u32),
    BindRenderbuffer(u32),
    RenderbufferStorage { format: u32, width: u32, height: u32 },
    GenFramebuffer(u32),
    DeleteFramebuffer(u32),
    BindFramebuffer(u32),
    FramebufferRenderbuffer { attachment: u32, renderbuffer: u32 },
    CheckFramebufferStatus,
    CreateShader { ty: u32, id: u32 },
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    GetAttribLocation(String),
    GetUniformLocation(String),
    Uniform1i { location: u32, value: i32 },
    Uniform1f { location: u32, value: f32 },
    Uniform3f { location: u32, value: [f32; 3] },
    Uniform4f { location: u32, value: [f32; 4] },
    UniformMatrix3f { location: u32, value: [f32; 9] },
    UniformMatrix4f { location: u32, value: [f32; 16] },
    GenTexture(u32),
    DeleteTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, id: u32 },
    TexParameteri { target: u32, param: u32, value: u32 },
    TexImage2D { width: u32, height: u32, len: usize },
    GenerateMipmap(u32),
    DrawElements { mode: u32, count: usize, ty: u32, offset: usize },
    ColorStorage { width: u32, height: u32 },
    Present,
}

/// A setup step the recorder can be told to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Failure {
    /// `glCompileShader` reports failure for shaders of this type.
    Compile(u32),

    /// `glLinkProgram` reports failure.
    Link,

    /// `glCheckFramebufferStatus` reports an incomplete framebuffer.
    Framebuffer,

    /// The display layer refuses color storage.
    Storage,

    /// The named attribute or uniform is inactive.
    Location(&'static str),
}

#[derive(Default)]
struct Log {
    calls: Vec<Call>,
    next_id: u32,
    locations: collections::HashMap<String, i32>,
    failures: Vec<Failure>,
    dimensions: (u32, u32),
}

impl Log {
    fn gen(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn location(&mut self, name: &ffi::CStr) -> i32 {
        let name = name.to_string_lossy().into_owned();
        let inactive = self.failures.iter().any(|failure| {
            matches!(failure, Failure::Location(missing) if *missing == name)
        });
        if inactive {
            return -1;
        }
        let next = self.locations.len() as i32;
        *self.locations.entry(name).or_insert(next)
    }
}

/// A `Context` that records instead of rendering.
///
/// Clones share the same log, so a test can keep one clone while the
/// surface owns another.
#[derive(Clone, Default)]
pub struct Recorder {
    log: rc::Rc<cell::RefCell<Log>>,
}

impl Recorder {
    /// Constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a setup step fail from now on.
    pub fn fail(&self, failure: Failure) {
        self.log.borrow_mut().failures.push(failure);
    }

    /// Returns a display layer of the given size sharing this log.
    pub fn layer(&self, width: u32, height: u32) -> Layer {
        self.log.borrow_mut().dimensions = (width, height);
        Layer { log: self.log.clone() }
    }

    /// Returns a copy of every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().calls.clone()
    }

    /// Returns the calls recorded so far and starts a fresh log.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut self.log.borrow_mut().calls)
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().calls.push(call);
    }

    fn gen(&self, call: fn(u32) -> Call) -> u32 {
        let id = self.log.borrow_mut().gen();
        self.push(call(id));
        id
    }

    fn fails(&self, failure: Failure) -> bool {
        self.log.borrow().failures.contains(&failure)
    }
}

/// A display layer that records storage allocation and presentation.
#[derive(Clone)]
pub struct Layer {
    log: rc::Rc<cell::RefCell<Log>>,
}

impl Layer {
    /// Changes the reported size, as a host resize would.
    pub fn set_dimensions(&self, width: u32, height: u32) {
        self.log.borrow_mut().dimensions = (width, height);
    }
}

impl Drawable for Layer {
    fn dimensions(&self) -> (u32, u32) {
        self.log.borrow().dimensions
    }

    fn allocate_color_storage(&mut self, width: u32, height: u32) -> Result<(), Error> {
        let mut log = self.log.borrow_mut();
        if log.failures.contains(&Failure::Storage) {
            return Err(Error::Storage("layer detached".to_string()));
        }
        log.calls.push(Call::ColorStorage { width, height });
        Ok(())
    }

    fn present(&mut self) {
        self.log.borrow_mut().calls.push(Call::Present);
    }
}

impl Context for Recorder {
    fn clear(&self, mask: u32) {
        self.push(Call::Clear(mask));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.push(Call::ClearColor([r, g, b, a]));
    }

    fn clear_depth(&self, z: f32) {
        self.push(Call::ClearDepth(z));
    }

    fn enable(&self, cap: u32) {
        self.push(Call::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.push(Call::Disable(cap));
    }

    fn cull_face(&self, face: u32) {
        self.push(Call::CullFace(face));
    }

    fn front_face(&self, mode: u32) {
        self.push(Call::FrontFace(mode));
    }

    fn depth_func(&self, func: u32) {
        self.push(Call::DepthFunc(func));
    }

    fn viewport(&self, x: u32, y: u32, w: u32, h: u32) {
        self.push(Call::Viewport { x, y, w, h });
    }

    fn gen_buffer(&self) -> u32 {
        self.gen(Call::GenBuffer)
    }

    fn delete_buffer(&self, id: u32) {
        self.push(Call::DeleteBuffer(id));
    }

    fn bind_buffer(&self, target: u32, id: u32) {
        self.push(Call::BindBuffer { target, id });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.push(Call::BufferData { target, len: data.len(), usage });
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: u32,
        ty: u32,
        _norm: bool,
        stride: usize,
        offset: usize,
    ) {
        self.push(Call::VertexAttribPointer { index, size, ty, stride, offset });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.push(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.push(Call::DisableVertexAttribArray(index));
    }

    fn gen_renderbuffer(&self) -> u32 {
        self.gen(Call::GenRenderbuffer)
    }

    fn delete_renderbuffer(&self, id: u32) {
        self.push(Call::DeleteRenderbuffer(id));
    }

    fn bind_renderbuffer(&self, id: u32) {
        self.push(Call::BindRenderbuffer(id));
    }

    fn renderbuffer_storage(&self, format: u32, width: u32, height: u32) {
        self.push(Call::RenderbufferStorage { format, width, height });
    }

    fn gen_framebuffer(&self) -> u32 {
        self.gen(Call::GenFramebuffer)
    }

    fn delete_framebuffer(&self, id: u32) {
        self.push(Call::DeleteFramebuffer(id));
    }

    fn bind_framebuffer(&self, id: u32) {
        self.push(Call::BindFramebuffer(id));
    }

    fn framebuffer_renderbuffer(&self, attachment: u32, renderbuffer: u32) {
        self.push(Call::FramebufferRenderbuffer { attachment, renderbuffer });
    }

    fn check_framebuffer_status(&self) -> u32 {
        self.push(Call::CheckFramebufferStatus);
        if self.fails(Failure::Framebuffer) {
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT
        } else {
            gl::FRAMEBUFFER_COMPLETE
        }
    }

    fn create_shader(&self, ty: u32) -> u32 {
        let id = self.log.borrow_mut().gen();
        self.push(Call::CreateShader { ty, id });
        id
    }

    fn shader_source(&self, id: u32, _source: &str) {
        self.push(Call::ShaderSource(id));
    }

    fn compile_shader(&self, id: u32) -> bool {
        self.push(Call::CompileShader(id));
        let log = self.log.borrow();
        let ty = log.calls.iter().find_map(|call| match *call {
            Call::CreateShader { ty, id: created } if created == id => Some(ty),
            _ => None,
        });
        !matches!(ty, Some(ty) if log.failures.contains(&Failure::Compile(ty)))
    }

    fn shader_info_log(&self, id: u32) -> String {
        format!("shader {}: syntax error", id)
    }

    fn delete_shader(&self, id: u32) {
        self.push(Call::DeleteShader(id));
    }

    fn create_program(&self) -> u32 {
        self.gen(Call::CreateProgram)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.push(Call::AttachShader { program, shader });
    }

    fn link_program(&self, id: u32) -> bool {
        self.push(Call::LinkProgram(id));
        !self.fails(Failure::Link)
    }

    fn program_info_log(&self, id: u32) -> String {
        format!("program {}: unresolved varying", id)
    }

    fn delete_program(&self, id: u32) {
        self.push(Call::DeleteProgram(id));
    }

    fn use_program(&self, id: u32) {
        self.push(Call::UseProgram(id));
    }

    fn get_attrib_location(&self, _program: u32, name: &ffi::CStr) -> i32 {
        self.push(Call::GetAttribLocation(name.to_string_lossy().into_owned()));
        self.log.borrow_mut().location(name)
    }

    fn get_uniform_location(&self, _program: u32, name: &ffi::CStr) -> i32 {
        self.push(Call::GetUniformLocation(name.to_string_lossy().into_owned()));
        self.log.borrow_mut().location(name)
    }

    fn uniform_1i(&self, location: u32, value: i32) {
        self.push(Call::Uniform1i { location, value });
    }

    fn uniform_1f(&self, location: u32, value: f32) {
        self.push(Call::Uniform1f { location, value });
    }

    fn uniform_3f(&self, location: u32, value: [f32; 3]) {
        self.push(Call::Uniform3f { location, value });
    }

    fn uniform_4f(&self, location: u32, value: [f32; 4]) {
        self.push(Call::Uniform4f { location, value });
    }

    fn uniform_matrix_3f(&self, location: u32, value: &[f32; 9]) {
        self.push(Call::UniformMatrix3f { location, value: *value });
    }

    fn uniform_matrix_4f(&self, location: u32, value: &[f32; 16]) {
        self.push(Call::UniformMatrix4f { location, value: *value });
    }

    fn gen_texture(&self) -> u32 {
        self.gen(Call::GenTexture)
    }

    fn delete_texture(&self, id: u32) {
        self.push(Call::DeleteTexture(id));
    }

    fn active_texture(&self, unit: u32) {
        self.push(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, id: u32) {
        self.push(Call::BindTexture { target, id });
    }

    fn tex_parameteri(&self, target: u32, param: u32, value: u32) {
        self.push(Call::TexParameteri { target, param, value });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _internal_format: u32,
        width: u32,
        height: u32,
        _format: u32,
        _ty: u32,
        data: &[u8],
    ) {
        self.push(Call::TexImage2D { width, height, len: data.len() });
    }

    fn generate_mipmap(&self, target: u32) {
        self.push(Call::GenerateMipmap(target));
    }

    fn draw_elements(&self, mode: u32, count: usize, ty: u32, offset: usize) {
        self.push(Call::DrawElements { mode, count, ty, offset });
    }
}
