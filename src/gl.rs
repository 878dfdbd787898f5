use std::{ffi, os, ptr, rc};

// Import OpenGL ES 2.0 bindings.
include!(concat!(env!("OUT_DIR"), "/gl.rs"));

/// The OpenGL ES 2.0 entry points used by the crate.
///
/// Object names are plain `u32` values where `0` is the unallocated
/// sentinel. Uniform and attribute locations are the non-negative values
/// returned by the driver.
pub trait Context {
    // Pipeline state operations

    /// Corresponds to `glClear`.
    fn clear(&self, mask: u32);

    /// Corresponds to `glClearColor`.
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);

    /// Corresponds to `glClearDepthf`.
    fn clear_depth(&self, z: f32);

    /// Corresponds to `glEnable`.
    fn enable(&self, cap: u32);

    /// Corresponds to `glDisable`.
    fn disable(&self, cap: u32);

    /// Corresponds to `glCullFace`.
    fn cull_face(&self, face: u32);

    /// Corresponds to `glFrontFace`.
    fn front_face(&self, mode: u32);

    /// Corresponds to `glDepthFunc`.
    fn depth_func(&self, func: u32);

    /// Corresponds to `glViewport`.
    fn viewport(&self, x: u32, y: u32, w: u32, h: u32);

    // Buffer operations

    /// Corresponds to `glGenBuffers(1)`.
    fn gen_buffer(&self) -> u32;

    /// Corresponds to `glDeleteBuffers(1)`.
    fn delete_buffer(&self, id: u32);

    /// Corresponds to `glBindBuffer`.
    fn bind_buffer(&self, target: u32, id: u32);

    /// Corresponds to `glBufferData`.
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);

    /// Corresponds to `glVertexAttribPointer`.
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: u32,
        ty: u32,
        norm: bool,
        stride: usize,
        offset: usize,
    );

    /// Corresponds to `glEnableVertexAttribArray`.
    fn enable_vertex_attrib_array(&self, index: u32);

    /// Corresponds to `glDisableVertexAttribArray`.
    fn disable_vertex_attrib_array(&self, index: u32);

    // Framebuffer operations

    /// Corresponds to `glGenRenderbuffers(1)`.
    fn gen_renderbuffer(&self) -> u32;

    /// Corresponds to `glDeleteRenderbuffers(1)`.
    fn delete_renderbuffer(&self, id: u32);

    /// Corresponds to `glBindRenderbuffer`.
    fn bind_renderbuffer(&self, id: u32);

    /// Corresponds to `glRenderbufferStorage`.
    fn renderbuffer_storage(&self, format: u32, width: u32, height: u32);

    /// Corresponds to `glGenFramebuffers(1)`.
    fn gen_framebuffer(&self) -> u32;

    /// Corresponds to `glDeleteFramebuffers(1)`.
    fn delete_framebuffer(&self, id: u32);

    /// Corresponds to `glBindFramebuffer`.
    fn bind_framebuffer(&self, id: u32);

    /// Corresponds to `glFramebufferRenderbuffer`.
    fn framebuffer_renderbuffer(&self, attachment: u32, renderbuffer: u32);

    /// Corresponds to `glCheckFramebufferStatus`.
    fn check_framebuffer_status(&self) -> u32;

    // Program operations

    /// Corresponds to `glCreateShader`.
    fn create_shader(&self, ty: u32) -> u32;

    /// Corresponds to `glShaderSource`.
    fn shader_source(&self, id: u32, source: &str);

    /// Corresponds to `glCompileShader`, returning the compile status.
    fn compile_shader(&self, id: u32) -> bool;

    /// Corresponds to `glGetShaderInfoLog`.
    fn shader_info_log(&self, id: u32) -> String;

    /// Corresponds to `glDeleteShader`.
    fn delete_shader(&self, id: u32);

    /// Corresponds to `glCreateProgram`.
    fn create_program(&self) -> u32;

    /// Corresponds to `glAttachShader`.
    fn attach_shader(&self, program: u32, shader: u32);

    /// Corresponds to `glLinkProgram`, returning the link status.
    fn link_program(&self, id: u32) -> bool;

    /// Corresponds to `glGetProgramInfoLog`.
    fn program_info_log(&self, id: u32) -> String;

    /// Corresponds to `glDeleteProgram`.
    fn delete_program(&self, id: u32);

    /// Corresponds to `glUseProgram`.
    fn use_program(&self, id: u32);

    /// Corresponds to `glGetAttribLocation`.
    fn get_attrib_location(&self, program: u32, name: &ffi::CStr) -> i32;

    /// Corresponds to `glGetUniformLocation`.
    fn get_uniform_location(&self, program: u32, name: &ffi::CStr) -> i32;

    /// Corresponds to `glUniform1i`.
    fn uniform_1i(&self, location: u32, value: i32);

    /// Corresponds to `glUniform1f`.
    fn uniform_1f(&self, location: u32, value: f32);

    /// Corresponds to `glUniform3fv(1)`.
    fn uniform_3f(&self, location: u32, value: [f32; 3]);

    /// Corresponds to `glUniform4fv(1)`.
    fn uniform_4f(&self, location: u32, value: [f32; 4]);

    /// Corresponds to `glUniformMatrix3fv(1)`.
    fn uniform_matrix_3f(&self, location: u32, value: &[f32; 9]);

    /// Corresponds to `glUniformMatrix4fv(1)`.
    fn uniform_matrix_4f(&self, location: u32, value: &[f32; 16]);

    // Texture operations

    /// Corresponds to `glGenTextures(1)`.
    fn gen_texture(&self) -> u32;

    /// Corresponds to `glDeleteTextures(1)`.
    fn delete_texture(&self, id: u32);

    /// Corresponds to `glActiveTexture(GL_TEXTURE0 + unit)`.
    fn active_texture(&self, unit: u32);

    /// Corresponds to `glBindTexture`.
    fn bind_texture(&self, target: u32, id: u32);

    /// Corresponds to `glTexParameteri`.
    fn tex_parameteri(&self, target: u32, param: u32, value: u32);

    /// Corresponds to `glTexImage2D` for mip level zero.
    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        format: u32,
        ty: u32,
        data: &[u8],
    );

    /// Corresponds to `glGenerateMipmap`.
    fn generate_mipmap(&self, target: u32);

    // Draw call operations

    /// Corresponds to `glDrawElements`.
    fn draw_elements(&self, mode: u32, count: usize, ty: u32, offset: usize);
}

/// Function pointers to a live OpenGL ES 2.0 context.
#[derive(Clone)]
pub struct Backend {
    gl: rc::Rc<Gles2>,
}

impl Backend {
    /// Constructor.
    ///
    /// The context the procedure addresses belong to must be current on
    /// the calling thread for as long as the backend is used.
    pub fn load<F>(mut func: F) -> Self
        where F: FnMut(&str) -> *const os::raw::c_void
    {
        let gl = rc::Rc::new(Gles2::load_with(|sym| func(sym)));
        Backend { gl }
    }

    // Error checking

    /// Corresponds to `glGetError` plus an error check.
    pub fn check_error(&self) {
        let error = unsafe { self.gl.GetError() };
        if error != NO_ERROR {
            error!(target: "gl", "0x{:x}", error);
        }
    }

    fn info_log(&self, id: u32, shader: bool) -> String {
        let mut len = 0i32;
        unsafe {
            if shader {
                self.gl.GetShaderiv(id, INFO_LOG_LENGTH, &mut len as *mut _);
            } else {
                self.gl.GetProgramiv(id, INFO_LOG_LENGTH, &mut len as *mut _);
            }
        }
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written = 0i32;
        unsafe {
            if shader {
                self.gl.GetShaderInfoLog(id, len, &mut written as *mut _, buf.as_mut_ptr() as *mut _);
            } else {
                self.gl.GetProgramInfoLog(id, len, &mut written as *mut _, buf.as_mut_ptr() as *mut _);
            }
        }
        self.check_error();
        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Context for Backend {
    fn clear(&self, mask: u32) {
        trace!(target: "gl", "glClear{:?}", (mask,));
        unsafe {
            self.gl.Clear(mask);
        }
        self.check_error();
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        trace!(target: "gl", "glClearColor{:?}", (r, g, b, a));
        unsafe {
            self.gl.ClearColor(r, g, b, a);
        }
        self.check_error();
    }

    fn clear_depth(&self, z: f32) {
        trace!(target: "gl", "glClearDepthf{:?}", (z,));
        unsafe {
            self.gl.ClearDepthf(z);
        }
        self.check_error();
    }

    fn enable(&self, cap: u32) {
        trace!(target: "gl", "glEnable{:?}", (cap,));
        unsafe {
            self.gl.Enable(cap);
        }
        self.check_error();
    }

    fn disable(&self, cap: u32) {
        trace!(target: "gl", "glDisable{:?}", (cap,));
        unsafe {
            self.gl.Disable(cap);
        }
        self.check_error();
    }

    fn cull_face(&self, face: u32) {
        trace!(target: "gl", "glCullFace{:?}", (face,));
        unsafe {
            self.gl.CullFace(face);
        }
        self.check_error();
    }

    fn front_face(&self, mode: u32) {
        trace!(target: "gl", "glFrontFace{:?}", (mode,));
        unsafe {
            self.gl.FrontFace(mode);
        }
        self.check_error();
    }

    fn depth_func(&self, func: u32) {
        trace!(target: "gl", "glDepthFunc{:?}", (func,));
        unsafe {
            self.gl.DepthFunc(func);
        }
        self.check_error();
    }

    fn viewport(&self, x: u32, y: u32, w: u32, h: u32) {
        trace!(target: "gl", "glViewport{:?}", (x, y, w, h));
        unsafe {
            self.gl.Viewport(x as _, y as _, w as _, h as _);
        }
        self.check_error();
    }

    fn gen_buffer(&self) -> u32 {
        let mut id: u32 = 0;
        unsafe {
            trace!(target: "gl", "glGenBuffers(1) ");
            self.gl.GenBuffers(1, &mut id as *mut _)
        };
        trace!(target: "gl", " => {}", id);
        self.check_error();
        id
    }

    fn delete_buffer(&self, id: u32) {
        trace!(target: "gl", "glDeleteBuffers{:?}", (1, id));
        unsafe {
            self.gl.DeleteBuffers(1, &id as *const _);
        }
        self.check_error();
    }

    fn bind_buffer(&self, target: u32, id: u32) {
        unsafe {
            trace!(target: "gl", "glBindBuffer{:?}", (target, id));
            self.gl.BindBuffer(target, id);
        }
        self.check_error();
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe {
            trace!(target: "gl", "glBufferData{:?}", (target, data.len(), usage));
            self.gl.BufferData(target, data.len() as _, data.as_ptr() as *const _, usage);
        }
        self.check_error();
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: u32,
        ty: u32,
        norm: bool,
        stride: usize,
        offset: usize,
    ) {
        unsafe {
            trace!(target: "gl", "glVertexAttribPointer{:?}", (index, size, ty, norm, stride, offset));
            self.gl.VertexAttribPointer(
                index,
                size as _,
                ty,
                if norm { TRUE } else { FALSE },
                stride as _,
                offset as *const _,
            );
        }
        self.check_error();
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe {
            trace!(target: "gl", "glEnableVertexAttribArray{:?}", (index,));
            self.gl.EnableVertexAttribArray(index);
        }
        self.check_error();
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe {
            trace!(target: "gl", "glDisableVertexAttribArray{:?}", (index,));
            self.gl.DisableVertexAttribArray(index);
        }
        self.check_error();
    }

    fn gen_renderbuffer(&self) -> u32 {
        trace!(target: "gl", "glGenRenderbuffers(1)");
        let mut id = 0;
        unsafe {
            self.gl.GenRenderbuffers(1, &mut id as *mut _);
        }
        self.check_error();
        id
    }

    fn delete_renderbuffer(&self, id: u32) {
        trace!(target: "gl", "glDeleteRenderbuffers{:?}", (1, id));
        unsafe {
            self.gl.DeleteRenderbuffers(1, &id as *const _);
        }
        self.check_error();
    }

    fn bind_renderbuffer(&self, id: u32) {
        trace!(target: "gl", "glBindRenderbuffer{:?} ", (RENDERBUFFER, id));
        unsafe {
            self.gl.BindRenderbuffer(RENDERBUFFER, id);
        }
        self.check_error();
    }

    fn renderbuffer_storage(&self, format: u32, width: u32, height: u32) {
        trace!(
            target: "gl",
            "glRenderbufferStorage{:?} ",
            (RENDERBUFFER, format, width, height),
        );
        unsafe {
            self.gl.RenderbufferStorage(RENDERBUFFER, format, width as _, height as _);
        }
        self.check_error();
    }

    fn gen_framebuffer(&self) -> u32 {
        trace!(target: "gl", "glGenFramebuffers(1)");
        let mut id = 0;
        unsafe {
            self.gl.GenFramebuffers(1, &mut id as *mut _);
        }
        self.check_error();
        id
    }

    fn delete_framebuffer(&self, id: u32) {
        trace!(target: "gl", "glDeleteFramebuffers{:?}", (1, id));
        unsafe {
            self.gl.DeleteFramebuffers(1, &id as *const _);
        }
        self.check_error();
    }

    fn bind_framebuffer(&self, id: u32) {
        trace!(target: "gl", "glBindFramebuffer{:?} ", (FRAMEBUFFER, id));
        unsafe {
            self.gl.BindFramebuffer(FRAMEBUFFER, id);
        }
        self.check_error();
    }

    fn framebuffer_renderbuffer(&self, attachment: u32, renderbuffer: u32) {
        trace!(
            target: "gl",
            "glFramebufferRenderbuffer{:?}",
            (FRAMEBUFFER, attachment, RENDERBUFFER, renderbuffer),
        );
        unsafe {
            self.gl.FramebufferRenderbuffer(
                FRAMEBUFFER,
                attachment,
                RENDERBUFFER,
                renderbuffer,
            );
        }
        self.check_error();
    }

    fn check_framebuffer_status(&self) -> u32 {
        let status = unsafe {
            trace!(target: "gl", "glCheckFramebufferStatus{:?} ", (FRAMEBUFFER,));
            self.gl.CheckFramebufferStatus(FRAMEBUFFER)
        };
        trace!(target: "gl", "=> 0x{:x}", status);
        self.check_error();
        status
    }

    fn create_shader(&self, ty: u32) -> u32 {
        let id = unsafe {
            trace!(target: "gl", "glCreateShader{:?} ", (ty,));
            self.gl.CreateShader(ty)
        };
        trace!(target: "gl", "=> {}", id);
        self.check_error();
        id
    }

    fn shader_source(&self, id: u32, source: &str) {
        unsafe {
            trace!(target: "gl", "glShaderSource{:?}", (id, source.len()));
            let ptr = source.as_ptr() as *const types::GLchar;
            let len = source.len() as types::GLint;
            self.gl.ShaderSource(id, 1, &ptr as *const _, &len as *const _);
        }
        self.check_error();
    }

    fn compile_shader(&self, id: u32) -> bool {
        let mut status = 0i32;
        unsafe {
            trace!(target: "gl", "glCompileShader{:?}", (id,));
            self.gl.CompileShader(id);
            self.check_error();
            self.gl.GetShaderiv(id, COMPILE_STATUS, &mut status as *mut _);
        }
        self.check_error();
        status != 0
    }

    fn shader_info_log(&self, id: u32) -> String {
        trace!(target: "gl", "glGetShaderInfoLog{:?}", (id,));
        self.info_log(id, true)
    }

    fn delete_shader(&self, id: u32) {
        trace!(target: "gl", "glDeleteShader{:?}", (id,));
        unsafe {
            self.gl.DeleteShader(id);
        }
        self.check_error();
    }

    fn create_program(&self) -> u32 {
        let id = unsafe {
            trace!(target: "gl", "glCreateProgram() ");
            self.gl.CreateProgram()
        };
        trace!(target: "gl", "=> {}", id);
        self.check_error();
        id
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe {
            trace!(target: "gl", "glAttachShader{:?}", (program, shader));
            self.gl.AttachShader(program, shader);
        }
        self.check_error();
    }

    fn link_program(&self, id: u32) -> bool {
        let mut status = 0i32;
        unsafe {
            trace!(target: "gl", "glLinkProgram{:?}", (id,));
            self.gl.LinkProgram(id);
            self.check_error();
            trace!(target: "gl", "glGetProgramiv{:?} ", (id, LINK_STATUS));
            self.gl.GetProgramiv(id, LINK_STATUS, &mut status as *mut _);
            trace!(target: "gl", "=> {}", status);
        }
        self.check_error();
        status != 0
    }

    fn program_info_log(&self, id: u32) -> String {
        trace!(target: "gl", "glGetProgramInfoLog{:?}", (id,));
        self.info_log(id, false)
    }

    fn delete_program(&self, id: u32) {
        trace!(target: "gl", "glDeleteProgram{:?}", (id,));
        unsafe {
            self.gl.DeleteProgram(id);
        }
        self.check_error();
    }

    fn use_program(&self, id: u32) {
        unsafe {
            trace!(target: "gl", "glUseProgram{:?}", (id,));
            self.gl.UseProgram(id);
        }
        self.check_error();
    }

    fn get_attrib_location(&self, program: u32, name: &ffi::CStr) -> i32 {
        let index;
        unsafe {
            trace!(target: "gl", "glGetAttribLocation{:?} ", (program, name));
            index = self.gl.GetAttribLocation(program, name.as_ptr() as _);
            trace!(target: "gl", "=> {}", index);
        }
        self.check_error();
        index
    }

    fn get_uniform_location(&self, program: u32, name: &ffi::CStr) -> i32 {
        let index;
        unsafe {
            trace!(target: "gl", "glGetUniformLocation{:?} ", (program, name));
            index = self.gl.GetUniformLocation(program, name.as_ptr() as _);
            trace!(target: "gl", "=> {}", index);
        }
        self.check_error();
        index
    }

    fn uniform_1i(&self, location: u32, value: i32) {
        trace!(target: "gl", "glUniform1i{:?}", (location, value));
        unsafe {
            self.gl.Uniform1i(location as _, value);
        }
        self.check_error();
    }

    fn uniform_1f(&self, location: u32, value: f32) {
        trace!(target: "gl", "glUniform1f{:?}", (location, value));
        unsafe {
            self.gl.Uniform1f(location as _, value);
        }
        self.check_error();
    }

    fn uniform_3f(&self, location: u32, value: [f32; 3]) {
        trace!(target: "gl", "glUniform3fv{:?}", (location, 1, value));
        unsafe {
            self.gl.Uniform3fv(location as _, 1, value.as_ptr());
        }
        self.check_error();
    }

    fn uniform_4f(&self, location: u32, value: [f32; 4]) {
        trace!(target: "gl", "glUniform4fv{:?}", (location, 1, value));
        unsafe {
            self.gl.Uniform4fv(location as _, 1, value.as_ptr());
        }
        self.check_error();
    }

    fn uniform_matrix_3f(&self, location: u32, value: &[f32; 9]) {
        trace!(target: "gl", "glUniformMatrix3fv{:?}", (location, 1, FALSE, value));
        unsafe {
            self.gl.UniformMatrix3fv(location as _, 1, FALSE, value.as_ptr());
        }
        self.check_error();
    }

    fn uniform_matrix_4f(&self, location: u32, value: &[f32; 16]) {
        trace!(target: "gl", "glUniformMatrix4fv{:?}", (location, 1, FALSE, value));
        unsafe {
            self.gl.UniformMatrix4fv(location as _, 1, FALSE, value.as_ptr());
        }
        self.check_error();
    }

    fn gen_texture(&self) -> u32 {
        let mut id = 0;
        unsafe {
            trace!(target: "gl", "glGenTextures(1) ");
            self.gl.GenTextures(1, &mut id as *mut _);
            trace!(target: "gl", "=> {}", id);
        }
        self.check_error();
        id
    }

    fn delete_texture(&self, id: u32) {
        trace!(target: "gl", "glDeleteTextures{:?}", (1, id));
        unsafe {
            self.gl.DeleteTextures(1, &id as *const _);
        }
        self.check_error();
    }

    fn active_texture(&self, unit: u32) {
        unsafe {
            trace!(target: "gl", "glActiveTexture{:?}", (unit,));
            self.gl.ActiveTexture(TEXTURE0 + unit);
        }
        self.check_error();
    }

    fn bind_texture(&self, target: u32, id: u32) {
        unsafe {
            trace!(target: "gl", "glBindTexture{:?}", (target, id));
            self.gl.BindTexture(target, id);
        }
        self.check_error();
    }

    fn tex_parameteri(&self, target: u32, param: u32, value: u32) {
        unsafe {
            trace!(target: "gl", "glTexParameteri{:?}", (target, param, value));
            self.gl.TexParameteri(target, param, value as i32);
        }
        self.check_error();
    }

    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        format: u32,
        ty: u32,
        data: &[u8],
    ) {
        let pixels = if data.is_empty() {
            ptr::null()
        } else {
            data.as_ptr() as *const os::raw::c_void
        };
        unsafe {
            trace!(target: "gl",
                "glTexImage2D{:?}",
                (
                    target,
                    0,
                    internal_format,
                    width,
                    height,
                    0,
                    format,
                    ty,
                    data.len(),
                ),
            );
            self.gl.TexImage2D(
                target,
                0,
                internal_format as _,
                width as _,
                height as _,
                0,
                format,
                ty,
                pixels,
            );
        }
        self.check_error();
    }

    fn generate_mipmap(&self, target: u32) {
        unsafe {
            trace!(target: "gl", "glGenerateMipmap{:?}", (target,));
            self.gl.GenerateMipmap(target);
        }
        self.check_error();
    }

    fn draw_elements(&self, mode: u32, count: usize, ty: u32, offset: usize) {
        unsafe {
            trace!(target: "gl", "glDrawElements{:?}", (mode, count, ty, offset));
            self.gl.DrawElements(mode, count as _, ty, offset as *const _);
        }
        self.check_error();
    }
}
