use std::ffi::{CStr, c_char, c_void};
use std::fmt;
use std::num::NonZero;
use std::ptr::null;

use anyhow::{Context as _, anyhow};

use crate as gl;

// NOTE: why not just use glow?
// its HasContext trait does not mirror the gl spec and hides things i want to see.
//
// methods match libgl's 1:1 with the exception of things that can be rustified (object handles
// are NonZero, "no object" is None, strings are CStr / String).
pub trait Adapter {
    type Buffer: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Shader: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;

    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn bind_buffer(&self, target: gl::GLenum, buffer: Option<Self::Buffer>);
    unsafe fn bind_vertex_array(&self, array: Option<Self::VertexArray>);
    unsafe fn buffer_data(
        &self,
        target: gl::GLenum,
        size: gl::GLsizeiptr,
        data: *const c_void,
        usage: gl::GLenum,
    );
    unsafe fn clear(&self, mask: gl::GLbitfield);
    unsafe fn clear_color(
        &self,
        red: gl::GLfloat,
        green: gl::GLfloat,
        blue: gl::GLfloat,
        alpha: gl::GLfloat,
    );
    unsafe fn compile_shader(&self, shader: Self::Shader);
    unsafe fn create_buffer(&self) -> anyhow::Result<Self::Buffer>;
    unsafe fn create_program(&self) -> anyhow::Result<Self::Program>;
    unsafe fn create_shader(&self, r#type: gl::GLenum) -> anyhow::Result<Self::Shader>;
    unsafe fn create_vertex_array(&self) -> anyhow::Result<Self::VertexArray>;
    unsafe fn delete_buffer(&self, buffer: Self::Buffer);
    unsafe fn delete_program(&self, program: Self::Program);
    unsafe fn delete_shader(&self, shader: Self::Shader);
    unsafe fn delete_vertex_array(&self, array: Self::VertexArray);
    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn draw_arrays(&self, mode: gl::GLenum, first: gl::GLint, count: gl::GLsizei);
    unsafe fn draw_elements(
        &self,
        mode: gl::GLenum,
        count: gl::GLsizei,
        r#type: gl::GLenum,
        indices: *const c_void,
    );
    unsafe fn enable_vertex_attrib_array(&self, index: gl::GLuint);
    unsafe fn get_program_info_log(&self, program: Self::Program) -> String;
    unsafe fn get_programiv(&self, program: Self::Program, pname: gl::GLenum) -> gl::GLint;
    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    unsafe fn get_shaderiv(&self, shader: Self::Shader, pname: gl::GLenum) -> gl::GLint;
    unsafe fn get_string(&self, name: gl::GLenum) -> anyhow::Result<String>;
    unsafe fn get_uniform_location(&self, program: Self::Program, name: &CStr)
    -> Option<gl::GLint>;
    unsafe fn link_program(&self, program: Self::Program);
    unsafe fn polygon_mode(&self, face: gl::GLenum, mode: gl::GLenum);
    unsafe fn program_uniform_1f(&self, program: Self::Program, location: gl::GLint, v0: f32);
    unsafe fn program_uniform_2f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
    );
    unsafe fn program_uniform_3f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
    );
    unsafe fn program_uniform_4f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
        v3: f32,
    );
    unsafe fn program_uniform_1i(&self, program: Self::Program, location: gl::GLint, v0: i32);
    unsafe fn program_uniform_2i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
    );
    unsafe fn program_uniform_3i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
    );
    unsafe fn program_uniform_4i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
        v3: i32,
    );
    /// `source` must be nul-terminated, its length is not passed to the driver.
    unsafe fn shader_source(&self, shader: Self::Shader, source: &CStr);
    unsafe fn use_program(&self, program: Option<Self::Program>);
    unsafe fn vertex_attrib_pointer(
        &self,
        index: gl::GLuint,
        size: gl::GLint,
        r#type: gl::GLenum,
        normalized: gl::GLboolean,
        stride: gl::GLsizei,
        pointer: *const c_void,
    );
    unsafe fn viewport(&self, x: gl::GLint, y: gl::GLint, width: gl::GLsizei, height: gl::GLsizei);
}

#[inline]
fn info_log_to_string(mut info_log: Vec<u8>, written: gl::GLsizei) -> String {
    info_log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&info_log).into_owned()
}

impl Adapter for gl::Api {
    type Buffer = NonZero<gl::GLuint>;
    type Program = NonZero<gl::GLuint>;
    type Shader = NonZero<gl::GLuint>;
    type VertexArray = NonZero<gl::GLuint>;

    #[inline]
    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.AttachShader(program.get(), shader.get()) };
    }

    #[inline]
    unsafe fn bind_buffer(&self, target: gl::GLenum, buffer: Option<Self::Buffer>) {
        unsafe { self.BindBuffer(target, buffer.map_or(0, |v| v.get())) };
    }

    #[inline]
    unsafe fn bind_vertex_array(&self, array: Option<Self::VertexArray>) {
        unsafe { self.BindVertexArray(array.map_or(0, |v| v.get())) };
    }

    #[inline]
    unsafe fn buffer_data(
        &self,
        target: gl::GLenum,
        size: gl::GLsizeiptr,
        data: *const c_void,
        usage: gl::GLenum,
    ) {
        unsafe { self.BufferData(target, size, data, usage) };
    }

    #[inline]
    unsafe fn clear(&self, mask: gl::GLbitfield) {
        unsafe { self.Clear(mask) };
    }

    #[inline]
    unsafe fn clear_color(
        &self,
        red: gl::GLfloat,
        green: gl::GLfloat,
        blue: gl::GLfloat,
        alpha: gl::GLfloat,
    ) {
        unsafe { self.ClearColor(red, green, blue, alpha) };
    }

    #[inline]
    unsafe fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.CompileShader(shader.get()) };
    }

    #[inline]
    unsafe fn create_buffer(&self) -> anyhow::Result<Self::Buffer> {
        let mut buffer: gl::GLuint = 0;
        unsafe { self.GenBuffers(1, &mut buffer) };
        NonZero::new(buffer).context("could not create buffer")
    }

    #[inline]
    unsafe fn create_program(&self) -> anyhow::Result<Self::Program> {
        let program = unsafe { self.CreateProgram() };
        NonZero::new(program).context("could not create program")
    }

    #[inline]
    unsafe fn create_shader(&self, r#type: gl::GLenum) -> anyhow::Result<Self::Shader> {
        let shader = unsafe { self.CreateShader(r#type) };
        NonZero::new(shader).context("could not create shader")
    }

    #[inline]
    unsafe fn create_vertex_array(&self) -> anyhow::Result<Self::VertexArray> {
        let mut array: gl::GLuint = 0;
        unsafe { self.GenVertexArrays(1, &mut array) };
        NonZero::new(array).context("could not create vertex array")
    }

    #[inline]
    unsafe fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.DeleteBuffers(1, &buffer.get()) };
    }

    #[inline]
    unsafe fn delete_program(&self, program: Self::Program) {
        unsafe { self.DeleteProgram(program.get()) };
    }

    #[inline]
    unsafe fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.DeleteShader(shader.get()) };
    }

    #[inline]
    unsafe fn delete_vertex_array(&self, array: Self::VertexArray) {
        unsafe { self.DeleteVertexArrays(1, &array.get()) };
    }

    #[inline]
    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.DetachShader(program.get(), shader.get()) };
    }

    #[inline]
    unsafe fn draw_arrays(&self, mode: gl::GLenum, first: gl::GLint, count: gl::GLsizei) {
        unsafe { self.DrawArrays(mode, first, count) };
    }

    #[inline]
    unsafe fn draw_elements(
        &self,
        mode: gl::GLenum,
        count: gl::GLsizei,
        r#type: gl::GLenum,
        indices: *const c_void,
    ) {
        unsafe { self.DrawElements(mode, count, r#type, indices) };
    }

    #[inline]
    unsafe fn enable_vertex_attrib_array(&self, index: gl::GLuint) {
        unsafe { self.EnableVertexAttribArray(index) };
    }

    #[inline]
    unsafe fn get_program_info_log(&self, program: Self::Program) -> String {
        let len = unsafe { self.get_programiv(program, gl::INFO_LOG_LENGTH) };
        let mut info_log = vec![0_u8; len.max(0) as usize];
        let mut written: gl::GLsizei = 0;
        unsafe {
            self.GetProgramInfoLog(
                program.get(),
                len,
                &mut written,
                info_log.as_mut_ptr() as *mut gl::GLchar,
            )
        };
        info_log_to_string(info_log, written)
    }

    #[inline]
    unsafe fn get_programiv(&self, program: Self::Program, pname: gl::GLenum) -> gl::GLint {
        let mut param: gl::GLint = 0;
        unsafe { self.GetProgramiv(program.get(), pname, &mut param) };
        param
    }

    #[inline]
    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        let len = unsafe { self.get_shaderiv(shader, gl::INFO_LOG_LENGTH) };
        let mut info_log = vec![0_u8; len.max(0) as usize];
        let mut written: gl::GLsizei = 0;
        unsafe {
            self.GetShaderInfoLog(
                shader.get(),
                len,
                &mut written,
                info_log.as_mut_ptr() as *mut gl::GLchar,
            )
        };
        info_log_to_string(info_log, written)
    }

    #[inline]
    unsafe fn get_shaderiv(&self, shader: Self::Shader, pname: gl::GLenum) -> gl::GLint {
        let mut param: gl::GLint = 0;
        unsafe { self.GetShaderiv(shader.get(), pname, &mut param) };
        param
    }

    #[inline]
    unsafe fn get_string(&self, name: gl::GLenum) -> anyhow::Result<String> {
        let ptr = unsafe { self.GetString(name) };
        if ptr.is_null() {
            return Err(anyhow!("could not get string (name 0x{name:x})"));
        }
        unsafe {
            CStr::from_ptr(ptr as *const c_char)
                .to_str()
                .context("invalid string")
                .map(|cstr| cstr.to_string())
        }
    }

    #[inline]
    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &CStr,
    ) -> Option<gl::GLint> {
        let ret = unsafe { self.GetUniformLocation(program.get(), name.as_ptr()) };
        (ret != -1).then_some(ret)
    }

    #[inline]
    unsafe fn link_program(&self, program: Self::Program) {
        unsafe { self.LinkProgram(program.get()) };
    }

    #[inline]
    unsafe fn polygon_mode(&self, face: gl::GLenum, mode: gl::GLenum) {
        unsafe { self.PolygonMode(face, mode) };
    }

    #[inline]
    unsafe fn program_uniform_1f(&self, program: Self::Program, location: gl::GLint, v0: f32) {
        unsafe { self.ProgramUniform1f(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
    ) {
        unsafe { self.ProgramUniform2f(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
    ) {
        unsafe { self.ProgramUniform3f(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4f(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
        v3: f32,
    ) {
        unsafe { self.ProgramUniform4f(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn program_uniform_1i(&self, program: Self::Program, location: gl::GLint, v0: i32) {
        unsafe { self.ProgramUniform1i(program.get(), location, v0) };
    }

    #[inline]
    unsafe fn program_uniform_2i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
    ) {
        unsafe { self.ProgramUniform2i(program.get(), location, v0, v1) };
    }

    #[inline]
    unsafe fn program_uniform_3i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
    ) {
        unsafe { self.ProgramUniform3i(program.get(), location, v0, v1, v2) };
    }

    #[inline]
    unsafe fn program_uniform_4i(
        &self,
        program: Self::Program,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
        v3: i32,
    ) {
        unsafe { self.ProgramUniform4i(program.get(), location, v0, v1, v2, v3) };
    }

    #[inline]
    unsafe fn shader_source(&self, shader: Self::Shader, source: &CStr) {
        // NOTE: null length array means "each string is nul-terminated".
        unsafe { self.ShaderSource(shader.get(), 1, &source.as_ptr(), null()) };
    }

    #[inline]
    unsafe fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.UseProgram(program.map_or(0, |v| v.get())) };
    }

    #[inline]
    unsafe fn vertex_attrib_pointer(
        &self,
        index: gl::GLuint,
        size: gl::GLint,
        r#type: gl::GLenum,
        normalized: gl::GLboolean,
        stride: gl::GLsizei,
        pointer: *const c_void,
    ) {
        unsafe { self.VertexAttribPointer(index, size, r#type, normalized, stride, pointer) };
    }

    #[inline]
    unsafe fn viewport(&self, x: gl::GLint, y: gl::GLint, width: gl::GLsizei, height: gl::GLsizei) {
        unsafe { self.Viewport(x, y, width, height) };
    }
}
