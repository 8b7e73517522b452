//! a recording, in-memory stand-in for a gl context.
//!
//! it remembers every state-changing call, tracks which objects are alive, and fakes just enough
//! of the compiler and linker: sources containing `#error` fail to compile, programs fail to link
//! unless they have both a vertex and a fragment stage, and `uniform <type> <name>;` lines in the
//! attached sources become the program's active uniforms.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, c_void};
use std::fs;
use std::num::NonZero;
use std::path::{Path, PathBuf};

pub type Handle = NonZero<u32>;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AttachShader {
        program: Handle,
        shader: Handle,
    },
    BindBuffer {
        target: gl::GLenum,
        buffer: Option<Handle>,
    },
    BindVertexArray(Option<Handle>),
    BufferData {
        target: gl::GLenum,
        data: Vec<u8>,
        usage: gl::GLenum,
    },
    Clear(gl::GLbitfield),
    ClearColor([f32; 4]),
    CompileShader(Handle),
    CreateBuffer(Handle),
    CreateProgram(Handle),
    CreateShader {
        r#type: gl::GLenum,
        shader: Handle,
    },
    CreateVertexArray(Handle),
    DeleteBuffer(Handle),
    DeleteProgram(Handle),
    DeleteShader(Handle),
    DeleteVertexArray(Handle),
    DetachShader {
        program: Handle,
        shader: Handle,
    },
    DrawArrays {
        mode: gl::GLenum,
        first: gl::GLint,
        count: gl::GLsizei,
    },
    DrawElements {
        mode: gl::GLenum,
        count: gl::GLsizei,
        r#type: gl::GLenum,
        offset: usize,
    },
    EnableVertexAttribArray(gl::GLuint),
    GetUniformLocation {
        program: Handle,
        name: String,
    },
    LinkProgram(Handle),
    PolygonMode {
        face: gl::GLenum,
        mode: gl::GLenum,
    },
    ProgramUniformF {
        program: Handle,
        location: gl::GLint,
        values: Vec<f32>,
    },
    ProgramUniformI {
        program: Handle,
        location: gl::GLint,
        values: Vec<i32>,
    },
    ShaderSource {
        shader: Handle,
        source: String,
    },
    UseProgram(Option<Handle>),
    VertexAttribPointer {
        index: gl::GLuint,
        size: gl::GLint,
        r#type: gl::GLenum,
        normalized: gl::GLboolean,
        stride: gl::GLsizei,
        offset: usize,
    },
    Viewport {
        x: gl::GLint,
        y: gl::GLint,
        width: gl::GLsizei,
        height: gl::GLsizei,
    },
}

#[derive(Debug, Default)]
struct ShaderState {
    r#type: gl::GLenum,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<Handle>,
    linked: bool,
    info_log: String,
    /// active uniform names; the index is the location.
    uniforms: Vec<String>,
    float_values: HashMap<gl::GLint, Vec<f32>>,
    int_values: HashMap<gl::GLint, Vec<i32>>,
}

fn parse_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("uniform") {
            return None;
        }
        let _type = tokens.next()?;
        let name = tokens.next()?.trim_end_matches(';');
        Some(name.to_string())
    })
}

#[derive(Debug, Default)]
pub struct FakeApi {
    last_handle: Cell<u32>,
    live: RefCell<HashSet<Handle>>,
    calls: RefCell<Vec<Call>>,
    shaders: RefCell<HashMap<Handle, ShaderState>>,
    programs: RefCell<HashMap<Handle, ProgramState>>,
    current_program: Cell<Option<Handle>>,
    bound_vertex_array: Cell<Option<Handle>>,
}

impl FakeApi {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn create(&self) -> Handle {
        let handle = NonZero::new(self.last_handle.get() + 1).expect("handle overflow");
        self.last_handle.set(handle.get());
        self.live.borrow_mut().insert(handle);
        handle
    }

    fn delete(&self, handle: Handle) {
        assert!(
            self.live.borrow_mut().remove(&handle),
            "{handle:?} is not alive (deleted twice?)"
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.live.borrow().contains(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn current_program(&self) -> Option<Handle> {
        self.current_program.get()
    }

    pub fn bound_vertex_array(&self) -> Option<Handle> {
        self.bound_vertex_array.get()
    }

    pub fn shader_type(&self, shader: Handle) -> Option<gl::GLenum> {
        self.shaders.borrow().get(&shader).map(|state| state.r#type)
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Option<gl::GLint> {
        let programs = self.programs.borrow();
        let state = programs.get(&program)?;
        let index = state.uniforms.iter().position(|uniform| uniform == name)?;
        Some(index as gl::GLint)
    }

    pub fn uniform_f(&self, program: Handle, name: &str) -> Option<Vec<f32>> {
        let location = self.uniform_location(program, name)?;
        let programs = self.programs.borrow();
        programs.get(&program)?.float_values.get(&location).cloned()
    }

    pub fn uniform_i(&self, program: Handle, name: &str) -> Option<Vec<i32>> {
        let location = self.uniform_location(program, name)?;
        let programs = self.programs.borrow();
        programs.get(&program)?.int_values.get(&location).cloned()
    }

    fn set_float_uniform(&self, program: Handle, location: gl::GLint, values: Vec<f32>) {
        self.record(Call::ProgramUniformF {
            program,
            location,
            values: values.clone(),
        });
        if let Some(state) = self.programs.borrow_mut().get_mut(&program) {
            state.float_values.insert(location, values);
        }
    }

    fn set_int_uniform(&self, program: Handle, location: gl::GLint, values: Vec<i32>) {
        self.record(Call::ProgramUniformI {
            program,
            location,
            values: values.clone(),
        });
        if let Some(state) = self.programs.borrow_mut().get_mut(&program) {
            state.int_values.insert(location, values);
        }
    }
}

impl gl::Adapter for FakeApi {
    type Buffer = Handle;
    type Program = Handle;
    type Shader = Handle;
    type VertexArray = Handle;

    unsafe fn attach_shader(&self, program: Handle, shader: Handle) {
        self.record(Call::AttachShader { program, shader });
        if let Some(state) = self.programs.borrow_mut().get_mut(&program) {
            state.attached.push(shader);
        }
    }

    unsafe fn bind_buffer(&self, target: gl::GLenum, buffer: Option<Handle>) {
        self.record(Call::BindBuffer { target, buffer });
    }

    unsafe fn bind_vertex_array(&self, array: Option<Handle>) {
        self.record(Call::BindVertexArray(array));
        self.bound_vertex_array.set(array);
    }

    unsafe fn buffer_data(
        &self,
        target: gl::GLenum,
        size: gl::GLsizeiptr,
        data: *const c_void,
        usage: gl::GLenum,
    ) {
        let data = unsafe { std::slice::from_raw_parts(data as *const u8, size as usize) };
        self.record(Call::BufferData {
            target,
            data: data.to_vec(),
            usage,
        });
    }

    unsafe fn clear(&self, mask: gl::GLbitfield) {
        self.record(Call::Clear(mask));
    }

    unsafe fn clear_color(
        &self,
        red: gl::GLfloat,
        green: gl::GLfloat,
        blue: gl::GLfloat,
        alpha: gl::GLfloat,
    ) {
        self.record(Call::ClearColor([red, green, blue, alpha]));
    }

    unsafe fn compile_shader(&self, shader: Handle) {
        self.record(Call::CompileShader(shader));
        let mut shaders = self.shaders.borrow_mut();
        let state = shaders.get_mut(&shader).expect("unknown shader");
        match state.source.lines().find(|line| line.starts_with("#error")) {
            Some(line) => {
                state.compiled = false;
                state.info_log = format!("0:1(1): error: {}", line.trim_start_matches("#error"));
            }
            None => {
                state.compiled = true;
                state.info_log.clear();
            }
        }
    }

    unsafe fn create_buffer(&self) -> anyhow::Result<Handle> {
        let buffer = self.create();
        self.record(Call::CreateBuffer(buffer));
        Ok(buffer)
    }

    unsafe fn create_program(&self) -> anyhow::Result<Handle> {
        let program = self.create();
        self.record(Call::CreateProgram(program));
        self.programs
            .borrow_mut()
            .insert(program, ProgramState::default());
        Ok(program)
    }

    unsafe fn create_shader(&self, r#type: gl::GLenum) -> anyhow::Result<Handle> {
        let shader = self.create();
        self.record(Call::CreateShader { r#type, shader });
        self.shaders.borrow_mut().insert(
            shader,
            ShaderState {
                r#type,
                ..ShaderState::default()
            },
        );
        Ok(shader)
    }

    unsafe fn create_vertex_array(&self) -> anyhow::Result<Handle> {
        let array = self.create();
        self.record(Call::CreateVertexArray(array));
        Ok(array)
    }

    unsafe fn delete_buffer(&self, buffer: Handle) {
        self.record(Call::DeleteBuffer(buffer));
        self.delete(buffer);
    }

    unsafe fn delete_program(&self, program: Handle) {
        self.record(Call::DeleteProgram(program));
        self.delete(program);
        if self.current_program.get() == Some(program) {
            self.current_program.set(None);
        }
    }

    unsafe fn delete_shader(&self, shader: Handle) {
        self.record(Call::DeleteShader(shader));
        self.delete(shader);
    }

    unsafe fn delete_vertex_array(&self, array: Handle) {
        self.record(Call::DeleteVertexArray(array));
        self.delete(array);
        if self.bound_vertex_array.get() == Some(array) {
            self.bound_vertex_array.set(None);
        }
    }

    unsafe fn detach_shader(&self, program: Handle, shader: Handle) {
        self.record(Call::DetachShader { program, shader });
        if let Some(state) = self.programs.borrow_mut().get_mut(&program) {
            state.attached.retain(|attached| *attached != shader);
        }
    }

    unsafe fn draw_arrays(&self, mode: gl::GLenum, first: gl::GLint, count: gl::GLsizei) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    unsafe fn draw_elements(
        &self,
        mode: gl::GLenum,
        count: gl::GLsizei,
        r#type: gl::GLenum,
        indices: *const c_void,
    ) {
        self.record(Call::DrawElements {
            mode,
            count,
            r#type,
            offset: indices as usize,
        });
    }

    unsafe fn enable_vertex_attrib_array(&self, index: gl::GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    unsafe fn get_program_info_log(&self, program: Handle) -> String {
        self.programs
            .borrow()
            .get(&program)
            .map(|state| state.info_log.clone())
            .unwrap_or_default()
    }

    unsafe fn get_programiv(&self, program: Handle, pname: gl::GLenum) -> gl::GLint {
        let programs = self.programs.borrow();
        let state = programs.get(&program).expect("unknown program");
        match pname {
            gl::LINK_STATUS => state.linked as gl::GLint,
            gl::INFO_LOG_LENGTH if state.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => state.info_log.len() as gl::GLint + 1,
            other => panic!("unsupported program parameter 0x{other:x}"),
        }
    }

    unsafe fn get_shader_info_log(&self, shader: Handle) -> String {
        self.shaders
            .borrow()
            .get(&shader)
            .map(|state| state.info_log.clone())
            .unwrap_or_default()
    }

    unsafe fn get_shaderiv(&self, shader: Handle, pname: gl::GLenum) -> gl::GLint {
        let shaders = self.shaders.borrow();
        let state = shaders.get(&shader).expect("unknown shader");
        match pname {
            gl::COMPILE_STATUS => state.compiled as gl::GLint,
            gl::SHADER_TYPE => state.r#type as gl::GLint,
            gl::INFO_LOG_LENGTH if state.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => state.info_log.len() as gl::GLint + 1,
            other => panic!("unsupported shader parameter 0x{other:x}"),
        }
    }

    unsafe fn get_string(&self, name: gl::GLenum) -> anyhow::Result<String> {
        match name {
            gl::VERSION => Ok("4.1 (fake)".to_string()),
            other => Err(anyhow::anyhow!("could not get string (name 0x{other:x})")),
        }
    }

    unsafe fn get_uniform_location(&self, program: Handle, name: &CStr) -> Option<gl::GLint> {
        let name = name.to_string_lossy().into_owned();
        let location = self.uniform_location(program, &name);
        self.record(Call::GetUniformLocation { program, name });
        location
    }

    unsafe fn link_program(&self, program: Handle) {
        self.record(Call::LinkProgram(program));
        let shaders = self.shaders.borrow();
        let mut programs = self.programs.borrow_mut();
        let state = programs.get_mut(&program).expect("unknown program");

        let attached: Vec<&ShaderState> = state
            .attached
            .iter()
            .filter_map(|shader| shaders.get(shader))
            .collect();
        let has_stage = |r#type| {
            attached
                .iter()
                .any(|shader| shader.compiled && shader.r#type == r#type)
        };

        state.linked = has_stage(gl::VERTEX_SHADER) && has_stage(gl::FRAGMENT_SHADER);
        if state.linked {
            state.info_log.clear();
            state.uniforms = attached
                .iter()
                .flat_map(|shader| parse_uniforms(&shader.source))
                .collect();
        } else {
            state.info_log = "error: linking requires a vertex and a fragment shader".to_string();
            state.uniforms.clear();
        }
    }

    unsafe fn polygon_mode(&self, face: gl::GLenum, mode: gl::GLenum) {
        self.record(Call::PolygonMode { face, mode });
    }

    unsafe fn program_uniform_1f(&self, program: Handle, location: gl::GLint, v0: f32) {
        self.set_float_uniform(program, location, vec![v0]);
    }

    unsafe fn program_uniform_2f(&self, program: Handle, location: gl::GLint, v0: f32, v1: f32) {
        self.set_float_uniform(program, location, vec![v0, v1]);
    }

    unsafe fn program_uniform_3f(
        &self,
        program: Handle,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
    ) {
        self.set_float_uniform(program, location, vec![v0, v1, v2]);
    }

    unsafe fn program_uniform_4f(
        &self,
        program: Handle,
        location: gl::GLint,
        v0: f32,
        v1: f32,
        v2: f32,
        v3: f32,
    ) {
        self.set_float_uniform(program, location, vec![v0, v1, v2, v3]);
    }

    unsafe fn program_uniform_1i(&self, program: Handle, location: gl::GLint, v0: i32) {
        self.set_int_uniform(program, location, vec![v0]);
    }

    unsafe fn program_uniform_2i(&self, program: Handle, location: gl::GLint, v0: i32, v1: i32) {
        self.set_int_uniform(program, location, vec![v0, v1]);
    }

    unsafe fn program_uniform_3i(
        &self,
        program: Handle,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
    ) {
        self.set_int_uniform(program, location, vec![v0, v1, v2]);
    }

    unsafe fn program_uniform_4i(
        &self,
        program: Handle,
        location: gl::GLint,
        v0: i32,
        v1: i32,
        v2: i32,
        v3: i32,
    ) {
        self.set_int_uniform(program, location, vec![v0, v1, v2, v3]);
    }

    unsafe fn shader_source(&self, shader: Handle, source: &CStr) {
        let source = source.to_string_lossy().into_owned();
        self.record(Call::ShaderSource {
            shader,
            source: source.clone(),
        });
        if let Some(state) = self.shaders.borrow_mut().get_mut(&shader) {
            state.source = source;
        }
    }

    unsafe fn use_program(&self, program: Option<Handle>) {
        self.record(Call::UseProgram(program));
        self.current_program.set(program);
    }

    unsafe fn vertex_attrib_pointer(
        &self,
        index: gl::GLuint,
        size: gl::GLint,
        r#type: gl::GLenum,
        normalized: gl::GLboolean,
        stride: gl::GLsizei,
        pointer: *const c_void,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            r#type,
            normalized,
            stride,
            offset: pointer as usize,
        });
    }

    unsafe fn viewport(&self, x: gl::GLint, y: gl::GLint, width: gl::GLsizei, height: gl::GLsizei) {
        self.record(Call::Viewport {
            x,
            y,
            width,
            height,
        });
    }
}

/// a file in the system temp dir that is removed on drop.
pub struct TempFile(PathBuf);

impl TempFile {
    pub fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("learn-opengl-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("could not write temp file");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}
