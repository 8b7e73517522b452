use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::fs;
use std::path::Path;

use gl::Adapter;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn gl_type(self) -> gl::GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// cuts `source` at its first nul (the driver stops reading there anyway) and nul-terminates it.
fn terminate(mut source: Vec<u8>) -> CString {
    if let Some(nul) = source.iter().position(|&byte| byte == 0) {
        source.truncate(nul);
    }
    // SAFETY: interior nuls were cut off above.
    unsafe { CString::from_vec_unchecked(source) }
}

/// A compiled shader stage. Values of this type only exist for shaders that compiled
/// successfully; they are consumed either by [`Program::link`] or by [`Shader::delete`].
pub struct Shader<A: Adapter> {
    handle: A::Shader,
    stage: Stage,
}

impl<A: Adapter> fmt::Debug for Shader<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("handle", &self.handle)
            .field("stage", &self.stage)
            .finish()
    }
}

impl<A: Adapter> Shader<A> {
    pub fn compile(api: &A, stage: Stage, source: impl Into<Vec<u8>>) -> Result<Self> {
        let source = terminate(source.into());
        unsafe {
            let handle = api
                .create_shader(stage.gl_type())
                .map_err(Error::create("shader"))?;
            api.shader_source(handle, &source);
            api.compile_shader(handle);

            let compile_status = api.get_shaderiv(handle, gl::COMPILE_STATUS);
            if compile_status == gl::FALSE as gl::GLint {
                let log = api.get_shader_info_log(handle);
                api.delete_shader(handle);
                return Err(Error::ShaderCompile { stage, log });
            }
            if api.get_shaderiv(handle, gl::INFO_LOG_LENGTH) > 0 {
                log::warn!(
                    "{stage} shader compiled with warnings: {}",
                    api.get_shader_info_log(handle)
                );
            }

            log::debug!("compiled {stage} shader {handle:?}");
            Ok(Self { handle, stage })
        }
    }

    pub fn compile_from_file(api: &A, stage: Stage, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::compile(api, stage, source)
    }

    #[inline]
    pub fn handle(&self) -> A::Shader {
        self.handle
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn delete(self, api: &A) {
        log::debug!("deleting {} shader {:?}", self.stage, self.handle);
        unsafe { api.delete_shader(self.handle) };
    }
}

/// A linked shader program.
///
/// uniform locations are resolved by name on first use and cached for the lifetime of the
/// program; names that are not active are never cached.
pub struct Program<A: Adapter> {
    handle: A::Program,
    locations: HashMap<String, gl::GLint>,
}

impl<A: Adapter> fmt::Debug for Program<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("handle", &self.handle)
            .field("locations", &self.locations)
            .finish()
    }
}

#[inline]
fn check_values_count(count: usize) -> Result<()> {
    match count {
        0 => Err(Error::NoValues),
        1..=4 => Ok(()),
        _ => Err(Error::TooManyValues { count }),
    }
}

impl<A: Adapter> Program<A> {
    /// links `shaders` in order. the shaders are consumed: they are deleted whether linking
    /// succeeds or not.
    pub fn link(api: &A, shaders: Vec<Shader<A>>) -> Result<Self> {
        if shaders.is_empty() {
            return Err(Error::NoShaders);
        }

        let shaders = scopeguard::guard(shaders, |shaders| {
            for shader in shaders {
                shader.delete(api);
            }
        });

        unsafe {
            let handle = api.create_program().map_err(Error::create("program"))?;

            for shader in shaders.iter() {
                api.attach_shader(handle, shader.handle);
            }

            api.link_program(handle);

            for shader in shaders.iter() {
                api.detach_shader(handle, shader.handle);
            }

            let link_status = api.get_programiv(handle, gl::LINK_STATUS);
            if link_status == gl::FALSE as gl::GLint {
                let log = api.get_program_info_log(handle);
                api.delete_program(handle);
                return Err(Error::ProgramLink { log });
            }

            log::debug!("linked program {handle:?} from {} shaders", shaders.len());
            Ok(Self {
                handle,
                locations: HashMap::new(),
            })
        }
    }

    pub fn link_from_files(
        api: &A,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex = Shader::compile_from_file(api, Stage::Vertex, vertex_path)
            .map_err(Error::stage(Stage::Vertex))?;
        let fragment = match Shader::compile_from_file(api, Stage::Fragment, fragment_path) {
            Ok(fragment) => fragment,
            Err(err) => {
                vertex.delete(api);
                return Err(Error::stage(Stage::Fragment)(err));
            }
        };
        Self::link(api, vec![vertex, fragment])
    }

    #[inline]
    pub fn handle(&self) -> A::Program {
        self.handle
    }

    /// makes this the active program of the context for subsequent draw calls.
    pub fn use_program(&self, api: &A) {
        unsafe { api.use_program(Some(self.handle)) };
    }

    fn location(&mut self, api: &A, name: &str) -> Result<gl::GLint> {
        if let Some(&location) = self.locations.get(name) {
            return Ok(location);
        }

        let not_found = || Error::UniformNotFound {
            name: name.to_string(),
        };
        // NOTE: a name with an interior nul can not be active.
        let cname = CString::new(name).map_err(|_| not_found())?;
        let location = unsafe { api.get_uniform_location(self.handle, &cname) }
            .ok_or_else(not_found)?;

        log::trace!("uniform `{name}` of program {:?} is at {location}", self.handle);
        self.locations.insert(name.to_string(), location);
        Ok(location)
    }

    /// sets an int, ivec2, ivec3 or ivec4 uniform depending on the number of values.
    pub fn set_uniform_int(&mut self, api: &A, name: &str, values: &[i32]) -> Result<()> {
        check_values_count(values.len())?;
        let location = self.location(api, name)?;

        let program = self.handle;
        unsafe {
            match *values {
                [v0] => api.program_uniform_1i(program, location, v0),
                [v0, v1] => api.program_uniform_2i(program, location, v0, v1),
                [v0, v1, v2] => api.program_uniform_3i(program, location, v0, v1, v2),
                [v0, v1, v2, v3] => api.program_uniform_4i(program, location, v0, v1, v2, v3),
                _ => unreachable!("values count is checked above"),
            }
        }
        Ok(())
    }

    /// sets a float, vec2, vec3 or vec4 uniform depending on the number of values.
    pub fn set_uniform_float(&mut self, api: &A, name: &str, values: &[f32]) -> Result<()> {
        check_values_count(values.len())?;
        let location = self.location(api, name)?;

        let program = self.handle;
        unsafe {
            match *values {
                [v0] => api.program_uniform_1f(program, location, v0),
                [v0, v1] => api.program_uniform_2f(program, location, v0, v1),
                [v0, v1, v2] => api.program_uniform_3f(program, location, v0, v1, v2),
                [v0, v1, v2, v3] => api.program_uniform_4f(program, location, v0, v1, v2, v3),
                _ => unreachable!("values count is checked above"),
            }
        }
        Ok(())
    }

    pub fn delete(self, api: &A) {
        log::debug!("deleting program {:?}", self.handle);
        unsafe { api.delete_program(self.handle) };
    }
}
