use std::io;
use std::path::PathBuf;

use crate::shader::Stage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

// NOTE: messages do not repeat their source; print with `{:#}` (anyhow) to get the whole chain,
// e.g. "create vertex: read vertex.glsl: No such file or directory (os error 2)".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("compile {stage} shader: {log}")]
    ShaderCompile { stage: Stage, log: String },
    #[error("link program: {log}")]
    ProgramLink { log: String },
    #[error("uniform {name} not found")]
    UniformNotFound { name: String },
    #[error("values count exceeds 4 (got {count})")]
    TooManyValues { count: usize },
    #[error("no values given")]
    NoValues,
    #[error("no shaders to link")]
    NoShaders,
    #[error("no vertices")]
    NoVertices,
    #[error("attribute {index} has {size} components, expected 1 to 4")]
    AttributeSize { index: usize, size: u32 },
    #[error("layout needs {required} floats per vertex, vertices have {available}")]
    LayoutOverflow { required: usize, available: usize },
    #[error("could not create {what}")]
    Create {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("create {stage}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn create(what: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Create { what, source }
    }

    pub(crate) fn stage(stage: Stage) -> impl FnOnce(Self) -> Self {
        move |source| Self::Stage {
            stage,
            source: Box::new(source),
        }
    }
}
