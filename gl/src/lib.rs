#[allow(
    clippy::all,
    dead_code,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    unused_imports
)]
mod libgl;
mod wrap;

pub use libgl::types::*;
pub use libgl::*;
pub use wrap::Adapter;

pub type Api = libgl::Gl;
