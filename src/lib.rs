pub mod color;
pub mod controls;
pub mod error;
pub mod frame;
pub mod object;
pub mod shader;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
