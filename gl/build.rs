use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};

// NOTE: 4.1 core is the newest version macos will hand out; ProgramUniform* is core since 4.1.
const GL_VERSION: (u8, u8) = (4, 1);

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(&env::var("OUT_DIR")?);

    let mut api_out = BufWriter::new(File::create(out_dir.join("gl_api_generated.rs"))?);
    Registry::new(Api::Gl, GL_VERSION, Profile::Core, Fallbacks::All, [])
        .write_bindings(StructGenerator, &mut api_out)?;

    Ok(())
}
