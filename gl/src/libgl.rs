// NOTE: generated by build.rs with gl_generator's StructGenerator; the function pointers are
// loaded at runtime with `Api::load_with`.
include!(concat!(env!("OUT_DIR"), "/gl_api_generated.rs"));
