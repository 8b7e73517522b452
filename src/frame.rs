use gl::Adapter;
use input::KeyboardState;

use crate::color::{self, Rgba};
use crate::controls::{Action, Controls, set_polygon_mode};
use crate::error::Result;
use crate::object::Object;
use crate::shader::Program;

/// the uniform every frame pushes the current shift into.
pub const SHIFT_UNIFORM: &str = "shift";

/// applies this frame's control action, then clears, updates the shift uniform and draws.
///
/// returns true if closing was requested. the frame is drawn either way; a missing shift uniform
/// is an error on every frame, the last one included.
pub fn step<A: Adapter>(
    api: &A,
    keyboard: &KeyboardState,
    controls: &mut Controls,
    program: &mut Program<A>,
    object: &Object<A>,
    clear_color: Rgba,
) -> Result<bool> {
    let mut close_requested = false;
    match controls.handle(keyboard) {
        Some(Action::Close) => close_requested = true,
        Some(Action::SetPolygonMode(mode)) => set_polygon_mode(api, mode),
        None => {}
    }

    color::clear(api, clear_color);
    program.set_uniform_float(api, SHIFT_UNIFORM, &[controls.shift()])?;
    object.draw(api);

    Ok(close_requested)
}
