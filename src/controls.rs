use gl::Adapter;
use input::{KeyboardState, Scancode};

/// how much the shift changes per frame while an arrow key is held.
pub const SHIFT_STEP: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

impl PolygonMode {
    pub fn gl_mode(self) -> gl::GLenum {
        match self {
            Self::Fill => gl::FILL,
            Self::Line => gl::LINE,
        }
    }
}

pub fn set_polygon_mode<A: Adapter>(api: &A, mode: PolygonMode) {
    log::debug!("polygon mode: {mode:?}");
    unsafe { api.polygon_mode(gl::FRONT_AND_BACK, mode.gl_mode()) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Close,
    SetPolygonMode(PolygonMode),
}

#[derive(Debug, Default)]
pub struct Controls {
    shift: f32,
}

impl Controls {
    /// reacts to at most one held key per frame, first match wins: escape, 1, 2, right, left.
    ///
    /// arrows adjust the shift in place; everything else is returned for the caller to apply.
    pub fn handle(&mut self, keyboard: &KeyboardState) -> Option<Action> {
        if keyboard.down(Scancode::Esc) {
            Some(Action::Close)
        } else if keyboard.down(Scancode::Num1) {
            Some(Action::SetPolygonMode(PolygonMode::Fill))
        } else if keyboard.down(Scancode::Num2) {
            Some(Action::SetPolygonMode(PolygonMode::Line))
        } else if keyboard.down(Scancode::ArrowRight) {
            self.shift += SHIFT_STEP;
            None
        } else if keyboard.down(Scancode::ArrowLeft) {
            self.shift -= SHIFT_STEP;
            None
        } else {
            None
        }
    }

    #[inline]
    pub fn shift(&self) -> f32 {
        self.shift
    }
}
