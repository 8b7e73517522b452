mod backend_winit;

pub use backend_winit::WinitWindow as Window;

pub const DEFAULT_LOGICAL_SIZE: (u32, u32) = (800, 600);
pub const DEFAULT_TITLE: &str = "LearnOpenGL";
/// 4.1 core is the newest profile every desktop platform (macos included) can provide.
pub const DEFAULT_GL_VERSION: (u8, u8) = (4, 1);

#[derive(Debug, Clone)]
pub struct WindowAttrs {
    pub title: String,
    pub logical_size: Option<(u32, u32)>,
    pub resizable: bool,
    pub gl_version: (u8, u8),
}

impl Default for WindowAttrs {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            logical_size: None,
            resizable: true,
            gl_version: DEFAULT_GL_VERSION,
        }
    }
}

#[derive(Debug)]
pub enum WindowEvent {
    /// the surface was already resized to `physical_size` by the time this is popped.
    Resized { physical_size: (u32, u32) },
    CloseRequested,
}

#[derive(Debug)]
pub enum Event {
    Window(WindowEvent),
    Keyboard(input::KeyboardEvent),
}

pub fn create_window(attrs: WindowAttrs) -> anyhow::Result<Window> {
    Window::new(attrs)
}
