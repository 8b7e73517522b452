use gl::Adapter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const DARK_GREEN: Self = Self::new(0.0, 100.0 / 255.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// fills the color buffer of the current framebuffer with `color`.
pub fn clear<A: Adapter>(api: &A, color: Rgba) {
    unsafe {
        api.clear_color(color.r, color.g, color.b, color.a);
        api.clear(gl::COLOR_BUFFER_BIT);
    }
}
