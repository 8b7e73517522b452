use std::iter;
use std::process::ExitCode;

use anyhow::Context as _;
use gl::Adapter as _;
use learn_opengl::color::Rgba;
use learn_opengl::controls::Controls;
use learn_opengl::frame;
use learn_opengl::object::{Attribute, Object};
use learn_opengl::shader::Program;
use window::{Event, Window, WindowAttrs, WindowEvent};

const VERTEX_SHADER_PATH: &str = "vertex.glsl";
const FRAGMENT_SHADER_PATH: &str = "fragment.glsl";

const CLEAR_COLOR: Rgba = Rgba::DARK_GREEN;

// position (3) + color (3)
#[rustfmt::skip]
const VERTICES: [[f32; 6]; 3] = [
    [ 0.5, -0.5, 0.0,   1.0, 0.0, 0.0],
    [-0.5, -0.5, 0.0,   0.0, 1.0, 0.0],
    [ 0.0,  0.5, 0.0,   0.0, 0.0, 1.0],
];
const COLOR_ATTRIBUTE: Attribute = Attribute::new(3, false);

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // NOTE: stdout is reserved for the fatal error.
        eprintln!(
            "{level:<5} {file}:{line} > {text}",
            level = record.level(),
            file = record.file().unwrap_or_else(|| record.target()),
            line = record
                .line()
                .map_or_else(|| "??".to_string(), |line| line.to_string()),
            text = record.args(),
        );
    }

    fn flush(&self) {}
}

impl Logger {
    fn init() {
        if log::set_logger(&Logger).is_err() {
            return;
        }
        log::set_max_level(if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
    }
}

struct Context {
    program: Program<gl::Api>,
    object: Object<gl::Api>,
    gl_api: gl::Api,
    keyboard: input::KeyboardState,
    controls: Controls,
    close_requested: bool,
    // NOTE: the window owns the gl context, it must outlive every gl call above.
    window: Window,
}

impl Context {
    fn new() -> anyhow::Result<Self> {
        let window =
            window::create_window(WindowAttrs::default()).context("could not create window")?;

        let gl_api = gl::Api::load_with(|symbol| window.get_proc_address(symbol));
        let version = unsafe { gl_api.get_string(gl::VERSION) }?;
        log::info!("gl version: {version}");

        let (width, height) = window.physical_size();
        unsafe { gl_api.viewport(0, 0, width as gl::GLsizei, height as gl::GLsizei) };

        let program = Program::link_from_files(&gl_api, VERTEX_SHADER_PATH, FRAGMENT_SHADER_PATH)
            .context("could not create program")?;
        program.use_program(&gl_api);

        let object = match Object::new(&gl_api, &VERTICES, &[COLOR_ATTRIBUTE], None) {
            Ok(object) => object,
            Err(err) => {
                program.delete(&gl_api);
                return Err(err).context("could not create object");
            }
        };

        Ok(Self {
            program,
            object,
            gl_api,
            keyboard: input::KeyboardState::default(),
            controls: Controls::default(),
            close_requested: false,
            window,
        })
    }

    fn iterate(&mut self) -> anyhow::Result<()> {
        self.window.pump_events()?;

        let gl_api = &self.gl_api;
        let close_requested = &mut self.close_requested;
        let window = &mut self.window;
        let events = iter::from_fn(|| window.pop_event()).filter_map(|event| match event {
            Event::Window(WindowEvent::Resized { physical_size }) => {
                let (width, height) = physical_size;
                unsafe { gl_api.viewport(0, 0, width as gl::GLsizei, height as gl::GLsizei) };
                None
            }
            Event::Window(WindowEvent::CloseRequested) => {
                *close_requested = true;
                None
            }
            Event::Keyboard(keyboard_event) => Some(keyboard_event),
        });
        self.keyboard.handle_events(events);
        if self.close_requested {
            return Ok(());
        }

        // NOTE: close only ends the loop; this frame is still drawn.
        let close_requested = frame::step(
            &self.gl_api,
            &self.keyboard,
            &mut self.controls,
            &mut self.program,
            &self.object,
            CLEAR_COLOR,
        )
        .context("could not draw frame")?;
        self.close_requested |= close_requested;

        self.window.swap_buffers()
    }

    fn destroy(self) {
        self.object.delete(&self.gl_api);
        self.program.delete(&self.gl_api);
        log::info!("bye");
    }
}

fn run() -> anyhow::Result<()> {
    let mut ctx = Context::new()?;
    while !ctx.close_requested {
        if let Err(err) = ctx.iterate() {
            ctx.destroy();
            return Err(err);
        }
    }
    ctx.destroy();
    Ok(())
}

fn main() -> ExitCode {
    Logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
