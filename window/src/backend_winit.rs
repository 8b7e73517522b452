use std::collections::VecDeque;
use std::ffi::{CString, c_void};
use std::num::NonZero;
use std::ptr::null;
use std::time::Duration;

use anyhow::{Context as _, anyhow};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig as _};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext as _,
    PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay as _, GlDisplay as _};
use glutin::surface::{GlSurface as _, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use input::{KeyState, KeyboardEvent, Scancode};
use raw_window_handle::HasWindowHandle as _;
use winit::platform::pump_events::{EventLoopExtPumpEvents as _, PumpStatus};

use crate::{DEFAULT_LOGICAL_SIZE, Event, WindowAttrs, WindowEvent};

#[inline]
fn map_keyboard_physical_key(physical_key: winit::keyboard::PhysicalKey) -> Option<Scancode> {
    use winit::keyboard::{KeyCode, PhysicalKey};
    match physical_key {
        PhysicalKey::Code(KeyCode::Escape) => Some(Scancode::Esc),
        PhysicalKey::Code(KeyCode::Digit1) => Some(Scancode::Num1),
        PhysicalKey::Code(KeyCode::Digit2) => Some(Scancode::Num2),
        PhysicalKey::Code(KeyCode::ArrowLeft) => Some(Scancode::ArrowLeft),
        PhysicalKey::Code(KeyCode::ArrowRight) => Some(Scancode::ArrowRight),
        _ => None,
    }
}

// NOTE: prefer multisampled configs, but any config glutin hands out will do.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|acc, config| {
            if config.num_samples() > acc.num_samples() {
                config
            } else {
                acc
            }
        })
        .expect("invariant: the config picker callback receives at least one config")
}

// NOTE: field order is drop order; the surface must go before the context, and both before the
// window they were created for.
struct GraphicsContext {
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: winit::window::Window,
}

impl GraphicsContext {
    fn new(
        event_loop: &winit::event_loop::ActiveEventLoop,
        attrs: &WindowAttrs,
    ) -> anyhow::Result<Self> {
        let logical_size = attrs.logical_size.unwrap_or(DEFAULT_LOGICAL_SIZE);
        let window_attrs = winit::window::WindowAttributes::default()
            .with_title(attrs.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                logical_size.0 as f64,
                logical_size.1 as f64,
            ))
            .with_resizable(attrs.resizable);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(window_attrs.clone()))
            .build(event_loop, ConfigTemplateBuilder::new(), pick_config)
            .map_err(|err| anyhow!("could not build gl display: {err}"))?;
        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, window_attrs, &gl_config)
                .context("could not create window")?,
        };

        let raw_window_handle = window
            .window_handle()
            .context("window handle is unavailable")?
            .as_raw();

        let gl_display = gl_config.display();
        let (major, minor) = attrs.gl_version;
        let context_attrs = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));
        let not_current_context = unsafe { gl_display.create_context(&gl_config, &context_attrs) }
            .with_context(|| format!("could not create gl {major}.{minor} core context"))?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("could not build surface attributes")?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs) }
            .context("could not create window surface")?;

        let gl_context = not_current_context
            .make_current(&gl_surface)
            .context("could not make current")?;

        let swap_interval = SwapInterval::Wait(NonZero::<u32>::MIN);
        if let Err(err) = gl_surface.set_swap_interval(&gl_context, swap_interval) {
            log::warn!("could not enable vsync: {err}");
        }

        Ok(Self {
            gl_surface,
            gl_context,
            window,
        })
    }
}

struct App {
    window_attrs: WindowAttrs,

    graphics_context: Option<GraphicsContext>,
    graphics_context_create_error: Option<anyhow::Error>,

    events: VecDeque<Event>,
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.graphics_context.is_some() || self.graphics_context_create_error.is_some() {
            return;
        }

        match GraphicsContext::new(event_loop, &self.window_attrs) {
            Ok(graphics_context) => {
                log::info!("created winit window with gl context");
                self.graphics_context = Some(graphics_context);
            }
            Err(err) => self.graphics_context_create_error = Some(err),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        window_event: winit::event::WindowEvent,
    ) {
        let Some(ref gc) = self.graphics_context else {
            return;
        };
        if gc.window.id() != window_id {
            return;
        }

        use winit::event::WindowEvent::*;
        let maybe_event = match window_event {
            Resized(physical_size) => {
                // NOTE: zero-sized surfaces are not a thing (minimized windows report 0x0).
                if let (Some(width), Some(height)) = (
                    NonZero::new(physical_size.width),
                    NonZero::new(physical_size.height),
                ) {
                    gc.gl_surface.resize(&gc.gl_context, width, height);
                }
                Some(Event::Window(WindowEvent::Resized {
                    physical_size: (physical_size.width, physical_size.height),
                }))
            }
            KeyboardInput { event, .. } => {
                map_keyboard_physical_key(event.physical_key).map(|scancode| {
                    Event::Keyboard(KeyboardEvent {
                        state: if event.state.is_pressed() {
                            KeyState::Pressed
                        } else {
                            KeyState::Released
                        },
                        scancode,
                        repeat: event.repeat,
                    })
                })
            }
            CloseRequested => Some(Event::Window(WindowEvent::CloseRequested)),
            other => {
                log::trace!("unused window event: {other:?}");
                None
            }
        };
        if let Some(event) = maybe_event {
            self.events.push_back(event);
        }
    }
}

// NOTE: the app (and thus the window) must be dropped before the event loop.
pub struct WinitWindow {
    app: App,
    event_loop: winit::event_loop::EventLoop<()>,
}

impl WinitWindow {
    /// creates the window and makes its gl context current on the calling thread.
    ///
    /// winit only allows creating windows once the event loop is resumed, so this pumps until
    /// that happens.
    pub fn new(attrs: WindowAttrs) -> anyhow::Result<Self> {
        let mut this = Self {
            event_loop: winit::event_loop::EventLoop::new()?,
            app: App {
                window_attrs: attrs,

                graphics_context: None,
                graphics_context_create_error: None,

                events: VecDeque::new(),
            },
        };
        while this.app.graphics_context.is_none() {
            this.pump_events()?;
        }
        Ok(this)
    }

    fn graphics_context(&self) -> &GraphicsContext {
        self.app
            .graphics_context
            .as_ref()
            .expect("initialized graphics context")
    }

    /// processes pending window system events without blocking.
    pub fn pump_events(&mut self) -> anyhow::Result<()> {
        let ret = match self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app)
        {
            PumpStatus::Exit(code) => Err(anyhow!(format!("unexpected exit (code {code})"))),
            PumpStatus::Continue => Ok(()),
        };

        if let Some(err) = self.app.graphics_context_create_error.take() {
            return Err(err).context("could not create window");
        }

        ret
    }

    pub fn pop_event(&mut self) -> Option<Event> {
        self.app.events.pop_front()
    }

    pub fn physical_size(&self) -> (u32, u32) {
        let inner_size = self.graphics_context().window.inner_size();
        (inner_size.width, inner_size.height)
    }

    /// returns null for symbols the driver does not know.
    pub fn get_proc_address(&self, symbol: &str) -> *const c_void {
        let gc = self.graphics_context();
        match CString::new(symbol) {
            Ok(symbol) => gc.gl_context.display().get_proc_address(symbol.as_c_str()),
            Err(_) => null(),
        }
    }

    /// presents the back buffer; blocks on vsync.
    pub fn swap_buffers(&self) -> anyhow::Result<()> {
        let gc = self.graphics_context();
        gc.gl_surface
            .swap_buffers(&gc.gl_context)
            .context("could not swap buffers")
    }
}
