use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::device::GpuInit;
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputState, Key, MouseButton};
use crate::render::{RenderBackend, WgpuBackend};
use crate::renderer::Renderer;
use crate::time::{FrameClock, FrameLimiter};

/// How many zero-timeout pumps `Engine::create` waits for the window.
const STARTUP_PUMPS: usize = 200;

/// Window and frame-loop configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    /// Drawable width in physical pixels.
    pub width: u32,
    /// Drawable height in physical pixels.
    pub height: u32,
    /// Target frames per second; 0 runs uncapped.
    pub fps_cap: u32,
    pub gpu: GpuInit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "slate".to_string(),
            width: 1280,
            height: 720,
            fps_cap: 60,
            gpu: GpuInit::default(),
        }
    }
}

/// A window, its renderer, and the per-frame loop state.
///
/// The application owns the loop:
///
/// ```no_run
/// # use slate_engine::{Engine, EngineConfig, paint::Color};
/// let mut engine = Engine::create(EngineConfig::default())?;
/// while engine.poll_and_advance() {
///     let r = engine.renderer_mut();
///     r.clear(Color::BLACK);
///     r.present();
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Engine {
    // Dropped first so textures are released while the device is alive.
    renderer: Renderer<WgpuBackend>,
    handler: EngineHandler,
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    clock: FrameClock,
    limiter: FrameLimiter,
}

impl Engine {
    /// Opens the window and initializes the GPU.
    pub fn create(config: EngineConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1)));
        let mut handler = EngineHandler::new(attrs);

        let mut pumps = 0;
        let window = loop {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut handler)
            {
                return Err(anyhow!("event loop exited during startup (code {code})"));
            }
            if let Some(err) = handler.startup_error.take() {
                return Err(err);
            }
            if let Some(window) = handler.window.clone() {
                break window;
            }
            pumps += 1;
            if pumps >= STARTUP_PUMPS {
                return Err(anyhow!("window was not created after {STARTUP_PUMPS} event pumps"));
            }
        };

        let backend = WgpuBackend::new(window.clone(), config.gpu.clone())
            .context("failed to initialize GPU backend")?;
        let viewport = backend.viewport();
        let renderer = Renderer::new(backend, viewport);

        log::info!(
            "engine created: \"{}\" {}x{} (fps cap {})",
            config.title,
            viewport.width,
            viewport.height,
            config.fps_cap
        );

        // Startup events should not count as the first frame's input.
        handler.resized = None;

        Ok(Self {
            renderer,
            handler,
            event_loop,
            window,
            clock: FrameClock::new(),
            limiter: FrameLimiter::new(config.fps_cap),
        })
    }

    /// Runs one iteration of the frame loop.
    ///
    /// Advances the clock, snapshots input for edge queries, drains pending
    /// window events, applies resizes, and sleeps to honor the fps cap.
    /// Returns `false` once the window was closed or rendering is lost.
    pub fn poll_and_advance(&mut self) -> bool {
        self.clock.tick();
        self.handler.input.begin_frame();

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if matches!(status, PumpStatus::Exit(_)) || self.handler.quit {
            log::info!("window closed");
            return false;
        }

        if let Some(size) = self.handler.resized.take() {
            self.renderer.resize(size.width, size.height);
        }

        self.limiter.wait();

        if self.renderer.backend().is_lost() {
            log::error!("rendering device lost; stopping");
            return false;
        }
        true
    }

    pub fn renderer(&self) -> &Renderer<WgpuBackend> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<WgpuBackend> {
        &mut self.renderer
    }

    pub fn input(&self) -> &InputState {
        &self.handler.input
    }

    // ── window ────────────────────────────────────────────────────────────

    /// Drawable width in physical pixels.
    pub fn width(&self) -> u32 {
        self.renderer.viewport().width as u32
    }

    /// Drawable height in physical pixels.
    pub fn height(&self) -> u32 {
        self.renderer.viewport().height as u32
    }

    /// Switches between borderless desktop fullscreen and windowed mode.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        let mode = fullscreen.then_some(Fullscreen::Borderless(None));
        self.window.set_fullscreen(mode);
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    /// Target frames per second; 0 disables the cap.
    pub fn set_fps_cap(&mut self, fps: u32) {
        self.limiter.set_cap(fps);
    }

    // ── time ──────────────────────────────────────────────────────────────

    /// Seconds since the engine was created.
    pub fn elapsed_time(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Seconds since the previous `poll_and_advance`, at most 0.1.
    pub fn delta_time(&self) -> f32 {
        self.clock.delta()
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn key_down(&self, key: Key) -> bool {
        self.handler.input.key_down(key)
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.handler.input.key_pressed(key)
    }

    pub fn key_released(&self, key: Key) -> bool {
        self.handler.input.key_released(key)
    }

    /// Pointer x in physical window pixels.
    pub fn mouse_x(&self) -> f32 {
        self.handler.input.mouse_position().0
    }

    /// Pointer y in physical window pixels.
    pub fn mouse_y(&self) -> f32 {
        self.handler.input.mouse_position().1
    }

    pub fn mouse_button_down(&self, button: MouseButton) -> bool {
        self.handler.input.button_down(button)
    }

    pub fn mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.handler.input.button_pressed(button)
    }

    pub fn mouse_button_released(&self, button: MouseButton) -> bool {
        self.handler.input.button_released(button)
    }

    /// Vertical wheel lines scrolled this frame.
    pub fn mouse_wheel_delta(&self) -> f32 {
        self.handler.input.wheel_delta()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("engine shutting down");
    }
}

/// Receives winit callbacks while the loop is pumped.
struct EngineHandler {
    attrs: WindowAttributes,
    window: Option<Arc<Window>>,
    startup_error: Option<anyhow::Error>,
    input: InputState,
    resized: Option<PhysicalSize<u32>>,
    quit: bool,
}

impl EngineHandler {
    fn new(attrs: WindowAttributes) -> Self {
        Self {
            attrs,
            window: None,
            startup_error: None,
            input: InputState::new(),
            resized: None,
            quit: false,
        }
    }

    /// Applies a window event to loop state; platform calls stay outside.
    fn handle_event(&mut self, event: &WindowEvent, inner_size: Option<PhysicalSize<u32>>) {
        if let Some(ev) = translate_window_event(event) {
            self.input.apply_event(&ev);
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.quit = true,
            WindowEvent::Resized(size) => self.resized = Some(*size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = inner_size {
                    self.resized = Some(size);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for EngineHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attrs.clone()) {
            Ok(window) => {
                self.input.focused = window.has_focus();
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                self.startup_error = Some(anyhow::Error::new(e).context("failed to create window"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let inner_size = self.window.as_ref().map(|w| w.inner_size());
        self.handle_event(&event, inner_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn handler() -> EngineHandler {
        EngineHandler::new(Window::default_attributes())
    }

    #[test]
    fn close_request_sets_quit() {
        let mut h = handler();
        h.handle_event(&WindowEvent::CloseRequested, None);
        assert!(h.quit);
    }

    #[test]
    fn resize_is_latched_until_taken() {
        let mut h = handler();
        h.handle_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)), None);
        h.handle_event(&WindowEvent::Resized(PhysicalSize::new(1024, 768)), None);
        assert_eq!(h.resized.take(), Some(PhysicalSize::new(1024, 768)));
        assert_eq!(h.resized, None);
    }

    #[test]
    fn pointer_events_reach_input_state() {
        let mut h = handler();
        let ev = WindowEvent::CursorMoved {
            device_id: DeviceId::dummy(),
            position: PhysicalPosition::new(12.0, 34.0),
        };
        h.handle_event(&ev, None);
        assert_eq!(h.input.mouse_position(), (12.0, 34.0));
        assert!(!h.quit);
    }

    #[test]
    fn default_config_is_capped() {
        let config = EngineConfig::default();
        assert_eq!((config.width, config.height, config.fps_cap), (1280, 720, 60));
    }
}
