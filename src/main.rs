use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use segcast::scaler::Upscaler;
use segcast::{DEMO_LEVEL, Framebuffer, Renderer, Scene, ViewerConfig};

const MAX_TICK: Duration = Duration::from_millis(100);

struct App {
    config: ViewerConfig,
    scene: Scene,

    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    renderer: Renderer,
    frame: Framebuffer,
    upscaler: Upscaler,

    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    frame_counter: u32,
    last_fps_report: Instant,

    // First fatal error raised inside the event loop.
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, scene: Scene) -> Self {
        let (w, h) = config.internal_size(
            config.window.width as usize,
            config.window.height as usize,
        );
        let renderer = Renderer::new(w, h).with_clear_color(config.render.clear_color);
        Self {
            config,
            scene,
            window: None,
            surface: None,
            renderer,
            frame: Framebuffer::new(w, h),
            upscaler: Upscaler::default(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
            frame_counter: 0,
            last_fps_report: Instant::now(),
            failure: None,
        }
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ));
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        let context =
            softbuffer::Context::new(window.clone()).map_err(|e| anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("softbuffer surface: {e}"))?;

        let size = window.inner_size();
        self.rebuild_targets(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
        Ok(())
    }

    /// Match the internal render size and the upscaler to a new window size.
    fn rebuild_targets(&mut self, window_w: usize, window_h: usize) {
        let (w, h) = self.config.internal_size(window_w, window_h);
        self.renderer.resize(w, h);
        let (w, h) = (self.renderer.width(), self.renderer.height());
        if self.upscaler.src_size() != (w, h) || self.upscaler.dst_size() != (window_w, window_h) {
            log::info!("window {window_w}x{window_h}, rendering at {w}x{h}");
            self.upscaler = Upscaler::new(w, h, window_w, window_h);
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };
        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized.
            return Ok(());
        };
        surface
            .resize(dw, dh)
            .map_err(|e| anyhow!("surface resize: {e}"))?;

        let scene = &self.scene;
        self.renderer.render(
            &scene.level,
            &scene.textures,
            &scene.pose,
            &scene.sprites,
            &mut self.frame,
        );

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| anyhow!("surface buffer: {e}"))?;
        self.upscaler.blit(&self.frame, &mut buffer);
        if self.config.render.sharpen {
            self.upscaler.sharpen(&mut buffer);
        }
        buffer.present().map_err(|e| anyhow!("present: {e}"))?;

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_report).as_secs_f32();
        if elapsed >= 1.0 {
            log::debug!("{:.1} fps", self.frame_counter as f32 / elapsed);
            self.frame_counter = 0;
            self.last_fps_report = now;
        }

        window.request_redraw();
        Ok(())
    }

    fn held(&self, code: KeyCode) -> f32 {
        if self.keys_down.contains(&code) { 1.0 } else { 0.0 }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(MAX_TICK).as_secs_f32();
        self.last_tick = now;

        let controls = &self.config.controls;
        let turn = self.held(KeyCode::KeyE) + self.held(KeyCode::ArrowRight)
            - self.held(KeyCode::KeyQ)
            - self.held(KeyCode::ArrowLeft);
        let mut forward = self.held(KeyCode::KeyW) + self.held(KeyCode::ArrowUp)
            - self.held(KeyCode::KeyS)
            - self.held(KeyCode::ArrowDown);
        let mut strafe = self.held(KeyCode::KeyD) - self.held(KeyCode::KeyA);
        let len = (forward * forward + strafe * strafe).sqrt();
        if len > 1.0 {
            forward /= len;
            strafe /= len;
        }
        let crouch = if self.keys_down.contains(&KeyCode::KeyC) {
            controls.crouch_offset
        } else {
            0.0
        };
        let step = controls.move_speed * dt;
        let turn_step = turn.clamp(-1.0, 1.0) * controls.turn_speed_deg * dt;

        let pose = &mut self.scene.pose;
        pose.view_angle_deg = (pose.view_angle_deg + turn_step).rem_euclid(360.0);
        pose.translate(forward * step, strafe * step);
        pose.eye_offset = crouch;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.open_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().is_some_and(|w| w.id() != id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::Resized(size) => {
                self.rebuild_targets(size.width as usize, size.height as usize);
            }

            WindowEvent::RedrawRequested => {
                self.tick();
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// `segcast [level.toml] [config.toml]`
fn parse_args() -> anyhow::Result<(Option<PathBuf>, Option<PathBuf>)> {
    let mut args = std::env::args_os().skip(1);
    let level = args.next().map(PathBuf::from);
    let config = args.next().map(PathBuf::from);
    if args.next().is_some() {
        anyhow::bail!("usage: segcast [level.toml] [config.toml]");
    }
    Ok((level, config))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let (level_path, config_path) = parse_args()?;

    let config = match &config_path {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let scene = match &level_path {
        Some(path) => {
            Scene::load(path).with_context(|| format!("loading level {}", path.display()))?
        }
        None => {
            log::info!("no level given; using the built-in demo");
            Scene::from_toml_str(DEMO_LEVEL).context("built-in demo level")?
        }
    };

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app).context("event loop")?;

    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
