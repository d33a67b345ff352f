mod audio;
mod keys;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use pasture_common::SimConfig;
use pasture_input::{Action, InputState};
use pasture_render::{FrameDriver, FrameStats};
use pasture_render_wgpu::{GpuError, WgpuRenderer};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::audio::TracingAudio;

#[derive(Parser)]
#[command(name = "pasture-desktop", about = "First-person pasture shooter")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML tuning file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for spawns and the flock
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// Everything the frame loop owns besides the GPU.
struct AppState {
    driver: FrameDriver,
    input: InputState,
    audio: TracingAudio,
    last_stats: FrameStats,
    show_hud: bool,
}

impl AppState {
    fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            driver: FrameDriver::new(config, seed),
            input: InputState::new(),
            audio: TracingAudio::default(),
            last_stats: FrameStats::default(),
            show_hud: true,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(action) = keys::action_for(key) {
            self.input.handle(action, pressed);
            return;
        }
        if !pressed {
            return;
        }
        match key {
            KeyCode::F1 => self.show_hud = !self.show_hud,
            KeyCode::Escape => self.input.set_mouse_captured(false),
            _ => {}
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }
        let sim = self.driver.sim();
        let score = sim.score();
        let timer = self.driver.timer();

        egui::Area::new(egui::Id::new("hud"))
            .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.heading(format!("Score {}", score.points));
                    ui.label(format!("Kills: {}", score.kills));
                    ui.label(format!("Health: {:.0}", sim.health()));
                    ui.label(format!("Enemies: {}", sim.swarm().len()));
                    ui.separator();
                    ui.label(format!(
                        "{:.0} fps ({:.1} ms)",
                        timer.fps(),
                        timer.average().as_secs_f64() * 1000.0
                    ));
                    ui.label(format!(
                        "Draw calls: {}  Batch verts: {}",
                        self.last_stats.draw_calls, self.last_stats.batch_vertices
                    ));
                    ui.small("RMB: look | WASD: move | Q/E: turn | F/LMB: fire");
                    ui.small("Space: jump | B/V: place/remove block | F1: HUD");
                });
            });

        if sim.downed() {
            egui::Area::new(egui::Id::new("downed"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.heading("Overrun! The flock is lost.");
                });
        }
    }
}

/// Window plus every GPU object created on resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Pasture")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::from)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pasture_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(GpuError::from)?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, format, config.width, config.height)?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Paint the HUD over the already rendered scene.
    fn paint_ui(&mut self, ctx: &EguiContext, view: &wgpu::TextureView, state: &AppState) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = ctx.run(raw_input, |ctx| state.draw_hud(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer.render(&mut pass, &paint_jobs, &screen);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct App {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            error: None,
        }
    }

    fn set_captured(&mut self, captured: bool) {
        self.state.input.set_mouse_captured(captured);
        if let Some(gpu) = &self.gpu {
            gpu.window.set_cursor_visible(!captured);
        }
    }

    /// One host frame: sample input, tick the driver into a GPU frame, then
    /// draw the HUD on top.
    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let controls = self.state.input.controls();
        let mut frame = gpu.renderer.frame(&gpu.device, &gpu.queue);
        self.state.last_stats =
            self.state
                .driver
                .tick(&controls, &mut frame, &mut self.state.audio);
        frame.finish(&view);

        gpu.paint_ui(&self.egui_ctx, &view, &self.state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state
                    .driver
                    .set_aspect(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.state
                        .driver
                        .set_aspect(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
                self.set_captured(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
                if !self.state.input.mouse_captured() {
                    if let Some(gpu) = &self.gpu {
                        gpu.window.set_cursor_visible(true);
                    }
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Right => self.set_captured(pressed),
                    MouseButton::Left => self.state.input.handle(Action::Fire, pressed),
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        // Angles only; the view matrix is rebuilt once per frame in the driver.
        if let DeviceEvent::MouseMotion { delta } = event {
            let camera = self.state.driver.sim_mut().camera_mut();
            self.state
                .input
                .look(camera, delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    tracing::info!(seed = cli.seed, "pasture-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(AppState::new(config, cli.seed));
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.error {
        return Err(e);
    }
    tracing::info!(
        score = app.state.driver.sim().score().points,
        frames = app.state.driver.sim().frame(),
        cues = app.state.audio.played(),
        "session ended"
    );
    Ok(())
}
