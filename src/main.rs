use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use gltf_viewer::cli::{Cli, RunMode, ViewerConfig};
use gltf_viewer::controllers::swap_controller;
use gltf_viewer::core::{Clock, GpuContext, WinitInput};
use gltf_viewer::gpu::{create_vertex_arrays, save_image, OffscreenTarget, SceneRenderer, CAPTURE_FORMAT};
use gltf_viewer::gui::{self, FrameStats, ViewerState};
use gltf_viewer::render::{draw_scene, FrameUniforms, LightSettings, RecordingContext};
use gltf_viewer::scene::{SceneDocument, SceneFraming};
use gltf_viewer::traits::{CameraController, GraphicsContext};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.12,
    a: 1.0,
};

/// Loaded scene plus everything derived from it once at startup
struct SceneSetup {
    document: SceneDocument,
    scene_index: Option<usize>,
    framing: SceneFraming,
    light: LightSettings,
}

impl SceneSetup {
    fn new(document: SceneDocument, config: &ViewerConfig) -> Self {
        let scene_index = document.active_scene();
        if scene_index.is_none() {
            log::warn!("Document has no scene, nothing will be drawn");
        }
        let framing = SceneFraming::new(&document, scene_index);
        let mut light = LightSettings::from_scene(&document, scene_index);
        light.enabled = config.lighting;
        light.from_camera = config.light_from_camera;

        Self {
            document,
            scene_index,
            framing,
            light,
        }
    }

    fn initial_controller(&self, config: &ViewerConfig) -> Box<dyn CameraController> {
        let camera = config.camera.unwrap_or_else(|| self.framing.default_camera());
        config.controller.build(camera, self.framing.controller_speed())
    }

    /// Run draw submission for the active scene into `context`
    fn draw(&self, context: &mut dyn GraphicsContext, frame: &FrameUniforms, ranges: &[gltf_viewer::gpu::VaoRange]) {
        if let Some(scene_index) = self.scene_index {
            draw_scene(&self.document, scene_index, ranges, frame, context);
        }
    }

    fn frame_uniforms(&self, controller: &dyn CameraController, light: &LightSettings, size: (u32, u32)) -> FrameUniforms {
        let aspect_ratio = size.0 as f32 / size.1.max(1) as f32;
        FrameUniforms::new(
            controller.camera().view_matrix(),
            self.framing.projection_matrix(aspect_ratio),
            light,
        )
    }
}

// === Offscreen modes ===

/// Render one frame without a window and write it to `path`
fn capture(setup: &SceneSetup, config: &ViewerConfig, path: &std::path::Path) -> Result<()> {
    let gpu = pollster::block_on(GpuContext::new_headless())?;
    let mut renderer = SceneRenderer::new(
        gpu.clone(),
        &setup.document,
        CAPTURE_FORMAT,
        config.shader_source.as_deref(),
    )?;
    let target = OffscreenTarget::new(gpu.device(), config.width, config.height);
    let controller = setup.initial_controller(config);
    let frame = setup.frame_uniforms(controller.as_ref(), &setup.light, target.size());

    renderer.begin_frame();
    let ranges = renderer.vertex_array_ranges().to_vec();
    setup.draw(&mut renderer, &frame, &ranges);

    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
    renderer.finish_frame(&mut encoder, target.view(), target.size(), CLEAR_COLOR);
    gpu.queue().submit(std::iter::once(encoder.finish()));
    log::info!("Rendered {} draws offscreen", renderer.last_draw_count());

    let pixels = target.read_pixels(&gpu)?;
    save_image(path, config.width, config.height, pixels)
}

/// Print the calls one frame makes on the graphics context
fn dump_draws(setup: &SceneSetup, config: &ViewerConfig) {
    let (_, ranges) = create_vertex_arrays(&setup.document);
    let controller = setup.initial_controller(config);
    let frame = setup.frame_uniforms(controller.as_ref(), &setup.light, (config.width, config.height));

    let mut context = RecordingContext::default();
    setup.draw(&mut context, &frame, &ranges);

    println!("camera: --lookat {}", controller.camera().look_at_args());
    for call in context.calls() {
        println!("{}", call);
    }
    println!("{} draws", context.draw_count());
}

// === Rendering System ===

/// Window surface, scene renderer and GUI renderer
struct Viewer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: SceneRenderer,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Viewer {
    async fn new(window: Arc<Window>, setup: &SceneSetup, config: &ViewerConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::new_with_window(window.clone()).await?;

        let surface_config = Self::create_surface_config(&surface, gpu.adapter(), size);
        surface.configure(gpu.device(), &surface_config);

        let renderer = SceneRenderer::new(
            gpu.clone(),
            &setup.document,
            surface_config.format,
            config.shader_source.as_deref(),
        )?;

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!("Viewer initialized: {}x{} {:?}", size.width, size.height, surface_config.format);

        Ok(Self {
            gpu,
            surface,
            surface_config,
            renderer,
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
    }

    /// GUI wants the pointer or keyboard, so the camera must not react
    fn gui_has_focus(&self) -> bool {
        self.egui_ctx.wants_pointer_input() || self.egui_ctx.wants_keyboard_input()
    }

    fn render(
        &mut self,
        window: &Window,
        setup: &SceneSetup,
        controller: &dyn CameraController,
        state: &mut ViewerState,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Scene pass
        let size = self.size();
        let frame = setup.frame_uniforms(controller, &state.light, size);
        self.renderer.begin_frame();
        let ranges = self.renderer.vertex_array_ranges().to_vec();
        setup.draw(&mut self.renderer, &frame, &ranges);
        self.renderer.finish_frame(&mut encoder, &view, size, CLEAR_COLOR);

        // egui pass - UI overlay
        let camera = controller.camera();
        let stats = FrameStats {
            fps,
            draws: self.renderer.last_draw_count(),
        };
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            gui::show(ctx, state, &camera, stats);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the encoder,
            // but egui-wgpu requires 'static. This is safe because we drop the
            // render pass before using the encoder again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }
}

// === Application ===

struct App {
    config: ViewerConfig,
    setup: SceneSetup,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    controller: Box<dyn CameraController>,
    input: WinitInput,
    clock: Clock,
    state: ViewerState,
}

impl App {
    fn new(config: ViewerConfig, setup: SceneSetup) -> Self {
        let controller = setup.initial_controller(&config);
        let state = ViewerState::new(controller.kind(), controller.speed(), setup.light);
        Self {
            config,
            setup,
            window: None,
            viewer: None,
            controller,
            input: WinitInput::new(),
            clock: Clock::new(),
            state,
        }
    }

    /// Apply panel edits made during the previous frame
    fn sync_gui_state(&mut self) {
        if self.state.controller != self.controller.kind() {
            self.controller = swap_controller(self.controller.as_ref(), self.state.controller);
        }
        if self.state.speed != self.controller.speed() {
            self.controller.set_speed(self.state.speed);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let elapsed_time = self.clock.tick();
        self.sync_gui_state();

        let (Some(viewer), Some(window)) = (&mut self.viewer, &self.window) else {
            return;
        };

        if !viewer.gui_has_focus() {
            self.controller.update(&self.input, elapsed_time);
        }

        match viewer.render(
            window,
            &self.setup,
            self.controller.as_ref(),
            &mut self.state,
            self.clock.fps(),
        ) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                viewer.resize(window.inner_size());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let title = format!("glTF Viewer - {}", self.config.file.display());
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title(title)
                    .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height)),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let viewer = match pollster::block_on(Viewer::new(window.clone(), &self.setup, &self.config)) {
                Ok(viewer) => viewer,
                Err(e) => {
                    log::error!("Failed to initialize viewer: {:#}", e);
                    event_loop.exit();
                    return;
                }
            };

            self.window = Some(window);
            self.viewer = Some(viewer);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let (Some(viewer), Some(window)) = (&mut self.viewer, &self.window) {
            viewer.handle_event(window, &event);
        }
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::try_from(Cli::parse())?;
    let document = gltf_viewer::load_scene(&config.file)?;
    let setup = SceneSetup::new(document, &config);

    match config.mode.clone() {
        RunMode::Capture(path) => capture(&setup, &config, &path),
        RunMode::DumpDraws => {
            dump_draws(&setup, &config);
            Ok(())
        }
        RunMode::Interactive => {
            let event_loop = EventLoop::new().context("Failed to create event loop")?;
            let mut app = App::new(config, setup);

            log::info!("Controls: trackball drags with the middle button (Shift pans, Ctrl zooms); first person uses WASD, arrows, Q/E and left drag; Escape quits");
            event_loop.run_app(&mut app)?;
            Ok(())
        }
    }
}
