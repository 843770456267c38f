use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use tessera_engine::backend::WgpuBackend;
use tessera_engine::device::{Gpu, SurfaceErrorAction};
use tessera_engine::render::{ForwardRenderer, View, Viewport};

use crate::config::StudioConfig;
use crate::control::ControlThread;
use crate::demo_scene::DemoScene;

/// Degrees per arrow-key press.
const ORBIT_STEP: f32 = 5.0;
const ZOOM_STEP: f32 = 1.1;

/// Window-bound GPU state, created on `resumed`.
struct Target {
    window: Arc<Window>,
    gpu: Gpu,
    backend: WgpuBackend,
}

pub struct StudioApp {
    config: StudioConfig,
    demo: DemoScene,
    renderer: ForwardRenderer,
    target: Option<Target>,
    control: Option<ControlThread>,
    failure: Option<anyhow::Error>,
}

impl StudioApp {
    pub fn new(config: StudioConfig) -> Result<Self> {
        let demo = DemoScene::build()?;
        let renderer = ForwardRenderer::new(Arc::clone(&demo.scene), config.renderer.clone());
        Ok(Self {
            config,
            demo,
            renderer,
            target: None,
            control: None,
            failure: None,
        })
    }

    /// Stops the control thread and reports the error that ended the loop.
    pub fn finish(mut self) -> Result<()> {
        if let Some(mut control) = self.control.take() {
            control.stop();
        }
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn create_target(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let gpu = pollster::block_on(Gpu::new(
            Arc::clone(&window),
            size.width,
            size.height,
            self.config.gpu.clone(),
        ))
        .context("GPU initialization failed")?;
        let backend = WgpuBackend::new(
            gpu.device().clone(),
            gpu.queue().clone(),
            gpu.surface_format(),
            gpu.depth_format(),
        );

        self.control = Some(ControlThread::spawn(
            Arc::clone(&self.demo.scene),
            Arc::clone(&self.demo.cube),
            self.config.tick,
        )?);
        window.request_redraw();
        self.target = Some(Target {
            window,
            gpu,
            backend,
        });
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };

        let mut frame = match target.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => match target.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => anyhow::bail!("surface is out of memory"),
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                    target.window.request_redraw();
                    return Ok(());
                }
            },
        };

        let (width, height) = target.gpu.size();
        let view = View::new(
            Viewport::new(width as f32, height as f32),
            Arc::clone(self.demo.scene.camera()),
        );
        let stats = self
            .renderer
            .render(&mut target.backend, &view)
            .context("render failed")?;
        log::trace!("{stats:?}");

        let [r, g, b, a] = self.renderer.config().clear_color;
        target.backend.encode(
            &mut frame.encoder,
            &frame.view,
            target.gpu.depth_view(),
            wgpu::Color { r, g, b, a },
        );
        target.gpu.submit(frame);
        Ok(())
    }

    fn on_key(&mut self, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed {
            return false;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let camera = self.demo.scene.camera();
        match code {
            KeyCode::Escape => return true,
            KeyCode::ArrowLeft => camera.update(|c| c.turn_azimuth(-ORBIT_STEP)),
            KeyCode::ArrowRight => camera.update(|c| c.turn_azimuth(ORBIT_STEP)),
            KeyCode::ArrowUp => camera.update(|c| c.turn_elevation(ORBIT_STEP)),
            KeyCode::ArrowDown => camera.update(|c| c.turn_elevation(-ORBIT_STEP)),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                if !camera.update(|c| c.zoom(1.0 / ZOOM_STEP)) {
                    log::warn!("zoom rejected: camera at minimum distance");
                }
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                camera.update(|c| c.zoom(ZOOM_STEP));
            }
            KeyCode::KeyT => self.demo.toggle_plane_pass(),
            _ => return false,
        }
        self.demo.scene.request_redraw();
        false
    }
}

impl ApplicationHandler for StudioApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.target.is_some() {
            return;
        }
        if let Err(err) = self.create_target(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.failure.is_some() {
            event_loop.exit();
            return;
        }
        // Wake up once per tick to pick up control-thread changes.
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.config.tick));
        if self.demo.scene.take_redraw_request() {
            if let Some(target) = &self.target {
                target.window.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(target) = self.target.as_mut() {
                    target.gpu.resize(size.width, size.height);
                    target.window.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(target) = self.target.as_mut() {
                    let size = target.window.inner_size();
                    target.gpu.resize(size.width, size.height);
                    target.window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if self.on_key(&event) {
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut control) = self.control.take() {
            control.stop();
        }
        if let Some(target) = self.target.as_mut() {
            self.renderer.release_all(&mut target.backend);
        }
    }
}
