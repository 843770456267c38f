use std::time::Duration;

use tessera_engine::device::GpuInit;
use tessera_engine::render::RendererConfig;
use winit::dpi::LogicalSize;

/// Studio window and runtime settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Control-thread tick: how often the animated scene is mutated.
    pub tick: Duration,
    pub gpu: GpuInit,
    pub renderer: RendererConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "tessera studio".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            tick: Duration::from_millis(16),
            gpu: GpuInit::default(),
            renderer: RendererConfig::default(),
        }
    }
}
