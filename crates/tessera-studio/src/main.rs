mod app;
mod config;
mod control;
mod demo_scene;

use anyhow::{Context, Result};
use winit::event_loop::EventLoop;

use tessera_engine::logging::{init_logging, LoggingConfig};

use crate::app::StudioApp;
use crate::config::StudioConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::default();
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = StudioApp::new(config).context("failed to build demo scene")?;

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    // A render error stops the loop; surface it as the exit status.
    app.finish()
}
