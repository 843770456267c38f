//! The control thread: mutates the scene while the window thread renders.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use tessera_engine::scene::{Mesh, Scene};

/// Degrees per tick.
const CUBE_SPIN: f32 = 1.0;
const CAMERA_DRIFT: f32 = 0.1;

pub struct ControlThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ControlThread {
    pub fn spawn(scene: Arc<Scene>, cube: Arc<Mesh>, tick: Duration) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("tessera-control".to_string())
            .spawn(move || {
                let base = cube.transform();
                let mut angle = 0.0f32;
                while !flag.load(Ordering::Acquire) {
                    angle = (angle + CUBE_SPIN).rem_euclid(360.0);
                    cube.set_transform(base * Mat4::from_axis_angle(Vec3::Z, angle.to_radians()));
                    scene.camera().update(|cam| cam.turn_azimuth(CAMERA_DRIFT));
                    scene.request_redraw();
                    thread::sleep(tick);
                }
                log::debug!("control thread stopped");
            })
            .context("failed to spawn control thread")?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("control thread panicked");
            }
        }
    }
}

impl Drop for ControlThread {
    fn drop(&mut self) {
        self.stop();
    }
}
