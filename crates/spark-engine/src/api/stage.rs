use crate::api::config::SimulationConfig;
use crate::core::time::{FrameDriver, FrameTick};
use crate::error::Result;
use crate::extensions::tween::TweenEngine;
use crate::input::queue::InputQueue;
use crate::systems::effects::ParticleSystem;

/// Owns one tween engine, one particle system and the frame driver, and runs
/// them in a fixed order each frame: input → tweens → particles → render.
///
/// Tweens see the stage clock, which advances only while the driver runs, so
/// stopping and restarting the stage never makes animations jump.
pub struct Stage {
    pub tweens: TweenEngine,
    pub particles: ParticleSystem,
    pub input: InputQueue,
    driver: FrameDriver,
    /// Accumulated running time in ms.
    clock: f64,
}

impl Stage {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            tweens: TweenEngine::new(),
            particles: ParticleSystem::new(config),
            input: InputQueue::new(),
            driver: FrameDriver::new(),
            clock: 0.0,
        }
    }

    /// Build from a JSON [`SimulationConfig`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(SimulationConfig::from_json(json)?))
    }

    pub fn start(&mut self) {
        self.driver.start();
        log::debug!("stage started at {:.1} ms", self.clock);
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        log::debug!("stage stopped at {:.1} ms", self.clock);
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Running time seen by tweens, in ms.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Process one host frame at timestamp `now` (ms).
    ///
    /// Returns `Ok(false)` when the frame was skipped (stopped, or a
    /// non-increasing timestamp). Rendering happens only when a surface is
    /// attached to the particle system.
    pub fn frame(&mut self, now: f64) -> Result<bool> {
        let Some(FrameTick { delta, .. }) = self.driver.advance(now) else {
            return Ok(false);
        };
        self.clock += delta;

        self.particles.pointer().apply_all(&mut self.input);
        self.tweens.tick(self.clock);
        self.particles.tick(delta as f32);
        if self.particles.has_surface() {
            self.particles.render()?;
        }
        Ok(true)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
