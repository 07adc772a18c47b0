use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Axis-aligned simulation rectangle in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `p` lies inside the rectangle grown by `margin` on every side.
    pub fn contains_with_margin(&self, p: Vec2, margin: f32) -> bool {
        p.x >= self.x - margin
            && p.x <= self.right() + margin
            && p.y >= self.y - margin
            && p.y <= self.bottom() + margin
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 800.0, 600.0)
    }
}

/// Construction-time options for the particle simulation.
///
/// Deserializes from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Population cap; spawning beyond it evicts the oldest particle (default: 1000).
    pub max_particles: usize,
    /// Acceleration per reference frame, scaled by particle mass (default: (0, 0.1)).
    pub gravity: Vec2,
    /// Velocity multiplier applied every tick (default: 0.99).
    pub friction: f32,
    pub bounds: Bounds,
    /// How far outside `bounds` a particle may travel before it is culled (default: 100).
    pub cull_margin: f32,
    /// Particles fading below this opacity are culled (default: 0.01).
    pub visibility_floor: f32,
    /// Clamp particles to `bounds` and reflect their velocity (default: true).
    pub bounce_off_bounds: bool,
    /// Resolve particle-particle overlaps every tick (default: true).
    pub particle_collisions: bool,
    /// Seed for emitter jitter (default: 42).
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            gravity: Vec2::new(0.0, 0.1),
            friction: 0.99,
            bounds: Bounds::default(),
            cull_margin: 100.0,
            visibility_floor: 0.01,
            bounce_off_bounds: true,
            particle_collisions: true,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    // -- Builder pattern --

    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_cull_margin(mut self, margin: f32) -> Self {
        self.cull_margin = margin;
        self
    }

    pub fn with_bounce_off_bounds(mut self, enabled: bool) -> Self {
        self.bounce_off_bounds = enabled;
        self
    }

    pub fn with_particle_collisions(mut self, enabled: bool) -> Self {
        self.particle_collisions = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Copy with out-of-range values pulled back to usable minimums.
    pub(crate) fn sanitized(mut self) -> Self {
        self.max_particles = self.max_particles.max(1);
        if !self.friction.is_finite() {
            self.friction = 1.0;
        }
        self.friction = self.friction.clamp(0.0, 1.0);
        self.bounds.width = self.bounds.width.max(0.0);
        self.bounds.height = self.bounds.height.max(0.0);
        self.cull_margin = self.cull_margin.max(0.0);
        self
    }
}
