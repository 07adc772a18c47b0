//! A single simulated particle and the options it is spawned from.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::surface::Color;

/// Milliseconds in one reference frame (1/60 s). Velocities are per reference frame.
pub const FRAME_MS: f32 = 16.67;

/// Smallest mass and size a particle may carry.
pub const MIN_MASS: f32 = 0.01;
pub const MIN_SIZE: f32 = 0.1;

/// Steering rule evaluated for a particle every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Kinematics, forces and collisions only.
    #[default]
    Default,
    /// Circle around the pointer.
    Orbit,
    /// Pulled toward the pointer.
    Attract,
    /// Pushed away from the pointer.
    Repel,
    /// Vertical wobble keyed to horizontal position.
    Sine,
}

/// Body shape drawn for a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    #[default]
    Circle,
    Square,
    /// Star with this many spikes (drawn as a 2·k-point polygon).
    Star(u8),
}

/// Spawn parameters for one particle. Every field has a default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleOptions {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Radius in surface units; also the collision radius.
    pub size: f32,
    pub color: Color,
    /// Lifetime in seconds of engine time.
    pub life: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub scale_speed: f32,
    /// Number of past positions kept for the trail (0 disables it).
    pub trail_length: usize,
    pub behavior: Behavior,
    /// Restitution applied on bounds or particle contact.
    pub bounce: f32,
    pub shape: ParticleShape,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            size: 3.0,
            color: Color::WHITE,
            life: 3.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            scale_speed: 0.0,
            trail_length: 0,
            behavior: Behavior::Default,
            bounce: 0.8,
            shape: ParticleShape::Circle,
        }
    }
}

impl ParticleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_life(mut self, seconds: f32) -> Self {
        self.life = seconds;
        self
    }

    pub fn with_spin(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_scale_speed(mut self, scale_speed: f32) -> Self {
        self.scale_speed = scale_speed;
        self
    }

    pub fn with_trail(mut self, length: usize) -> Self {
        self.trail_length = length;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }
}

/// A single particle with kinematic and visual state.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub size: f32,
    pub color: Color,
    /// Remaining-life ratio, refreshed every tick.
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub scale_speed: f32,
    /// Recent positions, oldest first.
    pub trail: VecDeque<Vec2>,
    pub trail_length: usize,
    /// Remaining life in seconds.
    pub life: f32,
    pub max_life: f32,
    pub behavior: Behavior,
    pub bounce: f32,
    pub shape: ParticleShape,
}

impl Particle {
    /// Build a particle, clamping malformed inputs to safe minimums.
    pub fn new(options: &ParticleOptions) -> Self {
        let life = finite_or(options.life, 0.0).max(0.0);
        Particle {
            position: options.position,
            velocity: options.velocity,
            mass: finite_or(options.mass, 1.0).max(MIN_MASS),
            size: finite_or(options.size, MIN_SIZE).max(MIN_SIZE),
            color: options.color,
            opacity: if life > 0.0 { 1.0 } else { 0.0 },
            rotation: options.rotation,
            rotation_speed: options.rotation_speed,
            scale: options.scale.max(0.0),
            scale_speed: options.scale_speed,
            trail: VecDeque::with_capacity(options.trail_length),
            trail_length: options.trail_length,
            life,
            max_life: life,
            behavior: options.behavior,
            bounce: finite_or(options.bounce, 0.0).max(0.0),
            shape: options.shape,
        }
    }

    /// Integrate one tick. `dt` is in reference frames (`delta_ms / FRAME_MS`).
    pub fn integrate(&mut self, dt: f32, gravity: Vec2, friction: f32) {
        if self.trail_length > 0 {
            self.trail.push_back(self.position);
            while self.trail.len() > self.trail_length {
                self.trail.pop_front();
            }
        }

        self.position += self.velocity * dt;
        self.velocity *= friction;
        self.velocity += gravity * self.mass * dt;
        self.rotation += self.rotation_speed * dt;
        self.scale = (self.scale + self.scale_speed * dt).max(0.0);

        self.life -= dt / 60.0;
        self.opacity = if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_clamps_bad_inputs() {
        let p = Particle::new(
            &ParticleOptions::new()
                .with_mass(0.0)
                .with_size(-4.0)
                .with_bounce(f32::NAN),
        );
        assert_eq!(p.mass, MIN_MASS);
        assert_eq!(p.size, MIN_SIZE);
        assert_eq!(p.bounce, 0.0);
        assert_eq!(p.opacity, 1.0);
    }

    #[test]
    fn integrate_moves_and_applies_gravity() {
        let mut p = Particle::new(&ParticleOptions::new().with_velocity(Vec2::new(2.0, 0.0)).with_mass(2.0));
        p.integrate(1.0, Vec2::new(0.0, 0.5), 1.0);
        assert_eq!(p.position, Vec2::new(2.0, 0.0));
        assert_eq!(p.velocity, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn friction_damps_velocity() {
        let mut p = Particle::new(&ParticleOptions::new().with_velocity(Vec2::new(10.0, 0.0)));
        p.integrate(1.0, Vec2::ZERO, 0.5);
        assert_eq!(p.velocity, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn life_drains_and_opacity_follows() {
        let mut p = Particle::new(&ParticleOptions::new().with_life(1.0));
        for _ in 0..30 {
            p.integrate(1.0, Vec2::ZERO, 1.0);
        }
        assert!((p.opacity - 0.5).abs() < 1e-4);
        for _ in 0..30 {
            p.integrate(1.0, Vec2::ZERO, 1.0);
        }
        assert!(p.life <= 1e-5);
        p.integrate(1.0, Vec2::ZERO, 1.0);
        assert!(!p.is_alive());
        assert_eq!(p.opacity, 0.0);
    }

    #[test]
    fn trail_is_bounded_oldest_first() {
        let mut p = Particle::new(&ParticleOptions::new().with_velocity(Vec2::X).with_trail(3));
        for _ in 0..5 {
            p.integrate(1.0, Vec2::ZERO, 1.0);
        }
        let xs: Vec<f32> = p.trail.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn spin_and_growth_advance() {
        let mut p = Particle::new(&ParticleOptions::new().with_spin(0.1).with_scale_speed(-0.6));
        p.integrate(2.0, Vec2::ZERO, 1.0);
        assert!((p.rotation - 0.2).abs() < 1e-6);
        assert_eq!(p.scale, 0.0);
    }
}
