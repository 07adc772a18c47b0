//! Particle simulation: particles, emitters and force fields advanced once per
//! frame, then painted onto a [`Surface`].
//!
//! [`ParticleSystem`] is the facade. The submodules hold the per-particle
//! pieces and can be used directly if needed.

mod rng;
mod particle;
mod behavior;
mod force;
mod collision;
mod draw;

pub use rng::Rng;
pub use particle::{Behavior, Particle, ParticleOptions, ParticleShape, FRAME_MS};
pub use behavior::{steer, DISTANCE_EPSILON};
pub use force::ForceField;
pub use collision::{reflect_off_bounds, resolve_all, resolve_pair};
pub use draw::{draw_particle, STAR_INNER_RATIO};

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;

use crate::api::config::SimulationConfig;
use crate::api::types::{EmitterId, ForceId, ParticleStats};
use crate::components::emitter::{Emitter, EmitterOptions};
use crate::error::{Result, SparkError};
use crate::input::Pointer;
use crate::renderer::surface::Surface;

/// Launch speed used by [`ParticleSystem::burst`], per reference frame.
pub const DEFAULT_BURST_SPEED: f32 = 3.0;

/// Owns every particle, emitter and force field. Callers hold only ids.
pub struct ParticleSystem {
    config: SimulationConfig,
    /// Oldest first; the front is evicted when the cap is reached.
    particles: VecDeque<Particle>,
    emitters: Vec<(EmitterId, Emitter)>,
    forces: Vec<(ForceId, ForceField)>,
    next_emitter: u32,
    next_force: u32,
    rng: Rng,
    pointer: Pointer,
    surface: Option<Box<dyn Surface>>,
}

impl ParticleSystem {
    pub fn new(config: SimulationConfig) -> Self {
        let config = config.sanitized();
        ParticleSystem {
            particles: VecDeque::with_capacity(config.max_particles.min(4096)),
            emitters: Vec::new(),
            forces: Vec::new(),
            next_emitter: 1,
            next_force: 1,
            rng: Rng::new(config.seed),
            pointer: Pointer::new(),
            surface: None,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // -- Population --

    /// Add one particle, evicting the oldest when the population is at its cap.
    pub fn spawn_particle(&mut self, options: ParticleOptions) {
        if self.particles.len() >= self.config.max_particles {
            self.particles.pop_front();
        }
        self.particles.push_back(Particle::new(&options));
    }

    /// Spawn `count` default particles fanned evenly around `position`.
    pub fn burst(&mut self, position: Vec2, count: usize) {
        self.burst_with(position, count, DEFAULT_BURST_SPEED, &ParticleOptions::default());
    }

    /// Spawn `count` copies of `template` at `position`, the i-th heading
    /// `2π·i/count` at `speed`.
    pub fn burst_with(&mut self, position: Vec2, count: usize, speed: f32, template: &ParticleOptions) {
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let options = template
                .clone()
                .at(position)
                .with_velocity(Vec2::from_angle(angle) * speed);
            self.spawn_particle(options);
        }
    }

    pub fn create_emitter(&mut self, position: Vec2, options: EmitterOptions) -> EmitterId {
        let id = EmitterId(self.next_emitter);
        self.next_emitter += 1;
        log::debug!("emitter {:?} created at ({}, {})", id, position.x, position.y);
        self.emitters.push((id, Emitter::new(position, options)));
        id
    }

    /// Stop an emitter; it is removed on the next tick. Returns whether it existed.
    pub fn stop_emitter(&mut self, id: EmitterId) -> bool {
        match self.emitters.iter_mut().find(|(eid, _)| *eid == id) {
            Some((_, emitter)) => {
                emitter.active = false;
                true
            }
            None => false,
        }
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn add_force(&mut self, force: ForceField) -> ForceId {
        let id = ForceId(self.next_force);
        self.next_force += 1;
        self.forces.push((id, force));
        id
    }

    /// Returns whether the force existed.
    pub fn remove_force(&mut self, id: ForceId) -> bool {
        let before = self.forces.len();
        self.forces.retain(|(fid, _)| *fid != id);
        self.forces.len() != before
    }

    /// Drop every particle, emitter and force. Ids are never reused.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.emitters.clear();
        self.forces.clear();
    }

    // -- Pointer --

    /// Handle to the pointer position read by the behavior step.
    pub fn pointer(&self) -> Pointer {
        self.pointer.clone()
    }

    /// Share an existing pointer handle instead of the system's own.
    pub fn set_pointer(&mut self, pointer: Pointer) {
        self.pointer = pointer;
    }

    // -- Simulation --

    /// Advance the simulation by `delta_ms`.
    ///
    /// Order: emitters, kinematics, behaviors, force fields, bounds,
    /// pairwise collisions, culling.
    pub fn tick(&mut self, delta_ms: f32) {
        let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        let dt = delta_ms / FRAME_MS;

        let mut emitted = Vec::new();
        for (_, emitter) in self.emitters.iter_mut() {
            if emitter.tick(delta_ms) {
                emitted.push(emitter.spawn(&mut self.rng));
            }
        }
        for options in emitted {
            self.spawn_particle(options);
        }

        let SimulationConfig { gravity, friction, bounds, bounce_off_bounds, .. } = self.config;
        let pointer = self.pointer.get();
        for particle in self.particles.iter_mut() {
            particle.integrate(dt, gravity, friction);
            steer(particle, pointer, dt);
            for (_, force) in &self.forces {
                force.apply(particle, dt);
            }
            if bounce_off_bounds {
                reflect_off_bounds(particle, &bounds);
            }
        }

        if self.config.particle_collisions {
            resolve_all(self.particles.make_contiguous());
        }

        let floor = self.config.visibility_floor;
        let margin = self.config.cull_margin;
        self.particles.retain(|p| {
            p.is_alive() && p.opacity >= floor && bounds.contains_with_margin(p.position, margin)
        });
        self.emitters.retain(|(_, e)| e.active);
    }

    // -- Rendering --

    pub fn attach_surface(&mut self, surface: Box<dyn Surface>) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn Surface>> {
        self.surface.take()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Paint every particle onto `surface`, oldest first. Does not clear.
    pub fn render_to(&self, surface: &mut dyn Surface) {
        for particle in &self.particles {
            draw_particle(surface, particle);
        }
    }

    /// Clear the bounds on the attached surface and paint every particle.
    pub fn render(&mut self) -> Result<()> {
        let surface = self
            .surface
            .as_deref_mut()
            .ok_or(SparkError::NotReady("no drawing surface attached"))?;
        let b = self.config.bounds;
        surface.clear_rect(b.x, b.y, b.width, b.height);
        for particle in &self.particles {
            draw_particle(surface, particle);
        }
        Ok(())
    }

    // -- Queries --

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn stats(&self) -> ParticleStats {
        ParticleStats {
            particles: self.particles.len(),
            emitters: self.emitters.len(),
            forces: self.forces.len(),
            max_particles: self.config.max_particles,
        }
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::Bounds;
    use crate::renderer::surface::{DrawCommand, RecordingSurface};

    /// No gravity, no friction, nothing that moves particles unless asked.
    fn still_config() -> SimulationConfig {
        SimulationConfig::default()
            .with_gravity(Vec2::ZERO)
            .with_friction(1.0)
            .with_particle_collisions(false)
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut sim = ParticleSystem::new(still_config().with_max_particles(3));
        for i in 0..5 {
            sim.spawn_particle(ParticleOptions::new().at(Vec2::new(10.0 * i as f32, 0.0)));
        }
        let xs: Vec<f32> = sim.particles().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![20.0, 30.0, 40.0]);
        assert_eq!(sim.stats().particles, 3);
    }

    #[test]
    fn particle_with_one_second_life_expires() {
        let mut sim = ParticleSystem::new(still_config());
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(100.0, 100.0)).with_life(1.0));
        for _ in 0..58 {
            sim.tick(FRAME_MS);
        }
        assert_eq!(sim.stats().particles, 1);
        for _ in 0..3 {
            sim.tick(FRAME_MS);
        }
        assert_eq!(sim.stats().particles, 0);
    }

    #[test]
    fn overlapping_particles_separate() {
        let mut sim = ParticleSystem::new(still_config().with_particle_collisions(true));
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(100.0, 100.0)).with_size(5.0));
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(104.0, 100.0)).with_size(5.0));
        sim.tick(FRAME_MS);
        let p: Vec<Vec2> = sim.particles().map(|p| p.position).collect();
        assert!(p[0].distance(p[1]) >= 10.0 - 1e-4);
    }

    #[test]
    fn burst_fans_evenly() {
        let mut sim = ParticleSystem::new(still_config());
        sim.burst(Vec2::new(50.0, 50.0), 8);
        assert_eq!(sim.stats().particles, 8);
        for (i, p) in sim.particles().enumerate() {
            let expected = TAU * i as f32 / 8.0;
            let mut angle = p.velocity.y.atan2(p.velocity.x);
            if angle < -1e-4 {
                angle += TAU;
            }
            assert!((angle - expected).abs() < 1e-4, "particle {}: {} vs {}", i, angle, expected);
            assert!((p.velocity.length() - DEFAULT_BURST_SPEED).abs() < 1e-4);
            assert_eq!(p.position, Vec2::new(50.0, 50.0));
        }
    }

    #[test]
    fn crossing_right_edge_reflects_and_clamps() {
        let mut sim = ParticleSystem::new(still_config().with_bounds(Bounds::new(0.0, 0.0, 800.0, 600.0)));
        sim.spawn_particle(
            ParticleOptions::new()
                .at(Vec2::new(795.0, 300.0))
                .with_velocity(Vec2::new(10.0, 0.0))
                .with_bounce(0.8),
        );
        sim.tick(FRAME_MS);
        let p = sim.particles().next().unwrap();
        assert_eq!(p.position.x, 800.0);
        assert!((p.velocity.x + 8.0).abs() < 1e-5);
    }

    #[test]
    fn particles_beyond_cull_margin_are_dropped() {
        let mut sim = ParticleSystem::new(
            still_config().with_bounce_off_bounds(false).with_cull_margin(10.0),
        );
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(805.0, 300.0)));
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(900.0, 300.0)));
        sim.tick(FRAME_MS);
        assert_eq!(sim.stats().particles, 1);
    }

    #[test]
    fn emitter_respects_rate_and_lifetime() {
        let mut sim = ParticleSystem::new(still_config());
        let id = sim.create_emitter(
            Vec2::new(400.0, 300.0),
            EmitterOptions::new().with_rate(10.0).with_lifetime(260.0),
        );
        for _ in 0..10 {
            sim.tick(25.0);
        }
        assert_eq!(sim.stats().particles, 2);
        assert!(sim.emitter(id).is_some());

        sim.tick(25.0);
        assert_eq!(sim.stats().emitters, 0);
        assert_eq!(sim.stats().particles, 2);
    }

    #[test]
    fn stopped_emitter_is_removed_next_tick() {
        let mut sim = ParticleSystem::new(still_config());
        let id = sim.create_emitter(Vec2::ZERO, EmitterOptions::new());
        assert!(sim.stop_emitter(id));
        sim.tick(FRAME_MS);
        assert!(sim.emitter(id).is_none());
        assert!(!sim.stop_emitter(id));
    }

    #[test]
    fn force_field_pulls_and_can_be_removed() {
        let mut sim = ParticleSystem::new(still_config());
        sim.spawn_particle(ParticleOptions::new().at(Vec2::new(150.0, 100.0)));
        let id = sim.add_force(ForceField::attractor(Vec2::new(100.0, 100.0), 1.0, 100.0));
        sim.tick(FRAME_MS);
        assert!(sim.particles().next().unwrap().velocity.x < 0.0);

        assert!(sim.remove_force(id));
        assert!(!sim.remove_force(id));
        assert_eq!(sim.stats().forces, 0);
    }

    #[test]
    fn attract_follows_shared_pointer() {
        let mut sim = ParticleSystem::new(still_config());
        let pointer = sim.pointer();
        sim.spawn_particle(
            ParticleOptions::new()
                .at(Vec2::new(100.0, 100.0))
                .with_behavior(Behavior::Attract),
        );
        sim.tick(FRAME_MS);
        assert_eq!(sim.particles().next().unwrap().velocity, Vec2::ZERO);

        pointer.set(Vec2::new(100.0, 200.0));
        sim.tick(FRAME_MS);
        assert!(sim.particles().next().unwrap().velocity.y > 0.0);
    }

    #[test]
    fn render_without_surface_is_not_ready() {
        let mut sim = ParticleSystem::default();
        assert!(matches!(sim.render(), Err(SparkError::NotReady(_))));
        sim.attach_surface(Box::new(RecordingSurface::new()));
        assert!(sim.render().is_ok());
        assert!(sim.detach_surface().is_some());
        assert!(!sim.has_surface());
    }

    #[test]
    fn render_to_paints_each_particle() {
        let mut sim = ParticleSystem::new(still_config());
        sim.burst(Vec2::new(100.0, 100.0), 4);
        let mut surface = RecordingSurface::new();
        sim.render_to(&mut surface);
        assert_eq!(surface.fill_count(), 4);
        assert!(!surface.commands.iter().any(|c| matches!(c, DrawCommand::ClearRect { .. })));
    }

    #[test]
    fn clear_drops_everything() {
        let mut sim = ParticleSystem::new(still_config());
        sim.burst(Vec2::new(10.0, 10.0), 3);
        sim.create_emitter(Vec2::ZERO, EmitterOptions::new());
        sim.add_force(ForceField::repulsor(Vec2::ZERO, 1.0, 10.0));
        sim.clear();
        let stats = sim.stats();
        assert_eq!((stats.particles, stats.emitters, stats.forces), (0, 0, 0));
    }
}
