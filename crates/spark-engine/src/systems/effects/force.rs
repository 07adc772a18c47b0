//! Radius-limited point forces that act on every particle in range.

use glam::Vec2;

use super::behavior::DISTANCE_EPSILON;
use super::particle::Particle;

/// A point source pulling (positive strength) or pushing (negative strength)
/// particles within `radius`, falling off linearly to zero at the edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    pub position: Vec2,
    pub strength: f32,
    pub radius: f32,
}

impl ForceField {
    pub fn new(position: Vec2, strength: f32, radius: f32) -> Self {
        Self { position, strength, radius }
    }

    /// Attracting field.
    pub fn attractor(position: Vec2, strength: f32, radius: f32) -> Self {
        Self::new(position, strength.abs(), radius)
    }

    /// Repelling field.
    pub fn repulsor(position: Vec2, strength: f32, radius: f32) -> Self {
        Self::new(position, -strength.abs(), radius)
    }

    /// Add this field's pull for one tick of `dt` reference frames.
    pub fn apply(&self, particle: &mut Particle, dt: f32) {
        let radius = self.radius.max(DISTANCE_EPSILON);
        let offset = self.position - particle.position;
        let distance = offset.length();
        if distance >= radius {
            return;
        }
        let distance = distance.max(DISTANCE_EPSILON);
        let falloff = self.strength * (1.0 - distance / radius);
        particle.velocity += offset / distance * falloff * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::effects::particle::ParticleOptions;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(&ParticleOptions::new().at(Vec2::new(x, y)))
    }

    #[test]
    fn attractor_pulls_with_linear_falloff() {
        let field = ForceField::attractor(Vec2::ZERO, 2.0, 100.0);
        let mut p = particle_at(50.0, 0.0);
        field.apply(&mut p, 1.0);
        assert!((p.velocity.x + 1.0).abs() < 1e-6);
        assert_eq!(p.velocity.y, 0.0);
    }

    #[test]
    fn repulsor_pushes_away() {
        let field = ForceField::repulsor(Vec2::ZERO, 2.0, 100.0);
        let mut p = particle_at(0.0, 25.0);
        field.apply(&mut p, 1.0);
        assert!(p.velocity.y > 0.0);
    }

    #[test]
    fn out_of_range_particles_are_untouched() {
        let field = ForceField::attractor(Vec2::ZERO, 2.0, 10.0);
        let mut p = particle_at(10.0, 0.0);
        field.apply(&mut p, 1.0);
        assert_eq!(p.velocity, Vec2::ZERO);
    }

    #[test]
    fn degenerate_fields_never_produce_nan() {
        let mut p = particle_at(0.0, 0.0);
        ForceField::new(Vec2::ZERO, 5.0, -3.0).apply(&mut p, 1.0);
        ForceField::new(Vec2::ZERO, 5.0, 10.0).apply(&mut p, 1.0);
        assert!(p.velocity.is_finite());
    }
}
