//! Per-particle steering rules, dispatched on [`Behavior`].

use glam::Vec2;

use super::particle::{Behavior, Particle};

/// Distances below this are treated as this, never as zero.
pub const DISTANCE_EPSILON: f32 = 0.001;

/// Numerator of the `k / (distance + 1)` law used by orbit, attract and repel.
pub const STEER_STRENGTH: f32 = 50.0;

/// Sine wobble: angular frequency over x, and velocity amplitude per frame.
pub const SINE_FREQUENCY: f32 = 0.02;
pub const SINE_AMPLITUDE: f32 = 0.1;

/// Apply the particle's behavior rule for one tick of `dt` reference frames.
///
/// Pointer-relative rules do nothing until a pointer position is known.
pub fn steer(particle: &mut Particle, pointer: Option<Vec2>, dt: f32) {
    let pull = |p: &Particle, reference: Vec2| -> (Vec2, f32) {
        let offset = reference - p.position;
        let distance = offset.length().max(DISTANCE_EPSILON);
        (offset / distance, STEER_STRENGTH / (distance + 1.0))
    };

    match (particle.behavior, pointer) {
        (Behavior::Default, _) => {}
        (Behavior::Attract, Some(reference)) => {
            let (dir, magnitude) = pull(particle, reference);
            particle.velocity += dir * magnitude * dt;
        }
        (Behavior::Repel, Some(reference)) => {
            let (dir, magnitude) = pull(particle, reference);
            particle.velocity -= dir * magnitude * dt;
        }
        (Behavior::Orbit, Some(reference)) => {
            let (dir, magnitude) = pull(particle, reference);
            particle.velocity += dir.perp() * magnitude * dt;
        }
        (Behavior::Sine, _) => {
            particle.velocity.y += (particle.position.x * SINE_FREQUENCY).sin() * SINE_AMPLITUDE * dt;
        }
        (Behavior::Attract | Behavior::Repel | Behavior::Orbit, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::effects::particle::ParticleOptions;

    fn particle(behavior: Behavior, at: Vec2) -> Particle {
        Particle::new(&ParticleOptions::new().at(at).with_behavior(behavior))
    }

    #[test]
    fn attract_pulls_toward_pointer() {
        let mut p = particle(Behavior::Attract, Vec2::ZERO);
        steer(&mut p, Some(Vec2::new(9.0, 0.0)), 1.0);
        assert!((p.velocity.x - 5.0).abs() < 1e-5);
        assert_eq!(p.velocity.y, 0.0);
    }

    #[test]
    fn repel_pushes_away_from_pointer() {
        let mut p = particle(Behavior::Repel, Vec2::ZERO);
        steer(&mut p, Some(Vec2::new(0.0, 9.0)), 1.0);
        assert!(p.velocity.y < 0.0);
        assert_eq!(p.velocity.x, 0.0);
    }

    #[test]
    fn orbit_is_perpendicular_to_pointer() {
        let mut p = particle(Behavior::Orbit, Vec2::ZERO);
        steer(&mut p, Some(Vec2::new(9.0, 0.0)), 1.0);
        assert!(p.velocity.x.abs() < 1e-6);
        assert!(p.velocity.y.abs() > 0.0);
    }

    #[test]
    fn pointer_rules_idle_without_pointer() {
        for behavior in [Behavior::Attract, Behavior::Repel, Behavior::Orbit] {
            let mut p = particle(behavior, Vec2::ZERO);
            steer(&mut p, None, 1.0);
            assert_eq!(p.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn pointer_on_top_of_particle_stays_finite() {
        let mut p = particle(Behavior::Attract, Vec2::new(3.0, 3.0));
        steer(&mut p, Some(Vec2::new(3.0, 3.0)), 1.0);
        assert!(p.velocity.is_finite());
    }

    #[test]
    fn sine_ignores_pointer() {
        let x = std::f32::consts::FRAC_PI_2 / SINE_FREQUENCY;
        let mut p = particle(Behavior::Sine, Vec2::new(x, 0.0));
        steer(&mut p, None, 1.0);
        assert!((p.velocity.y - SINE_AMPLITUDE).abs() < 1e-5);
        assert_eq!(p.velocity.x, 0.0);
    }
}
