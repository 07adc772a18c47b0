//! Bounds reflection and brute-force pairwise particle contacts.

use glam::Vec2;

use crate::api::config::Bounds;
use super::behavior::DISTANCE_EPSILON;
use super::particle::Particle;

/// Clamp a particle into `bounds`, reflecting the crossing velocity component
/// scaled by the particle's bounce.
pub fn reflect_off_bounds(particle: &mut Particle, bounds: &Bounds) {
    let bounce = particle.bounce;
    if particle.position.x < bounds.x {
        particle.position.x = bounds.x;
        particle.velocity.x *= -bounce;
    } else if particle.position.x > bounds.right() {
        particle.position.x = bounds.right();
        particle.velocity.x *= -bounce;
    }
    if particle.position.y < bounds.y {
        particle.position.y = bounds.y;
        particle.velocity.y *= -bounce;
    } else if particle.position.y > bounds.bottom() {
        particle.position.y = bounds.bottom();
        particle.velocity.y *= -bounce;
    }
}

/// Separate one overlapping pair and swap their velocities.
///
/// Each particle moves half the overlap along the contact normal and receives
/// the other's velocity scaled by its own bounce. Returns whether they touched.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    let offset = b.position - a.position;
    let distance = offset.length();
    let min_distance = a.size + b.size;
    if distance >= min_distance {
        return false;
    }

    // Coincident centers have no normal; pick one so they still separate.
    let normal = if distance < DISTANCE_EPSILON {
        Vec2::X
    } else {
        offset / distance
    };
    let half_overlap = (min_distance - distance) * 0.5;
    a.position -= normal * half_overlap;
    b.position += normal * half_overlap;

    let (va, vb) = (a.velocity, b.velocity);
    a.velocity = vb * a.bounce;
    b.velocity = va * b.bounce;
    true
}

/// Resolve every overlapping unordered pair once, in index order. O(n²).
/// Returns the number of contacts.
pub fn resolve_all(particles: &mut [Particle]) -> usize {
    let mut contacts = 0;
    for i in 0..particles.len() {
        let (head, tail) = particles.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if resolve_pair(a, b) {
                contacts += 1;
            }
        }
    }
    contacts
}
