//! Paints particles onto a [`Surface`]: trail first, then the body shape.

use std::f32::consts::{PI, TAU};

use crate::renderer::surface::Surface;
use super::particle::{Particle, ParticleShape};

/// Inner radius of a star as a fraction of its outer radius.
pub const STAR_INNER_RATIO: f32 = 0.5;

/// Fewest spikes a star is drawn with.
const MIN_STAR_POINTS: u8 = 2;

/// Paint one particle. Invisible particles (opacity or scale at zero) are skipped.
pub fn draw_particle(surface: &mut dyn Surface, particle: &Particle) {
    if particle.opacity <= 0.0 || particle.scale <= 0.0 {
        return;
    }
    draw_trail(surface, particle);

    surface.save();
    surface.set_global_alpha(particle.opacity);
    surface.set_fill_color(particle.color);
    surface.translate(particle.position.x, particle.position.y);
    surface.rotate(particle.rotation);
    surface.scale(particle.scale, particle.scale);

    let size = particle.size;
    match particle.shape {
        ParticleShape::Circle => {
            surface.begin_path();
            surface.arc(0.0, 0.0, size, 0.0, TAU);
            surface.fill();
        }
        ParticleShape::Square => {
            surface.fill_rect(-size, -size, size * 2.0, size * 2.0);
        }
        ParticleShape::Star(spikes) => {
            draw_star(surface, spikes.max(MIN_STAR_POINTS), size, size * STAR_INNER_RATIO);
        }
    }
    surface.restore();
}

/// Trail dots oldest to newest, alpha rising toward the particle's own opacity.
fn draw_trail(surface: &mut dyn Surface, particle: &Particle) {
    let count = particle.trail.len();
    if count == 0 {
        return;
    }
    surface.save();
    surface.set_fill_color(particle.color);
    let radius = particle.size * particle.scale * 0.5;
    for (i, point) in particle.trail.iter().enumerate() {
        let fade = (i + 1) as f32 / (count + 1) as f32;
        surface.set_global_alpha(particle.opacity * fade);
        surface.begin_path();
        surface.arc(point.x, point.y, radius, 0.0, TAU);
        surface.fill();
    }
    surface.restore();
}

/// Closed 2·k-point polygon alternating outer and inner radius, first point straight up.
fn draw_star(surface: &mut dyn Surface, spikes: u8, outer: f32, inner: f32) {
    let points = spikes as usize * 2;
    let step = PI / spikes as f32;
    surface.begin_path();
    for i in 0..points {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = i as f32 * step - PI / 2.0;
        let (x, y) = (angle.cos() * radius, angle.sin() * radius);
        if i == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
    surface.close_path();
    surface.fill();
}
