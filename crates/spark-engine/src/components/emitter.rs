use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::surface::Color;
use crate::systems::effects::{ParticleOptions, Rng};

/// Spatial pattern particles are released in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum EmitPattern {
    /// From the emitter position, heading `angle ± spread/2`.
    Cone,
    /// From a random point on a ring, heading outward.
    Circle { radius: f32 },
    /// From a random point on a segment through the emitter, perpendicular
    /// to `angle`, heading `angle ± spread/2`.
    Line { length: f32 },
}

/// How particle colors are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleColorMode {
    /// Use the template's color.
    Template,
    /// Pick a random opaque color for each particle.
    Random,
    /// Pick randomly from a palette of colors.
    Palette(Vec<Color>),
}

/// Creation parameters for an [`Emitter`].
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// Particles per second. Zero never emits.
    pub rate: f32,
    pub pattern: EmitPattern,
    /// Heading in radians (0 = +x, -π/2 = up on a y-down surface).
    pub angle: f32,
    /// Full width of the heading jitter in radians.
    pub spread: f32,
    /// Launch speed per reference frame.
    pub force: f32,
    /// Remaining lifetime in ms; `None` runs until stopped.
    pub lifetime: Option<f32>,
    /// Template every emitted particle starts from.
    pub particle: ParticleOptions,
    pub color_mode: ParticleColorMode,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            rate: 10.0,
            pattern: EmitPattern::Cone,
            angle: -FRAC_PI_2,
            spread: FRAC_PI_2,
            force: 2.0,
            lifetime: None,
            particle: ParticleOptions::default(),
            color_mode: ParticleColorMode::Template,
        }
    }
}

impl EmitterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_pattern(mut self, pattern: EmitPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_force(mut self, force: f32) -> Self {
        self.force = force;
        self
    }

    pub fn with_lifetime(mut self, lifetime_ms: f32) -> Self {
        self.lifetime = Some(lifetime_ms);
        self
    }

    pub fn with_particle(mut self, particle: ParticleOptions) -> Self {
        self.particle = particle;
        self
    }

    pub fn with_color_mode(mut self, mode: ParticleColorMode) -> Self {
        self.color_mode = mode;
        self
    }
}

/// A particle source at a fixed position.
#[derive(Debug, Clone)]
pub struct Emitter {
    pub position: Vec2,
    pub options: EmitterOptions,
    /// Whether the emitter is still spawning. Inactive emitters are culled.
    pub active: bool,
    /// Remaining lifetime in ms, if bounded.
    remaining: Option<f32>,
    /// Time since the last emission in ms.
    since_last: f32,
}

impl Emitter {
    pub fn new(position: Vec2, options: EmitterOptions) -> Self {
        let remaining = options.lifetime.map(|ms| if ms.is_finite() { ms } else { 0.0 });
        Self {
            position,
            options,
            active: true,
            remaining,
            since_last: 0.0,
        }
    }

    /// Interval between emissions in ms, or `None` when the rate never emits.
    pub fn interval(&self) -> Option<f32> {
        let rate = self.options.rate;
        (rate.is_finite() && rate > 0.0).then(|| 1000.0 / rate)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance by `delta_ms`. Returns `true` when one particle should be released.
    ///
    /// Expiry wins over emission: the tick that exhausts the lifetime emits nothing.
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= delta_ms;
            if *remaining <= 0.0 {
                self.active = false;
                log::debug!("emitter at ({}, {}) expired", self.position.x, self.position.y);
                return false;
            }
        }

        self.since_last += delta_ms;
        match self.interval() {
            Some(interval) if self.since_last > interval => {
                self.since_last = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Build the next particle according to the emitter's pattern.
    pub fn spawn(&self, rng: &mut Rng) -> ParticleOptions {
        let o = &self.options;
        let jitter = |rng: &mut Rng| o.angle + rng.range(-0.5, 0.5) * o.spread;

        let (position, heading) = match o.pattern {
            EmitPattern::Cone => (self.position, jitter(rng)),
            EmitPattern::Circle { radius } => {
                let theta = rng.range(0.0, TAU);
                let dir = Vec2::from_angle(theta);
                (self.position + dir * radius.max(0.0), theta)
            }
            EmitPattern::Line { length } => {
                let along = Vec2::from_angle(o.angle).perp();
                let offset = rng.range(-0.5, 0.5) * length.max(0.0);
                (self.position + along * offset, jitter(rng))
            }
        };

        let color = match &o.color_mode {
            ParticleColorMode::Template => o.particle.color,
            ParticleColorMode::Random => Color::rgb(rng.next_f32(), rng.next_f32(), rng.next_f32()),
            ParticleColorMode::Palette(colors) if colors.is_empty() => o.particle.color,
            ParticleColorMode::Palette(colors) => colors[rng.next_int(colors.len() as u32) as usize],
        };

        o.particle
            .clone()
            .at(position)
            .with_velocity(Vec2::from_angle(heading) * o.force)
            .with_color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = EmitterOptions::default();
        assert_eq!(o.rate, 10.0);
        assert_eq!(o.pattern, EmitPattern::Cone);
        assert!(o.lifetime.is_none());
    }

    #[test]
    fn builder_pattern() {
        let o = EmitterOptions::new()
            .with_rate(50.0)
            .with_pattern(EmitPattern::Circle { radius: 8.0 })
            .with_force(3.0)
            .with_lifetime(500.0);
        assert_eq!(o.rate, 50.0);
        assert_eq!(o.pattern, EmitPattern::Circle { radius: 8.0 });
        assert_eq!(o.force, 3.0);
        assert_eq!(o.lifetime, Some(500.0));
    }

    #[test]
    fn emits_once_interval_is_exceeded() {
        // 10/s -> 100 ms interval; 25 ms ticks emit on every 5th tick.
        let mut e = Emitter::new(Vec2::ZERO, EmitterOptions::new().with_rate(10.0));
        let fired: Vec<bool> = (0..10).map(|_| e.tick(25.0)).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 2);
        assert!(!fired[3]);
        assert!(fired[4]);
    }

    #[test]
    fn at_most_one_emission_per_tick() {
        let mut e = Emitter::new(Vec2::ZERO, EmitterOptions::new().with_rate(1000.0));
        assert!(e.tick(500.0));
        assert!(!e.tick(0.5));
    }

    #[test]
    fn zero_rate_never_emits() {
        let mut e = Emitter::new(Vec2::ZERO, EmitterOptions::new().with_rate(0.0));
        assert!((0..100).all(|_| !e.tick(100.0)));
        assert!(e.active);
    }

    #[test]
    fn lifetime_expiry_deactivates() {
        let mut e = Emitter::new(Vec2::ZERO, EmitterOptions::new().with_lifetime(50.0));
        e.tick(25.0);
        assert!(e.active);
        assert!(!e.tick(25.0));
        assert!(!e.active);
        assert!(!e.tick(1000.0));
    }

    #[test]
    fn cone_heading_stays_within_spread() {
        let e = Emitter::new(
            Vec2::new(10.0, 10.0),
            EmitterOptions::new().with_angle(0.0).with_spread(0.5).with_force(4.0),
        );
        let mut rng = Rng::new(3);
        for _ in 0..50 {
            let p = e.spawn(&mut rng);
            assert_eq!(p.position, Vec2::new(10.0, 10.0));
            assert!((p.velocity.length() - 4.0).abs() < 1e-4);
            assert!(p.velocity.y.atan2(p.velocity.x).abs() <= 0.25 + 1e-4);
        }
    }

    #[test]
    fn circle_spawns_on_ring_heading_outward() {
        let e = Emitter::new(
            Vec2::ZERO,
            EmitterOptions::new().with_pattern(EmitPattern::Circle { radius: 20.0 }),
        );
        let mut rng = Rng::new(9);
        for _ in 0..20 {
            let p = e.spawn(&mut rng);
            assert!((p.position.length() - 20.0).abs() < 1e-3);
            assert!(p.position.normalize().dot(p.velocity.normalize()) > 0.999);
        }
    }

    #[test]
    fn line_spawns_across_heading() {
        let e = Emitter::new(
            Vec2::ZERO,
            EmitterOptions::new()
                .with_angle(0.0)
                .with_spread(0.0)
                .with_pattern(EmitPattern::Line { length: 40.0 }),
        );
        let mut rng = Rng::new(11);
        for _ in 0..20 {
            let p = e.spawn(&mut rng);
            assert!(p.position.x.abs() < 1e-4);
            assert!(p.position.y.abs() <= 20.0);
            assert!(p.velocity.y.abs() < 1e-4);
        }
    }

    #[test]
    fn palette_colors_are_used() {
        let palette = vec![Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 1.0)];
        let e = Emitter::new(
            Vec2::ZERO,
            EmitterOptions::new().with_color_mode(ParticleColorMode::Palette(palette.clone())),
        );
        let mut rng = Rng::new(5);
        for _ in 0..10 {
            assert!(palette.contains(&e.spawn(&mut rng).color));
        }
    }
}
