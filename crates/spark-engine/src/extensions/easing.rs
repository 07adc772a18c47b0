// extensions/easing.rs
//
// Easing catalog: pure reparameterizations of linear progress.
// Every curve maps 0 -> 0 and 1 -> 1; Back, Elastic and Bounce leave [0, 1] in between.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::SparkError;

/// Easing curve selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Pull back before leaving.
    BackIn,
    /// Overshoot then settle.
    BackOut,
    BackInOut,
    /// Spring wind-up at the start.
    ElasticIn,
    /// Spring settle at the end.
    ElasticOut,
    /// Mirror of `BounceOut`: `1 - bounce_out(1 - t)`.
    BounceIn,
    /// Ball dropping onto the end value.
    BounceOut,
}

impl Easing {
    /// Every curve in the catalog, in declaration order.
    pub const ALL: [Easing; 23] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::BounceIn,
        Easing::BounceOut,
    ];

    /// Apply the curve to a normalized time value `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        // Pinned: several closed forms land a few ulps off the endpoints.
        if t == 0.0 {
            return 0.0;
        }
        if t == 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,

            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Easing::QuartIn => t * t * t * t,
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }

            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Easing::ExpoIn => 2.0_f32.powf(10.0 * t - 10.0),
            Easing::ExpoOut => 1.0 - 2.0_f32.powf(-10.0 * t),
            Easing::ExpoInOut => {
                if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Easing::BackIn => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                C3 * t * t * t - C1 * t * t
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::BackInOut => {
                const C1: f32 = 1.70158;
                const C2: f32 = C1 * 1.525;
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
                }
            }

            Easing::ElasticIn => {
                const C4: f32 = (2.0 * PI) / 3.0;
                -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
            }
            Easing::ElasticOut => {
                const C4: f32 = (2.0 * PI) / 3.0;
                2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
            }

            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
        }
    }

    /// Conventional name of the curve, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::SineIn => "easeInSine",
            Easing::SineOut => "easeOutSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::BackIn => "easeInBack",
            Easing::BackOut => "easeOutBack",
            Easing::BackInOut => "easeInOutBack",
            Easing::ElasticIn => "easeInElastic",
            Easing::ElasticOut => "easeOutElastic",
            Easing::BounceIn => "easeInBounce",
            Easing::BounceOut => "easeOutBounce",
        }
    }
}

impl FromStr for Easing {
    type Err = SparkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name() == name)
            .ok_or_else(|| SparkError::UnknownEasing(name.to_string()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}
