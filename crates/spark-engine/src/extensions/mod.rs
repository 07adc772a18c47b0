// extensions/mod.rs
//
// Property animation for SparkEngine.
// Decoupled from the particle simulation: callers opt in by creating a TweenEngine
// (or let a Stage own one).

pub mod easing;
pub mod interpolate;
pub mod timeline;
pub mod tween;

pub use easing::{Easing, lerp, ease};
pub use interpolate::{interpolate, parse_unit, Value};
pub use timeline::Timeline;
pub use tween::{
    Animatable, TargetRef, TweenEngine, TweenEvent, TweenId, TweenOptions, TweenPhase,
    PropertyTrack, DEFAULT_DURATION_MS,
};
