pub mod api;
pub mod core;
pub mod components;
pub mod error;
pub mod extensions;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{Bounds, SimulationConfig};
pub use api::stage::Stage;
pub use api::types::{EmitterId, ForceId, ParticleStats};
pub use components::emitter::{Emitter, EmitterOptions, EmitPattern, ParticleColorMode};
pub use crate::core::time::{FrameDriver, FrameTick};
pub use error::{Result, SparkError};
pub use input::{InputEvent, InputQueue, Pointer};
pub use renderer::surface::{Color, DrawCommand, RecordingSurface, Surface};
pub use systems::effects::{
    Behavior, ForceField, Particle, ParticleOptions, ParticleShape, ParticleSystem, Rng,
};

pub use extensions::{
    Easing, lerp, ease,
    Value, interpolate, parse_unit,
    Animatable, TargetRef, TweenEngine, TweenEvent, TweenId, TweenOptions, TweenPhase,
    Timeline,
};
