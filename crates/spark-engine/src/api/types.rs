/// Handle to an emitter owned by the particle system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(pub u32);

/// Handle to a force field owned by the particle system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForceId(pub u32);

/// Population counts polled from the particle system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticleStats {
    pub particles: usize,
    pub emitters: usize,
    pub forces: usize,
    /// Configured population cap.
    pub max_particles: usize,
}
