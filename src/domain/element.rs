use crate::domain::arena::{DecayId, ParticleId};

/// Closed set of model elements accepted by converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    ProcessGroup,
    Particle(ParticleId),
    Decay(DecayId),
}

impl From<ParticleId> for ElementRef {
    fn from(id: ParticleId) -> Self {
        ElementRef::Particle(id)
    }
}

impl From<DecayId> for ElementRef {
    fn from(id: DecayId) -> Self {
        ElementRef::Decay(id)
    }
}
