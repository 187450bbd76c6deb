//! Domain layer: the decay model and the statements it is built from
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod element;
pub mod error;
pub mod expand;
pub mod lookup;
pub mod params;
pub mod process;
pub mod statement;

pub use arena::{Decay, DecayId, DecaySpec, DecayTree, Particle, ParticleId, Subtree, MAX_TREE_DEPTH};
pub use builder::TreeBuilder;
pub use element::ElementRef;
pub use error::{ConsistencyError, DomainError, DomainResult};
pub use expand::{AlternativeTree, DEFAULT_MAX_ALTERNATIVES};
pub use lookup::{DecayMode, InMemoryDatabase, NullDatabase, ParticleDatabase, ParticleType};
pub use params::{ParamValue, Params, BRANCHING_FRACTION_PARAM, TYPE_PARAM};
pub use process::ProcessGroup;
pub use statement::{DefaultScope, Located, Position, Statement};
