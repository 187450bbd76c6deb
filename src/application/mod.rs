//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod emitter;
pub mod error;
pub mod error_ext;
pub mod kinematics;
pub mod render;
pub mod services;

pub use emitter::emit;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
