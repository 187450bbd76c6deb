//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits, loads particle databases and
//! wires up services.

pub mod database;
pub mod di;
pub mod error;
pub mod traits;

pub use database::load_database;
pub use error::{InfraError, InfraResult};
