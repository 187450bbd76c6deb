//! Particle database loading.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{InMemoryDatabase, NullDatabase, ParticleDatabase};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

/// Read an [`InMemoryDatabase`] from a TOML file.
#[instrument(level = "debug", skip(fs))]
pub fn read_database(fs: &dyn FileSystem, path: &Path) -> InfraResult<InMemoryDatabase> {
    let content = fs
        .read_to_string(path)
        .map_err(|e| InfraError::io(format!("read particle database {}", path.display()), e))?;
    let database: InMemoryDatabase = toml::from_str(&content).map_err(|e| InfraError::Database {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(
        "loaded {} particles and {} decay modes",
        database.particles.len(),
        database.decays.len()
    );
    Ok(database)
}

/// Database capability for the given configuration: the file's contents, or
/// a database on which every lookup misses.
pub fn load_database(fs: &dyn FileSystem, path: Option<&Path>) -> InfraResult<Arc<dyn ParticleDatabase>> {
    match path {
        Some(path) => Ok(Arc::new(read_database(fs, path)?)),
        None => Ok(Arc::new(NullDatabase)),
    }
}
