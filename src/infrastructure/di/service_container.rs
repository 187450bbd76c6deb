//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::DecayService;
use crate::config::Settings;
use crate::domain::ParticleDatabase;
use crate::infrastructure::database::load_database;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Particle database capability handed to every tree
    pub database: Arc<dyn ParticleDatabase>,

    pub decay_service: DecayService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// Loads the configured particle database, if any.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let database = load_database(fs.as_ref(), settings.database.as_deref())?;
        Ok(Self::with_deps(settings, fs, database))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        database: Arc<dyn ParticleDatabase>,
    ) -> Self {
        let settings = Arc::new(settings);
        let decay_service = DecayService::new(fs.clone(), settings.clone(), database.clone());

        Self {
            settings,
            fs,
            database,
            decay_service,
        }
    }
}
