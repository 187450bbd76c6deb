//! Particle and decay-mode lookup backends.
//!
//! The tree never reaches for a global database; a [`ParticleDatabase`] is
//! handed to [`crate::domain::DecayTree::with_database`] and every type
//! lookup goes through it.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::params::{ParamValue, Params};

/// Database record describing one particle species.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleType {
    pub name: String,
    pub attributes: Params,
}

impl ParticleType {
    /// Named field of the record; `name` is always present.
    pub fn field(&self, field: &str) -> Option<ParamValue> {
        if field == "name" {
            return Some(ParamValue::Text(self.name.clone()));
        }
        self.attributes.get(field).cloned()
    }
}

/// Database record describing one decay mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayMode {
    pub initial: String,
    pub products: Vec<String>,
    #[serde(default)]
    pub branching_fraction: Option<f64>,
    #[serde(default)]
    pub angular_momentum: Option<f64>,
    #[serde(default)]
    pub attributes: Params,
}

impl DecayMode {
    fn matches(&self, initial: &str, sorted_products: &[&str], angular_momentum: Option<f64>) -> bool {
        if self.initial != initial || self.angular_momentum != angular_momentum {
            return false;
        }
        let mut own: Vec<&str> = self.products.iter().map(String::as_str).collect();
        own.sort_unstable();
        own == sorted_products
    }
}

/// Lookup collaborator for particle types and decay modes.
///
/// Implementations signal a miss with [`DomainError::NotFound`].
pub trait ParticleDatabase: Debug + Send + Sync {
    fn get_type_for_name(&self, name: &str) -> DomainResult<ParticleType>;

    fn get_types_for_names(&self, names: &[&str]) -> DomainResult<Vec<ParticleType>> {
        names.iter().map(|n| self.get_type_for_name(n)).collect()
    }

    /// Decay mode from `initial` to exactly `products` (order-insensitive).
    fn get_mode_for_particles(
        &self,
        initial: &ParticleType,
        products: &[ParticleType],
        angular_momentum: Option<f64>,
    ) -> DomainResult<DecayMode>;
}

/// Database on which every lookup fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDatabase;

impl ParticleDatabase for NullDatabase {
    fn get_type_for_name(&self, name: &str) -> DomainResult<ParticleType> {
        Err(DomainError::NotFound(format!("unknown particle name '{name}'")))
    }

    fn get_mode_for_particles(
        &self,
        initial: &ParticleType,
        products: &[ParticleType],
        _angular_momentum: Option<f64>,
    ) -> DomainResult<DecayMode> {
        Err(DomainError::NotFound(format!(
            "no decay mode for {} -> {}",
            initial.name,
            product_names(products)
        )))
    }
}

/// Dictionary-backed database, usually loaded from a TOML file:
///
/// ```toml
/// [particles."pi+"]
/// mass = 139.57018
///
/// [[decays]]
/// initial = "D0"
/// products = ["e+", "K-", "nu(e)"]
/// branching_fraction = 0.0355
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryDatabase {
    pub particles: BTreeMap<String, Params>,
    pub decays: Vec<DecayMode>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_particle(&mut self, name: impl Into<String>, attributes: Params) -> &mut Self {
        self.particles.insert(name.into(), attributes);
        self
    }

    pub fn add_decay_mode(&mut self, mode: DecayMode) -> &mut Self {
        self.decays.push(mode);
        self
    }
}

impl ParticleDatabase for InMemoryDatabase {
    fn get_type_for_name(&self, name: &str) -> DomainResult<ParticleType> {
        self.particles
            .get(name)
            .map(|attributes| ParticleType {
                name: name.to_string(),
                attributes: attributes.clone(),
            })
            .ok_or_else(|| DomainError::NotFound(format!("unknown particle name '{name}'")))
    }

    fn get_mode_for_particles(
        &self,
        initial: &ParticleType,
        products: &[ParticleType],
        angular_momentum: Option<f64>,
    ) -> DomainResult<DecayMode> {
        let mut sorted: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        sorted.sort_unstable();

        self.decays
            .iter()
            .find(|mode| mode.matches(&initial.name, &sorted, angular_momentum))
            .cloned()
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "no decay mode for {} -> {}",
                    initial.name,
                    product_names(products)
                ))
            })
    }
}

fn product_names(products: &[ParticleType]) -> String {
    products
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
