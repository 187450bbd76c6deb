//! Tree builder: turns parsed statements into a [`ProcessGroup`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{DecayTree, ParticleId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::lookup::{NullDatabase, ParticleDatabase};
use crate::domain::params::{merged, ParamValue, Params, TYPE_PARAM};
use crate::domain::process::ProcessGroup;
use crate::domain::statement::{DefaultScope, Located, Statement};

/// Resolves identifiers into particles and decays.
///
/// Node statements are handled first, each with the particle defaults
/// declared before it. Edges follow in a second pass with both default kinds
/// re-accumulated from the top; identifiers never declared as nodes are
/// created on first use. Every distinct topmost ancestor becomes a root.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    database: Arc<dyn ParticleDatabase>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Name resolution state of one build.
struct Scope {
    particles: HashMap<String, ParticleId>,
    first_mention: HashMap<String, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_database(Arc::new(NullDatabase))
    }

    pub fn with_database(database: Arc<dyn ParticleDatabase>) -> Self {
        Self { database }
    }

    #[instrument(level = "debug", skip_all, fields(statements = statements.len()))]
    pub fn build(&self, statements: &[Located<Statement>]) -> DomainResult<ProcessGroup> {
        let mut group = ProcessGroup::with_database(self.database.clone());
        let mut scope = Scope {
            particles: HashMap::new(),
            first_mention: first_mentions(statements),
        };

        // Pass 1: declared nodes, defaults apply in lexical order only
        let mut particle_defaults = Params::new();
        for statement in statements {
            match &statement.value {
                Statement::Default {
                    scope: DefaultScope::Particle,
                    params,
                } => particle_defaults.extend(params.clone()),
                Statement::Node { name, params } => {
                    trace!(%statement.position, %name, "node");
                    declare(group.tree_mut(), &mut scope, name, &particle_defaults, params)?;
                }
                _ => {}
            }
        }

        // Pass 2: edges and document parameters
        particle_defaults.clear();
        let mut decay_defaults = Params::new();
        for statement in statements {
            match &statement.value {
                Statement::Default { scope: kind, params } => match kind {
                    DefaultScope::Particle => particle_defaults.extend(params.clone()),
                    DefaultScope::Decay => decay_defaults.extend(params.clone()),
                },
                Statement::Edge {
                    source,
                    targets,
                    params,
                } => {
                    trace!(%statement.position, %source, ?targets, "edge");
                    let tree = group.tree_mut();
                    let parent = find_or_insert(tree, &mut scope, source, &particle_defaults)?;
                    let products = targets
                        .iter()
                        .map(|target| find_or_insert(tree, &mut scope, target, &particle_defaults))
                        .collect::<DomainResult<Vec<_>>>()?;
                    tree.add_decay(parent, products, merged(&decay_defaults, params))?;
                }
                Statement::Param { name, value } => group.add_param(name.clone(), value.clone()),
                Statement::Node { .. } => {}
            }
        }

        for root in find_root_particles(group.tree(), &scope)? {
            group.tree().check_depth(root)?;
            group.add_root_particle(root)?;
        }
        debug!(
            "built {} particles under {} roots",
            group.tree().particle_count(),
            group.len()
        );
        Ok(group)
    }
}

/// Lexical rank of the first mention of every identifier.
fn first_mentions(statements: &[Located<Statement>]) -> HashMap<String, usize> {
    let mut ranks = HashMap::new();
    let mut mention = |name: &str| {
        let next = ranks.len();
        ranks.entry(name.to_string()).or_insert(next);
    };
    for statement in statements {
        match &statement.value {
            Statement::Node { name, .. } => mention(name),
            Statement::Edge {
                source, targets, ..
            } => {
                mention(source);
                targets.iter().for_each(|t| mention(t));
            }
            _ => {}
        }
    }
    ranks
}

/// Split the `type` entry off `params`; the identifier is the fallback.
fn take_type(params: &mut Params) -> DomainResult<Option<String>> {
    match params.remove(TYPE_PARAM) {
        None => Ok(None),
        Some(ParamValue::Text(type_name)) => Ok(Some(type_name)),
        Some(other) => Err(DomainError::InvalidParam {
            name: TYPE_PARAM.to_string(),
            reason: format!("expected a particle name, got '{other}'"),
        }),
    }
}

/// Create the particle `name`, or annotate it if it already exists.
fn declare(
    tree: &mut DecayTree,
    scope: &mut Scope,
    name: &str,
    defaults: &Params,
    params: &Params,
) -> DomainResult<ParticleId> {
    let mut params = merged(defaults, params);
    let type_name = take_type(&mut params)?;

    if let Some(&existing) = scope.particles.get(name) {
        let particle = tree.particle_mut(existing)?;
        particle.params.extend(params);
        if let Some(type_name) = type_name {
            particle.type_name = type_name;
        }
        return Ok(existing);
    }

    let id = tree.add_particle(type_name.unwrap_or_else(|| name.to_string()), params);
    scope.particles.insert(name.to_string(), id);
    Ok(id)
}

/// Particle mentioned by an edge. One created here is typed by its
/// identifier, whatever the defaults say.
fn find_or_insert(
    tree: &mut DecayTree,
    scope: &mut Scope,
    name: &str,
    defaults: &Params,
) -> DomainResult<ParticleId> {
    if let Some(&id) = scope.particles.get(name) {
        return Ok(id);
    }
    let id = tree.add_particle(name, defaults.clone());
    scope.particles.insert(name.to_string(), id);
    Ok(id)
}

/// Topmost ancestors, ordered by the first mention of any of their members.
fn find_root_particles(tree: &DecayTree, scope: &Scope) -> DomainResult<Vec<ParticleId>> {
    let mut pending: Vec<(&String, &ParticleId)> = scope.particles.iter().collect();
    pending.sort_by_key(|(name, _)| scope.first_mention.get(*name).copied().unwrap_or(usize::MAX));

    let mut seen = HashSet::new();
    let mut roots = Vec::new();
    for (_, &id) in pending {
        let root = tree.root_of(id)?;
        if seen.insert(root) {
            roots.push(root);
        }
    }
    Ok(roots)
}
