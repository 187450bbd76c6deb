use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{ConsistencyError, DomainError, DomainResult};
use crate::domain::lookup::{DecayMode, NullDatabase, ParticleDatabase, ParticleType};
use crate::domain::params::{ParamValue, Params, BRANCHING_FRACTION_PARAM};

/// Decay parameter forwarded to decay-mode lookups.
pub const ANGULAR_MOMENTUM_PARAM: &str = "angular_momentum";

/// Longest decay chain the recursive walks (expansion, rendering, emitting)
/// accept below a single particle.
pub const MAX_TREE_DEPTH: usize = 64;

/// Handle of a particle stored in a [`DecayTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(Index);

/// Handle of a decay stored in a [`DecayTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecayId(Index);

/// One particle occurrence in a decay tree.
#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) type_name: String,
    pub(crate) params: Params,
    /// Non-owning back-reference, None for roots and free particles
    pub(crate) parent: Option<ParticleId>,
    /// Alternative decays, in insertion order
    pub(crate) decays: Vec<DecayId>,
    serial: u64,
}

impl Particle {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn parent(&self) -> Option<ParticleId> {
        self.parent
    }

    pub fn decays(&self) -> &[DecayId] {
        &self.decays
    }

    pub fn is_leaf(&self) -> bool {
        self.decays.is_empty()
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

/// A decay hypothesis: ordered products plus decay parameters.
#[derive(Debug, Clone)]
pub struct Decay {
    pub(crate) products: Vec<ParticleId>,
    pub(crate) params: Params,
    pub(crate) parent: Option<ParticleId>,
    serial: u64,
}

impl Decay {
    pub fn products(&self) -> &[ParticleId] {
        &self.products
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn parent(&self) -> Option<ParticleId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// A decay without products (a generic decay).
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParticleId> {
        self.products.iter()
    }
}

impl<'a> IntoIterator for &'a Decay {
    type Item = &'a ParticleId;
    type IntoIter = std::slice::Iter<'a, ParticleId>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// What to attach in [`DecayTree::add_decay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecaySpec {
    /// Wrap these particles into a new decay
    Products(Vec<ParticleId>),
    /// Attach a decay created earlier with [`DecayTree::new_decay`]
    Existing(DecayId),
}

impl From<Vec<ParticleId>> for DecaySpec {
    fn from(products: Vec<ParticleId>) -> Self {
        DecaySpec::Products(products)
    }
}

impl From<&[ParticleId]> for DecaySpec {
    fn from(products: &[ParticleId]) -> Self {
        DecaySpec::Products(products.to_vec())
    }
}

impl<const N: usize> From<[ParticleId; N]> for DecaySpec {
    fn from(products: [ParticleId; N]) -> Self {
        DecaySpec::Products(products.to_vec())
    }
}

impl From<DecayId> for DecaySpec {
    fn from(decay: DecayId) -> Self {
        DecaySpec::Existing(decay)
    }
}

/// Arena storage for particles and decays.
///
/// Ownership flows parent -> decay -> products; parent links are plain
/// handles. All linkage changes go through the tree so the one-parent
/// invariant holds. The particle database used for type lookups is injected
/// at construction.
#[derive(Debug, Clone)]
pub struct DecayTree {
    particles: Arena<Particle>,
    decays: Arena<Decay>,
    next_serial: u64,
    database: Arc<dyn ParticleDatabase>,
}

impl Default for DecayTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayTree {
    /// Tree whose type lookups always miss.
    pub fn new() -> Self {
        Self::with_database(Arc::new(NullDatabase))
    }

    pub fn with_database(database: Arc<dyn ParticleDatabase>) -> Self {
        Self {
            particles: Arena::new(),
            decays: Arena::new(),
            next_serial: 0,
            database,
        }
    }

    pub fn database(&self) -> &dyn ParticleDatabase {
        self.database.as_ref()
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.0)
    }

    pub fn decay(&self, id: DecayId) -> Option<&Decay> {
        self.decays.get(id.0)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn decay_count(&self) -> usize {
        self.decays.len()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains(id.0)
    }

    pub(crate) fn particle_ref(&self, id: ParticleId) -> DomainResult<&Particle> {
        self.particles
            .get(id.0)
            .ok_or_else(|| DomainError::UnknownParticle(format!("{id:?}")))
    }

    pub(crate) fn particle_mut(&mut self, id: ParticleId) -> DomainResult<&mut Particle> {
        self.particles
            .get_mut(id.0)
            .ok_or_else(|| DomainError::UnknownParticle(format!("{id:?}")))
    }

    pub(crate) fn decay_ref(&self, id: DecayId) -> DomainResult<&Decay> {
        self.decays
            .get(id.0)
            .ok_or_else(|| DomainError::UnknownDecay(format!("{id:?}")))
    }

    fn decay_mut(&mut self, id: DecayId) -> DomainResult<&mut Decay> {
        self.decays
            .get_mut(id.0)
            .ok_or_else(|| DomainError::UnknownDecay(format!("{id:?}")))
    }

    /// Type label used in error messages.
    pub(crate) fn label(&self, id: ParticleId) -> String {
        self.particles
            .get(id.0)
            .map(|p| p.type_name.clone())
            .unwrap_or_else(|| format!("{id:?}"))
    }

    fn take_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    #[instrument(level = "trace", skip(self, params))]
    pub fn add_particle(&mut self, type_name: impl Into<String> + fmt::Debug, params: Params) -> ParticleId {
        let serial = self.take_serial();
        let particle = Particle {
            type_name: type_name.into(),
            params,
            parent: None,
            decays: Vec::new(),
            serial,
        };
        ParticleId(self.particles.insert(particle))
    }

    /// Set a parameter on a particle, replacing any previous value.
    pub fn add_param(&mut self, id: ParticleId, name: impl Into<String>, value: ParamValue) -> DomainResult<()> {
        self.particle_mut(id)?.params.insert(name.into(), value);
        Ok(())
    }

    /// Set a parameter on a decay, replacing any previous value.
    pub fn add_decay_param(&mut self, id: DecayId, name: impl Into<String>, value: ParamValue) -> DomainResult<()> {
        self.decay_mut(id)?.params.insert(name.into(), value);
        Ok(())
    }

    /// Create an unattached decay over `products`.
    ///
    /// Fails if a product already has a parent or is listed twice.
    #[instrument(level = "trace", skip(self, params))]
    pub fn new_decay(&mut self, products: Vec<ParticleId>, params: Params) -> DomainResult<DecayId> {
        self.check_products(&products)?;
        let serial = self.take_serial();
        let decay = Decay {
            products,
            params,
            parent: None,
            serial,
        };
        Ok(DecayId(self.decays.insert(decay)))
    }

    fn check_products(&self, products: &[ParticleId]) -> DomainResult<()> {
        self.check_products_freeing(products, &HashSet::new())
    }

    /// Like `check_products`, with the particles in `freed` counted as
    /// already detached from their parent.
    fn check_products_freeing(
        &self,
        products: &[ParticleId],
        freed: &HashSet<ParticleId>,
    ) -> DomainResult<()> {
        let mut seen = HashSet::with_capacity(products.len());
        for &product in products {
            let node = self.particle_ref(product)?;
            if node.parent.is_some() && !freed.contains(&product) {
                return Err(ConsistencyError::ProductAlreadyParented {
                    product: node.type_name.clone(),
                }
                .into());
            }
            if !seen.insert(product) {
                return Err(ConsistencyError::DuplicateProduct {
                    product: node.type_name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn check_no_cycle(&self, particle: ParticleId, products: &[ParticleId]) -> DomainResult<()> {
        let mut current = Some(particle);
        while let Some(id) = current {
            if products.contains(&id) {
                return Err(ConsistencyError::Cycle {
                    particle: self.label(id),
                }
                .into());
            }
            current = self.particle_ref(id)?.parent;
        }
        Ok(())
    }

    /// Append a decay to `particle`'s alternatives and parent its products.
    ///
    /// `decay` is either a list of products, wrapped into a new decay, or an
    /// unattached decay from [`DecayTree::new_decay`]; `params` are merged
    /// into the decay's parameters.
    #[instrument(level = "debug", skip(self, decay, params))]
    pub fn add_decay(
        &mut self,
        particle: ParticleId,
        decay: impl Into<DecaySpec>,
        params: Params,
    ) -> DomainResult<DecayId> {
        self.particle_ref(particle)?;
        let decay_id = match decay.into() {
            DecaySpec::Products(products) => {
                self.check_no_cycle(particle, &products)?;
                self.new_decay(products, params)?
            }
            DecaySpec::Existing(id) => {
                let existing = self.decay_ref(id)?;
                if let Some(owner) = existing.parent {
                    return Err(ConsistencyError::DecayAlreadyOwned {
                        owner: self.label(owner),
                    }
                    .into());
                }
                let products = existing.products.clone();
                self.check_products(&products)?;
                self.check_no_cycle(particle, &products)?;
                self.decay_mut(id)?.params.extend(params);
                id
            }
        };
        self.attach(particle, decay_id)?;
        debug!(
            "attached decay {:?} to {}",
            decay_id,
            self.label(particle)
        );
        Ok(decay_id)
    }

    fn attach(&mut self, particle: ParticleId, decay: DecayId) -> DomainResult<()> {
        let products = self.decay_ref(decay)?.products.clone();
        for product in products {
            self.particle_mut(product)?.parent = Some(particle);
        }
        self.decay_mut(decay)?.parent = Some(particle);
        self.particle_mut(particle)?.decays.push(decay);
        Ok(())
    }

    fn detach(&mut self, decay: DecayId) -> DomainResult<()> {
        let products = self.decay_ref(decay)?.products.clone();
        for product in products {
            self.particle_mut(product)?.parent = None;
        }
        self.decay_mut(decay)?.parent = None;
        Ok(())
    }

    /// Replace all decays of `particle` with the single given decay.
    ///
    /// The previous decays are detached (they and their products lose their
    /// parent) but stay in the arena. The replacement is validated first, so
    /// a rejected call leaves `particle` untouched; products and decays that
    /// only hang off the replaced decays may be reused.
    #[instrument(level = "debug", skip(self, decay, params))]
    pub fn set_decay(
        &mut self,
        particle: ParticleId,
        decay: impl Into<DecaySpec>,
        params: Params,
    ) -> DomainResult<DecayId> {
        let decay: DecaySpec = decay.into();
        let previous = self.particle_ref(particle)?.decays.clone();
        let mut freed = HashSet::new();
        for &old in &previous {
            freed.extend(self.decay_ref(old)?.products.iter().copied());
        }

        let products = match &decay {
            DecaySpec::Products(products) => products.clone(),
            DecaySpec::Existing(id) => {
                let existing = self.decay_ref(*id)?;
                if let Some(owner) = existing.parent.filter(|_| !previous.contains(id)) {
                    return Err(ConsistencyError::DecayAlreadyOwned {
                        owner: self.label(owner),
                    }
                    .into());
                }
                existing.products.clone()
            }
        };
        self.check_products_freeing(&products, &freed)?;
        self.check_no_cycle(particle, &products)?;

        self.particle_mut(particle)?.decays.clear();
        for old in previous {
            self.detach(old)?;
        }
        self.add_decay(particle, decay, params)
    }

    /// Remove `decay` from `particle`, resetting the parent links of the
    /// decay and its products. Errors if the decay is not in the list.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_decay(&mut self, particle: ParticleId, decay: DecayId) -> DomainResult<()> {
        let position = self
            .particle_ref(particle)?
            .decays
            .iter()
            .position(|&d| d == decay)
            .ok_or_else(|| DomainError::DecayNotFound {
                particle: self.label(particle),
            })?;
        self.particle_mut(particle)?.decays.remove(position);
        self.detach(decay)
    }

    /// Copy type and parameters into a new, parentless particle; with
    /// `deep`, every decay subtree is cloned as well.
    #[instrument(level = "trace", skip(self))]
    pub fn clone_particle(&mut self, id: ParticleId, deep: bool) -> DomainResult<ParticleId> {
        if deep {
            return self.clone_subtree(id);
        }
        let source = self.particle_ref(id)?;
        let (type_name, params) = (source.type_name.clone(), source.params.clone());
        Ok(self.add_particle(type_name, params))
    }

    /// Clone a decay and (deeply) its products.
    ///
    /// With `parent`, the clone is attached to it after construction; without,
    /// the clone is left unattached.
    #[instrument(level = "trace", skip(self))]
    pub fn clone_decay(&mut self, id: DecayId, parent: Option<ParticleId>) -> DomainResult<DecayId> {
        let source = self.decay_ref(id)?;
        let products = source.products.clone();
        let params = source.params.clone();

        let mut cloned = Vec::with_capacity(products.len());
        for product in products {
            cloned.push(self.clone_subtree(product)?);
        }
        let decay = self.new_decay(cloned, params)?;
        if let Some(parent) = parent {
            self.attach(parent, decay)?;
        }
        Ok(decay)
    }

    /// Copy every particle below `root` first, then rebuild the decays over
    /// the copies.
    fn clone_subtree(&mut self, root: ParticleId) -> DomainResult<ParticleId> {
        self.particle_ref(root)?;
        let sources: Vec<ParticleId> = self.subtree(root).map(|(id, _)| id).collect();

        let mut copies = HashMap::with_capacity(sources.len());
        for &source in &sources {
            let particle = self.particle_ref(source)?;
            let (type_name, params) = (particle.type_name.clone(), particle.params.clone());
            copies.insert(source, self.add_particle(type_name, params));
        }
        let copy_of = |id: &ParticleId| {
            copies
                .get(id)
                .copied()
                .ok_or_else(|| DomainError::UnknownParticle(format!("{id:?}")))
        };

        for &source in &sources {
            let parent = copy_of(&source)?;
            for decay in self.particle_ref(source)?.decays.clone() {
                let original = self.decay_ref(decay)?;
                let products = original
                    .products
                    .iter()
                    .map(copy_of)
                    .collect::<DomainResult<Vec<_>>>()?;
                let params = original.params.clone();
                let cloned = self.new_decay(products, params)?;
                self.attach(parent, cloned)?;
            }
        }
        copy_of(&root)
    }

    /// Remove a parentless particle and its whole subtree from the arena.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: ParticleId) -> DomainResult<()> {
        if self.particle_ref(id)?.parent.is_some() {
            return Err(ConsistencyError::StillAttached {
                particle: self.label(id),
            }
            .into());
        }
        let doomed: Vec<ParticleId> = self.subtree(id).map(|(pid, _)| pid).collect();
        for pid in doomed {
            if let Some(particle) = self.particles.remove(pid.0) {
                for decay in particle.decays {
                    self.decays.remove(decay.0);
                }
            }
        }
        trace!("discarded subtree, {} particles left", self.particles.len());
        Ok(())
    }

    /// Topmost ancestor of `id` (itself for a root).
    pub fn root_of(&self, id: ParticleId) -> DomainResult<ParticleId> {
        let mut current = id;
        while let Some(parent) = self.particle_ref(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Longest chain of decays below `root`; 0 for a leaf.
    pub fn depth(&self, root: ParticleId) -> DomainResult<usize> {
        let mut deepest = 0;
        let mut stack = vec![(root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            for &decay in &self.particle_ref(id)?.decays {
                let products = &self.decay_ref(decay)?.products;
                stack.extend(products.iter().map(|&product| (product, level + 1)));
            }
        }
        Ok(deepest)
    }

    /// Reject `root` with [`DomainError::TooDeep`] if its decay chains are
    /// longer than [`MAX_TREE_DEPTH`].
    pub fn check_depth(&self, root: ParticleId) -> DomainResult<()> {
        let depth = self.depth(root)?;
        if depth > MAX_TREE_DEPTH {
            return Err(DomainError::TooDeep {
                particle: self.label(root),
                depth,
                limit: MAX_TREE_DEPTH,
            });
        }
        Ok(())
    }

    /// Pre-order walk over `root` and every product of every decay below it.
    pub fn subtree(&self, root: ParticleId) -> Subtree<'_> {
        Subtree::new(self, root)
    }

    /// Presentation label `<type>_<serial>`.
    ///
    /// The serial is assigned at creation and unique within this tree only;
    /// it differs between runs and must not be persisted.
    pub fn unique_name(&self, id: ParticleId) -> DomainResult<String> {
        let particle = self.particle_ref(id)?;
        Ok(format!("{}_{}", particle.type_name, particle.serial))
    }

    pub fn decay_unique_name(&self, id: DecayId) -> DomainResult<String> {
        Ok(self.decay_ref(id)?.serial.to_string())
    }

    /// Database record for the particle's type.
    pub fn particle_type(&self, id: ParticleId) -> DomainResult<ParticleType> {
        let particle = self.particle_ref(id)?;
        self.database.get_type_for_name(&particle.type_name)
    }

    /// Database decay mode matching (parent type, product types).
    pub fn decay_mode(&self, id: DecayId) -> DomainResult<DecayMode> {
        let decay = self.decay_ref(id)?;
        let parent = decay
            .parent
            .ok_or_else(|| DomainError::NotFound("decay has no parent particle".to_string()))?;
        let initial = self
            .database
            .get_type_for_name(&self.particle_ref(parent)?.type_name)?;
        let names = decay
            .products
            .iter()
            .map(|&p| self.particle_ref(p).map(|n| n.type_name.as_str()))
            .collect::<DomainResult<Vec<_>>>()?;
        let products = self.database.get_types_for_names(&names)?;
        let angular_momentum = decay
            .params
            .get(ANGULAR_MOMENTUM_PARAM)
            .and_then(ParamValue::as_f64);
        self.database
            .get_mode_for_particles(&initial, &products, angular_momentum)
    }

    /// Branching fraction of a decay; `None` means unknown.
    ///
    /// The `fraction` parameter overrides the database. A database miss is
    /// reported as unknown, never as an error.
    pub fn branching_fraction(&self, id: DecayId) -> DomainResult<Option<f64>> {
        let decay = self.decay_ref(id)?;
        if let Some(value) = decay.params.get(BRANCHING_FRACTION_PARAM) {
            return value.as_f64().map(Some).ok_or_else(|| DomainError::InvalidParam {
                name: BRANCHING_FRACTION_PARAM.to_string(),
                reason: format!("'{value}' is not a number"),
            });
        }
        match self.decay_mode(id) {
            Ok(mode) => Ok(mode.branching_fraction),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Attribute lookup for a particle.
    ///
    /// Precedence: the particle's own params, then the field of its database
    /// type record, then the intrinsic fields `type` and `unique_name`.
    pub fn get(&self, id: ParticleId, name: &str) -> DomainResult<ParamValue> {
        let particle = self.particle_ref(id)?;
        if let Some(value) = particle.params.get(name) {
            return Ok(value.clone());
        }
        match self.database.get_type_for_name(&particle.type_name) {
            Ok(record) => {
                if let Some(value) = record.field(name) {
                    return Ok(value);
                }
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        match name {
            "type" => Ok(ParamValue::Text(particle.type_name.clone())),
            "unique_name" => Ok(ParamValue::Text(self.unique_name(id)?)),
            _ => Err(DomainError::AttributeNotFound {
                element: particle.type_name.clone(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Attribute lookup for a decay: params, then its database decay mode,
    /// then the intrinsic field `unique_name`.
    pub fn decay_get(&self, id: DecayId, name: &str) -> DomainResult<ParamValue> {
        let decay = self.decay_ref(id)?;
        if let Some(value) = decay.params.get(name) {
            return Ok(value.clone());
        }
        match self.decay_mode(id) {
            Ok(mode) => {
                let field = match name {
                    "branching_fraction" => mode.branching_fraction.map(ParamValue::Number),
                    ANGULAR_MOMENTUM_PARAM => mode.angular_momentum.map(ParamValue::Number),
                    _ => mode.attributes.get(name).cloned(),
                };
                if let Some(value) = field {
                    return Ok(value);
                }
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        match name {
            "unique_name" => Ok(ParamValue::Text(self.decay_unique_name(id)?)),
            _ => Err(DomainError::AttributeNotFound {
                element: format!("decay {}", decay.serial),
                attribute: name.to_string(),
            }),
        }
    }
}

/// Pre-order iterator over a particle subtree.
pub struct Subtree<'a> {
    tree: &'a DecayTree,
    stack: Vec<ParticleId>,
}

impl<'a> Subtree<'a> {
    fn new(tree: &'a DecayTree, root: ParticleId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(root) {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for Subtree<'a> {
    type Item = (ParticleId, &'a Particle);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let particle = self.tree.particle(current)?;
        // Push in reverse for left-to-right traversal
        for &decay in particle.decays.iter().rev() {
            if let Some(decay) = self.tree.decay(decay) {
                self.stack.extend(decay.products.iter().rev());
            }
        }
        Some((current, particle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::params::params;

    #[test]
    fn given_products_when_adding_decay_then_links_both_ways() {
        let mut tree = DecayTree::new();
        let d0 = tree.add_particle("D0", Params::new());
        let k = tree.add_particle("K-", Params::new());
        let pi = tree.add_particle("pi+", Params::new());

        let decay = tree.add_decay(d0, [k, pi], Params::new()).unwrap();

        assert_eq!(tree.particle(d0).unwrap().decays(), &[decay]);
        assert_eq!(tree.decay(decay).unwrap().parent(), Some(d0));
        assert_eq!(tree.particle(k).unwrap().parent(), Some(d0));
        assert_eq!(tree.particle(pi).unwrap().parent(), Some(d0));
        assert_eq!(tree.decay(decay).unwrap().len(), 2);
    }

    #[test]
    fn given_product_listed_twice_when_creating_decay_then_consistency_error() {
        let mut tree = DecayTree::new();
        let pi = tree.add_particle("pi0", Params::new());

        let err = tree.new_decay(vec![pi, pi], Params::new()).unwrap_err();

        assert!(matches!(
            err,
            DomainError::Consistency(ConsistencyError::DuplicateProduct { .. })
        ));
    }

    #[test]
    fn given_root_as_product_of_descendant_when_adding_decay_then_cycle_error() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("A", Params::new());
        let b = tree.add_particle("B", Params::new());
        tree.add_decay(a, [b], Params::new()).unwrap();

        let err = tree.add_decay(b, [a], Params::new()).unwrap_err();

        assert!(matches!(
            err,
            DomainError::Consistency(ConsistencyError::Cycle { .. })
        ));
        assert_eq!(tree.particle(a).unwrap().parent(), None);
    }

    #[test]
    fn given_existing_decay_when_adding_then_merges_params() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("A", Params::new());
        let b = tree.add_particle("B", Params::new());
        let decay = tree
            .new_decay(vec![b], params([("model", "PHSP".into())]))
            .unwrap();

        tree.add_decay(a, decay, params([("fraction", "0.5".into())]))
            .unwrap();

        let stored = tree.decay(decay).unwrap();
        assert_eq!(stored.params().len(), 2);
        assert_eq!(tree.branching_fraction(decay).unwrap(), Some(0.5));
    }

    #[test]
    fn given_attached_subtree_when_discarding_then_refuses() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("A", Params::new());
        let b = tree.add_particle("B", Params::new());
        tree.add_decay(a, [b], Params::new()).unwrap();

        assert!(tree.discard(b).is_err());
        tree.discard(a).unwrap();

        assert_eq!(tree.particle_count(), 0);
        assert_eq!(tree.decay_count(), 0);
    }

    #[test]
    fn given_nested_tree_when_walking_subtree_then_visits_pre_order() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("A", Params::new());
        let b = tree.add_particle("B", Params::new());
        let c = tree.add_particle("C", Params::new());
        let d = tree.add_particle("D", Params::new());
        tree.add_decay(a, [b, c], Params::new()).unwrap();
        tree.add_decay(b, [d], Params::new()).unwrap();

        let order: Vec<&str> = tree.subtree(a).map(|(_, p)| p.type_name()).collect();

        assert_eq!(order, vec!["A", "B", "D", "C"]);
        assert_eq!(tree.root_of(d).unwrap(), a);
    }

    #[test]
    fn given_two_particles_when_naming_then_names_differ_and_carry_type() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("pi+", Params::new());
        let b = tree.add_particle("pi+", Params::new());

        let name_a = tree.unique_name(a).unwrap();
        let name_b = tree.unique_name(b).unwrap();

        assert!(name_a.starts_with("pi+_"));
        assert_ne!(name_a, name_b);
    }

    #[test]
    fn given_non_numeric_fraction_when_reading_branching_fraction_then_invalid_param() {
        let mut tree = DecayTree::new();
        let a = tree.add_particle("A", Params::new());
        let b = tree.add_particle("B", Params::new());
        let decay = tree
            .add_decay(a, [b], params([("fraction", "half".into())]))
            .unwrap();

        let err = tree.branching_fraction(decay).unwrap_err();

        assert!(matches!(err, DomainError::InvalidParam { .. }));
    }
}
