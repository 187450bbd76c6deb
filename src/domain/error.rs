//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Violations of the decay-tree linkage invariants.
///
/// Raised at the offending call; mutations made by earlier calls are not
/// rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("particle {product} is already the product of another decay")]
    ProductAlreadyParented { product: String },

    #[error("decay already belongs to particle {owner}; remove it there before adding it elsewhere")]
    DecayAlreadyOwned { owner: String },

    #[error("particle {product} is listed more than once in the same decay")]
    DuplicateProduct { product: String },

    #[error("particle {particle} would become its own descendant")]
    Cycle { particle: String },

    #[error("particle {particle} is a decay product and cannot be a root")]
    RootHasParent { particle: String },

    #[error("particle {particle} is still attached to a parent decay")]
    StillAttached { particle: String },
}

/// Domain errors represent decay-model violations and failed lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("unknown particle handle: {0}")]
    UnknownParticle(String),

    #[error("unknown decay handle: {0}")]
    UnknownDecay(String),

    #[error("decay is not in the decay list of particle {particle}")]
    DecayNotFound { particle: String },

    #[error("not found in particle database: {0}")]
    NotFound(String),

    #[error("{element} has no attribute '{attribute}'")]
    AttributeNotFound { element: String, attribute: String },

    #[error("invalid type: {0}")]
    InvalidType(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("expansion of {particle} yields {count} alternative trees, limit is {limit}")]
    TooManyAlternatives {
        particle: String,
        count: u128,
        limit: usize,
    },

    #[error("decay chain below {particle} is {depth} levels deep, limit is {limit}")]
    TooDeep {
        particle: String,
        depth: usize,
        limit: usize,
    },
}

impl DomainError {
    pub fn is_consistency(&self) -> bool {
        matches!(self, DomainError::Consistency(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound(_) | DomainError::DecayNotFound { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
