pub mod charts;
pub mod error;
pub mod index;
pub mod parsing;
pub mod plan;
pub mod prune;
pub mod reindex;
pub mod types;

pub use error::{PruneError, Result};
pub use prune::prune_repository;
pub use reindex::{HelmIndexRebuilder, IndexRebuilder};
pub use types::{
    IndexEntry, ProtectionSet, PruneOptions, PruneOutcome, RepositoryIndex, RetentionPlan,
};
