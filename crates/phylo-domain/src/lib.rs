// phylo-domain library entry point
pub mod error;
pub mod handle;
pub mod method;
pub mod newick;
pub mod query;

pub use error::DomainError;
pub use handle::ArtifactHandle;
pub use method::{AlignmentMethod, TreeMethod};
pub use query::GeneQuery;
