//! phylo-providers: backends que ejecutan el trabajo externo del pipeline.
//!
//! - `GalaxyBackend`: cada stage es un job en un servidor Galaxy.
//! - `LocalBackend`: búsqueda vía NCBI Entrez y herramientas locales como
//!   subprocesos.
//! - `MockBackend`: backend en memoria que registra cada llamada (tests).
//!
//! Los stages se escriben una sola vez contra `PhyloBackend`.

pub mod error;
pub mod implementations;
pub mod trait_backend;

pub use error::ProviderError;
pub use implementations::entrez::{EntrezApi, UreqEntrezApi};
pub use implementations::galaxy::{GalaxyApi, GalaxyBackend, UreqGalaxyApi};
pub use implementations::local::LocalBackend;
pub use implementations::mock_provider::{MockBackend, MockCall};
pub use implementations::process::{SystemToolRunner, ToolCommand, ToolRunner};
pub use trait_backend::PhyloBackend;
