//! phylo-adapters: capa de adaptación pipeline ↔ core.
//!
//! Este crate provee:
//! - Artifacts tipados con la forma de cada resultado intermedio
//!   (registros, compuesto, alineamiento, árboles, archivos exportados).
//! - Los cinco stages escritos una sola vez contra `PhyloBackend`.
//! - Un `TypedStep` por stage y el armado del flujo lineal completo.
//!
//! El core sólo ve `Artifact { kind, hash, payload, metadata }`; los handles
//! de backend viajan dentro del payload sin ser interpretados.

pub mod artifacts;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod steps;

pub use error::{PipelineError, StageError};
pub use pipeline::{build_pipeline, run_pipeline, PipelineConfig, PipelineReport};
pub use steps::StageFailures;
