//! phylo-core: motor lineal determinista para los stages del pipeline.
//!
//! El core no conoce secuencias, alineamientos ni árboles: sólo ejecuta
//! steps en orden, encadena un `Artifact` de salida como entrada del
//! siguiente step y deja un rastro de eventos append-only con fingerprints.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod repo;
pub mod step;

pub use engine::{EngineBuilder, EngineBuilderInit, FlowEngine};
pub use errors::CoreEngineError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use model::{Artifact, ArtifactKind, ArtifactSpec, TypedArtifact};
pub use repo::{build_flow_definition, build_flow_definition_auto, FlowDefinition, FlowRepository, InMemoryFlowRepository};
pub use step::{SameAs, StepDefinition, StepKind, StepRunResult, StepRunResultTyped, StepStatus, TypedStep};
