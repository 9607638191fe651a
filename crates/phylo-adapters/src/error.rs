use phylo_core::CoreEngineError;
use phylo_domain::DomainError;
use phylo_providers::ProviderError;
use thiserror::Error;

/// Error fatal de un stage del pipeline.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Unsupported(#[from] DomainError),
    #[error("no sequences were retrieved; nothing to merge")]
    NoSequences,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Fallo de una corrida completa. Si lo causó un stage, conserva su error
/// tipado junto al id del step.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("step {step_id} failed: {source}")]
    Stage {
        step_id: String,
        #[source]
        source: StageError,
    },
    #[error(transparent)]
    Engine(#[from] CoreEngineError),
}
