use phylo_adapters::{PipelineError, StageError};
use phylo_core::CoreEngineError;
use phylo_domain::DomainError;
use phylo_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de dominio: {0}")]
    Domain(#[from] DomainError),
    #[error("Error de backend: {0}")]
    Provider(#[from] ProviderError),
    #[error("Sin secuencias: ninguna búsqueda devolvió registros")]
    NoSequences,
    #[error("Error del pipeline: {0}")]
    Engine(#[from] CoreEngineError),
}

/// Un fallo de stage conserva su categoría; el id del step ya quedó en el log
/// del engine.
impl From<PipelineError> for CoreError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Stage { source, .. } => match source {
                StageError::Unsupported(e) => CoreError::Domain(e),
                StageError::NoSequences => CoreError::NoSequences,
                StageError::Provider(e) => CoreError::Provider(e),
            },
            PipelineError::Engine(e) => CoreError::Engine(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_variant_format() {
        let err = CoreError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
    }

    #[test]
    fn test_engine_variant_names_failed_step() {
        let err: CoreError = CoreEngineError::FlowHasFailed.into();
        assert_eq!(err.to_string(),
                   "Error del pipeline: flow has failed previously (stop-on-failure invariant)");
    }

    #[test]
    fn test_stage_failures_keep_their_category() {
        let unsupported = PipelineError::Stage { step_id: "align_sequences".into(),
                                                 source: DomainError::UnsupportedAlignmentMethod("x".into()).into() };
        let err: CoreError = unsupported.into();
        assert!(matches!(err, CoreError::Domain(DomainError::UnsupportedAlignmentMethod(_))));
        assert_eq!(err.to_string(), "Error de dominio: Unsupported alignment method: x");

        let empty = PipelineError::Stage { step_id: "merge_records".into(),
                                           source: StageError::NoSequences };
        assert!(matches!(CoreError::from(empty), CoreError::NoSequences));

        let failed = PipelineError::Stage { step_id: "build_trees".into(),
                                            source: ProviderError::MissingOutput { tool: "iqtree".into(),
                                                                                   path: "iqtree_out.treefile".into() }.into() };
        assert!(matches!(CoreError::from(failed), CoreError::Provider(ProviderError::MissingOutput { .. })));
    }
}
