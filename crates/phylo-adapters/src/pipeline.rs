//! Armado y ejecución del flujo completo fetch → merge → align → trees → export.

use std::path::PathBuf;
use std::rc::Rc;

use log::info;
use phylo_core::{ArtifactSpec, CoreEngineError, FlowEngine, InMemoryEventStore, InMemoryFlowRepository};
use phylo_domain::GeneQuery;
use phylo_providers::PhyloBackend;

use crate::artifacts::{AlignedSequences, CompositeSequences, ExportedTrees, FetchedSequences, TreeSet};
use crate::steps::{AlignSequencesStep, BuildTreesStep, ExportTreesStep, FetchSequencesStep, MergeRecordsStep,
                   StageFailures};
use crate::PipelineError;

pub const PIPELINE_NAME: &str = "phylo_pipeline";

/// Entradas de una ejecución.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub queries: Vec<GeneQuery>,
    pub align_method: String,
    pub tree_methods: Vec<String>,
    pub output: PathBuf,
}

/// Resultados tipados de cada stage más el rastro del engine.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub fetched: FetchedSequences,
    pub composite: CompositeSequences,
    pub alignment: AlignedSequences,
    pub trees: TreeSet,
    pub exported: ExportedTrees,
    pub flow_fingerprint: String,
    pub event_variants: Vec<&'static str>,
}

pub type PipelineEngine = FlowEngine<InMemoryEventStore, InMemoryFlowRepository>;

/// Construye el engine con los cinco steps encadenados sobre un mismo backend.
/// Todos los steps registran su error tipado en `failures`.
pub fn build_pipeline(backend: Rc<dyn PhyloBackend>, config: &PipelineConfig, failures: &StageFailures) -> PipelineEngine {
    let fetch = FetchSequencesStep::new(backend.clone(), config.queries.clone()).reporting_to(failures.clone());
    let merge = MergeRecordsStep::new(backend.clone()).reporting_to(failures.clone());
    let align = AlignSequencesStep::new(backend.clone(), config.align_method.clone()).reporting_to(failures.clone());
    let trees = BuildTreesStep::new(backend.clone(), config.tree_methods.clone()).reporting_to(failures.clone());
    let export = ExportTreesStep::new(backend, config.output.clone()).reporting_to(failures.clone());
    let mut engine = FlowEngine::new().first_step(fetch)
                                      .add_step(merge)
                                      .add_step(align)
                                      .add_step(trees)
                                      .add_step(export)
                                      .build();
    engine.set_name(PIPELINE_NAME);
    engine
}

/// Ejecuta el pipeline completo. El primer stage que falla detiene el flujo y
/// su error se devuelve tipado.
pub fn run_pipeline(backend: Rc<dyn PhyloBackend>, config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    info!("pipeline:start backend={} queries={} align={} trees={:?}",
          backend.name(),
          config.queries.len(),
          config.align_method,
          config.tree_methods);
    let failures = StageFailures::default();
    let mut engine = build_pipeline(backend, config, &failures);
    if let Err(e) = engine.run() {
        return Err(match failures.take() {
            Some((step_id, source)) => PipelineError::Stage { step_id, source },
            None => PipelineError::Engine(e),
        });
    }

    let report = PipelineReport { fetched: output_of(&engine, FetchSequencesStep::ID)?,
                                  composite: output_of(&engine, MergeRecordsStep::ID)?,
                                  alignment: output_of(&engine, AlignSequencesStep::ID)?,
                                  trees: output_of(&engine, BuildTreesStep::ID)?,
                                  exported: output_of(&engine, ExportTreesStep::ID)?,
                                  flow_fingerprint: engine.flow_fingerprint()
                                                          .ok_or_else(|| CoreEngineError::Internal("flow did not complete".into()))?,
                                  event_variants: engine.event_variants().unwrap_or_default() };
    info!("pipeline:done fingerprint={} files={}", report.flow_fingerprint, report.exported.files.len());
    Ok(report)
}

fn output_of<T: ArtifactSpec>(engine: &PipelineEngine, step_id: &str) -> Result<T, CoreEngineError> {
    match engine.last_step_output_typed::<T>(step_id) {
        Some(Ok(typed)) => Ok(typed.inner),
        Some(Err(e)) => Err(CoreEngineError::ArtifactDecode(e.to_string())),
        None => Err(CoreEngineError::Internal(format!("no output recorded for step {step_id}"))),
    }
}
