//! Flujo completo sobre el backend mock: eventos, artifacts y llamadas
//! externas por stage.

use std::fs;
use std::rc::Rc;

use phylo_adapters::artifacts::TreeSet;
use phylo_adapters::steps::BuildTreesStep;
use phylo_adapters::{build_pipeline, run_pipeline, PipelineConfig, PipelineError, StageError, StageFailures};
use phylo_core::CoreEngineError;
use phylo_domain::{AlignmentMethod, DomainError, GeneQuery, TreeMethod};
use phylo_providers::{MockBackend, MockCall, PhyloBackend, ProviderError};

fn config(dir: &std::path::Path, align: &str, trees: &[&str]) -> PipelineConfig {
    PipelineConfig { queries: vec![GeneQuery::new("fliC", "Escherichia coli").unwrap(),
                                   GeneQuery::new("madeUpGene123", "Nonexistent organism").unwrap()],
                     align_method: align.to_string(),
                     tree_methods: trees.iter().map(|s| s.to_string()).collect(),
                     output: dir.join("treefile.newick") }
}

#[test]
fn end_to_end_with_one_miss() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Rc::new(MockBackend::new().with_miss("Nonexistent organism"));
    let backend: Rc<dyn PhyloBackend> = mock.clone();

    let report = run_pipeline(backend, &config(dir.path(), "mafft", &["fasttree"])).unwrap();

    assert_eq!(report.fetched.records.len(), 1);
    assert_eq!(report.fetched.misses.len(), 1);
    assert_eq!(report.composite.member_count, 1);
    assert_eq!(report.alignment.method, AlignmentMethod::Mafft);
    assert_eq!(report.trees.trees.len(), 1);
    assert_eq!(report.exported.files.len(), 1);

    let path = &report.exported.files[0].path;
    assert_eq!(path, &dir.path().join("treefile.newick"));
    assert!(fs::read_to_string(path).unwrap().trim_end().ends_with(';'));

    assert_eq!(mock.call_count("search"), 2);
    assert_eq!(mock.call_count("merge"), 1);
    assert_eq!(mock.call_count("align"), 1);
    assert_eq!(mock.call_count("build_tree"), 1);
    assert_eq!(mock.call_count("export"), 1);

    assert_eq!(report.event_variants, vec!["I", "S", "F", "S", "F", "S", "F", "S", "F", "S", "F", "C"]);
}

#[test]
fn several_trees_export_one_file_per_method() {
    let dir = tempfile::tempdir().unwrap();
    let backend: Rc<dyn PhyloBackend> = Rc::new(MockBackend::new());
    let report = run_pipeline(backend, &config(dir.path(), "muscle", &["raxml", "iqtree"])).unwrap();
    let names: Vec<String> = report.exported
                                   .files
                                   .iter()
                                   .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
                                   .collect();
    assert_eq!(names, vec!["treefile.raxml.newick", "treefile.iqtree.newick"]);
}

#[test]
fn unsupported_alignment_stops_before_any_alignment_call() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Rc::new(MockBackend::new());
    let backend: Rc<dyn PhyloBackend> = mock.clone();
    let failures = StageFailures::default();
    let mut engine = build_pipeline(backend, &config(dir.path(), "nonexistent", &["fasttree"]), &failures);

    let err = engine.run().unwrap_err();
    assert_eq!(err,
               CoreEngineError::StepExecution { step_id: "align_sequences".into(),
                                                message: "Unsupported alignment method: nonexistent".into() });
    let (step_id, source) = failures.take().unwrap();
    assert_eq!(step_id, "align_sequences");
    assert!(matches!(source, StageError::Unsupported(DomainError::UnsupportedAlignmentMethod(_))));
    assert_eq!(engine.event_variants().unwrap(), vec!["I", "S", "F", "S", "F", "S", "X"]);
    assert_eq!(mock.call_count("align"), 0);
    assert_eq!(mock.call_count("build_tree"), 0);
    assert!(!dir.path().join("treefile.newick").exists());

    // Stop-on-failure: el flujo no se reanuda.
    assert_eq!(engine.run().unwrap_err(), CoreEngineError::FlowHasFailed);
}

#[test]
fn all_misses_fail_at_merge() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Rc::new(MockBackend::new().with_miss("Escherichia coli").with_miss("Nonexistent organism"));
    let backend: Rc<dyn PhyloBackend> = mock.clone();
    let err = run_pipeline(backend, &config(dir.path(), "mafft", &["fasttree"])).unwrap_err();
    match err {
        PipelineError::Stage { step_id, source: StageError::NoSequences } => assert_eq!(step_id, "merge_records"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.call_count("merge"), 0);
}

#[test]
fn run_pipeline_keeps_typed_stage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_pipeline(Rc::new(MockBackend::new()), &config(dir.path(), "mafft", &["fasttree", "nonexistent"]))
        .unwrap_err();
    assert!(matches!(err,
                     PipelineError::Stage { ref step_id, source: StageError::Unsupported(DomainError::UnsupportedTreeMethod(_)) }
                     if step_id == "build_trees"));
    assert_eq!(err.to_string(), "step build_trees failed: Unsupported tree-building method: nonexistent");

    let err = run_pipeline(Rc::new(MockBackend::new().failing_on("align")), &config(dir.path(), "mafft", &["fasttree"]))
        .unwrap_err();
    assert!(matches!(err,
                     PipelineError::Stage { ref step_id, source: StageError::Provider(ProviderError::Api { status: 500, .. }) }
                     if step_id == "align_sequences"));
}

#[test]
fn backend_failure_is_recorded_and_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Rc::new(MockBackend::new().failing_on("build_tree"));
    let backend: Rc<dyn PhyloBackend> = mock.clone();
    let mut engine = build_pipeline(backend, &config(dir.path(), "mafft", &["fasttree", "raxml"]), &StageFailures::default());
    assert!(engine.run().is_err());
    // El primer árbol falla; el segundo nunca se pide.
    assert_eq!(mock.calls().last(), Some(&MockCall::BuildTree(TreeMethod::FastTree)));
    assert_eq!(mock.call_count("export"), 0);
    assert!(engine.last_step_output_typed::<TreeSet>(BuildTreesStep::ID).is_none());
}

#[test]
fn fingerprint_is_reproducible_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "mafft", &["fasttree"]);
    let a = run_pipeline(Rc::new(MockBackend::new()), &cfg).unwrap();
    let b = run_pipeline(Rc::new(MockBackend::new()), &cfg).unwrap();
    assert_eq!(a.flow_fingerprint, b.flow_fingerprint);

    let other = run_pipeline(Rc::new(MockBackend::new()), &config(dir.path(), "muscle", &["fasttree"])).unwrap();
    assert_ne!(a.flow_fingerprint, other.flow_fingerprint);
}
