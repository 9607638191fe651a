use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use phylo_core::{StepKind, StepRunResultTyped, TypedStep};
use phylo_providers::PhyloBackend;
use serde::{Deserialize, Serialize};

use super::{missing_input, StageFailures};
use crate::artifacts::{ExportedTrees, TreeSet};
use crate::stages::export_trees;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportParams {
    pub target: PathBuf,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self { target: PathBuf::from("treefile.newick") }
    }
}

/// Sink: materializa cada árbol como archivo local.
pub struct ExportTreesStep {
    backend: Rc<dyn PhyloBackend>,
    params: ExportParams,
    failures: StageFailures,
}

impl ExportTreesStep {
    pub const ID: &'static str = "export_trees";

    pub fn new(backend: Rc<dyn PhyloBackend>, target: impl Into<PathBuf>) -> Self {
        Self { backend,
               params: ExportParams { target: target.into() },
               failures: StageFailures::default() }
    }

    pub fn reporting_to(mut self, failures: StageFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl fmt::Debug for ExportTreesStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportTreesStep")
         .field("backend", &self.backend.name())
         .field("target", &self.params.target)
         .finish()
    }
}

impl TypedStep for ExportTreesStep {
    type Params = ExportParams;
    type Input = TreeSet;
    type Output = ExportedTrees;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn kind(&self) -> StepKind {
        StepKind::Sink
    }

    fn params_default(&self) -> ExportParams {
        self.params.clone()
    }

    fn run_typed(&self, input: Option<TreeSet>, params: ExportParams) -> StepRunResultTyped<ExportedTrees> {
        let Some(trees) = input else {
            return missing_input(Self::ID);
        };
        self.failures.result(Self::ID, export_trees(self.backend.as_ref(), &trees.trees, &params.target))
    }
}
