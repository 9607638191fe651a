use std::fmt;
use std::rc::Rc;

use phylo_core::{StepKind, StepRunResultTyped, TypedStep};
use phylo_providers::PhyloBackend;
use serde::{Deserialize, Serialize};

use super::{missing_input, StageFailures};
use crate::artifacts::{AlignedSequences, TreeSet};
use crate::stages::build_trees;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeParams {
    pub methods: Vec<String>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self { methods: vec!["fasttree".to_string()] }
    }
}

pub struct BuildTreesStep {
    backend: Rc<dyn PhyloBackend>,
    params: TreeParams,
    failures: StageFailures,
}

impl BuildTreesStep {
    pub const ID: &'static str = "build_trees";

    pub fn new(backend: Rc<dyn PhyloBackend>, methods: Vec<String>) -> Self {
        Self { backend,
               params: TreeParams { methods },
               failures: StageFailures::default() }
    }

    pub fn reporting_to(mut self, failures: StageFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl fmt::Debug for BuildTreesStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildTreesStep")
         .field("backend", &self.backend.name())
         .field("methods", &self.params.methods)
         .finish()
    }
}

impl TypedStep for BuildTreesStep {
    type Params = TreeParams;
    type Input = AlignedSequences;
    type Output = TreeSet;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn params_default(&self) -> TreeParams {
        self.params.clone()
    }

    fn run_typed(&self, input: Option<AlignedSequences>, params: TreeParams) -> StepRunResultTyped<TreeSet> {
        let Some(alignment) = input else {
            return missing_input(Self::ID);
        };
        self.failures.result(Self::ID, build_trees(self.backend.as_ref(), &alignment.handle, &params.methods))
    }
}
