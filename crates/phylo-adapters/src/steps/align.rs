use std::fmt;
use std::rc::Rc;

use phylo_core::{StepKind, StepRunResultTyped, TypedStep};
use phylo_providers::PhyloBackend;
use serde::{Deserialize, Serialize};

use super::{missing_input, StageFailures};
use crate::artifacts::{AlignedSequences, CompositeSequences};
use crate::stages::align_sequences;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignParams {
    /// Selector tal como lo dio el usuario; se valida al ejecutar.
    pub method: String,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self { method: "mafft".to_string() }
    }
}

pub struct AlignSequencesStep {
    backend: Rc<dyn PhyloBackend>,
    params: AlignParams,
    failures: StageFailures,
}

impl AlignSequencesStep {
    pub const ID: &'static str = "align_sequences";

    pub fn new(backend: Rc<dyn PhyloBackend>, method: impl Into<String>) -> Self {
        Self { backend,
               params: AlignParams { method: method.into() },
               failures: StageFailures::default() }
    }

    pub fn reporting_to(mut self, failures: StageFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl fmt::Debug for AlignSequencesStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignSequencesStep")
         .field("backend", &self.backend.name())
         .field("method", &self.params.method)
         .finish()
    }
}

impl TypedStep for AlignSequencesStep {
    type Params = AlignParams;
    type Input = CompositeSequences;
    type Output = AlignedSequences;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn params_default(&self) -> AlignParams {
        self.params.clone()
    }

    fn run_typed(&self, input: Option<CompositeSequences>, params: AlignParams) -> StepRunResultTyped<AlignedSequences> {
        let Some(composite) = input else {
            return missing_input(Self::ID);
        };
        self.failures.result(Self::ID, align_sequences(self.backend.as_ref(), &composite.handle, &params.method))
    }
}
