use std::fmt;
use std::rc::Rc;

use phylo_core::{StepKind, StepRunResultTyped, TypedStep};
use phylo_providers::PhyloBackend;

use super::{missing_input, StageFailures};
use crate::artifacts::{CompositeSequences, FetchedSequences};
use crate::stages::merge_records;

/// Transform: registros → compuesto único. Sin parámetros.
pub struct MergeRecordsStep {
    backend: Rc<dyn PhyloBackend>,
    failures: StageFailures,
}

impl MergeRecordsStep {
    pub const ID: &'static str = "merge_records";

    pub fn new(backend: Rc<dyn PhyloBackend>) -> Self {
        Self { backend,
               failures: StageFailures::default() }
    }

    pub fn reporting_to(mut self, failures: StageFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl fmt::Debug for MergeRecordsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeRecordsStep").field("backend", &self.backend.name()).finish()
    }
}

impl TypedStep for MergeRecordsStep {
    type Params = ();
    type Input = FetchedSequences;
    type Output = CompositeSequences;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn run_typed(&self, input: Option<FetchedSequences>, _params: ()) -> StepRunResultTyped<CompositeSequences> {
        let Some(fetched) = input else {
            return missing_input(Self::ID);
        };
        self.failures.result(Self::ID, merge_records(self.backend.as_ref(), &fetched.handles()))
    }
}
