use std::fmt;
use std::rc::Rc;

use phylo_core::{StepKind, StepRunResultTyped, TypedStep};
use phylo_domain::GeneQuery;
use phylo_providers::PhyloBackend;
use serde::{Deserialize, Serialize};

use super::StageFailures;
use crate::artifacts::FetchedSequences;
use crate::stages::fetch_sequences;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchParams {
    /// Lista ordenada de queries.
    pub queries: Vec<GeneQuery>,
}

/// Source: busca un registro por query.
pub struct FetchSequencesStep {
    backend: Rc<dyn PhyloBackend>,
    params: FetchParams,
    failures: StageFailures,
}

impl FetchSequencesStep {
    pub const ID: &'static str = "fetch_sequences";

    pub fn new(backend: Rc<dyn PhyloBackend>, queries: Vec<GeneQuery>) -> Self {
        Self { backend,
               params: FetchParams { queries },
               failures: StageFailures::default() }
    }

    /// Comparte el registro de fallos de la corrida.
    pub fn reporting_to(mut self, failures: StageFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl fmt::Debug for FetchSequencesStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSequencesStep")
         .field("backend", &self.backend.name())
         .field("queries", &self.params.queries.len())
         .finish()
    }
}

impl TypedStep for FetchSequencesStep {
    type Params = FetchParams;
    type Input = FetchedSequences;
    type Output = FetchedSequences;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }

    fn params_default(&self) -> FetchParams {
        self.params.clone()
    }

    fn run_typed(&self, _input: Option<FetchedSequences>, params: FetchParams) -> StepRunResultTyped<FetchedSequences> {
        self.failures.result(Self::ID, fetch_sequences(self.backend.as_ref(), &params.queries))
    }
}
