//! Un `TypedStep` por stage. Cada step comparte el backend de la ejecución
//! (`Rc<dyn PhyloBackend>`, todo corre en un único hilo) y guarda sus
//! parámetros deterministas, que entran en el fingerprint del step.

pub mod align;
pub mod export;
pub mod fetch;
pub mod merge;
pub mod tree;

pub use align::{AlignParams, AlignSequencesStep};
pub use export::{ExportParams, ExportTreesStep};
pub use fetch::{FetchParams, FetchSequencesStep};
pub use merge::MergeRecordsStep;
pub use tree::{BuildTreesStep, TreeParams};

use std::cell::RefCell;
use std::rc::Rc;

use phylo_core::{ArtifactSpec, CoreEngineError, StepRunResultTyped};

use crate::StageError;

/// Último error de stage de una corrida, compartido por sus steps. El engine
/// sólo registra el mensaje (`StepExecution`); aquí se conserva la variante.
#[derive(Debug, Clone, Default)]
pub struct StageFailures(Rc<RefCell<Option<(String, StageError)>>>);

impl StageFailures {
    /// Retira el error registrado, con el id del step que lo produjo.
    pub fn take(&self) -> Option<(String, StageError)> {
        self.0.borrow_mut().take()
    }

    /// Traduce el resultado de un stage al resultado tipado del step.
    pub(crate) fn result<O: ArtifactSpec>(&self, step_id: &str, result: Result<O, StageError>) -> StepRunResultTyped<O> {
        match result {
            Ok(out) => StepRunResultTyped::Success { outputs: vec![out] },
            Err(e) => {
                let error = CoreEngineError::StepExecution { step_id: step_id.to_string(),
                                                             message: e.to_string() };
                *self.0.borrow_mut() = Some((step_id.to_string(), e));
                StepRunResultTyped::Failure { error }
            }
        }
    }
}

pub(crate) fn missing_input<O: ArtifactSpec>(step_id: &str) -> StepRunResultTyped<O> {
    StepRunResultTyped::Failure { error: CoreEngineError::MissingInputs(step_id.to_string()) }
}
