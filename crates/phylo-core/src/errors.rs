//! Errores específicos del core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("flow already completed")] FlowCompleted,
    #[error("missing required inputs for step {0}")] MissingInputs(String),
    #[error("flow has failed previously (stop-on-failure invariant)")] FlowHasFailed,
    #[error("artifact decode failed: {0}")] ArtifactDecode(String),
    #[error("step {step_id} failed: {message}")] StepExecution { step_id: String, message: String },
    #[error("internal: {0}")] Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_execution_message_names_step() {
        let e = CoreEngineError::StepExecution { step_id: "align".into(),
                                                 message: "mafft exited with 1".into() };
        assert_eq!(e.to_string(), "step align failed: mafft exited with 1");
    }
}
