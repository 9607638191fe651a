use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Artifact;

/// Contexto de ejecución entregado al StepDefinition::run
pub struct ExecutionContext {
    pub input: Option<Artifact>, // Artifact único encadenado (None primer step)
    pub params: Value,           // parámetros canónicos
}

impl ExecutionContext {
    /// Decodifica los params a un tipo concreto.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.params.clone())
    }
}
