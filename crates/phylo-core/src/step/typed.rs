use serde::{de::DeserializeOwned, Serialize};

use super::{StepKind, StepRunResult};
use crate::errors::CoreEngineError;
use crate::model::{ArtifactSpec, ExecutionContext};

/// Marker trait para exigir en compilación que dos tipos sean el mismo.
pub trait SameAs<T> {}
impl<T> SameAs<T> for T {}

/// Resultado tipado de ejecutar un `TypedStep`.
pub enum StepRunResultTyped<Out: ArtifactSpec> {
    Success { outputs: Vec<Out> },
    Failure { error: CoreEngineError },
}

impl<Out: ArtifactSpec> StepRunResultTyped<Out> {
    /// Convierte a `StepRunResult` neutro serializando los outputs a
    /// `Artifact`.
    pub fn into_neutral(self) -> StepRunResult {
        match self {
            StepRunResultTyped::Success { outputs } => {
                match outputs.into_iter().map(|o| o.into_artifact()).collect::<Result<Vec<_>, _>>() {
                    Ok(outputs) => StepRunResult::Success { outputs },
                    Err(e) => StepRunResult::Failure { error: CoreEngineError::ArtifactDecode(e.to_string()) },
                }
            }
            StepRunResultTyped::Failure { error } => StepRunResult::Failure { error },
        }
    }
}

/// Interfaz de alto nivel para definir Steps con tipos fuertes
/// (Params / Input / Output).
///
/// Implementadores escriben `run_typed` con tipos concretos; el adaptador de
/// abajo convierte esa ejecución a la interfaz neutra `StepDefinition`.
pub trait TypedStep {
    type Params: DeserializeOwned + Serialize + Clone + Default;
    /// Para un `Source` se ignora; por convención es igual a `Output`.
    type Input: ArtifactSpec;
    type Output: ArtifactSpec;

    fn id(&self) -> &'static str;

    fn name(&self) -> &str {
        self.id()
    }

    fn kind(&self) -> StepKind;

    /// Parámetros deterministas del step (por defecto `Default`).
    fn params_default(&self) -> Self::Params {
        Default::default()
    }

    /// Ejecución tipada. Para `Source`, `input` será `None`.
    fn run_typed(&self, input: Option<Self::Input>, params: Self::Params) -> StepRunResultTyped<Self::Output>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStep` implementa `StepDefinition` neutro.
// -------------------------------------------------------------
impl<T> crate::step::StepDefinition for T where T: TypedStep + std::fmt::Debug + 'static
{
    fn id(&self) -> &str {
        <Self as TypedStep>::id(self)
    }

    fn name(&self) -> &str {
        <Self as TypedStep>::name(self)
    }

    fn base_params(&self) -> serde_json::Value {
        serde_json::to_value(self.params_default()).unwrap_or(serde_json::Value::Null)
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        let params: T::Params = ctx.params_as().unwrap_or_else(|_| self.params_default());

        let step_id = <Self as TypedStep>::id(self);
        let typed_in = match (&ctx.input, <Self as TypedStep>::kind(self)) {
            (_, StepKind::Source) => None,
            (None, _) => {
                return StepRunResult::Failure { error: CoreEngineError::MissingInputs(step_id.to_string()) };
            }
            (Some(a), _) => match T::Input::from_artifact(a) {
                Ok(v) => Some(v),
                Err(e) => return StepRunResult::Failure { error: CoreEngineError::ArtifactDecode(e.to_string()) },
            },
        };

        self.run_typed(typed_in, params).into_neutral()
    }

    fn kind(&self) -> StepKind {
        <Self as TypedStep>::kind(self)
    }
}
