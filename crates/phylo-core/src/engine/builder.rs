//! Builder para `FlowEngine`.
//!
//! Obliga a declarar el primer paso (fuente) y a encadenar pasos cuyos tipos
//! de entrada y salida sean compatibles:
//!
//! ```ignore
//! let engine = FlowEngine::new()
//!     .first_step(FetchSequencesStep::new(..))
//!     .add_step(MergeSequencesStep::new(..))
//!     .build();
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;

use crate::engine::FlowEngine;
use crate::event::EventStore;
use crate::repo::FlowRepository;
use crate::step::{SameAs, StepDefinition, StepKind, TypedStep};

/// Estado inicial del builder: sólo stores, todavía sin pasos.
#[derive(Debug)]
pub struct EngineBuilderInit<E: EventStore, R: FlowRepository> {
    pub event_store: E,
    pub repository: R,
}

impl<E: EventStore, R: FlowRepository> EngineBuilderInit<E, R> {
    /// Define el primer paso del flujo, que debe ser de tipo `Source`.
    #[inline]
    pub fn first_step<S>(self, step: S) -> EngineBuilder<S, E, R>
        where S: TypedStep + Debug + 'static
    {
        debug_assert!(matches!(TypedStep::kind(&step), StepKind::Source),
                      "el primer paso debe ser de tipo Source");

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        steps: vec![Box::new(step)],
                        _out: PhantomData }
    }
}

/// Builder principal. `S` es el último `TypedStep` añadido; su `S::Output`
/// restringe el input del siguiente `add_step`.
#[derive(Debug)]
pub struct EngineBuilder<S: TypedStep + Debug + 'static, E: EventStore, R: FlowRepository> {
    event_store: E,
    repository: R,
    steps: Vec<Box<dyn StepDefinition>>,
    _out: PhantomData<S::Output>,
}

impl<S: TypedStep + Debug + 'static, E: EventStore, R: FlowRepository> EngineBuilder<S, E, R> {
    /// Añade el siguiente paso; `N::Input` debe ser exactamente `S::Output`.
    #[inline]
    pub fn add_step<N>(mut self, next: N) -> EngineBuilder<N, E, R>
        where N: TypedStep + Debug + 'static,
              N::Input: SameAs<S::Output>
    {
        self.steps.push(Box::new(next));

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        steps: self.steps,
                        _out: PhantomData }
    }

    /// Construye el `FlowEngine` y fija la definición por defecto.
    #[inline]
    pub fn build(self) -> FlowEngine<E, R> {
        let mut engine = FlowEngine::new_with_stores(self.event_store, self.repository);
        let definition = crate::repo::build_flow_definition_auto(self.steps);
        engine.set_default_definition(definition);
        engine
    }
}
