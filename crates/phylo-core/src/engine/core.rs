//! Core FlowEngine implementation

use std::collections::HashMap;

use log::{error, info};
use serde_json::json;
use uuid::Uuid;

use crate::constants::ENGINE_VERSION;
use crate::engine::EngineBuilderInit;
use crate::errors::CoreEngineError;
use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactDecodeError, ArtifactSpec, ExecutionContext, TypedArtifact};
use crate::repo::{FlowDefinition, FlowRepository, InMemoryFlowRepository};
use crate::step::{StepDefinition, StepRunResult};

/// Motor de ejecución de flujos lineales.
///
/// Ejecuta los pasos en orden, encadena el primer output de cada paso como
/// input del siguiente, almacena los artifacts por hash y registra todo en el
/// `EventStore`. Un fallo detiene el flujo (stop-on-failure).
#[derive(Debug)]
pub struct FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    event_store: E,
    repository: R,
    artifact_store: HashMap<String, Artifact>,
    default_flow_id: Option<Uuid>,
    default_definition: Option<FlowDefinition>,
    name: Option<String>,
}

impl FlowEngine<InMemoryEventStore, InMemoryFlowRepository> {
    /// Crea un builder con stores en memoria.
    #[inline]
    pub fn new() -> EngineBuilderInit<InMemoryEventStore, InMemoryFlowRepository> {
        EngineBuilderInit { event_store: InMemoryEventStore::default(),
                            repository: InMemoryFlowRepository::new() }
    }
}

impl<E, R> FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    pub fn new_with_stores(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               artifact_store: HashMap::new(),
               default_flow_id: None,
               default_definition: None,
               name: None }
    }

    /// Nombre legible del flujo (sólo para logs).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("flow")
    }

    pub fn set_default_definition(&mut self, definition: FlowDefinition) {
        self.default_definition = Some(definition);
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Define/genera un `flow_id` por defecto si no existe aún y lo retorna.
    pub fn ensure_default_flow_id(&mut self) -> Uuid {
        *self.default_flow_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn default_flow_id(&self) -> Option<Uuid> {
        self.default_flow_id
    }

    /// Ejecuta el flujo por defecto hasta completarlo y retorna su id.
    pub fn run(&mut self) -> Result<Uuid, CoreEngineError> {
        let flow_id = self.ensure_default_flow_id();
        let def = self.default_definition
                      .take()
                      .ok_or_else(|| CoreEngineError::Internal("no default definition configured".into()))?;
        let result = self.run_flow_to_completion(flow_id, &def);
        self.default_definition = Some(def);
        result
    }

    /// Avanza un único paso del flujo por defecto.
    pub fn step(&mut self) -> Result<(), CoreEngineError> {
        let flow_id = self.ensure_default_flow_id();
        let def = self.default_definition
                      .take()
                      .ok_or_else(|| CoreEngineError::Internal("no default definition configured".into()))?;
        let result = self.next_with(flow_id, &def);
        self.default_definition = Some(def);
        result
    }

    /// Ejecuta un flujo específico hasta su finalización.
    pub fn run_flow_to_completion(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Result<Uuid, CoreEngineError> {
        loop {
            match self.next_with(flow_id, definition) {
                Ok(()) => continue,
                Err(CoreEngineError::FlowCompleted) => return Ok(flow_id),
                Err(e) => return Err(e),
            }
        }
    }

    /// Garantiza un `FlowInitialized` y devuelve los eventos actuales del flujo.
    fn load_or_init(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Vec<FlowEvent> {
        let mut events = self.event_store.list(flow_id);
        let has_init = events.iter().any(|e| matches!(e.kind, FlowEventKind::FlowInitialized { .. }));
        if !has_init {
            info!("flow:init name={} flow_id={flow_id} steps={}", self.name(), definition.len());
            let ev = self.event_store
                         .append_kind(flow_id,
                                      FlowEventKind::FlowInitialized { definition_hash: definition.definition_hash.clone(),
                                                                       step_count: definition.len() });
            events.push(ev);
        }
        self.default_flow_id = Some(flow_id);
        events
    }

    fn next_with(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Result<(), CoreEngineError> {
        let events = self.load_or_init(flow_id, definition);
        let instance = self.repository.load(flow_id, &events, definition);

        if instance.failed {
            return Err(CoreEngineError::FlowHasFailed);
        }
        if instance.completed || instance.cursor >= definition.len() {
            return Err(CoreEngineError::FlowCompleted);
        }

        let cursor = instance.cursor;
        let step_def = definition.steps[cursor].as_ref();
        let input = if cursor == 0 {
            None
        } else {
            instance.steps
                    .get(cursor - 1)
                    .and_then(|s| s.outputs.first())
                    .and_then(|h| self.artifact_store.get(h).cloned())
        };

        let ctx = ExecutionContext { input,
                                     params: step_def.base_params() };

        info!("step:start flow_id={flow_id} index={cursor} step={}", step_def.id());
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepStarted { step_index: cursor,
                                                                  step_id: step_def.id().to_string() });

        match step_def.run(&ctx) {
            StepRunResult::Success { outputs } => {
                self.handle_step_success(flow_id, cursor, step_def, outputs, definition);
                Ok(())
            }
            StepRunResult::Failure { error } => Err(self.handle_step_failure(flow_id, cursor, step_def, error, definition)),
        }
    }

    fn hash_and_store_outputs(&mut self, outputs: &mut [Artifact]) -> Vec<String> {
        let mut hashes: Vec<String> = Vec::with_capacity(outputs.len());
        for o in outputs.iter_mut() {
            let h = hash_value(&o.payload);
            o.hash = h.clone();
            self.artifact_store.insert(h.clone(), o.clone());
            hashes.push(h);
        }
        hashes
    }

    fn handle_step_success(&mut self,
                           flow_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           mut outputs: Vec<Artifact>,
                           definition: &FlowDefinition) {
        let output_hashes = self.hash_and_store_outputs(&mut outputs);
        let fingerprint = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "definition_hash": definition.definition_hash,
            "step_index": cursor,
            "output_hashes": output_hashes,
            "params": step_def.base_params()
        }));

        info!("step:done flow_id={flow_id} index={cursor} step={} outputs={}",
              step_def.id(),
              output_hashes.len());
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFinished { step_index: cursor,
                                                                   step_id: step_def.id().to_string(),
                                                                   outputs: output_hashes,
                                                                   fingerprint });

        if cursor + 1 == definition.len() {
            self.complete_flow(flow_id, definition);
        }
    }

    fn handle_step_failure(&mut self,
                           flow_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           error: CoreEngineError,
                           definition: &FlowDefinition)
                           -> CoreEngineError {
        let fingerprint = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "definition_hash": definition.definition_hash,
            "step_index": cursor,
            "params": step_def.base_params()
        }));

        error!("step:failed flow_id={flow_id} index={cursor} step={} err={error}", step_def.id());
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFailed { step_index: cursor,
                                                                 step_id: step_def.id().to_string(),
                                                                 error: error.clone(),
                                                                 fingerprint });
        error
    }

    fn complete_flow(&mut self, flow_id: Uuid, definition: &FlowDefinition) {
        let step_fps: Vec<String> = self.event_store
                                        .list(flow_id)
                                        .into_iter()
                                        .filter_map(|e| match e.kind {
                                            FlowEventKind::StepFinished { fingerprint, .. } => Some(fingerprint),
                                            _ => None,
                                        })
                                        .collect();

        let flow_fingerprint = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "definition_hash": definition.definition_hash,
            "step_fingerprints": step_fps
        }));

        info!("flow:completed name={} flow_id={flow_id}", self.name());
        self.event_store
            .append_kind(flow_id, FlowEventKind::FlowCompleted { flow_fingerprint });
    }

    /// Lista eventos del flujo por defecto.
    pub fn events(&self) -> Option<Vec<FlowEvent>> {
        self.default_flow_id.map(|fid| self.event_store.list(fid))
    }

    /// Variante compacta de eventos para el flujo por defecto.
    pub fn event_variants(&self) -> Option<Vec<&'static str>> {
        self.events().map(|events| {
                         events.iter()
                               .map(|e| match e.kind {
                                   FlowEventKind::FlowInitialized { .. } => "I",
                                   FlowEventKind::StepStarted { .. } => "S",
                                   FlowEventKind::StepFinished { .. } => "F",
                                   FlowEventKind::StepFailed { .. } => "X",
                                   FlowEventKind::FlowCompleted { .. } => "C",
                               })
                               .collect()
                     })
    }

    /// Fingerprint del flujo por defecto si está completo.
    pub fn flow_fingerprint(&self) -> Option<String> {
        self.events()?.into_iter().rev().find_map(|e| match e.kind {
                                              FlowEventKind::FlowCompleted { flow_fingerprint } => Some(flow_fingerprint),
                                              _ => None,
                                          })
    }

    /// Último output (primer artifact) de `step_id`, decodificado a `T`.
    pub fn last_step_output_typed<T: ArtifactSpec>(&self, step_id: &str) -> Option<Result<TypedArtifact<T>, ArtifactDecodeError>> {
        let hash = self.events()?.into_iter().rev().find_map(|e| match e.kind {
                                                    FlowEventKind::StepFinished { step_id: id, outputs, .. } if id == step_id => {
                                                        outputs.into_iter().next()
                                                    }
                                                    _ => None,
                                                })?;
        self.artifact_store.get(&hash).map(TypedArtifact::decode)
    }
}
