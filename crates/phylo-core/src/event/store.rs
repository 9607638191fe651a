use std::collections::HashMap;

use chrono::Utc;
use log::debug;
use uuid::Uuid;

use super::{FlowEvent, FlowEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent;
    /// Lista eventos de un flujo (orden ascendente por seq).
    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<FlowEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let events = self.inner.entry(flow_id).or_default();
        let seq = events.len() as u64;
        debug!("append_kind flow_id={flow_id} seq={seq} kind={}", kind.variant_name());
        let ev = FlowEvent { seq, flow_id, kind, ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent> {
        self.inner.get(&flow_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_dense_per_flow() {
        let mut store = InMemoryEventStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append_kind(a, FlowEventKind::FlowInitialized { definition_hash: "h".into(), step_count: 1 });
        store.append_kind(b, FlowEventKind::FlowInitialized { definition_hash: "h".into(), step_count: 1 });
        let ev = store.append_kind(a, FlowEventKind::StepStarted { step_index: 0, step_id: "fetch".into() });
        assert_eq!(ev.seq, 1);
        assert_eq!(store.list(b).len(), 1);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
