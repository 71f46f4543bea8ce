use std::collections::HashMap;

use tokio::time::Instant;

use crate::flow::types::FlowId;

/// Pending eviction deadlines, one per flow.
///
/// Scheduling again keeps whichever deadline comes first, which behaves like
/// several one-shot timers where the earliest to fire wins.
#[derive(Debug, Default)]
pub(super) struct EvictionSchedule {
    deadlines: HashMap<FlowId, Instant>,
}

impl EvictionSchedule {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn schedule(&mut self, id: FlowId, deadline: Instant) {
        self.deadlines
            .entry(id)
            .and_modify(|pending| {
                if deadline < *pending {
                    *pending = deadline;
                }
            })
            .or_insert(deadline);
    }

    /// Cancel the flow's pending eviction. Other flows are untouched.
    pub(super) fn cancel(&mut self, id: &FlowId) -> bool {
        self.deadlines.remove(id).is_some()
    }

    pub(super) fn deadline(&self, id: &FlowId) -> Option<Instant> {
        self.deadlines.get(id).copied()
    }

    pub(super) fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// The flow whose eviction is due soonest.
    pub(super) fn earliest(&self) -> Option<FlowId> {
        self.deadlines
            .iter()
            .min_by_key(|(id, deadline)| (**deadline, **id))
            .map(|(id, _)| *id)
    }

    /// Remove and return every flow due at `now`, soonest first.
    pub(super) fn take_due(&mut self, now: Instant) -> Vec<FlowId> {
        let mut due = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect::<Vec<_>>();
        due.sort();

        due.into_iter()
            .map(|(_, id)| {
                self.deadlines.remove(&id);
                id
            })
            .collect()
    }

    pub(super) fn len(&self) -> usize {
        self.deadlines.len()
    }
}
