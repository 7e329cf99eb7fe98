use std::collections::HashMap;

use crate::form::FieldId;

/// Identifies one issued lookup. A response is applied only while its
/// ticket is still the newest one for the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub field: FieldId,
    pub page: u32,
    epoch: u64,
    seq: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    epoch: u64,
    seq: u64,
}

/// Request-generation tokens per field: last request wins, and
/// invalidating a field (its parent changed) bumps the epoch so every
/// outstanding ticket goes stale.
#[derive(Debug, Clone, Default)]
pub struct LookupTracker {
    slots: HashMap<FieldId, Slot>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, field: &FieldId, page: u32) -> LookupTicket {
        let slot = self.slots.entry(field.clone()).or_default();
        slot.seq += 1;
        LookupTicket {
            field: field.clone(),
            page,
            epoch: slot.epoch,
            seq: slot.seq,
        }
    }

    pub fn invalidate(&mut self, field: &FieldId) {
        let slot = self.slots.entry(field.clone()).or_default();
        slot.epoch += 1;
    }

    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.slots
            .get(&ticket.field)
            .is_some_and(|slot| slot.epoch == ticket.epoch && slot.seq == ticket.seq)
    }
}
