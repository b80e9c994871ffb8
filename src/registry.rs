use indexmap::IndexMap;

use crate::models::MovementRecord;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Open movements keyed by plate, in declaration order.
///
/// A plate appears at most once; re-declaring a plate replaces the earlier movement in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OngoingRegistry {
    details: IndexMap<String, MovementRecord>,
}

impl OngoingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = MovementRecord>) -> Self {
        let mut registry = Self::new();
        for record in records {
            registry.register(record);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn get(&self, plate: &str) -> Option<&MovementRecord> {
        self.details.get(plate)
    }

    pub fn contains(&self, plate: &str) -> bool {
        self.details.contains_key(plate)
    }

    /// Opens (or replaces) the movement for `record.plate`. Returns the replaced movement.
    pub fn register(&mut self, record: MovementRecord) -> Option<MovementRecord> {
        let replaced = self.details.insert(record.plate.clone(), record);
        if let Some(previous) = &replaced {
            log_info!("Plate {} re-declared; replacing open movement", previous.plate);
        }
        replaced
    }

    /// Closes the movement for `plate`. Closing a plate that is not open is a no-op.
    pub fn close(&mut self, plate: &str) -> Option<MovementRecord> {
        let closed = self.details.shift_remove(plate);
        if closed.is_none() {
            log_debug!("Plate {plate} is not open; nothing to close");
        }
        closed
    }

    /// First open movement, in declaration order, that involves `identity`.
    pub fn find_involving(&self, identity: &str) -> Option<&MovementRecord> {
        self.details.values().find(|record| record.involves(identity))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovementRecord> {
        self.details.values()
    }

    pub fn snapshot(&self) -> IndexMap<String, MovementRecord> {
        self.details.clone()
    }
}
