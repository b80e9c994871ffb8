use serde::{Deserialize, Serialize};

/// An open vehicle movement, keyed by plate in the ongoing registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    pub model: String,
    pub plate: String,
    pub assigned_to: String,
    pub vehicle_commander: Option<String>,
    pub purpose: Option<String>,
}

impl MovementRecord {
    /// True when `identity` is either the assignee or the vehicle commander.
    pub fn involves(&self, identity: &str) -> bool {
        self.assigned_to == identity || self.vehicle_commander.as_deref() == Some(identity)
    }
}

impl std::fmt::Display for MovementRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model: {}\nPlate: {}\nTO: {}\nVCOM: {}\nPurpose: {}",
            self.model,
            self.plate,
            self.assigned_to,
            self.vehicle_commander.as_deref().unwrap_or("-"),
            self.purpose.as_deref().unwrap_or("-"),
        )
    }
}
