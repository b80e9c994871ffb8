mod connection;
mod helpers;
mod migrations;
mod repositories;

use anyhow::{Context, Result};
use chrono::Utc;

pub use connection::Database;

use crate::db::repositories::{replace_ongoing, replace_roster};
use crate::interpretation::StateSnapshot;
use crate::models::MovementRecord;
use crate::registry::OngoingRegistry;
use crate::roster::RosterTable;

impl Database {
    /// Persists the full engine state. Roster and ongoing details are written together or
    /// not at all.
    pub async fn save_state(&self, snapshot: &StateSnapshot) -> Result<()> {
        let roster = snapshot.roster.clone();
        let ongoing: Vec<MovementRecord> = snapshot.ongoing.values().cloned().collect();
        self.execute(move |conn| {
            let saved_at = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;
            replace_roster(&tx, &roster, &saved_at)?;
            replace_ongoing(&tx, &ongoing, &saved_at)?;
            tx.commit().context("failed to commit state")?;
            Ok(())
        })
        .await
    }

    /// Restores a previously saved state. An empty store yields an empty roster and registry.
    pub async fn load_state(&self) -> Result<(RosterTable, OngoingRegistry)> {
        let roster = RosterTable::from_records(self.load_roster().await?)
            .context("stored roster is inconsistent")?;
        let registry = OngoingRegistry::from_records(self.load_ongoing().await?);
        Ok((roster, registry))
    }
}
