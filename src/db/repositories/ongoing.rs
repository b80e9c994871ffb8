use anyhow::{Context, Result};
use rusqlite::{params, Row, Transaction};

use crate::db::{connection::Database, helpers::to_i64};
use crate::models::MovementRecord;

fn row_to_movement(row: &Row) -> Result<MovementRecord> {
    Ok(MovementRecord {
        model: row.get("model")?,
        plate: row.get("plate")?,
        assigned_to: row.get("assigned_to")?,
        vehicle_commander: row.get("vehicle_commander")?,
        purpose: row.get("purpose")?,
    })
}

/// Replaces the stored ongoing details with `movements`, keeping their order.
pub(crate) fn replace_ongoing(
    tx: &Transaction<'_>,
    movements: &[MovementRecord],
    saved_at: &str,
) -> Result<()> {
    tx.execute("DELETE FROM ongoing_details", [])?;
    let mut stmt = tx.prepare(
        "INSERT INTO ongoing_details (plate, position, model, assigned_to, vehicle_commander, purpose, saved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, movement) in movements.iter().enumerate() {
        stmt.execute(params![
            movement.plate,
            to_i64(position)?,
            movement.model,
            movement.assigned_to,
            movement.vehicle_commander,
            movement.purpose,
            saved_at,
        ])
        .with_context(|| format!("failed to insert ongoing detail {}", movement.plate))?;
    }
    Ok(())
}

impl Database {
    pub async fn load_ongoing(&self) -> Result<Vec<MovementRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT plate, model, assigned_to, vehicle_commander, purpose
                 FROM ongoing_details
                 ORDER BY position ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut movements = Vec::new();
            while let Some(row) = rows.next()? {
                movements.push(row_to_movement(row)?);
            }
            Ok(movements)
        })
        .await
    }
}
