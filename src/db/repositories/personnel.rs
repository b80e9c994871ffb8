use anyhow::{Context, Result};
use rusqlite::{params, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{decode_notes, encode_notes, to_i64, to_u32},
};
use crate::models::{PersonnelRecord, Status};

fn row_to_personnel(row: &Row) -> Result<PersonnelRecord> {
    let serial: i64 = row.get("serial")?;
    let status: String = row.get("status")?;
    let latest_update: String = row.get("latest_update")?;

    Ok(PersonnelRecord {
        serial: to_u32(serial, "serial")?,
        rank: row.get("rank")?,
        name: row.get("name")?,
        display_name: row.get("display_name")?,
        platoon: row.get("platoon")?,
        vocation: row.get("vocation")?,
        status: Status::from_label(&status),
        remarks: row.get("remarks")?,
        latest_update: decode_notes(&latest_update, "latest_update")?,
    })
}

/// Replaces the stored parade state with `roster` inside the caller's transaction.
pub(crate) fn replace_roster(
    tx: &Transaction<'_>,
    roster: &[PersonnelRecord],
    saved_at: &str,
) -> Result<()> {
    tx.execute("DELETE FROM personnel", [])?;
    let mut stmt = tx.prepare(
        "INSERT INTO personnel (serial, position, rank, name, display_name, platoon, vocation, status, remarks, latest_update, saved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for (position, record) in roster.iter().enumerate() {
        stmt.execute(params![
            record.serial,
            to_i64(position)?,
            record.rank,
            record.name,
            record.display_name,
            record.platoon,
            record.vocation,
            record.status.as_str(),
            record.remarks,
            encode_notes(&record.latest_update)?,
            saved_at,
        ])
        .with_context(|| format!("failed to insert personnel {}", record.serial))?;
    }
    Ok(())
}

impl Database {
    /// Stored parade state, in roster order.
    pub async fn load_roster(&self) -> Result<Vec<PersonnelRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT serial, rank, name, display_name, platoon, vocation, status, remarks, latest_update
                 FROM personnel
                 ORDER BY position ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut roster = Vec::new();
            while let Some(row) = rows.next()? {
                roster.push(row_to_personnel(row)?);
            }
            Ok(roster)
        })
        .await
    }
}
