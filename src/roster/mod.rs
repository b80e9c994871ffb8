pub mod matcher;

use std::collections::{HashMap, HashSet};

use crate::error::RosterError;
use crate::models::{PersonnelRecord, Status, UpdateNote};

pub use matcher::{match_mask, match_name, NameMatch};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const COL_SERIAL: &str = "S/N";
const COL_RANK: &str = "RANK";
const COL_NAME: &str = "NAME";
const COL_PLATOON: &str = "PLATOON";
const COL_VOCATION: &str = "VOCATION";
const COL_STATUS: &str = "STATUS";
const COL_REMARKS: &str = "REMARKS";

const REQUIRED_COLUMNS: [&str; 6] = [
    COL_SERIAL,
    COL_RANK,
    COL_NAME,
    COL_PLATOON,
    COL_VOCATION,
    COL_STATUS,
];

/// Placeholder for a blank platoon or vocation cell.
pub const UNASSIGNED: &str = "TBD";

/// A change to one or more roster rows produced by interpreting a single message.
///
/// Applied all-or-nothing by [`RosterTable::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterUpdate {
    pub serials: Vec<u32>,
    pub status: Option<Status>,
    pub note: Option<UpdateNote>,
}

/// The parade state: every person on the roster and their current status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterTable {
    rows: Vec<PersonnelRecord>,
}

impl RosterTable {
    /// Builds the table from a spreadsheet-style grid of cells.
    ///
    /// Rows above the header (the first row holding an "S/N" cell) are ignored, as are rows
    /// with fewer than two non-empty cells. Columns beyond the known ones pass through
    /// untouched.
    pub fn load(grid: &[Vec<String>]) -> Result<Self, RosterError> {
        let header_at = grid
            .iter()
            .position(|row| row.iter().any(|cell| cell.trim() == COL_SERIAL))
            .ok_or(RosterError::MissingHeader)?;

        let columns: HashMap<&str, usize> = grid[header_at]
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell.trim(), idx))
            .collect();

        let column = |name: &'static str| {
            columns
                .get(name)
                .copied()
                .ok_or(RosterError::MissingColumn(name))
        };
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = column(name)?;
        }
        let [serial_idx, rank_idx, name_idx, platoon_idx, vocation_idx, status_idx] = indices;
        let remarks_idx = columns.get(COL_REMARKS).copied();

        let mut records = Vec::new();
        for (offset, row) in grid[header_at + 1..].iter().enumerate() {
            let filled = row.iter().filter(|cell| !cell.trim().is_empty()).count();
            if filled < 2 {
                log_debug!("skipping sparse roster row {}", header_at + 1 + offset);
                continue;
            }

            let raw_serial = cell(row, serial_idx);
            let serial = raw_serial
                .parse::<u32>()
                .map_err(|_| RosterError::InvalidSerial {
                    row: header_at + 1 + offset,
                    value: raw_serial.to_string(),
                })?;

            let mut record = PersonnelRecord::new(
                serial,
                cell(row, rank_idx),
                cell(row, name_idx),
                or_unassigned(cell(row, platoon_idx)),
                or_unassigned(cell(row, vocation_idx)),
                Status::from_label(cell(row, status_idx)),
            );
            record.remarks = remarks_idx
                .map(|idx| cell(row, idx))
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            records.push(record);
        }

        let table = Self::from_records(records)?;
        log_info!("Roster loaded with {} personnel", table.len());
        Ok(table)
    }

    /// Builds the table from already-typed records, enforcing unique serial numbers.
    pub fn from_records(rows: Vec<PersonnelRecord>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        for record in &rows {
            if !seen.insert(record.serial) {
                return Err(RosterError::DuplicateSerial(record.serial));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[PersonnelRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&PersonnelRecord> {
        self.rows.get(idx)
    }

    pub fn get(&self, serial: u32) -> Option<&PersonnelRecord> {
        self.rows.iter().find(|record| record.serial == serial)
    }

    /// Serials of every row whose display identity is one of `identities`.
    pub fn serials_for(&self, identities: &[&str]) -> Vec<u32> {
        self.rows
            .iter()
            .filter(|record| identities.contains(&record.display_name.as_str()))
            .map(|record| record.serial)
            .collect()
    }

    /// Applies `update` to every listed row, or to none if any serial is unknown.
    pub fn apply(&mut self, update: &RosterUpdate) -> Result<(), RosterError> {
        if let Some(missing) = update
            .serials
            .iter()
            .find(|serial| self.get(**serial).is_none())
        {
            return Err(RosterError::UnknownSerial(*missing));
        }

        for record in self
            .rows
            .iter_mut()
            .filter(|record| update.serials.contains(&record.serial))
        {
            if let Some(status) = &update.status {
                record.status = status.clone();
            }
            if let Some(note) = &update.note {
                record.latest_update.push(note.clone());
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> Vec<PersonnelRecord> {
        self.rows.clone()
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|value| value.trim()).unwrap_or("")
}

fn or_unassigned(value: &str) -> &str {
    if value.is_empty() {
        UNASSIGNED
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn sample() -> Vec<Vec<String>> {
        grid(&[
            &["MHN PARADE STATE", "", "", "", "", "", "", ""],
            &[" S/N ", "RANK", "NAME", "PLATOON", "VOCATION", "STATUS", "REMARKS", "EXTRA"],
            &["1", "CPL", "Wei Ming Tan", "PLATOON 1", "TO", "PRESENT", "", "x"],
            &["2", "SSG", "Lim Boon Keng", "", "", "", "AMB DUTY", ""],
            &["", "", "", "", "", "", "", ""],
            &["3", "", "", "", "", "", "", ""],
        ])
    }

    #[test]
    fn load_applies_defaults_and_skips_sparse_rows() {
        let table = RosterTable::load(&sample()).unwrap();
        assert_eq!(table.len(), 2);

        let tan = table.get(1).unwrap();
        assert_eq!(tan.display_name, "CPL Wei Ming Tan");
        assert_eq!(tan.status, Status::Present);
        assert_eq!(tan.remarks, None);

        let lim = table.get(2).unwrap();
        assert_eq!(lim.status, Status::Wfh);
        assert_eq!(lim.platoon, UNASSIGNED);
        assert_eq!(lim.vocation, UNASSIGNED);
        assert_eq!(lim.remarks.as_deref(), Some("AMB DUTY"));
    }

    #[test]
    fn load_rejects_missing_columns() {
        let grid = grid(&[&["S/N", "RANK", "NAME"], &["1", "CPL", "Tan"]]);
        assert_eq!(
            RosterTable::load(&grid),
            Err(RosterError::MissingColumn("PLATOON"))
        );
    }

    #[test]
    fn load_rejects_missing_header_and_bad_serials() {
        let no_header = grid(&[&["1", "CPL", "Tan"]]);
        assert_eq!(RosterTable::load(&no_header), Err(RosterError::MissingHeader));

        let bad_serial = grid(&[
            &["S/N", "RANK", "NAME", "PLATOON", "VOCATION", "STATUS"],
            &["one", "CPL", "Tan", "", "", ""],
        ]);
        assert!(matches!(
            RosterTable::load(&bad_serial),
            Err(RosterError::InvalidSerial { .. })
        ));

        let duplicate = grid(&[
            &["S/N", "RANK", "NAME", "PLATOON", "VOCATION", "STATUS"],
            &["1", "CPL", "Tan", "", "", ""],
            &["1", "CPL", "Lim", "", "", ""],
        ]);
        assert_eq!(
            RosterTable::load(&duplicate),
            Err(RosterError::DuplicateSerial(1))
        );
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut table = RosterTable::load(&sample()).unwrap();
        let before = table.clone();
        let note = UpdateNote::new(
            NaiveDate::from_ymd_opt(2021, 2, 3)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            &["RTU".to_string()],
        );

        let bad = RosterUpdate {
            serials: vec![1, 99],
            status: Some(Status::Detail),
            note: Some(note.clone()),
        };
        assert_eq!(table.apply(&bad), Err(RosterError::UnknownSerial(99)));
        assert_eq!(table, before);

        let good = RosterUpdate {
            serials: vec![1, 2],
            status: Some(Status::Detail),
            note: Some(note),
        };
        table.apply(&good).unwrap();
        assert!(table.rows().iter().all(|r| r.status == Status::Detail));
        assert!(table.rows().iter().all(|r| r.latest_update.len() == 1));
    }

    #[test]
    fn serials_for_matches_display_identity() {
        let table = RosterTable::load(&sample()).unwrap();
        assert_eq!(
            table.serials_for(&["SSG Lim Boon Keng", "CPL Nobody"]),
            vec![2]
        );
    }
}
