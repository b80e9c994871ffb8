use chrono::NaiveDateTime;

use crate::error::FieldError;
use crate::interpretation::classifier::Participants;
use crate::interpretation::config::EngineConfig;
use crate::interpretation::fields::split_field;
use crate::models::{MovementRecord, Status, UpdateNote};
use crate::roster::{match_name, RosterTable, RosterUpdate};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Everything a movement declaration changes, computed without touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementPlan {
    /// Addressee and commander rows go on DETAIL whether or not a plate was found.
    pub update: RosterUpdate,
    pub movement: Result<MovementRecord, FieldError>,
    /// Lines that could not be read as fields.
    pub skipped: Vec<FieldError>,
}

/// Resolves a display string to the roster's identity for that person, or keeps it raw.
pub(crate) fn resolve_identity(
    roster: &RosterTable,
    raw: &str,
    config: &EngineConfig,
) -> (String, Option<u32>) {
    match match_name(roster, raw, config.match_score_floor)
        .row()
        .and_then(|idx| roster.row(idx))
    {
        Some(record) => (record.display_name.clone(), Some(record.serial)),
        None => (raw.to_string(), None),
    }
}

/// Vehicle model from the declaration line: "2x 5TON MOV TO MHC" becomes "5ton".
pub fn extract_model(line: &str) -> String {
    let lowered = line.to_lowercase();
    let before_mov = lowered.split("mov").next().unwrap_or("");
    before_mov.rsplit('x').next().unwrap_or("").trim().to_string()
}

pub fn parse_movement(
    roster: &RosterTable,
    lines: &[String],
    participants: &Participants,
    timestamp: NaiveDateTime,
    config: &EngineConfig,
) -> MovementPlan {
    let (assigned_to, to_serial) =
        resolve_identity(roster, participants.addressee.as_deref().unwrap_or(""), config);
    let (vehicle_commander, vc_serial) = match participants.vehicle_commander.as_deref() {
        Some(raw) => {
            let (identity, serial) = resolve_identity(roster, raw, config);
            (Some(identity), serial)
        }
        None => (None, None),
    };

    let mut serials: Vec<u32> = to_serial.into_iter().collect();
    if let Some(serial) = vc_serial.filter(|serial| !serials.contains(serial)) {
        serials.push(serial);
    }

    let update = RosterUpdate {
        serials,
        status: Some(Status::Detail),
        note: Some(UpdateNote::new(timestamp, lines)),
    };

    let Some(first) = lines.first() else {
        return MovementPlan {
            update,
            movement: Err(FieldError::MissingModel),
            skipped: Vec::new(),
        };
    };
    let model = extract_model(first);

    let mut plate = None;
    let mut purpose = None;
    let mut skipped = Vec::new();
    for line in &lines[1..] {
        let field = match split_field(line) {
            Ok(field) => field,
            Err(err) => {
                log_debug!("{err}");
                skipped.push(err);
                continue;
            }
        };

        let value = Some(field.value.to_string()).filter(|value| !value.is_empty());
        if field.label_contains(&config.plate_label) {
            plate = value;
        } else if field.label_contains(&config.purpose_label) {
            purpose = value;
        }
    }

    let movement = plate
        .map(|plate| MovementRecord {
            model,
            plate,
            assigned_to,
            vehicle_commander,
            purpose,
        })
        .ok_or(FieldError::MissingPlate);

    MovementPlan {
        update,
        movement,
        skipped,
    }
}
