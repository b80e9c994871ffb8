use indexmap::IndexMap;
use serde::Serialize;

use crate::error::InterpretError;
use crate::interpretation::classifier::{
    classify, locate_content_start, resolve_participants, MessageKind, Participants,
};
use crate::interpretation::config::EngineConfig;
use crate::interpretation::movement::parse_movement;
use crate::interpretation::reply::{parse_reply, Resolution};
use crate::models::{Message, MovementRecord, PersonnelRecord};
use crate::registry::OngoingRegistry;
use crate::roster::RosterTable;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// What processing one message did to the tracked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub kind: MessageKind,
    pub participants: Participants,
    /// Serials of the roster rows that were updated.
    pub updated: Vec<u32>,
    /// Plate opened (or re-opened) by a movement declaration.
    pub registered: Option<String>,
    /// Plate closed by a return confirmation.
    pub closed: Option<String>,
    /// Whether the message confirmed a return, with or without a matching movement.
    pub returned: bool,
}

/// Persistable view of everything the engine tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub roster: Vec<PersonnelRecord>,
    pub ongoing: IndexMap<String, MovementRecord>,
}

/// Owns the roster and the ongoing registry and applies messages to them, one at a time.
///
/// Messages must arrive in non-decreasing timestamp order; the engine does no reordering.
#[derive(Debug, Clone)]
pub struct InterpretationEngine {
    roster: RosterTable,
    registry: OngoingRegistry,
    config: EngineConfig,
}

impl InterpretationEngine {
    pub fn new(roster: RosterTable, config: EngineConfig) -> Self {
        Self::with_registry(roster, OngoingRegistry::new(), config)
    }

    pub fn with_registry(
        roster: RosterTable,
        registry: OngoingRegistry,
        config: EngineConfig,
    ) -> Self {
        Self {
            roster,
            registry,
            config,
        }
    }

    pub fn roster(&self) -> &RosterTable {
        &self.roster
    }

    pub fn registry(&self) -> &OngoingRegistry {
        &self.registry
    }

    /// Replaces the roster with a freshly loaded one. Open movements are kept.
    pub fn reload_roster(&mut self, roster: RosterTable) {
        log_info!("Roster reloaded ({} personnel)", roster.len());
        self.roster = roster;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            roster: self.roster.snapshot(),
            ongoing: self.registry.snapshot(),
        }
    }

    /// Classifies `message` and applies it to the roster and registry.
    ///
    /// Ambiguous names, unreadable fields and replies that match no movement are logged and
    /// absorbed. Only a message with fewer than two lines is rejected.
    pub fn process(&mut self, message: &Message) -> Result<Interpretation, InterpretError> {
        let lines = &message.lines;
        if lines.len() < 2 {
            return Err(InterpretError::TooFewLines(lines.len()));
        }

        let participants = resolve_participants(lines, &message.sender);
        let start = locate_content_start(lines).min(lines.len());
        let body = &lines[start..];
        let kind = classify(lines);

        log_info!(
            "Parsing {:?}: {} commanded by {}",
            kind,
            participants.addressee.as_deref().unwrap_or("?"),
            participants.vehicle_commander.as_deref().unwrap_or("-"),
        );

        match kind {
            MessageKind::Movement => self.apply_movement(body, participants, message),
            MessageKind::Reply => self.apply_reply(body, participants, message),
        }
    }

    fn apply_movement(
        &mut self,
        body: &[String],
        participants: Participants,
        message: &Message,
    ) -> Result<Interpretation, InterpretError> {
        let plan = parse_movement(
            &self.roster,
            body,
            &participants,
            message.timestamp,
            &self.config,
        );
        self.roster.apply(&plan.update)?;

        let registered = match plan.movement {
            Ok(movement) => {
                log_info!(
                    "New movement logged: [{}]",
                    movement.to_string().lines().collect::<Vec<_>>().join("], [")
                );
                let plate = movement.plate.clone();
                self.registry.register(movement);
                Some(plate)
            }
            Err(err) => {
                log_info!("Movement not registered: {err}");
                None
            }
        };

        Ok(Interpretation {
            kind: MessageKind::Movement,
            participants,
            updated: plan.update.serials,
            registered,
            closed: None,
            returned: false,
        })
    }

    fn apply_reply(
        &mut self,
        body: &[String],
        participants: Participants,
        message: &Message,
    ) -> Result<Interpretation, InterpretError> {
        let plan = parse_reply(
            &self.roster,
            &self.registry,
            body,
            &participants,
            message.timestamp,
            &self.config,
        );
        self.roster.apply(&plan.update)?;

        if plan.resolution == Resolution::Unresolved {
            log_debug!("Reply did not resolve to an open movement");
        }

        let closed = match plan.plate_to_close() {
            Some(plate) => self.registry.close(plate).map(|movement| {
                log_info!(
                    "RTU: {}",
                    movement.to_string().lines().collect::<Vec<_>>().join(", ")
                );
                movement.plate
            }),
            None => None,
        };

        Ok(Interpretation {
            kind: MessageKind::Reply,
            participants,
            updated: plan.update.serials,
            registered: None,
            closed,
            returned: plan.returned_via.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 2, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn engine() -> InterpretationEngine {
        let roster = RosterTable::from_records(vec![
            PersonnelRecord::new(1, "CPL", "Wei Ming Tan", "PLATOON 1", "TO", Status::Present),
            PersonnelRecord::new(2, "SSG", "Lim Boon Keng", "HQ PLATOON", "VC", Status::Present),
        ])
        .unwrap();
        InterpretationEngine::new(roster, EngineConfig::default())
    }

    #[test]
    fn single_line_messages_are_rejected() {
        let mut engine = engine();
        let message = Message::new(["RTU"], "Tan Wei Ming CPL", at(9));
        assert_eq!(
            engine.process(&message),
            Err(InterpretError::TooFewLines(1))
        );
    }

    #[test]
    fn quoted_reply_with_short_body_does_not_panic() {
        let mut engine = engine();
        let message = Message::new(["CPL Tan", "CPL Tan"], "Tan Wei Ming CPL", at(9));
        let outcome = engine.process(&message).unwrap();
        assert_eq!(outcome.kind, MessageKind::Reply);
        assert_eq!(outcome.closed, None);
    }

    #[test]
    fn declaration_then_return_closes_the_detail() {
        let mut engine = engine();
        let declared = Message::new(
            ["3T MOV", "TO: CPL Tan Wei Ming", "VC: SSG Lim Boon Keng", "MID: SBA1234A"],
            "Lim Boon Keng SSG",
            at(8),
        );
        let outcome = engine.process(&declared).unwrap();
        assert_eq!(outcome.registered.as_deref(), Some("SBA1234A"));
        assert_eq!(engine.roster().get(1).unwrap().status, Status::Detail);
        assert_eq!(engine.roster().get(2).unwrap().status, Status::Detail);

        let back = Message::new(
            ["Wei Ming Tan CPL", "Wei Ming Tan CPL", "RTU", "Reached MHC", "12:05"],
            "Wei Ming Tan CPL",
            at(12),
        );
        let outcome = engine.process(&back).unwrap();
        assert_eq!(outcome.closed.as_deref(), Some("SBA1234A"));
        assert!(engine.registry().is_empty());
        assert_eq!(engine.roster().get(2).unwrap().status, Status::Present);
    }

    fn parade_grid() -> Vec<Vec<String>> {
        [
            ["S/N", "RANK", "NAME", "PLATOON", "VOCATION", "STATUS"],
            ["1", "CPL", "Wei Ming Tan", "PLATOON 1", "TO", "PRESENT"],
            ["2", "SSG", "Lim Boon Keng", "HQ PLATOON", "VC", "PRESENT"],
        ]
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
    }

    #[test]
    fn reloaded_roster_keeps_open_details() {
        let mut engine = engine();
        let declared = Message::new(
            ["3T MOV", "TO: CPL Tan Wei Ming", "VC: SSG Lim Boon Keng", "MID: SBA1234A"],
            "Lim Boon Keng SSG",
            at(8),
        );
        engine.process(&declared).unwrap();
        assert_eq!(engine.roster().get(1).unwrap().status, Status::Detail);

        engine.reload_roster(RosterTable::load(&parade_grid()).unwrap());
        assert!(engine.registry().contains("SBA1234A"));
        for record in engine.roster().rows() {
            assert_eq!(record.status, Status::Present);
            assert!(record.latest_update.is_empty());
        }

        // Only the sender is known, so the reply is tied to the detail through the registry.
        let back = Message::new(
            ["Update", "RTU", "Reached MHC", "1200"],
            "Tan Wei Ming CPL",
            at(12),
        );
        let outcome = engine.process(&back).unwrap();
        assert_eq!(outcome.closed.as_deref(), Some("SBA1234A"));
        assert_eq!(outcome.updated, vec![1, 2]);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.roster().get(2).unwrap().latest_update.len(), 1);
    }
}
