use chrono::NaiveDateTime;

use crate::interpretation::classifier::Participants;
use crate::interpretation::config::EngineConfig;
use crate::interpretation::fields::split_field;
use crate::models::{MovementRecord, Status, UpdateNote};
use crate::registry::OngoingRegistry;
use crate::roster::{match_name, RosterTable, RosterUpdate};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// How a reply was tied to an open movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reply restates TO/VC and names the plate.
    Direct(MovementRecord),
    /// Only the sender is known; matched through the movement they are on.
    Indirect(MovementRecord),
    Unresolved,
}

impl Resolution {
    pub fn movement(&self) -> Option<&MovementRecord> {
        match self {
            Resolution::Direct(movement) | Resolution::Indirect(movement) => Some(movement),
            Resolution::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPlan {
    pub update: RosterUpdate,
    pub resolution: Resolution,
    /// The closure keyword that confirmed a return, if any.
    pub returned_via: Option<String>,
    /// A plate the reply named that is not open (already closed, or declared before tracking
    /// started).
    pub unknown_plate: Option<String>,
}

impl ReplyPlan {
    /// Plate to remove from the registry once the update is applied.
    pub fn plate_to_close(&self) -> Option<&str> {
        self.returned_via
            .as_ref()
            .and(self.resolution.movement())
            .map(|movement| movement.plate.as_str())
    }
}

/// Returns the first closure keyword whose last occurrence is followed by the arrival token.
///
/// Matching ignores case on both the text and the configured words.
pub fn closure_keyword<'c>(joined: &str, config: &'c EngineConfig) -> Option<&'c str> {
    let joined = joined.to_lowercase();
    let arrival = config.arrival_token.to_lowercase();
    config
        .closure_keywords
        .iter()
        .find(|keyword| {
            let keyword = keyword.to_lowercase();
            !keyword.is_empty()
                && joined
                    .rfind(&keyword)
                    .is_some_and(|at| joined[at + keyword.len()..].contains(&arrival))
        })
        .map(String::as_str)
}

fn referenced_plate(lines: &[String], config: &EngineConfig) -> Option<String> {
    lines.iter().skip(1).find_map(|line| {
        split_field(line)
            .ok()
            .filter(|field| field.label_contains(&config.plate_label))
            .map(|field| field.value.to_string())
    })
}

pub fn parse_reply(
    roster: &RosterTable,
    registry: &OngoingRegistry,
    lines: &[String],
    participants: &Participants,
    timestamp: NaiveDateTime,
    config: &EngineConfig,
) -> ReplyPlan {
    let addressee_row = participants
        .addressee
        .as_deref()
        .and_then(|raw| match_name(roster, raw, config.match_score_floor).row());
    let commander_row = participants
        .vehicle_commander
        .as_deref()
        .and_then(|raw| match_name(roster, raw, config.match_score_floor).row());

    let mut serials: Vec<u32> = addressee_row
        .iter()
        .chain(commander_row.iter())
        .filter_map(|idx| roster.row(*idx))
        .map(|record| record.serial)
        .collect();
    serials.dedup();

    let joined: String = lines.iter().map(|line| line.to_lowercase()).collect();
    let mut unknown_plate = None;

    let resolution = if joined.contains("to") && joined.contains("vc") {
        match referenced_plate(lines, config) {
            Some(plate) => match registry.get(&plate) {
                Some(movement) => Resolution::Direct(movement.clone()),
                None => {
                    log_debug!("Reply names plate {plate}, which is not open");
                    unknown_plate = Some(plate);
                    Resolution::Unresolved
                }
            },
            None => Resolution::Unresolved,
        }
    } else if !registry.is_empty() {
        let found = addressee_row
            .or(commander_row)
            .and_then(|idx| roster.row(idx))
            .and_then(|record| registry.find_involving(&record.display_name));
        match found {
            Some(movement) => {
                let mut crew = vec![movement.assigned_to.as_str()];
                crew.extend(movement.vehicle_commander.as_deref());
                serials = roster.serials_for(&crew);
                Resolution::Indirect(movement.clone())
            }
            None => Resolution::Unresolved,
        }
    } else {
        Resolution::Unresolved
    };

    let returned_via = closure_keyword(&joined, config).map(str::to_string);

    let update = RosterUpdate {
        serials,
        status: returned_via.as_ref().map(|_| Status::Present),
        note: Some(UpdateNote::new(timestamp, lines)),
    };

    ReplyPlan {
        update,
        resolution,
        returned_via,
        unknown_plate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonnelRecord;
    use chrono::NaiveDate;

    fn roster() -> RosterTable {
        RosterTable::from_records(vec![
            PersonnelRecord::new(1, "CPL", "Wei Ming Tan", "PLATOON 1", "TO", Status::Detail),
            PersonnelRecord::new(2, "SSG", "Lim Boon Keng", "HQ PLATOON", "VC", Status::Detail),
            PersonnelRecord::new(3, "LCP", "Muthu Rajan", "PLATOON 2", "TO", Status::Present),
        ])
        .unwrap()
    }

    fn registry() -> OngoingRegistry {
        OngoingRegistry::from_records([MovementRecord {
            model: "3t".into(),
            plate: "SBA1234A".into(),
            assigned_to: "CPL Wei Ming Tan".into(),
            vehicle_commander: Some("SSG Lim Boon Keng".into()),
            purpose: Some("Ferrying".into()),
        }])
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 2, 3)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    fn participants(to: Option<&str>, vc: Option<&str>) -> Participants {
        Participants {
            addressee: to.map(Into::into),
            vehicle_commander: vc.map(Into::into),
        }
    }

    #[test]
    fn keyword_must_precede_reach() {
        let config = EngineConfig::default();
        assert_eq!(closure_keyword("rtureached", &config), Some("rtu"));
        assert_eq!(closure_keyword("reachedrtu", &config), None);
        assert_eq!(closure_keyword("assessmentdone reach mhc", &config), Some("assessment"));
        assert_eq!(closure_keyword("going to mhreached", &config), Some("to mh"));
        assert_eq!(closure_keyword("nothing here", &config), None);
    }

    #[test]
    fn configured_keywords_ignore_case() {
        let config = EngineConfig {
            closure_keywords: vec!["RTU".into(), String::new()],
            arrival_token: "Reach".into(),
            ..EngineConfig::default()
        };
        assert_eq!(closure_keyword("RTU\nReached", &config), Some("RTU"));
        assert_eq!(closure_keyword("reached", &config), None);
    }

    #[test]
    fn direct_closure_by_plate() {
        let msg = lines(&[
            "RTU",
            "TO: CPL Tan Wei Ming",
            "VC: SSG Lim Boon Keng",
            "MID: SBA1234A",
            "Reached",
        ]);
        let plan = parse_reply(
            &roster(),
            &registry(),
            &msg,
            &participants(Some("CPL Tan Wei Ming"), Some("SSG Lim Boon Keng")),
            at(),
            &EngineConfig::default(),
        );
        assert!(matches!(plan.resolution, Resolution::Direct(_)));
        assert_eq!(plan.returned_via.as_deref(), Some("rtu"));
        assert_eq!(plan.plate_to_close(), Some("SBA1234A"));
        assert_eq!(plan.update.serials, vec![1, 2]);
        assert_eq!(plan.update.status, Some(Status::Present));
    }

    #[test]
    fn indirect_closure_through_sender() {
        let msg = lines(&["RTU", "Reached"]);
        let plan = parse_reply(
            &roster(),
            &registry(),
            &msg,
            &participants(Some("SSG Lim Boon Keng"), None),
            at(),
            &EngineConfig::default(),
        );
        assert!(matches!(plan.resolution, Resolution::Indirect(_)));
        assert_eq!(plan.plate_to_close(), Some("SBA1234A"));
        // The whole crew is stood down, not only the sender.
        assert_eq!(plan.update.serials, vec![1, 2]);
    }

    #[test]
    fn closed_plate_is_reported_not_resolved() {
        let msg = lines(&["RTU", "TO: CPL Tan Wei Ming", "VC: SSG Lim", "MID: SBA1234A", "Reached"]);
        let plan = parse_reply(
            &roster(),
            &OngoingRegistry::new(),
            &msg,
            &participants(Some("CPL Tan Wei Ming"), Some("SSG Lim")),
            at(),
            &EngineConfig::default(),
        );
        assert_eq!(plan.resolution, Resolution::Unresolved);
        assert_eq!(plan.unknown_plate.as_deref(), Some("SBA1234A"));
        assert_eq!(plan.plate_to_close(), None);
        // Status still applies to whoever was matched.
        assert_eq!(plan.update.serials, vec![1]);
        assert_eq!(plan.update.status, Some(Status::Present));
    }

    #[test]
    fn progress_update_only_records_the_note() {
        let msg = lines(&["Moving off now", "ETA 1000"]);
        let plan = parse_reply(
            &roster(),
            &registry(),
            &msg,
            &participants(Some("LCP Muthu Rajan"), None),
            at(),
            &EngineConfig::default(),
        );
        assert_eq!(plan.resolution, Resolution::Unresolved);
        assert_eq!(plan.returned_via, None);
        assert_eq!(plan.update.serials, vec![3]);
        assert_eq!(plan.update.status, None);
        assert!(plan.update.note.is_some());
    }
}
