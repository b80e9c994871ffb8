use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Parade-state label for a person.
///
/// The roster is maintained by hand, so labels are free-form ("RS (MC)", "OFF/REST", ...).
/// Known values get their own variant; anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Present,
    Wfh,
    Detail,
    Rs,
    Ao,
    Tbd,
    Other(String),
}

impl Default for Status {
    fn default() -> Self {
        Status::Wfh
    }
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Present => "PRESENT",
            Status::Wfh => "WFH",
            Status::Detail => "DETAIL",
            Status::Rs => "RS",
            Status::Ao => "AO",
            Status::Tbd => "TBD",
            Status::Other(label) => label.as_str(),
        }
    }

    /// Parses a roster cell. Blank cells fall back to WFH.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" | "WFH" => Status::Wfh,
            "PRESENT" => Status::Present,
            "DETAIL" => Status::Detail,
            "RS" => Status::Rs,
            "AO" => Status::Ao,
            "TBD" => Status::Tbd,
            other => Status::Other(other.to_string()),
        }
    }

    /// Substring test against the label, the way the daily report groups people.
    pub fn contains(&self, needle: &str) -> bool {
        self.as_str().contains(needle)
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::from_label(&value)
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped message that touched a roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub timestamp: NaiveDateTime,
    pub text: String,
}

impl UpdateNote {
    pub fn new(timestamp: NaiveDateTime, lines: &[String]) -> Self {
        Self {
            timestamp,
            text: lines.join("\n"),
        }
    }

    pub fn render(&self) -> String {
        format!("{}\n{}", self.timestamp.format("%Y-%m-%d %H:%M"), self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelRecord {
    pub serial: u32,
    pub rank: String,
    pub name: String,
    /// "RANK NAME", fixed at load time and used for every identity comparison.
    pub display_name: String,
    pub platoon: String,
    pub vocation: String,
    pub status: Status,
    pub remarks: Option<String>,
    /// Messages received for this person this session, oldest first.
    pub latest_update: Vec<UpdateNote>,
}

impl PersonnelRecord {
    pub fn new(
        serial: u32,
        rank: impl Into<String>,
        name: impl Into<String>,
        platoon: impl Into<String>,
        vocation: impl Into<String>,
        status: Status,
    ) -> Self {
        let rank = rank.into();
        let name = name.into();
        let display_name = format!("{rank} {name}");
        Self {
            serial,
            rank,
            name,
            display_name,
            platoon: platoon.into(),
            vocation: vocation.into(),
            status,
            remarks: None,
            latest_update: Vec::new(),
        }
    }

    pub fn latest_update_text(&self) -> String {
        self.latest_update
            .iter()
            .map(UpdateNote::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_known_and_free_form_labels() {
        assert_eq!(Status::from_label("PRESENT"), Status::Present);
        assert_eq!(Status::from_label("  "), Status::Wfh);
        let custom = Status::from_label("RS (MC)");
        assert_eq!(custom, Status::Other("RS (MC)".into()));
        assert!(custom.contains("RS"));
        assert_eq!(String::from(custom), "RS (MC)");
    }

    #[test]
    fn display_name_is_rank_then_name() {
        let record = PersonnelRecord::new(1, "CPL", "Wei Ming Tan", "PLATOON 1", "TO", Status::Wfh);
        assert_eq!(record.display_name, "CPL Wei Ming Tan");
    }

    #[test]
    fn status_serializes_as_plain_label() {
        let json = serde_json::to_string(&Status::Detail).unwrap();
        assert_eq!(json, "\"DETAIL\"");
        let back: Status = serde_json::from_str("\"OFF\"").unwrap();
        assert_eq!(back, Status::Other("OFF".into()));
    }
}
