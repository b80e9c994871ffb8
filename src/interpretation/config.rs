use serde::{Deserialize, Serialize};

/// Tunable thresholds and keyword lists for message interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Name-match scores at or below this are treated as no match.
    pub match_score_floor: usize,

    /// Closure keywords, tried in order; the first one followed by `arrival_token` wins.
    pub closure_keywords: Vec<String>,

    /// Token that must appear after a closure keyword for the reply to count as a return.
    pub arrival_token: String,

    /// Substring of a field label that marks the plate.
    pub plate_label: String,

    /// Substring of a field label that marks the purpose.
    pub purpose_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_score_floor: 3,
            closure_keywords: vec!["rtu".into(), "assessment".into(), "to mh".into()],
            arrival_token: "reach".into(),
            plate_label: "mid".into(),
            purpose_label: "purpose".into(),
        }
    }
}
