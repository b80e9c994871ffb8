use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A chat message as handed to the interpretation engine.
///
/// `lines` never contains empty strings; `sender` is the chat client's display string for
/// the author, which is used when the message itself names no addressee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub lines: Vec<String>,
    pub sender: String,
    pub timestamp: NaiveDateTime,
}

impl Message {
    pub fn new<I, S>(lines: I, sender: impl Into<String>, timestamp: NaiveDateTime) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(Into::into)
                .filter(|line: &String| !line.is_empty())
                .collect(),
            sender: sender.into(),
            timestamp,
        }
    }
}
