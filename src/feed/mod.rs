//! Caller-side helpers for turning scraped chat bubbles into engine messages.
//!
//! The chat client exposes each bubble's text plus a metadata string such as
//! `[14:05, 3/2/2021] Tan Wei Ming CPL: `. Only bubbles that look like movement traffic are
//! forwarded to the engine.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Message;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// A chat bubble as scraped, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub pre_plain_text: String,
    pub text: String,
}

impl RawMessage {
    /// Returns `None` for bubbles the engine has no use for.
    pub fn into_message(self, now: NaiveDateTime) -> Result<Option<Message>> {
        if !is_relevant(&self.text) {
            log_debug!("skipping irrelevant message: {:?}", self.text.lines().next());
            return Ok(None);
        }
        let (timestamp, sender) = parse_pre_plain_text(&self.pre_plain_text, now)?;
        Ok(Some(Message {
            lines: split_lines(&self.text),
            sender,
            timestamp,
        }))
    }
}

/// Movement declarations carry "MID" and a "TO:" line; returns mention both "rtu" and
/// "reach". Everything else (forecasts, chatter) is dropped.
pub fn is_relevant(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let declaration =
        text.contains("MID") && (lowered.contains("to:") || lowered.contains("to :"));
    let arrival = lowered.contains("rtu") && lowered.contains("reach");
    declaration || arrival
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `[HH:MM, D/M/YYYY] Sender: ` into a timestamp and the sender label.
///
/// The client sometimes renders dates month-first. A day-first reading that lands two or
/// more whole days after `now` is reread as month-first.
pub fn parse_pre_plain_text(meta: &str, now: NaiveDateTime) -> Result<(NaiveDateTime, String)> {
    let open = meta
        .find('[')
        .ok_or_else(|| anyhow!("metadata '{meta}' has no '['"))?;
    let close = meta
        .find(']')
        .filter(|close| *close > open)
        .ok_or_else(|| anyhow!("metadata '{meta}' has no closing ']'"))?;

    let stamp = &meta[open + 1..close];
    let sender = meta[close + 1..]
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string();

    let (clock, date) = stamp
        .split_once(',')
        .ok_or_else(|| anyhow!("timestamp '{stamp}' has no date part"))?;
    let (hour, minute) = clock
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("clock '{clock}' is not HH:MM"))?;
    let hour: u32 = hour.trim().parse().context("invalid hour")?;
    let minute: u32 = minute.trim().parse().context("invalid minute")?;

    let parts: Vec<u32> = date
        .trim()
        .split('/')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid date '{date}'"))?;
    let [first, second, year] = parts[..] else {
        bail!("date '{date}' is not D/M/YYYY");
    };
    let year = i32::try_from(year).context("year out of range")?;

    let at = |day: u32, month: u32| {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour % 24, minute, 0))
    };

    let timestamp = match at(first, second) {
        Some(day_first) if (day_first - now).num_days() <= 1 => day_first,
        day_first => at(second, first)
            .or(day_first)
            .ok_or_else(|| anyhow!("'{stamp}' is not a valid date"))?,
    };

    Ok((timestamp, sender))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn relevance_filter() {
        assert!(is_relevant("3T MOV\nTO: CPL Tan\nMID: 123"));
        assert!(is_relevant("5TON MOV\nTo : CPL Tan\nMID 123"));
        assert!(!is_relevant("3T MOV\nTO: CPL Tan\nmid: 123"));
        assert!(is_relevant("RTU\nReached MHC"));
        assert!(!is_relevant("Detail forecast for tomorrow"));
    }

    #[test]
    fn empty_lines_are_dropped() {
        assert_eq!(split_lines("RTU\n\nReached\n"), vec!["RTU", "Reached"]);
    }

    #[test]
    fn metadata_is_day_first() {
        let (at, sender) =
            parse_pre_plain_text("[14:05, 3/2/2021] Tan Wei Ming CPL: ", now()).unwrap();
        assert_eq!(
            at,
            NaiveDate::from_ymd_opt(2021, 2, 3)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap()
        );
        assert_eq!(sender, "Tan Wei Ming CPL");
    }

    #[test]
    fn future_dates_are_reread_month_first() {
        // 12 Mar is less than two whole days ahead and kept; 3 Sep becomes 9 Mar.
        let (at, _) = parse_pre_plain_text("[09:00, 12/3/2021] Lim SSG:", now()).unwrap();
        assert_eq!(at.date(), NaiveDate::from_ymd_opt(2021, 3, 12).unwrap());
        let (at, _) = parse_pre_plain_text("[09:00, 3/9/2021] Lim SSG:", now()).unwrap();
        assert_eq!(at.date(), NaiveDate::from_ymd_opt(2021, 3, 9).unwrap());
    }

    #[test]
    fn hour_wraps_at_24() {
        let (at, _) = parse_pre_plain_text("[24:10, 9/3/2021] Lim SSG:", now()).unwrap();
        assert_eq!(at.time(), chrono::NaiveTime::from_hms_opt(0, 10, 0).unwrap());
    }

    #[test]
    fn malformed_metadata_is_an_error() {
        assert!(parse_pre_plain_text("no brackets", now()).is_err());
        assert!(parse_pre_plain_text("[14:05] Tan:", now()).is_err());
        assert!(parse_pre_plain_text("[14:05, 3/2] Tan:", now()).is_err());
    }

    #[test]
    fn irrelevant_bubbles_become_none() {
        let raw = RawMessage {
            pre_plain_text: "[14:05, 3/2/2021] Tan:".into(),
            text: "Lunch at 1230".into(),
        };
        assert_eq!(raw.into_message(now()).unwrap(), None);
    }
}
