use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};

use crate::models::UpdateNote;

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

pub fn encode_notes(notes: &[UpdateNote]) -> Result<String> {
    serde_json::to_string(notes).context("failed to encode latest_update")
}

pub fn decode_notes(raw: &str, field: &str) -> Result<Vec<UpdateNote>> {
    serde_json::from_str(raw).with_context(|| format!("failed to parse {field}"))
}
