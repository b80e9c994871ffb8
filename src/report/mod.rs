//! Parade-state summaries for the daily report.
//!
//! [`ParadeReport::build`] is the query: counts and member lists grouped by status and by
//! platoon. [`render`] formats it as the temperature-monitoring message posted to the chat.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PersonnelRecord;

const PRESENT: &str = "PRESENT";
const REST: &str = "REST";
const REPORT_SICK: &str = "RS";
const ABSENT_OFFICIALLY: &str = "AO";
const AMBULANCE_REMARK: &str = "AMB DUTY";
const RULE_WIDTH: usize = 22;

/// Members sharing one label, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub label: String,
    pub members: Vec<String>,
    /// Remarks for each member, aligned with `members`.
    #[serde(default)]
    remarks: Vec<Option<String>>,
}

impl Group {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            members: Vec::new(),
            remarks: Vec::new(),
        }
    }

    fn push(&mut self, record: &PersonnelRecord) {
        self.members.push(record.display_name.clone());
        self.remarks.push(record.remarks.clone());
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Splits members by whether their remarks contain `needle`.
    fn partition_by_remark(&self, needle: &str) -> (Vec<&str>, Vec<&str>) {
        let mut with = Vec::new();
        let mut without = Vec::new();
        for (member, remark) in self.members.iter().zip(&self.remarks) {
            if remark.as_deref().is_some_and(|r| r.contains(needle)) {
                with.push(member.as_str());
            } else {
                without.push(member.as_str());
            }
        }
        (with, without)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParadeReport {
    pub total_strength: usize,
    /// Present or resting in camp.
    pub present_strength: usize,
    /// Strictly PRESENT; these people take temperature.
    pub temperature_strength: usize,
    pub present_by_platoon: BTreeMap<String, usize>,
    pub by_status: Vec<Group>,
    pub by_platoon: Vec<Group>,
    pub report_sick: Group,
}

impl ParadeReport {
    pub fn build(roster: &[PersonnelRecord]) -> Self {
        let mut by_status: BTreeMap<String, Group> = BTreeMap::new();
        let mut by_platoon: BTreeMap<String, Group> = BTreeMap::new();
        let mut present_by_platoon: BTreeMap<String, usize> = BTreeMap::new();
        let mut report_sick = Group::new(REPORT_SICK);

        for record in roster {
            let status = record.status.as_str();
            by_status
                .entry(status.to_string())
                .or_insert_with(|| Group::new(status))
                .push(record);
            by_platoon
                .entry(record.platoon.clone())
                .or_insert_with(|| Group::new(&record.platoon))
                .push(record);

            let present = present_by_platoon.entry(record.platoon.clone()).or_insert(0);
            if record.status.contains(PRESENT) {
                *present += 1;
            }
            if record.status.contains(REPORT_SICK) {
                report_sick.push(record);
            }
        }

        let present_strength = roster
            .iter()
            .filter(|r| r.status.contains(PRESENT) || r.status.contains(REST))
            .count();
        let temperature_strength = roster.iter().filter(|r| r.status.contains(PRESENT)).count();

        Self {
            total_strength: roster.len(),
            present_strength,
            temperature_strength,
            present_by_platoon,
            by_status: by_status.into_values().collect(),
            by_platoon: by_platoon.into_values().collect(),
            report_sick,
        }
    }

    pub fn status_count(&self, label: &str) -> usize {
        self.by_status
            .iter()
            .find(|group| group.label == label)
            .map(Group::count)
            .unwrap_or(0)
    }
}

/// Which daily parade the report is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSlot {
    Morning,
    Afternoon,
}

impl ReportSlot {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            ReportSlot::Morning
        } else {
            ReportSlot::Afternoon
        }
    }

    fn time_label(self) -> &'static str {
        match self {
            ReportSlot::Morning => "0800hrs",
            ReportSlot::Afternoon => "1500hrs",
        }
    }
}

fn numbered(members: &[&str]) -> String {
    members
        .iter()
        .enumerate()
        .map(|(i, member)| format!("{}. {}", i + 1, member))
        .collect::<Vec<_>>()
        .join("\n")
}

fn platoon_breakdown(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(platoon, count)| format!("{count} from {platoon}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats the temperature-monitoring message.
///
/// PRESENT and RS groups are left out of the "reason for not taking" list; RS gets its own
/// section at the end and AO is split into ambulance duty and the rest.
pub fn render(report: &ParadeReport, unit_name: &str, date: NaiveDate, slot: ReportSlot) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let breakdown = platoon_breakdown(&report.present_by_platoon);

    let mut out = format!(
        "*Temperature Monitoring*\n\n\
         Grouping : {unit_name}\n\
         Date: {}\n\
         Time: {}\n\n\
         {rule}\n\n\
         Total Strength: {}\n\
         Present Strength: {}\n\
         ({breakdown})\n\
         Temperature Taking Strength: {}\n\
         ({breakdown})\n\n\n\
         Reason for not taking (Rank/Name & Reason):",
        date.format("%d%m%y"),
        slot.time_label(),
        report.total_strength,
        report.present_strength,
        report.temperature_strength,
    );

    for group in &report.by_status {
        if group.label.contains(PRESENT) || group.label.contains(REPORT_SICK) {
            continue;
        }

        out.push_str("\n\n");
        if group.label.contains(ABSENT_OFFICIALLY) {
            let (ambulance, others) = group.partition_by_remark(AMBULANCE_REMARK);
            out.push_str(&format!(
                "AMBULANCE DUTY ({} pax)\n{}",
                ambulance.len(),
                numbered(&ambulance)
            ));
            if !others.is_empty() {
                out.push_str(&format!(
                    "\n\n{} ({} pax)\n{}",
                    group.label,
                    others.len(),
                    numbered(&others)
                ));
            }
        } else {
            let members: Vec<&str> = group.members.iter().map(String::as_str).collect();
            out.push_str(&format!(
                "{} ({} pax)\n{}",
                group.label,
                group.count(),
                numbered(&members)
            ));
        }
    }

    let sick: Vec<&str> = report.report_sick.members.iter().map(String::as_str).collect();
    out.push_str(&format!(
        "\n\n{rule}\n\nAny report sick ({} pax): (Rank/Name & Reason)\n{}",
        sick.len(),
        numbered(&sick)
    ));

    out
}
