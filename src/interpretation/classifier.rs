//! Message shape detection.
//!
//! Two shapes show up in the group chat. Movement declarations open with a vehicle line
//! ("3T MOV", "1x 5TON MOV ..."). Status replies either repeat the sender's name as a
//! quoted header or end with a "reached" confirmation. Forwarded or quoted messages may carry
//! one or two header lines (a name, a date) before the content.

/// What a message is declaring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Movement,
    Reply,
}

/// Who a message is about, before roster resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Participants {
    pub addressee: Option<String>,
    pub vehicle_commander: Option<String>,
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Index of the first substantive line, skipping a quoted name or date header.
pub fn locate_content_start(lines: &[String]) -> usize {
    let Some(first) = lines.first() else {
        return 0;
    };
    if starts_with_digit(first) {
        return 0;
    }

    let repeated_header = lines.get(1).is_some_and(|second| second == first);
    let dated_third = lines
        .get(2)
        .is_some_and(|third| starts_with_digit(third) && !third.contains(':'));

    if repeated_header || dated_third {
        2
    } else {
        1
    }
}

pub fn classify(lines: &[String]) -> MessageKind {
    let repeated_header = matches!(lines, [first, second, ..] if first == second);
    let arrival_confirmed = lines.len() >= 2
        && lines[lines.len() - 2].to_lowercase().contains("reach");

    if repeated_header || arrival_confirmed {
        MessageKind::Reply
    } else {
        MessageKind::Movement
    }
}

/// Finds the "TO:" and "VC:" lines. Falls back to the sender when no "TO:" line exists.
pub fn resolve_participants(lines: &[String], sender: &str) -> Participants {
    let mut participants = Participants::default();

    for line in lines {
        let lowered = line.to_lowercase();
        if lowered.starts_with("to") {
            participants.addressee = Some(value_after_colon(line));
        } else if lowered.starts_with("vc") {
            participants.vehicle_commander = Some(value_after_colon(line));
        }
    }

    if participants.addressee.is_none() {
        participants.addressee = Some(name_from_sender(sender)).filter(|name| !name.is_empty());
    }

    participants
}

fn value_after_colon(line: &str) -> String {
    line.rsplit(':').next().unwrap_or(line).trim().to_string()
}

/// Turns a contact label such as "Tan Wei Ming CPL, (Driver)" into "CPL Tan Wei Ming".
///
/// Contacts are saved with the rank last, so the final token moves to the front.
pub fn name_from_sender(sender: &str) -> String {
    let head = sender.split(',').next().unwrap_or("").replace('(', "");
    let mut tokens: Vec<&str> = head.split_whitespace().collect();
    if let Some(rank) = tokens.pop() {
        tokens.insert(0, rank);
    }
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn content_starts_at_zero_for_vehicle_lines() {
        assert_eq!(locate_content_start(&lines(&["3T MOV", "TO: CPL Tan"])), 0);
    }

    #[test]
    fn repeated_header_is_skipped() {
        let msg = lines(&["CPL Tan", "CPL Tan", "RTU", "Reached"]);
        assert_eq!(locate_content_start(&msg), 2);
        assert_eq!(classify(&msg), MessageKind::Reply);
    }

    #[test]
    fn date_header_on_third_line_is_skipped() {
        let msg = lines(&["Forwarded", "CPL Tan", "12/03 0900", "5TON MOV"]);
        assert_eq!(locate_content_start(&msg), 2);
        let timed = lines(&["Forwarded", "5TON MOV", "0900: depart"]);
        assert_eq!(locate_content_start(&timed), 1);
    }

    #[test]
    fn reach_on_second_last_line_marks_a_reply() {
        let msg = lines(&["Header", "RTU", "Reached MHC", "0930"]);
        assert_eq!(classify(&msg), MessageKind::Reply);
        let movement = lines(&["3T MOV", "TO: CPL Tan", "MID: SBA1234A"]);
        assert_eq!(classify(&movement), MessageKind::Movement);
    }

    #[test]
    fn participants_come_from_labelled_lines() {
        let msg = lines(&["3T MOV", "TO: CPL Tan", "VC : SSG Lim", "MID: 1"]);
        let found = resolve_participants(&msg, "ignored");
        assert_eq!(found.addressee.as_deref(), Some("CPL Tan"));
        assert_eq!(found.vehicle_commander.as_deref(), Some("SSG Lim"));
    }

    #[test]
    fn sender_is_used_without_a_to_line() {
        let msg = lines(&["RTU", "Reached"]);
        let found = resolve_participants(&msg, "Tan Wei Ming CPL, (Driver)");
        assert_eq!(found.addressee.as_deref(), Some("CPL Tan Wei Ming"));
        assert_eq!(found.vehicle_commander, None);
    }

    #[test]
    fn sender_reordering() {
        assert_eq!(name_from_sender("Tan CPL"), "CPL Tan");
        assert_eq!(name_from_sender("Lim Boon Keng SSG, (Ops)"), "SSG Lim Boon Keng");
        assert_eq!(name_from_sender(""), "");
    }
}
