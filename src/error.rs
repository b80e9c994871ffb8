use thiserror::Error;

/// Failures while building or updating the roster table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster has no header row containing \"S/N\"")]
    MissingHeader,
    #[error("roster is missing required column {0}")]
    MissingColumn(&'static str),
    #[error("roster row {row}: serial number '{value}' is not numeric")]
    InvalidSerial { row: usize, value: String },
    #[error("duplicate serial number {0} in roster")]
    DuplicateSerial(u32),
    #[error("no roster row with serial number {0}")]
    UnknownSerial(u32),
}

/// Precondition violations reported by the interpretation engine.
///
/// Everything else that can go wrong with a message is logged and absorbed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterpretError {
    #[error("message has {0} line(s); at least two are required")]
    TooFewLines(usize),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// A single field that could not be extracted from a message line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("line '{0}' has no label/value separator")]
    Unlabelled(String),
    #[error("message body is empty; no model line")]
    MissingModel,
    #[error("no MID line carrying a plate")]
    MissingPlate,
}
