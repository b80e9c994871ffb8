mod ongoing;
mod personnel;

pub(crate) use ongoing::replace_ongoing;
pub(crate) use personnel::replace_roster;
