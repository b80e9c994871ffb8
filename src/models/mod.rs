pub mod message;
pub mod movement;
pub mod personnel;

pub use message::Message;
pub use movement::MovementRecord;
pub use personnel::{PersonnelRecord, Status, UpdateNote};
