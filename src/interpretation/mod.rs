//! Turns chat messages into roster and registry changes.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod fields;
pub mod movement;
pub mod reply;

pub use classifier::{classify, locate_content_start, MessageKind, Participants};
pub use config::EngineConfig;
pub use engine::{Interpretation, InterpretationEngine, StateSnapshot};
pub use movement::{parse_movement, MovementPlan};
pub use reply::{parse_reply, ReplyPlan, Resolution};
