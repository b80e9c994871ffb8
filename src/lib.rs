//! Interprets vehicle-movement chat traffic into a parade-state roster and a registry of
//! ongoing details.
//!
//! The core ([`interpretation::InterpretationEngine`]) is synchronous and owns its state.
//! Persistence ([`db::Database`]), settings and the CLI sit around it.

mod cli;
pub mod db;
pub mod error;
pub mod feed;
pub mod interpretation;
pub mod models;
pub mod registry;
pub mod report;
pub mod roster;
pub mod settings;
mod utils;

use clap::Parser;

pub use cli::{Cli, Commands};
pub use error::{FieldError, InterpretError, RosterError};
pub use interpretation::{EngineConfig, Interpretation, InterpretationEngine, StateSnapshot};
pub use models::{Message, MovementRecord, PersonnelRecord, Status, UpdateNote};
pub use registry::OngoingRegistry;
pub use roster::{matcher::NameMatch, RosterTable, RosterUpdate};

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli::execute(cli))
}
