//! Cat Clicker: the progression economy of an incremental cat game.
//!
//! Food → cats → catnip → racoons → science → upgrades. The presentation
//! layer submits [`actions::Action`]s to [`engine::GameEngine::dispatch`],
//! advances time with [`engine::GameEngine::advance`] and renders
//! [`engine::Snapshot`]s.

pub mod actions;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod save;
pub mod scheduler;
pub mod state;
pub mod time;

pub use actions::Action;
pub use engine::{ActionReport, GameEngine, Outcome, Snapshot, StateListener, TickReport};
pub use error::{ConfigError, PersistError, UnknownAction};
