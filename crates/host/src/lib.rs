//! Simulated engine host for the clan tag registry.
//!
//! Plays the roles the game engine plays around the registry: it emits
//! lifecycle events, calls the tag API on behalf of other plugins, and owns the
//! player state that resolved tags are written into on each tick.

pub mod engine;
pub mod run;
pub mod script;

pub use engine::PlayerState;
pub use run::{live, replay};
pub use script::{Command, ScriptError, ScriptErrorKind, parse_line, parse_script};
