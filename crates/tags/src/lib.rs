//! Per-subject prioritized clan tags.
//!
//! Independent callers attach `(tag, priority)` entries to a subject; the
//! subject always displays the entry with the smallest priority, ties broken
//! by tag text. [`TagRegistry`] owns every subject's entries and hands each
//! newly resolved tag to the tick boundary through a [`Handoff`]; the engine
//! side applies them from a [`TickPump`].

mod api;
mod config;
mod entry;
mod error;
mod lifecycle;
mod registry;
mod set;
mod subject;

pub use api::TagsApi;
pub use clantag_worker::{Handoff, HandoffPolicy, TickPump, TickReport, TickSink};
pub use config::{DEFAULT_CAPABILITY, DisplayConfig, DisplayPolicy, TagsConfig};
pub use entry::{Priority, TagEntry};
pub use error::{ConfigError, Result};
pub use lifecycle::SubjectEvent;
pub use registry::{DisplayPump, TagRegistry};
pub use set::TagSet;
pub use subject::SubjectId;
