//! Tick-boundary handoff primitives.
//!
//! [`Handoff`] carries keyed updates from any number of producer threads to
//! one consumer; [`TickPump`] drains it on a fixed cadence into a
//! [`TickSink`]. Nothing pushed into a handoff is applied outside a tick.

mod handoff;
mod spawn;
mod tick;

pub use handoff::{Handoff, HandoffError, HandoffOutcome, HandoffPolicy};
pub use spawn::spawn;
pub use tick::{TickPump, TickReport, TickSink};
