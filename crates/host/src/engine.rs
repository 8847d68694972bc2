use std::collections::BTreeMap;
use std::io::Write;

use clantag_tags::{SubjectId, TickSink};

/// Simulated engine player state.
///
/// Each applied update writes the subject's clan field and emits
/// `display <id> "<tag>"`; a tick that wrote anything ends with
/// `refresh <count>`, standing in for the engine-wide refresh broadcast.
#[derive(Debug)]
pub struct PlayerState<W> {
	clan: BTreeMap<SubjectId, String>,
	out: W,
}

impl<W: Write> PlayerState<W> {
	pub fn new(out: W) -> Self {
		Self {
			clan: BTreeMap::new(),
			out,
		}
	}

	/// Clan field currently written for `subject`.
	pub fn clan(&self, subject: SubjectId) -> Option<&str> {
		self.clan.get(&subject).map(String::as_str)
	}

	pub fn writer(&mut self) -> &mut W {
		&mut self.out
	}

	pub fn into_writer(self) -> W {
		self.out
	}

	/// Writes the line with a single `write_all` so a shared writer never
	/// splits it.
	fn emit(&mut self, line: std::fmt::Arguments<'_>) {
		let line = format!("{line}\n");
		if let Err(err) = self.out.write_all(line.as_bytes()) {
			tracing::warn!(%err, "engine.output_failed");
		}
	}
}

impl<W: Write> TickSink<SubjectId, String> for PlayerState<W> {
	fn apply(&mut self, subject: SubjectId, tag: String) {
		self.emit(format_args!("display {subject} {tag:?}"));
		tracing::trace!(%subject, tag = %tag, "engine.state_changed");
		self.clan.insert(subject, tag);
	}

	fn end_tick(&mut self, applied: usize) {
		if applied > 0 {
			self.emit(format_args!("refresh {applied}"));
		}
	}
}
