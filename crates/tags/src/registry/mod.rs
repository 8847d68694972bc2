//! Concurrent per-subject tag storage.
//!
//! Subjects live in a sharded map, so unrelated subjects never wait on each
//! other. Every mutation of one subject runs "mutate, resolve winner, publish"
//! while holding that subject's shard guard: concurrent callers observe either
//! the whole step or none of it, and display updates reach the handoff in the
//! same order as the mutations that produced them.

use clantag_worker::{Handoff, HandoffOutcome, TickPump};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxBuildHasher;

use crate::config::TagsConfig;
use crate::entry::{Priority, TagEntry};
use crate::set::TagSet;
use crate::subject::SubjectId;


/// Tick-side consumer of resolved display tags.
pub type DisplayPump = TickPump<SubjectId, String>;

/// Owner of every subject's [`TagSet`].
#[derive(Debug)]
pub struct TagRegistry {
	subjects: DashMap<SubjectId, TagSet, FxBuildHasher>,
	display: Handoff<SubjectId, String>,
}

impl TagRegistry {
	/// Creates an empty registry publishing resolved tags into `display`.
	pub fn new(display: Handoff<SubjectId, String>) -> Self {
		Self {
			subjects: DashMap::with_hasher(FxBuildHasher),
			display,
		}
	}

	/// Creates a registry and the pump that applies its display updates.
	pub fn from_config(config: &TagsConfig) -> (Self, DisplayPump) {
		let display = Handoff::new(config.display.handoff_policy());
		let pump = TickPump::new(display.clone());
		(Self::new(display), pump)
	}

	/// Starts `subject` with an empty set, discarding any previous one.
	pub fn on_subject_join(&self, subject: SubjectId) {
		match self.subjects.entry(subject) {
			Entry::Occupied(mut occupied) => {
				let dropped = self.display.discard(&subject);
				let previous = occupied.insert(TagSet::new());
				tracing::debug!(%subject, discarded_tags = previous.len(), dropped_updates = dropped, "tags.join.reset");
			}
			Entry::Vacant(vacant) => {
				vacant.insert(TagSet::new());
				tracing::debug!(%subject, "tags.join");
			}
		}
	}

	/// Drops everything held for `subject`. Unknown subjects are ignored.
	pub fn on_subject_leave(&self, subject: SubjectId) {
		if let Entry::Occupied(occupied) = self.subjects.entry(subject) {
			let dropped = self.display.discard(&subject);
			let previous = occupied.remove();
			tracing::debug!(%subject, discarded_tags = previous.len(), dropped_updates = dropped, "tags.leave");
		}
	}

	/// Attaches `(tag, priority)` to `subject` and republishes its winner.
	///
	/// Works without a prior join; the set is created on first use.
	pub fn set_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		let mut set = self.subjects.entry(subject).or_default();
		let inserted = set.insert(tag, priority);
		tracing::trace!(%subject, tag, priority, inserted, "tags.set");
		self.publish(subject, set.display_tag());
	}

	/// Detaches the exact `(tag, priority)` pair and republishes the winner,
	/// or an empty tag once nothing is left. No-op for unknown subjects.
	pub fn remove_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		let Some(mut set) = self.subjects.get_mut(&subject) else {
			return;
		};
		let removed = set.remove(tag, priority);
		tracing::trace!(%subject, tag, priority, removed, "tags.remove");
		self.publish(subject, set.display_tag());
	}

	/// Priority of `tag` on `subject`, if attached. When the tag is attached
	/// under several priorities the smallest one is reported.
	pub fn tag_priority(&self, subject: SubjectId, tag: &str) -> Option<Priority> {
		self.subjects.get(&subject)?.priority_of(tag)
	}

	/// Tag `subject` should currently display, if it has a set.
	pub fn displayed_tag(&self, subject: SubjectId) -> Option<String> {
		self.subjects.get(&subject).map(|set| set.display_tag().to_owned())
	}

	/// Snapshot of `subject`'s entries in display order.
	pub fn entries(&self, subject: SubjectId) -> Vec<TagEntry> {
		self.subjects
			.get(&subject)
			.map(|set| set.iter().cloned().collect())
			.unwrap_or_default()
	}

	/// Number of subjects currently holding a set.
	pub fn subject_count(&self) -> usize {
		self.subjects.len()
	}

	/// Queue this registry publishes into.
	pub fn display(&self) -> &Handoff<SubjectId, String> {
		&self.display
	}

	fn publish(&self, subject: SubjectId, tag: &str) {
		match self.display.push(subject, tag.to_owned()) {
			Ok(HandoffOutcome::Enqueued) => {}
			Ok(HandoffOutcome::Coalesced) => tracing::trace!(%subject, "tags.display.coalesced"),
			Err(err) => tracing::debug!(%subject, tag, %err, "tags.display.dropped"),
		}
	}
}
