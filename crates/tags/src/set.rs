use std::collections::BTreeSet;

use crate::entry::{Priority, TagEntry};

/// Ordered, duplicate-free tags attached to one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
	entries: BTreeSet<TagEntry>,
}

impl TagSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `(tag, priority)`. Returns false if the pair was already present.
	pub fn insert(&mut self, tag: impl Into<String>, priority: Priority) -> bool {
		self.entries.insert(TagEntry::new(tag, priority))
	}

	/// Removes the exact `(tag, priority)` pair. Returns false on a miss.
	pub fn remove(&mut self, tag: &str, priority: Priority) -> bool {
		self.entries.remove(&TagEntry::new(tag, priority))
	}

	/// The entry currently on display.
	pub fn winner(&self) -> Option<&TagEntry> {
		self.entries.first()
	}

	/// Tag text to display; empty when the set is empty.
	pub fn display_tag(&self) -> &str {
		self.winner().map_or("", TagEntry::tag)
	}

	/// Priority of the first entry carrying `tag`, i.e. its smallest priority.
	pub fn priority_of(&self, tag: &str) -> Option<Priority> {
		self.entries.iter().find(|entry| entry.tag() == tag).map(TagEntry::priority)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in display order.
	pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
		self.entries.iter()
	}
}
