use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Display precedence of a tag. Smaller values win.
pub type Priority = i32;

/// One `(tag, priority)` attachment on a subject.
///
/// Entries order by ascending priority, then ascending tag text, so the first
/// entry of a sorted collection is the one to display. Two entries are equal
/// only when both the tag and the priority match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagEntry {
	tag: String,
	priority: Priority,
}

impl TagEntry {
	pub fn new(tag: impl Into<String>, priority: Priority) -> Self {
		Self { tag: tag.into(), priority }
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub const fn priority(&self) -> Priority {
		self.priority
	}

	/// Returns true when this entry is exactly `(tag, priority)`.
	pub fn matches(&self, tag: &str, priority: Priority) -> bool {
		self.priority == priority && self.tag == tag
	}
}

impl Ord for TagEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		self.priority.cmp(&other.priority).then_with(|| self.tag.cmp(&other.tag))
	}
}

impl PartialOrd for TagEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
