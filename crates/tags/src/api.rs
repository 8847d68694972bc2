use std::sync::Arc;

use crate::entry::Priority;
use crate::registry::TagRegistry;
use crate::subject::SubjectId;

/// Clan tag capability handed to other callers.
///
/// Lower priority values take precedence: a tag set with priority 1 is shown
/// over one set with priority 2. Any caller may set or remove any pair.
pub trait TagsApi: Send + Sync {
	/// Attaches `tag` at `priority`. Setting the same pair twice is a no-op
	/// apart from refreshing the display. An empty tag displays as blank.
	fn set_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority);

	/// Detaches the pair previously set with exactly this tag (case, spaces and
	/// symbols included) and priority. Nothing is removed on a mismatch.
	fn remove_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority);

	/// Priority `tag` is attached with, or `None` if it is not attached.
	fn get_clan_tag_priority(&self, subject: SubjectId, tag: &str) -> Option<Priority>;
}

impl TagsApi for TagRegistry {
	fn set_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		self.set_tag(subject, tag, priority);
	}

	fn remove_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		self.remove_tag(subject, tag, priority);
	}

	fn get_clan_tag_priority(&self, subject: SubjectId, tag: &str) -> Option<Priority> {
		self.tag_priority(subject, tag)
	}
}

impl<T> TagsApi for Arc<T>
where
	T: TagsApi + ?Sized,
{
	fn set_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		(**self).set_clan_tag(subject, tag, priority);
	}

	fn remove_clan_tag(&self, subject: SubjectId, tag: &str, priority: Priority) {
		(**self).remove_clan_tag(subject, tag, priority);
	}

	fn get_clan_tag_priority(&self, subject: SubjectId, tag: &str) -> Option<Priority> {
		(**self).get_clan_tag_priority(subject, tag)
	}
}
