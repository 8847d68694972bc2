use crate::registry::TagRegistry;
use crate::subject::SubjectId;

/// Connection lifecycle signal from the host's event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectEvent {
	/// Subject finished connecting.
	Joined(SubjectId),
	/// Subject disconnected.
	Left(SubjectId),
}

impl TagRegistry {
	/// Applies one lifecycle signal.
	pub fn handle_event(&self, event: SubjectEvent) {
		match event {
			SubjectEvent::Joined(subject) => self.on_subject_join(subject),
			SubjectEvent::Left(subject) => self.on_subject_leave(subject),
		}
	}
}
