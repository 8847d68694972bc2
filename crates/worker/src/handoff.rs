use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// Queueing policy for updates waiting on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandoffPolicy {
	/// Keep every update and apply them in push order.
	#[default]
	Fifo,
	/// Keep at most one pending update per key; newer values replace the queued one in place.
	LatestPerKey,
}

/// Outcome from pushing one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
	/// Update was appended to the queue.
	Enqueued,
	/// A pending update for the same key was replaced.
	Coalesced,
}

/// Handoff push error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandoffError {
	/// The consumer side has shut down.
	#[error("handoff queue is closed")]
	Closed,
}

struct HandoffState<K, V> {
	queue: VecDeque<(K, V)>,
	closed: bool,
}

struct HandoffInner<K, V> {
	policy: HandoffPolicy,
	state: Mutex<HandoffState<K, V>>,
}

/// Multi-producer queue carrying keyed updates to a single tick consumer.
///
/// Producers push from any thread without blocking beyond a short critical
/// section. The consumer takes the whole batch at once with [`Handoff::drain`],
/// so it never holds the lock while applying updates.
pub struct Handoff<K, V> {
	inner: Arc<HandoffInner<K, V>>,
}

impl<K, V> Clone for Handoff<K, V> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<K, V> std::fmt::Debug for Handoff<K, V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Handoff")
			.field("policy", &self.inner.policy)
			.field("pending", &state.queue.len())
			.field("closed", &state.closed)
			.finish()
	}
}

impl<K, V> Handoff<K, V>
where
	K: PartialEq,
{
	/// Creates an open, empty handoff queue.
	pub fn new(policy: HandoffPolicy) -> Self {
		Self {
			inner: Arc::new(HandoffInner {
				policy,
				state: Mutex::new(HandoffState {
					queue: VecDeque::new(),
					closed: false,
				}),
			}),
		}
	}

	/// Queues one update for the next tick.
	pub fn push(&self, key: K, value: V) -> Result<HandoffOutcome, HandoffError> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(HandoffError::Closed);
		}

		if self.inner.policy == HandoffPolicy::LatestPerKey
			&& let Some(existing) = state.queue.iter_mut().find(|(k, _)| *k == key)
		{
			existing.1 = value;
			return Ok(HandoffOutcome::Coalesced);
		}

		state.queue.push_back((key, value));
		Ok(HandoffOutcome::Enqueued)
	}

	/// Drops every pending update for `key`. Returns how many were dropped.
	pub fn discard(&self, key: &K) -> usize {
		let mut state = self.inner.state.lock();
		let before = state.queue.len();
		state.queue.retain(|(k, _)| k != key);
		before - state.queue.len()
	}

	/// Takes every pending update in queue order.
	pub fn drain(&self) -> VecDeque<(K, V)> {
		std::mem::take(&mut self.inner.state.lock().queue)
	}

	/// Rejects further pushes. Already queued updates stay drainable.
	pub fn close(&self) {
		self.inner.state.lock().closed = true;
	}

	/// Returns true once [`Self::close`] has been called.
	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}

	/// Returns the number of pending updates.
	pub fn len(&self) -> usize {
		self.inner.state.lock().queue.len()
	}

	/// Returns true when nothing is pending.
	pub fn is_empty(&self) -> bool {
		self.inner.state.lock().queue.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fifo_keeps_every_update_in_order() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);

		assert_eq!(handoff.push(1u32, "a"), Ok(HandoffOutcome::Enqueued));
		assert_eq!(handoff.push(2, "b"), Ok(HandoffOutcome::Enqueued));
		assert_eq!(handoff.push(1, "c"), Ok(HandoffOutcome::Enqueued));

		let drained: Vec<_> = handoff.drain().into_iter().collect();
		assert_eq!(drained, vec![(1, "a"), (2, "b"), (1, "c")]);
		assert!(handoff.is_empty());
	}

	#[test]
	fn latest_per_key_replaces_in_place() {
		let handoff = Handoff::new(HandoffPolicy::LatestPerKey);

		let _ = handoff.push(1u32, "a");
		let _ = handoff.push(2, "b");
		// Key 1 keeps its slot ahead of key 2.
		assert_eq!(handoff.push(1, "c"), Ok(HandoffOutcome::Coalesced));
		assert_eq!(handoff.len(), 2);

		let drained: Vec<_> = handoff.drain().into_iter().collect();
		assert_eq!(drained, vec![(1, "c"), (2, "b")]);
	}

	#[test]
	fn discard_drops_only_matching_key() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let _ = handoff.push(1u32, "a");
		let _ = handoff.push(2, "b");
		let _ = handoff.push(1, "c");

		assert_eq!(handoff.discard(&1), 2);
		assert_eq!(handoff.discard(&7), 0);
		let drained: Vec<_> = handoff.drain().into_iter().collect();
		assert_eq!(drained, vec![(2, "b")]);
	}

	#[test]
	fn closed_rejects_push_but_drains_backlog() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let _ = handoff.push(1u32, "a");
		handoff.close();

		assert!(handoff.is_closed());
		assert_eq!(handoff.push(2, "b"), Err(HandoffError::Closed));
		let drained: Vec<_> = handoff.drain().into_iter().collect();
		assert_eq!(drained, vec![(1, "a")]);
	}

	#[test]
	fn clones_share_one_queue() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let producer = handoff.clone();
		let _ = producer.push(3u32, 30);

		assert_eq!(handoff.len(), 1);
		assert_eq!(handoff.drain().pop_front(), Some((3, 30)));
	}

	/// Deterministic pseudo-random number generator for reproducible stress tests.
	struct Xorshift64(u64);

	impl Xorshift64 {
		fn next(&mut self) -> u64 {
			let mut x = self.0;
			x ^= x << 13;
			x ^= x >> 7;
			x ^= x << 17;
			self.0 = x;
			x
		}
	}

	#[test]
	fn stress_latest_per_key_matches_model() {
		const OPS: usize = 10_000;
		let handoff = Handoff::new(HandoffPolicy::LatestPerKey);
		let mut model: Vec<(u64, usize)> = Vec::new();
		let mut rng = Xorshift64(0xFEED_FACE);

		for i in 0..OPS {
			match rng.next() % 10 {
				0..=6 => {
					let key = rng.next() % 6;
					let expected = match model.iter_mut().find(|(k, _)| *k == key) {
						Some(slot) => {
							slot.1 = i;
							HandoffOutcome::Coalesced
						}
						None => {
							model.push((key, i));
							HandoffOutcome::Enqueued
						}
					};
					assert_eq!(handoff.push(key, i), Ok(expected), "op {i}");
				}
				7 => {
					let key = rng.next() % 6;
					let before = model.len();
					model.retain(|(k, _)| *k != key);
					assert_eq!(handoff.discard(&key), before - model.len(), "op {i}");
				}
				_ => {
					let drained: Vec<_> = handoff.drain().into_iter().collect();
					assert_eq!(drained, std::mem::take(&mut model), "op {i}");
				}
			}
		}
	}

	#[test]
	fn concurrent_producers_never_lose_updates() {
		const PRODUCERS: usize = 8;
		const PER_PRODUCER: usize = 500;
		let handoff = Handoff::new(HandoffPolicy::Fifo);

		std::thread::scope(|scope| {
			for producer in 0..PRODUCERS {
				let handoff = handoff.clone();
				scope.spawn(move || {
					for seq in 0..PER_PRODUCER {
						let _ = handoff.push(producer, seq);
					}
				});
			}
		});

		let drained = handoff.drain();
		assert_eq!(drained.len(), PRODUCERS * PER_PRODUCER);
		for producer in 0..PRODUCERS {
			let seqs: Vec<_> = drained.iter().filter(|(k, _)| *k == producer).map(|(_, v)| *v).collect();
			assert_eq!(seqs, (0..PER_PRODUCER).collect::<Vec<_>>(), "producer {producer} order");
		}
	}
}
