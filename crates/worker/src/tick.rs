//! Single-consumer tick boundary.
//!
//! Producers hand updates to a [`Handoff`] from arbitrary threads; a
//! [`TickPump`] is the only place those updates are applied, once per tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::handoff::Handoff;

/// Consumer of updates applied on the tick boundary.
pub trait TickSink<K, V> {
	/// Applies one update.
	fn apply(&mut self, key: K, value: V);

	/// Runs once after each tick's batch, including empty ones.
	fn end_tick(&mut self, _applied: usize) {}
}

impl<K, V, S> TickSink<K, V> for &mut S
where
	S: TickSink<K, V> + ?Sized,
{
	fn apply(&mut self, key: K, value: V) {
		(**self).apply(key, value);
	}

	fn end_tick(&mut self, applied: usize) {
		(**self).end_tick(applied);
	}
}

/// Summary of one drained tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
	/// Monotonic tick number, starting at 1.
	pub tick: u64,
	/// Updates applied during this tick.
	pub applied: usize,
}

/// Drains a [`Handoff`] into a [`TickSink`] once per tick.
#[derive(Debug)]
pub struct TickPump<K, V> {
	handoff: Handoff<K, V>,
	tick: u64,
}

impl<K, V> TickPump<K, V>
where
	K: PartialEq + Send + 'static,
	V: Send + 'static,
{
	/// Creates a pump consuming `handoff`.
	pub fn new(handoff: Handoff<K, V>) -> Self {
		Self { handoff, tick: 0 }
	}

	/// Runs one tick: applies every pending update in queue order.
	pub fn tick<S>(&mut self, sink: &mut S) -> TickReport
	where
		S: TickSink<K, V> + ?Sized,
	{
		self.tick = self.tick.wrapping_add(1);
		let batch = self.handoff.drain();
		let applied = batch.len();
		for (key, value) in batch {
			sink.apply(key, value);
		}
		sink.end_tick(applied);
		if applied > 0 {
			tracing::trace!(tick = self.tick, applied, "worker.tick");
		}
		TickReport { tick: self.tick, applied }
	}

	/// Runs [`Self::tick`] every `period` until `cancel` fires or the handoff
	/// is closed, then drains once more and returns the sink.
	pub fn spawn<S>(mut self, period: Duration, mut sink: S, cancel: CancellationToken) -> JoinHandle<S>
	where
		S: TickSink<K, V> + Send + 'static,
	{
		crate::spawn("worker.tick_pump", async move {
			let mut interval = tokio::time::interval(period);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			tracing::debug!(period_ms = period.as_millis() as u64, "worker.tick_pump.start");

			loop {
				tokio::select! {
					biased;
					_ = cancel.cancelled() => break,
					_ = interval.tick() => {
						self.tick(&mut sink);
						if self.handoff.is_closed() && self.handoff.is_empty() {
							break;
						}
					}
				}
			}

			let last = self.tick(&mut sink);
			tracing::debug!(ticks = last.tick, "worker.tick_pump.stop");
			sink
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::HandoffPolicy;

	#[derive(Default)]
	struct Recorder {
		applied: Vec<(u32, String)>,
		ticks: Vec<usize>,
	}

	impl TickSink<u32, String> for Recorder {
		fn apply(&mut self, key: u32, value: String) {
			self.applied.push((key, value));
		}

		fn end_tick(&mut self, applied: usize) {
			self.ticks.push(applied);
		}
	}

	#[test]
	fn tick_applies_batch_in_order() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let mut pump = TickPump::new(handoff.clone());
		let mut sink = Recorder::default();

		let _ = handoff.push(1, "a".to_string());
		let _ = handoff.push(2, "b".to_string());

		assert_eq!(pump.tick(&mut sink), TickReport { tick: 1, applied: 2 });
		assert_eq!(pump.tick(&mut sink), TickReport { tick: 2, applied: 0 });
		assert_eq!(sink.applied, vec![(1, "a".to_string()), (2, "b".to_string())]);
		assert_eq!(sink.ticks, vec![2, 0]);
	}

	#[test]
	fn updates_pushed_after_drain_wait_for_next_tick() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let mut pump = TickPump::new(handoff.clone());
		let mut sink = Recorder::default();

		pump.tick(&mut sink);
		let _ = handoff.push(5, "late".to_string());
		assert!(sink.applied.is_empty());

		pump.tick(&mut sink);
		assert_eq!(sink.applied, vec![(5, "late".to_string())]);
	}

	#[tokio::test(start_paused = true)]
	async fn spawned_pump_applies_on_interval_and_drains_on_cancel() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let cancel = CancellationToken::new();
		let task = TickPump::new(handoff.clone()).spawn(Duration::from_millis(16), Recorder::default(), cancel.clone());

		let _ = handoff.push(1, "first".to_string());
		tokio::time::sleep(Duration::from_millis(40)).await;
		let _ = handoff.push(2, "second".to_string());
		cancel.cancel();

		let sink = task.await.expect("pump task should not panic");
		assert_eq!(sink.applied, vec![(1, "first".to_string()), (2, "second".to_string())]);
	}

	#[tokio::test(start_paused = true)]
	async fn spawned_pump_stops_once_closed_and_drained() {
		let handoff = Handoff::new(HandoffPolicy::Fifo);
		let task = TickPump::new(handoff.clone()).spawn(Duration::from_millis(16), Recorder::default(), CancellationToken::new());

		let _ = handoff.push(9, "bye".to_string());
		handoff.close();

		let sink = tokio::time::timeout(Duration::from_secs(1), task)
			.await
			.expect("pump should stop after close")
			.expect("pump task should not panic");
		assert_eq!(sink.applied, vec![(9, "bye".to_string())]);
	}
}
