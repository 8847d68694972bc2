use std::io::Write;

use clantag_tags::{SubjectEvent, TagRegistry, TagsApi, TagsConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::engine::PlayerState;
use crate::script::{self, Command};

/// Whether a command asked for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
	Continue,
	Tick,
}

/// Runs one command against the registry. `get` answers are written to `out`
/// immediately as one `write_all` per line; display updates wait for the next
/// tick.
fn execute(registry: &TagRegistry, command: Command, out: &mut impl Write) -> std::io::Result<Flow> {
	let api: &dyn TagsApi = registry;
	match command {
		Command::Join(subject) => registry.handle_event(SubjectEvent::Joined(subject)),
		Command::Leave(subject) => registry.handle_event(SubjectEvent::Left(subject)),
		Command::Set { subject, priority, tag } => api.set_clan_tag(subject, &tag, priority),
		Command::Remove { subject, priority, tag } => api.remove_clan_tag(subject, &tag, priority),
		Command::Get { subject, tag } => {
			let line = match api.get_clan_tag_priority(subject, &tag) {
				Some(priority) => format!("priority {subject} {priority}\n"),
				None => format!("priority {subject} none\n"),
			};
			out.write_all(line.as_bytes())?;
		}
		Command::Tick => return Ok(Flow::Tick),
	}
	Ok(Flow::Continue)
}

/// Executes `commands` deterministically: display updates are applied only on
/// `tick` commands and once after the last command.
pub fn replay<W: Write>(commands: Vec<Command>, config: &TagsConfig, out: W) -> anyhow::Result<PlayerState<W>> {
	let (registry, mut pump) = TagRegistry::from_config(config);
	let mut engine = PlayerState::new(out);

	for command in commands {
		if execute(&registry, command, engine.writer())? == Flow::Tick {
			pump.tick(&mut engine);
		}
	}
	let last = pump.tick(&mut engine);
	tracing::debug!(ticks = last.tick, subjects = registry.subject_count(), "host.replay.done");
	Ok(engine)
}

/// Reads commands from `input` until EOF while the display pump runs on its
/// own interval. Malformed lines are reported and skipped.
pub async fn live<R, W>(input: R, config: &TagsConfig, out: W) -> anyhow::Result<PlayerState<W>>
where
	R: AsyncBufRead + Unpin,
	W: Write + Clone + Send + 'static,
{
	let (registry, pump) = TagRegistry::from_config(config);
	let cancel = CancellationToken::new();
	let pump_task = pump.spawn(config.display.tick_interval(), PlayerState::new(out.clone()), cancel.clone());
	tracing::info!(capability = %config.capability, "host.live.ready");

	let mut answers = out;
	let mut lines = input.lines();
	let mut line_no = 0usize;
	while let Some(line) = lines.next_line().await? {
		line_no += 1;
		match script::parse_line(&line) {
			Ok(Some(command)) => {
				if execute(&registry, command, &mut answers)? == Flow::Tick {
					tracing::debug!(line = line_no, "host.live.tick_ignored");
				}
			}
			Ok(None) => {}
			Err(kind) => tracing::warn!(line = line_no, %kind, "host.live.bad_line"),
		}
	}

	cancel.cancel();
	let engine = pump_task.await?;
	tracing::debug!(lines = line_no, "host.live.done");
	Ok(engine)
}
