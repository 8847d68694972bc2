//! Line-oriented command scripts driving the simulated engine.
//!
//! ```text
//! join 3
//! set 3 1 "[VIP] "
//! remove 3 1 "[VIP] "
//! get 3 [VIP]
//! leave 3
//! tick
//! ```

use clantag_tags::{Priority, SubjectId};
use thiserror::Error;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Join(SubjectId),
	Leave(SubjectId),
	Set { subject: SubjectId, priority: Priority, tag: String },
	Remove { subject: SubjectId, priority: Priority, tag: String },
	Get { subject: SubjectId, tag: String },
	Tick,
}

/// A malformed script line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
	pub line: usize,
	pub kind: ScriptErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
	#[error("unknown command `{0}`")]
	UnknownCommand(String),
	#[error("missing {0}")]
	MissingArgument(&'static str),
	#[error("invalid {what} `{value}`")]
	InvalidNumber { what: &'static str, value: String },
	#[error("unterminated quoted tag")]
	UnterminatedQuote,
	#[error("unexpected input after tag: `{0}`")]
	TrailingInput(String),
}

/// Parses a whole script, skipping blank lines and `#` comments.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
	source
		.lines()
		.enumerate()
		.filter_map(|(idx, line)| parse_line(line).map_err(|kind| ScriptError { line: idx + 1, kind }).transpose())
		.collect()
}

/// Parses one line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, ScriptErrorKind> {
	let line = line.trim();
	if line.is_empty() || line.starts_with('#') {
		return Ok(None);
	}

	let (verb, rest) = split_word(line);
	let command = match verb {
		"join" => Command::Join(subject(rest)?.0),
		"leave" => Command::Leave(subject(rest)?.0),
		"tick" => {
			let rest = rest.trim();
			if !rest.is_empty() {
				return Err(ScriptErrorKind::TrailingInput(rest.to_owned()));
			}
			Command::Tick
		}
		"set" | "remove" => {
			let (subject, rest) = subject(rest)?;
			let (priority, rest) = split_word(rest);
			let priority = number::<Priority>(priority, "priority")?;
			let tag = tag(rest)?;
			if verb == "set" {
				Command::Set { subject, priority, tag }
			} else {
				Command::Remove { subject, priority, tag }
			}
		}
		"get" => {
			let (subject, rest) = subject(rest)?;
			Command::Get { subject, tag: tag(rest)? }
		}
		other => return Err(ScriptErrorKind::UnknownCommand(other.to_owned())),
	};
	Ok(Some(command))
}

fn split_word(input: &str) -> (&str, &str) {
	let input = input.trim_start();
	match input.find(char::is_whitespace) {
		Some(end) => (&input[..end], &input[end..]),
		None => (input, ""),
	}
}

fn subject(input: &str) -> Result<(SubjectId, &str), ScriptErrorKind> {
	let (word, rest) = split_word(input);
	Ok((SubjectId(number(word, "subject id")?), rest))
}

fn number<T: std::str::FromStr>(word: &str, what: &'static str) -> Result<T, ScriptErrorKind> {
	if word.is_empty() {
		return Err(ScriptErrorKind::MissingArgument(what));
	}
	word.parse().map_err(|_| ScriptErrorKind::InvalidNumber {
		what,
		value: word.to_owned(),
	})
}

/// Bare tags run to the end of the line; quoted tags keep surrounding spaces
/// and accept `\"` and `\\` escapes.
fn tag(input: &str) -> Result<String, ScriptErrorKind> {
	let input = input.trim();
	if input.is_empty() {
		return Err(ScriptErrorKind::MissingArgument("tag"));
	}
	let Some(quoted) = input.strip_prefix('"') else {
		return Ok(input.to_owned());
	};

	let mut tag = String::new();
	let mut chars = quoted.char_indices();
	while let Some((idx, ch)) = chars.next() {
		match ch {
			'"' => {
				let rest = quoted[idx + 1..].trim();
				if !rest.is_empty() {
					return Err(ScriptErrorKind::TrailingInput(rest.to_owned()));
				}
				return Ok(tag);
			}
			'\\' => match chars.next() {
				Some((_, escaped @ ('"' | '\\'))) => tag.push(escaped),
				Some((_, other)) => {
					tag.push('\\');
					tag.push(other);
				}
				None => return Err(ScriptErrorKind::UnterminatedQuote),
			},
			other => tag.push(other),
		}
	}
	Err(ScriptErrorKind::UnterminatedQuote)
}
