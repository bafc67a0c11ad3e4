//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, index state labels and Unicode symbols.

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

use indexsync_lib::api::IndexState;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One planned or applied change, prefixed with `+`, `~` or `-`.
pub fn print_change(symbol: &str, summary: &str) {
  let colored = match symbol {
    symbols::ADD => format!("{}", symbol.if_supports_color(Stream::Stdout, |s| s.green())),
    symbols::MODIFY => format!("{}", symbol.if_supports_color(Stream::Stdout, |s| s.yellow())),
    _ => format!("{}", symbol.if_supports_color(Stream::Stdout, |s| s.red())),
  };
  println!("  {colored} {summary}");
}

/// The state of a live index, colored by how usable it is.
pub fn state_label(state: Option<IndexState>) -> String {
  let label = state.map(|s| s.as_str()).unwrap_or("STATE_UNSPECIFIED");
  match state {
    Some(IndexState::Ready) => format!("{}", label.if_supports_color(Stream::Stdout, |s| s.green())),
    Some(IndexState::Creating) => format!("{}", label.if_supports_color(Stream::Stdout, |s| s.yellow())),
    _ => format!("{}", label.if_supports_color(Stream::Stdout, |s| s.red())),
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// `"1 index"` / `"2 indexes"`.
pub fn count(n: usize, singular: &str, plural: &str) -> String {
  if n == 1 {
    format!("{n} {singular}")
  } else {
    format!("{n} {plural}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_count() {
    assert_eq!(count(0, "index", "indexes"), "0 indexes");
    assert_eq!(count(1, "index", "indexes"), "1 index");
    assert_eq!(count(3, "field override", "field overrides"), "3 field overrides");
  }

  #[test]
  fn test_state_label_contains_state_name() {
    assert!(state_label(Some(IndexState::Ready)).contains("READY"));
    assert!(state_label(Some(IndexState::Creating)).contains("CREATING"));
    assert!(state_label(None).contains("STATE_UNSPECIFIED"));
  }
}
