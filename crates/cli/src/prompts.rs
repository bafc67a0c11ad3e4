use std::io::{self, IsTerminal, Write};

use indexsync_lib::reconcile::Confirm;

/// Asks on stderr and reads the answer from stdin.
///
/// Without a terminal on both ends the question's default is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
  fn confirm(&self, message: &str, default: bool) -> bool {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      return default;
    }
    ask(message, default).unwrap_or(default)
  }
}

fn ask(message: &str, default: bool) -> io::Result<bool> {
  let hint = if default { "[Y/n]" } else { "[y/N]" };
  write!(io::stderr(), "{} {} ", message, hint)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(parse_answer(&input, default))
}

fn parse_answer(input: &str, default: bool) -> bool {
  match input.trim().to_ascii_lowercase().as_str() {
    "y" | "yes" => true,
    "n" | "no" => false,
    _ => default,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_answer() {
    assert!(parse_answer("y\n", false));
    assert!(parse_answer(" YES ", false));
    assert!(!parse_answer("n\n", true));
    assert!(!parse_answer("\n", false));
    assert!(parse_answer("\n", true));
    assert!(!parse_answer("maybe", false));
  }
}
