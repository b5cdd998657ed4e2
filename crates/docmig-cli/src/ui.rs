use std::io::{BufRead, IsTerminal, Write};
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let is_tty = std::io::stdout().is_terminal();
    let table_color = is_tty
        && flags.format == OutputFormat::Table
        && !flags.quiet
        && std::env::var_os("NO_COLOR").is_none();

    let progress = is_tty && !flags.quiet && flags.format != OutputFormat::Json;

    let term_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    let _ = UI_PREFS.set(UiPrefs {
        table_color,
        progress,
        term_width,
    });
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        table_color: false,
        progress: false,
        term_width: None,
    })
}

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    confirm_with(&mut stdin.lock(), &mut stderr, question)
}

/// Only `y` and `yes` (any case) accept; end of input declines.
pub fn confirm_with<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> anyhow::Result<bool> {
    write!(writer, "{question} [y/N] ")?;
    writer.flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    let answer = answer.trim().to_ascii_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::confirm_with;

    fn answer(input: &str) -> bool {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut prompt = Vec::new();
        let accepted = confirm_with(&mut reader, &mut prompt, "Proceed?").expect("confirm");
        assert!(String::from_utf8_lossy(&prompt).starts_with("Proceed?"));
        accepted
    }

    #[test]
    fn yes_answers_accept() {
        assert!(answer("y\n"));
        assert!(answer("YES\n"));
        assert!(answer("  yes  \n"));
    }

    #[test]
    fn anything_else_declines() {
        assert!(!answer("n\n"));
        assert!(!answer("\n"));
        assert!(!answer("sure\n"));
    }

    #[test]
    fn closed_stdin_declines() {
        assert!(!answer(""));
    }
}
