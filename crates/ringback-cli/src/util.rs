use anyhow::{Context as _, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::error::invalid_input;

pub fn prompt_for_path(prompt: &str) -> Result<PathBuf> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;
    drop(stdout);

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| "read path from stdin")?;
    let cleaned = clean_path_input(&line);
    if cleaned.is_empty() {
        return Err(invalid_input("no CSV path given"));
    }
    Ok(PathBuf::from(cleaned))
}

/// Strips whitespace and the quotes a shell drag-and-drop tends to add.
pub fn clean_path_input(raw: &str) -> &str {
    raw.trim().trim_matches(|ch: char| ch == '"' || ch == '\'').trim()
}
