use anyhow::Result;
use ringback_config::AppConfig;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::util::prompt_for_path;

pub mod extract;
pub mod run;
pub mod status;

pub const PATH_PROMPT: &str = "Enter the path to your CSV file: ";

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

impl Context<'_> {
    pub fn results_path(&self, custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(|| self.config.results_path.clone())
    }
}

pub fn source_path(input: Option<PathBuf>) -> Result<PathBuf> {
    match input {
        Some(path) => Ok(path),
        None => prompt_for_path(PATH_PROMPT),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
