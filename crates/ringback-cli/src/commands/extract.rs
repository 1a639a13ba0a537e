use crate::commands::print_json;
use crate::error::not_found;
use anyhow::{Context as _, Result};
use clap::Args;
use ringback_core::extract_phone_numbers;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Read text from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn extract(json: bool, args: ExtractArgs) -> Result<()> {
    let text = match args.file {
        Some(path) => {
            if !path.is_file() {
                return Err(not_found(format!("text file {}", path.display())));
            }
            fs::read_to_string(&path)
                .with_context(|| format!("read text file {}", path.display()))?
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .with_context(|| "read text from stdin")?;
            text
        }
    };

    let candidates = extract_phone_numbers(&text);
    if json {
        return print_json(&candidates);
    }
    for candidate in candidates {
        println!("{}", candidate);
    }
    Ok(())
}
