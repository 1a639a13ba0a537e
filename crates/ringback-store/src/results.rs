use crate::error::{Result, StoreError};
use crate::working_set::FIRST_NAME_COLUMN;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use ringback_core::MatchRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const PHONE_NUMBER_COLUMN: &str = "phone_number";

/// Append-only CSV of confirmed matches.
#[derive(Debug)]
pub struct ResultsStore {
    path: PathBuf,
    created: bool,
    appended: usize,
}

impl ResultsStore {
    /// Opens the results file, creating it with a header row when it is
    /// absent or empty. An existing file is never truncated.
    pub fn open(path: &Path) -> Result<Self> {
        let needs_header = match fs::metadata(path) {
            Ok(metadata) => metadata.len() == 0,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => return Err(err.into()),
        };

        if needs_header {
            write_header(path).map_err(|err| StoreError::write(path, err))?;
        } else {
            validate_header(path)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            created: needs_header,
            appended: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when this run created the file.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Appends one record and syncs it to disk before returning.
    pub fn append(&mut self, record: &MatchRecord) -> Result<()> {
        append_record(&self.path, record).map_err(|err| StoreError::write(&self.path, err))?;
        self.appended += 1;
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<MatchRecord>> {
        read_records(&self.path)
    }

    /// Reads an existing results file without creating it.
    pub fn read_existing(path: &Path) -> Result<Vec<MatchRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        if fs::metadata(path)?.len() == 0 {
            return Ok(Vec::new());
        }
        validate_header(path)?;
        read_records(path)
    }
}

fn write_header(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record([FIRST_NAME_COLUMN, PHONE_NUMBER_COLUMN])?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn validate_header(path: &Path) -> Result<()> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?;
    let has = |name: &str| {
        headers
            .iter()
            .any(|header| header_name(header) == name)
    };
    let mut columns = Vec::new();
    if !has(FIRST_NAME_COLUMN) {
        columns.push(FIRST_NAME_COLUMN);
    }
    if !has(PHONE_NUMBER_COLUMN) {
        columns.push(PHONE_NUMBER_COLUMN);
    }
    if columns.is_empty() {
        return Ok(());
    }
    Err(StoreError::MissingColumns {
        path: path.to_path_buf(),
        columns,
    })
}

fn header_name(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

fn append_record(path: &Path, record: &MatchRecord) -> Result<()> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;
    if !ends_with_newline(&mut file)? {
        file.write_all(b"\n")?;
    }
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn read_records(path: &Path) -> Result<Vec<MatchRecord>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers: StringRecord = reader.headers()?.iter().map(header_name).collect();
    reader.set_headers(headers);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: MatchRecord = row?;
        records.push(record);
    }
    Ok(records)
}
