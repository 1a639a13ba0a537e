use crate::error::{Result, StoreError};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use ringback_core::Contact;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const EMAIL_COLUMN: &str = "email";
pub const FIRST_NAME_COLUMN: &str = "first_name";

#[derive(Debug, Clone)]
struct PendingRow {
    contact: Contact,
    record: StringRecord,
}

/// Contacts still waiting to be processed, backed by the source CSV.
///
/// Every original column is carried along so that rewriting the source
/// only ever drops whole rows.
#[derive(Debug)]
pub struct WorkingSet {
    path: PathBuf,
    headers: StringRecord,
    rows: Vec<PendingRow>,
}

impl WorkingSet {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StoreError::MissingSource(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();

        let email_idx = column_index(&headers, EMAIL_COLUMN);
        let first_name_idx = column_index(&headers, FIRST_NAME_COLUMN);
        let (email_idx, first_name_idx) = match (email_idx, first_name_idx) {
            (Some(email), Some(first_name)) => (email, first_name),
            (email, first_name) => {
                let mut columns = Vec::new();
                if email.is_none() {
                    columns.push(EMAIL_COLUMN);
                }
                if first_name.is_none() {
                    columns.push(FIRST_NAME_COLUMN);
                }
                return Err(StoreError::MissingColumns {
                    path: path.to_path_buf(),
                    columns,
                });
            }
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let contact = Contact::new(
                record.get(email_idx).unwrap_or_default().trim(),
                record.get(first_name_idx).unwrap_or_default().trim(),
            );
            rows.push(PendingRow { contact, record });
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Contact> {
        self.rows.get(position).map(|row| &row.contact)
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.rows.iter().map(|row| &row.contact)
    }

    pub fn remove(&mut self, position: usize) -> Result<Contact> {
        if position >= self.rows.len() {
            return Err(StoreError::InvalidPosition(position));
        }
        Ok(self.rows.remove(position).contact)
    }

    /// Rewrites the source file with the remaining rows. The new contents
    /// are written to a sibling temp file and renamed over the original,
    /// keeping the original file's permissions.
    pub fn persist(&self) -> Result<()> {
        self.write_atomic()
            .map_err(|err| StoreError::write(&self.path, err))
    }

    fn write_atomic(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = fs::metadata(&self.path)?.permissions();
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .from_writer(temp.as_file_mut());
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(&row.record)?;
            }
            writer.flush()?;
        }
        temp.as_file_mut().flush()?;
        temp.as_file().set_permissions(permissions)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
}
