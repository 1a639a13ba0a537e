use crate::error::{Result, StoreError};
use crate::results::ResultsStore;
use crate::working_set::WorkingSet;
use ringback_core::{Contact, MatchRecord, Outcome, UnmatchedReason};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

/// What happened to a contact after its outcome was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Match appended to the results file and contact removed.
    Saved,
    /// Terminally unmatched and removed.
    Removed,
    /// Kept pending for the next run.
    Retry,
    /// Match found but the results file could not be written; kept pending.
    Unsaved,
}

impl Disposition {
    pub fn removes_contact(self) -> bool {
        matches!(self, Disposition::Saved | Disposition::Removed)
    }
}

#[derive(Debug)]
pub struct ContactReport<'a> {
    pub position: usize,
    pub contact: &'a Contact,
    pub outcome: &'a Outcome,
    pub disposition: Disposition,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub matched: usize,
    pub no_snippets: usize,
    pub no_candidates: usize,
    pub no_name_match: usize,
    pub retry: usize,
    pub remaining: usize,
    /// Matches that could not be appended to the results file.
    pub unsaved: Vec<MatchRecord>,
    /// True when the final source rewrite failed and the file on disk still
    /// lists contacts that were already processed.
    pub source_stale: bool,
}

impl RunSummary {
    pub fn unmatched(&self) -> usize {
        self.no_snippets + self.no_candidates + self.no_name_match
    }

    fn record(&mut self, outcome: &Outcome, disposition: Disposition) {
        self.processed += 1;
        match disposition {
            Disposition::Saved => self.matched += 1,
            Disposition::Retry | Disposition::Unsaved => self.retry += 1,
            Disposition::Removed => match outcome.unmatched_reason() {
                Some(UnmatchedReason::NoSnippets) => self.no_snippets += 1,
                Some(UnmatchedReason::NoCandidates) => self.no_candidates += 1,
                Some(UnmatchedReason::NoNameMatch) => self.no_name_match += 1,
                None => {}
            },
        }
    }
}

/// Owns the pending working set and the results file and applies each
/// contact's outcome to both, persisting after every contact.
#[derive(Debug)]
pub struct CheckpointStore {
    working: WorkingSet,
    results: ResultsStore,
}

impl CheckpointStore {
    pub fn open(source: &Path, results: &Path) -> Result<Self> {
        let working = WorkingSet::open(source)?;
        let results = ResultsStore::open(results)?;
        Ok(Self { working, results })
    }

    pub fn pending(&self) -> &WorkingSet {
        &self.working
    }

    pub fn results(&self) -> &ResultsStore {
        &self.results
    }

    /// Applies `outcome` to the contact at `position` and persists the
    /// working set when the contact leaves it.
    ///
    /// A match is appended to the results file before the contact is
    /// removed, so a crash between the two writes can only cause the contact
    /// to be processed again, never a lost match.
    pub fn commit(&mut self, position: usize, outcome: &Outcome) -> Result<Disposition> {
        let disposition = self.apply(position, outcome)?;
        if disposition.removes_contact() {
            self.working.persist()?;
        }
        Ok(disposition)
    }

    fn apply(&mut self, position: usize, outcome: &Outcome) -> Result<Disposition> {
        if position >= self.working.len() {
            return Err(StoreError::InvalidPosition(position));
        }
        if !outcome.is_terminal() {
            return Ok(Disposition::Retry);
        }
        if let Outcome::Matched(record) = outcome {
            self.results.append(record)?;
            self.working.remove(position)?;
            return Ok(Disposition::Saved);
        }
        self.working.remove(position)?;
        Ok(Disposition::Removed)
    }

    /// Processes pending contacts in source order, at most `limit` of them.
    ///
    /// Per-contact write failures never abort the run: an unwritable results
    /// file keeps the contact pending and the match is returned in
    /// [`RunSummary::unsaved`].
    pub fn run<P, R>(&mut self, limit: Option<usize>, mut process: P, mut report: R) -> RunSummary
    where
        P: FnMut(&Contact) -> Outcome,
        R: FnMut(&ContactReport<'_>),
    {
        let mut summary = RunSummary::default();
        let mut position = 0;
        let mut source_dirty = false;

        while position < self.working.len() {
            if limit.is_some_and(|limit| summary.processed >= limit) {
                break;
            }
            let current = position;
            let Some(contact) = self.working.get(current).cloned() else {
                break;
            };

            let outcome = process(&contact);
            let disposition = match self.apply(current, &outcome) {
                Ok(disposition) => disposition,
                Err(err) => {
                    error!(
                        email = %contact.email,
                        error = %err,
                        "failed to record match; contact kept pending"
                    );
                    if let Outcome::Matched(record) = &outcome {
                        summary.unsaved.push(record.clone());
                    }
                    Disposition::Unsaved
                }
            };

            if disposition.removes_contact() {
                if let Err(err) = self.working.persist() {
                    error!(
                        path = %self.working.path().display(),
                        error = %err,
                        "failed to rewrite source file"
                    );
                    source_dirty = true;
                } else {
                    source_dirty = false;
                }
            } else {
                position += 1;
            }

            match disposition {
                Disposition::Saved | Disposition::Removed => {
                    info!(email = %contact.email, ?disposition, "contact processed")
                }
                Disposition::Retry | Disposition::Unsaved => {
                    warn!(email = %contact.email, ?disposition, "contact kept pending")
                }
            }

            summary.record(&outcome, disposition);
            report(&ContactReport {
                position: current,
                contact: &contact,
                outcome: &outcome,
                disposition,
            });
        }

        if source_dirty {
            if let Err(err) = self.working.persist() {
                error!(
                    path = %self.working.path().display(),
                    error = %err,
                    "source file still stale after final rewrite"
                );
                summary.source_stale = true;
            }
        }

        summary.remaining = self.working.len();
        summary
    }
}
