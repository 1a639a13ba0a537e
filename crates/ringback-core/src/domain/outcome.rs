use crate::domain::phone::PhoneCandidate;
use crate::domain::record::MatchRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub candidate: PhoneCandidate,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    NoSnippets,
    NoCandidates,
    NoNameMatch,
}

impl UnmatchedReason {
    pub fn label(self) -> &'static str {
        match self {
            UnmatchedReason::NoSnippets => "no snippets",
            UnmatchedReason::NoCandidates => "no phone numbers",
            UnmatchedReason::NoNameMatch => "no matching name",
        }
    }
}

/// Result of processing one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched(MatchRecord),
    NoSnippets,
    NoCandidates,
    NoNameMatch,
    TransientError(String),
}

impl Outcome {
    /// Every outcome except a transient error removes the contact from the
    /// working set.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::TransientError(_))
    }

    pub fn unmatched_reason(&self) -> Option<UnmatchedReason> {
        match self {
            Outcome::NoSnippets => Some(UnmatchedReason::NoSnippets),
            Outcome::NoCandidates => Some(UnmatchedReason::NoCandidates),
            Outcome::NoNameMatch => Some(UnmatchedReason::NoNameMatch),
            Outcome::Matched(_) | Outcome::TransientError(_) => None,
        }
    }
}
