use crate::source::{NameLookup, SnippetSource};
use crate::Result;
use ringback_core::{
    extract_phone_numbers, first_name_matches, Contact, MatchRecord, Outcome, PhoneCandidate,
    VerificationResult,
};
use tracing::{debug, info, warn};

/// Turns one contact into an [`Outcome`]: search snippets, extract
/// candidates, verify them in order and stop at the first name match.
#[derive(Debug, Clone)]
pub struct MatchingPipeline<S, L> {
    snippets: S,
    lookup: L,
}

impl<S, L> MatchingPipeline<S, L>
where
    S: SnippetSource,
    L: NameLookup,
{
    pub fn new(snippets: S, lookup: L) -> Self {
        Self { snippets, lookup }
    }

    pub fn verify(&self, candidate: &PhoneCandidate) -> Result<VerificationResult> {
        let display_name = self.lookup.lookup_name(candidate)?;
        Ok(VerificationResult {
            candidate: candidate.clone(),
            display_name,
        })
    }

    pub fn process(&self, contact: &Contact) -> Outcome {
        // A row without an email or first name can never match; drop it
        // without touching either remote service.
        if let Err(err) = contact.validate() {
            warn!(email = %contact.email, error = %err, "invalid contact row");
            return Outcome::NoNameMatch;
        }

        let text = match self.snippets.fetch_snippets(&contact.email) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    email = %contact.email,
                    source = self.snippets.source_name(),
                    error = %err,
                    "snippet search failed"
                );
                return Outcome::TransientError(err.to_string());
            }
        };
        if text.trim().is_empty() {
            debug!(email = %contact.email, "no snippets");
            return Outcome::NoSnippets;
        }

        let candidates = extract_phone_numbers(&text);
        if candidates.is_empty() {
            debug!(email = %contact.email, "no phone numbers in snippets");
            return Outcome::NoCandidates;
        }
        debug!(email = %contact.email, count = candidates.len(), "phone candidates");

        for candidate in &candidates {
            let result = match self.verify(candidate) {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        candidate = %candidate,
                        source = self.lookup.source_name(),
                        error = %err,
                        "lookup failed, trying next candidate"
                    );
                    continue;
                }
            };
            let Some(name) = result.display_name else {
                debug!(candidate = %candidate, "no name found");
                continue;
            };
            if first_name_matches(&contact.first_name, &name) {
                info!(candidate = %candidate, name = %name, "name matched");
                return Outcome::Matched(MatchRecord::new(
                    contact.first_name.clone(),
                    result.candidate,
                ));
            }
            debug!(candidate = %candidate, name = %name, "name did not match");
        }

        Outcome::NoNameMatch
    }
}
