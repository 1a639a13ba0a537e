use crate::Result;
use ringback_core::PhoneCandidate;

/// Free-text search for an email address.
pub trait SnippetSource {
    fn source_name(&self) -> &'static str;

    /// Concatenated result snippets; empty when the search found nothing.
    fn fetch_snippets(&self, email: &str) -> Result<String>;
}

/// Reverse phone-number directory.
///
/// `Ok(None)` means the lookup completed and found no name. Any failure to
/// complete the lookup is an error.
pub trait NameLookup {
    fn source_name(&self) -> &'static str;

    fn lookup_name(&self, candidate: &PhoneCandidate) -> Result<Option<String>>;
}

impl<T: SnippetSource + ?Sized> SnippetSource for &T {
    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }

    fn fetch_snippets(&self, email: &str) -> Result<String> {
        (**self).fetch_snippets(email)
    }
}

impl<T: NameLookup + ?Sized> NameLookup for &T {
    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }

    fn lookup_name(&self, candidate: &PhoneCandidate) -> Result<Option<String>> {
        (**self).lookup_name(candidate)
    }
}
