use crate::domain::phone::{normalize_candidate, PhoneCandidate};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const PHONE_PATTERN: &str = concat!(
    // country code: +1, +88, 880
    r"(?:\+?[0-9]{1,3}[\s\-.]?)?",
    // area code, optionally parenthesized: (02), 0171
    r"(?:\(?[0-9]{2,4}\)?[\s\-.]?)?",
    // two to five digit groups
    r"(?:[0-9]{2,4}[\s\-.]?){2,5}",
    // the match always ends on a digit
    r"[0-9]+",
);

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"));

/// Finds phone-like substrings in free text and returns them normalized,
/// in order of first appearance, without duplicates.
pub fn extract_phone_numbers(text: &str) -> Vec<PhoneCandidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for found in PHONE_RE.find_iter(text) {
        let Some(candidate) = normalize_candidate(found.as_str()) else {
            continue;
        };
        if seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    }
    out
}
