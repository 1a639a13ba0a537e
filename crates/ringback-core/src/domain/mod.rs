pub mod contact;
pub mod outcome;
pub mod phone;
pub mod record;

pub use contact::Contact;
pub use outcome::{Outcome, UnmatchedReason, VerificationResult};
pub use phone::{normalize_candidate, PhoneCandidate};
pub use record::MatchRecord;
