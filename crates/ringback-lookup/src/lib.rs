pub mod error;
pub mod pipeline;
pub mod serper;
pub mod source;
pub mod webdriver;

pub use error::{LookupError, Result};
pub use pipeline::MatchingPipeline;
pub use source::{NameLookup, SnippetSource};
