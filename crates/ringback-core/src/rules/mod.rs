pub mod matching;

pub use matching::first_name_matches;
