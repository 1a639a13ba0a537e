pub mod checkpoint;
pub mod error;
pub mod results;
pub mod working_set;

pub use checkpoint::{CheckpointStore, ContactReport, Disposition, RunSummary};
pub use error::{Result, StoreError, StoreErrorKind};
pub use results::{ResultsStore, PHONE_NUMBER_COLUMN};
pub use working_set::{WorkingSet, EMAIL_COLUMN, FIRST_NAME_COLUMN};
