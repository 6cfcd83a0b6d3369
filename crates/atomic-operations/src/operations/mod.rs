mod analyze;
mod commit;
mod message;

pub use analyze::{AnalysisContext, AnalyzeOperation, change_entries_from_status};
pub use commit::{CommitOperation, CommitReport, StashOutcome, ValidationFailure};
pub use message::commit_message;
