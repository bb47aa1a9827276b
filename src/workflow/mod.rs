pub mod single_file;
pub mod submission_flow;

pub use single_file::run_single_file;
pub use submission_flow::{SubmissionFlow, SubmissionOutcome, SubmissionStage};
