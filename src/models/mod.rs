pub mod submission;

pub use submission::{
    StatusCategory, SubmissionRequest, SubmissionResult, UploadedFile, WorkerOutput, SUCCESS_MARKER,
};
