//! Recording of exam attempts against assignments.

pub mod submission;

pub use submission::{ExamSubmission, SubmissionRecorder};
