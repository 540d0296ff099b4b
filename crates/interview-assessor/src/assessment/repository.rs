use super::domain::{Interview, InterviewId};
use super::report::AssessmentReport;

/// Storage for interview records and final reports.
///
/// Calls fail fast. The service keeps its in-memory state on failure so the same
/// operation can be retried.
pub trait InterviewRepository: Send + Sync {
    fn save_interview(&self, interview: &Interview) -> Result<(), RepositoryError>;
    fn save_report(&self, report: &AssessmentReport) -> Result<(), RepositoryError>;
    fn load_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
