use interview_assessor::assessment::{
    AssessmentReport, Interview, InterviewId, InterviewRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Process-local store backing CLI replays.
#[derive(Default, Clone)]
pub(crate) struct InMemoryInterviewRepository {
    interviews: Arc<Mutex<HashMap<InterviewId, Interview>>>,
    reports: Arc<Mutex<HashMap<InterviewId, AssessmentReport>>>,
}

impl InMemoryInterviewRepository {
    pub(crate) fn report_count(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl InterviewRepository for InMemoryInterviewRepository {
    fn save_interview(&self, interview: &Interview) -> Result<(), RepositoryError> {
        let mut guard = self
            .interviews
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(interview.id.clone(), interview.clone());
        Ok(())
    }

    fn save_report(&self, report: &AssessmentReport) -> Result<(), RepositoryError> {
        let mut guard = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(report.interview_id.clone(), report.clone());
        Ok(())
    }

    fn load_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        let guard = self
            .interviews
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }
}
