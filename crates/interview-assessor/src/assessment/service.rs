use super::domain::{CandidateProfile, Interview, InterviewId};
use super::judge::TurnJudge;
use super::report::{AssessmentReport, LiveAssessment};
use super::repository::{InterviewRepository, RepositoryError};
use super::rubric::{RubricCatalog, RubricError};
use super::scoring::ScoringEngine;
use super::session::{AnswerOutcome, InterviewSession, SessionError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Per-interview mutation lock plus the state readable without it.
struct SessionSlot {
    session: Mutex<InterviewSession>,
    cancel: Arc<AtomicBool>,
    latest: RwLock<LiveAssessment>,
}

impl SessionSlot {
    fn new(session: InterviewSession) -> Self {
        Self {
            cancel: session.cancel_handle(),
            latest: RwLock::new(session.live_assessment()),
            session: Mutex::new(session),
        }
    }

    fn publish(&self, snapshot: LiveAssessment) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

/// Service composing the rubric catalog, turn judge, scoring engine and repository.
///
/// Mutations of one interview are serialized through its own async mutex; different
/// interviews never contend. The session map lock is never held across an await.
pub struct AssessmentService<R, J: ?Sized> {
    catalog: Arc<RubricCatalog>,
    repository: Arc<R>,
    judge: Arc<J>,
    scoring: ScoringEngine,
    sessions: RwLock<HashMap<InterviewId, Arc<SessionSlot>>>,
    sequence: AtomicU64,
}

impl<R, J> AssessmentService<R, J>
where
    R: InterviewRepository + 'static,
    J: TurnJudge + ?Sized + 'static,
{
    pub fn new(
        catalog: Arc<RubricCatalog>,
        repository: Arc<R>,
        judge: Arc<J>,
        scoring: ScoringEngine,
    ) -> Self {
        Self {
            catalog,
            repository,
            judge,
            scoring,
            sessions: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &Arc<RubricCatalog> {
        &self.catalog
    }

    fn slot(&self, id: &InterviewId) -> Result<Arc<SessionSlot>, AssessmentServiceError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))
    }

    /// Next sequential id that is neither registered nor already in the store. The sequence
    /// restarts with the process, so stored interviews from earlier runs are skipped.
    fn allocate_id(&self) -> Result<InterviewId, AssessmentServiceError> {
        loop {
            let id = InterviewId(format!(
                "interview-{:06}",
                self.sequence.fetch_add(1, Ordering::Relaxed)
            ));
            if self.slot(&id).is_ok() {
                continue;
            }
            if self.repository.load_interview(&id)?.is_none() {
                return Ok(id);
            }
            debug!(interview_id = %id, "interview id already stored, skipping");
        }
    }

    fn register(&self, session: InterviewSession) -> Arc<SessionSlot> {
        let id = session.interview().id.clone();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(id)
                .or_insert_with(|| Arc::new(SessionSlot::new(session))),
        )
    }

    /// Loads the rubric, stores a new interview in `Created` and registers its session.
    pub fn create_interview(
        &self,
        template_id: &str,
        candidate: CandidateProfile,
    ) -> Result<Interview, AssessmentServiceError> {
        let rubric = self.catalog.load(template_id)?;
        let interview = Interview::new(
            self.allocate_id()?,
            rubric.template_id(),
            candidate,
            Utc::now(),
        );

        self.repository.save_interview(&interview)?;
        info!(
            interview_id = %interview.id,
            template_id = rubric.template_id(),
            "interview created"
        );
        self.register(InterviewSession::new(interview.clone(), rubric));
        Ok(interview)
    }

    pub async fn start(&self, id: &InterviewId) -> Result<(), AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        session.start(Utc::now())?;
        slot.publish(session.live_assessment());
        self.repository.save_interview(session.interview())?;
        session.mark_persisted();
        Ok(())
    }

    pub async fn record_question(
        &self,
        id: &InterviewId,
        question: &str,
    ) -> Result<(), AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        session.record_question(question)?;
        self.repository.save_interview(session.interview())?;
        session.mark_persisted();
        Ok(())
    }

    /// Judges and records one answer. Calls for the same interview queue in arrival order.
    pub async fn submit_answer(
        &self,
        id: &InterviewId,
        answer: &str,
    ) -> Result<AnswerOutcome, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        let result = session
            .submit_answer(self.judge.as_ref(), answer, Utc::now())
            .await;
        slot.publish(session.live_assessment());

        match result {
            Ok(outcome) => {
                self.repository.save_interview(session.interview())?;
                session.mark_persisted();
                Ok(outcome)
            }
            Err(err) => {
                // A cancelled answer abandons the interview; a failed save here is
                // retried by the next `abandon` or `persist`.
                if session.is_dirty() {
                    match self.repository.save_interview(session.interview()) {
                        Ok(()) => session.mark_persisted(),
                        Err(save_err) => error!(
                            interview_id = %id,
                            error = %save_err,
                            "failed to persist abandoned interview"
                        ),
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Scores and reports once; repeated calls return the same report and re-save it.
    pub async fn complete(
        &self,
        id: &InterviewId,
    ) -> Result<Arc<AssessmentReport>, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        let report = session
            .complete(self.judge.as_ref(), &self.scoring, Utc::now())
            .await?;
        slot.publish(session.live_assessment());

        self.repository.save_interview(session.interview())?;
        self.repository.save_report(&report)?;
        session.mark_persisted();
        Ok(report)
    }

    /// Always permitted. The cancellation flag flips before waiting on an in-flight answer.
    /// Also saves a terminal interview whose last save failed.
    pub async fn abandon(&self, id: &InterviewId) -> Result<(), AssessmentServiceError> {
        let slot = self.slot(id)?;
        slot.cancel.store(true, Ordering::SeqCst);

        let mut session = slot.session.lock().await;
        if session.abandon(Utc::now()) {
            slot.publish(session.live_assessment());
            self.repository.save_interview(session.interview())?;
            if let Some(report) = session.report() {
                self.repository.save_report(report)?;
            }
            session.mark_persisted();
        }
        Ok(())
    }

    /// Last published snapshot. Does not wait for an in-flight judge call.
    pub fn live_assessment(&self, id: &InterviewId) -> Result<LiveAssessment, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let snapshot = slot
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(snapshot)
    }

    pub async fn interview(&self, id: &InterviewId) -> Result<Interview, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let session = slot.session.lock().await;
        Ok(session.interview().clone())
    }

    /// Re-saves the current record, e.g. after a failed save.
    pub async fn persist(&self, id: &InterviewId) -> Result<(), AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut session = slot.session.lock().await;
        self.repository.save_interview(session.interview())?;
        if let Some(report) = session.report() {
            self.repository.save_report(report)?;
        }
        session.mark_persisted();
        Ok(())
    }

    /// Loads an interview from the store and rebuilds its aggregation.
    /// An interview that is already registered is returned as is.
    pub async fn resume_interview(
        &self,
        id: &InterviewId,
    ) -> Result<Interview, AssessmentServiceError> {
        if let Ok(slot) = self.slot(id) {
            let session = slot.session.lock().await;
            return Ok(session.interview().clone());
        }

        let interview = self
            .repository
            .load_interview(id)?
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?;
        let rubric = self.catalog.load(&interview.template_id)?;
        info!(
            interview_id = %interview.id,
            turns = interview.turns.len(),
            state = %interview.state,
            "interview resumed"
        );
        self.register(InterviewSession::resume(interview.clone(), rubric));
        Ok(interview)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Rubric(#[from] RubricError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
    #[error("interview {0} not found")]
    NotFound(InterviewId),
}
