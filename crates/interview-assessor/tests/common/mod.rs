#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use interview_assessor::assessment::{
    AssessmentReport, AssessmentService, CandidateProfile, DirectoryRubricSource,
    FollowUpRequest, Interview, InterviewId, InterviewRepository, JudgeError, Judgment,
    ReplayJudge, ReplayStep, RepositoryError, Rubric, RubricCatalog, ScoringEngine,
    SummaryRequest, Turn, TurnJudge,
};

pub const TEMPLATE_ID: &str = "backend-engineer";
pub const TECHNICAL: &str = "Technical Knowledge";
pub const PROBLEM_SOLVING: &str = "Problem-Solving Approach";
pub const COMMUNICATION: &str = "Communication";
pub const COLLABORATION: &str = "Collaboration";

/// Repository double with switchable failures.
#[derive(Default)]
pub struct MemoryRepository {
    interviews: Mutex<HashMap<InterviewId, Interview>>,
    reports: Mutex<Vec<AssessmentReport>>,
    failing_saves: AtomicUsize,
    failing_report_saves: AtomicUsize,
}

impl MemoryRepository {
    pub fn fail_next_saves(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_report_saves(&self, count: usize) {
        self.failing_report_saves.store(count, Ordering::SeqCst);
    }

    pub fn stored(&self, id: &InterviewId) -> Option<Interview> {
        self.interviews
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }

    pub fn reports(&self) -> Vec<AssessmentReport> {
        self.reports
            .lock()
            .expect("repository mutex poisoned")
            .clone()
    }

    fn take_failure(counter: &AtomicUsize) -> Result<(), RepositoryError> {
        let failed = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            Err(RepositoryError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl InterviewRepository for MemoryRepository {
    fn save_interview(&self, interview: &Interview) -> Result<(), RepositoryError> {
        Self::take_failure(&self.failing_saves)?;
        self.interviews
            .lock()
            .expect("repository mutex poisoned")
            .insert(interview.id.clone(), interview.clone());
        Ok(())
    }

    fn save_report(&self, report: &AssessmentReport) -> Result<(), RepositoryError> {
        Self::take_failure(&self.failing_report_saves)?;
        self.reports
            .lock()
            .expect("repository mutex poisoned")
            .push(report.clone());
        Ok(())
    }

    fn load_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.stored(id))
    }
}

pub fn template_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

pub fn catalog() -> Arc<RubricCatalog> {
    Arc::new(RubricCatalog::new(DirectoryRubricSource::new(vec![
        template_dir(),
    ])))
}

pub fn service<J: TurnJudge + 'static>(
    repository: Arc<MemoryRepository>,
    judge: Arc<J>,
) -> AssessmentService<MemoryRepository, J> {
    service_with_catalog(catalog(), repository, judge)
}

pub fn service_with_catalog<J: TurnJudge + 'static>(
    catalog: Arc<RubricCatalog>,
    repository: Arc<MemoryRepository>,
    judge: Arc<J>,
) -> AssessmentService<MemoryRepository, J> {
    AssessmentService::new(catalog, repository, judge, ScoringEngine::default())
}

/// Shipped template text with its declared id replaced.
pub fn template_declaring(template_id: &str) -> String {
    std::fs::read_to_string(template_dir().join("backend-engineer-assessment.yaml"))
        .expect("shipped template readable")
        .replacen(
            "template_id: backend-engineer",
            &format!("template_id: {template_id}"),
            1,
        )
}

pub fn candidate() -> CandidateProfile {
    CandidateProfile::new("Sam Okafor", "Backend Engineer")
}

pub fn judged(entries: &[(&str, f64, &[&str])]) -> ReplayStep {
    ReplayStep::Judged(
        entries
            .iter()
            .fold(Judgment::new(), |judgment, (name, score, quotes)| {
                judgment.score(*name, *score, quotes)
            }),
    )
}

/// Replays judgments after a fixed delay.
pub struct SlowJudge {
    pub replay: ReplayJudge,
    pub delay: Duration,
}

#[async_trait]
impl TurnJudge for SlowJudge {
    async fn judge(
        &self,
        rubric: &Rubric,
        transcript: &[Turn],
        question: &str,
        answer: &str,
    ) -> Result<Judgment, JudgeError> {
        tokio::time::sleep(self.delay).await;
        self.replay.judge(rubric, transcript, question, answer).await
    }

    async fn follow_up_question(
        &self,
        rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        self.replay.follow_up_question(rubric, request).await
    }

    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        self.replay.summarize(request).await
    }
}

/// Holds any answer containing "hold" until the test releases it.
pub struct GatedJudge {
    pub replay: ReplayJudge,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedJudge {
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            replay: ReplayJudge::new(steps),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl TurnJudge for GatedJudge {
    async fn judge(
        &self,
        rubric: &Rubric,
        transcript: &[Turn],
        question: &str,
        answer: &str,
    ) -> Result<Judgment, JudgeError> {
        if answer.contains("hold") {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.replay.judge(rubric, transcript, question, answer).await
    }

    async fn follow_up_question(
        &self,
        rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        self.replay.follow_up_question(rubric, request).await
    }

    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        self.replay.summarize(request).await
    }
}
