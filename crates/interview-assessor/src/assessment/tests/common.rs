use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::assessment::domain::{CandidateProfile, Interview, InterviewId, Turn};
use crate::assessment::judge::{
    EvidenceQuote, FollowUpRequest, JudgeError, Judgment, ReplayJudge, ReplayStep,
    SummaryRequest, TurnJudge,
};
use crate::assessment::rubric::{parse_rubric, Rubric, RubricFormat};
use crate::assessment::session::InterviewSession;

pub(super) fn rubric_yaml(template_id: &str, weights: &[(&str, f64)]) -> String {
    let mut yaml = format!("template_id: {template_id}\nversion: \"2.1\"\ndimensions:\n");
    for (name, weight) in weights {
        yaml.push_str(&format!(
            "  - name: {name}\n    description: How the candidate handles {name}\n    weight: {weight}\n    keywords: [{lower}]\n    levels:\n",
            lower = name.to_lowercase()
        ));
        for score in 1..=5 {
            yaml.push_str(&format!(
                "      - {{score: {score}, label: L{score}, description: \"{name} level {score}\"}}\n"
            ));
        }
    }
    yaml
}

pub(super) fn rubric(weights: &[(&str, f64)]) -> Arc<Rubric> {
    Arc::new(
        parse_rubric(&rubric_yaml("backend-engineer", weights), RubricFormat::Yaml)
            .expect("fixture rubric is valid"),
    )
}

pub(super) fn two_dimension_rubric() -> Arc<Rubric> {
    rubric(&[("Technical", 0.5), ("Communication", 0.5)])
}

pub(super) fn five_dimension_rubric() -> Arc<Rubric> {
    rubric(&[
        ("Technical", 0.2),
        ("Communication", 0.2),
        ("Problem Solving", 0.2),
        ("Culture", 0.2),
        ("Leadership", 0.2),
    ])
}

pub(super) fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

pub(super) fn candidate() -> CandidateProfile {
    CandidateProfile::new("Riley Chen", "Backend Engineer")
}

pub(super) fn interview(id: &str) -> Interview {
    Interview::new(
        InterviewId(id.to_string()),
        "backend-engineer",
        candidate(),
        at(0),
    )
}

pub(super) fn judged(entries: &[(&str, f64, &[&str])]) -> ReplayStep {
    ReplayStep::Judged(judgment(entries))
}

pub(super) fn judgment(entries: &[(&str, f64, &[&str])]) -> Judgment {
    entries
        .iter()
        .fold(Judgment::new(), |judgment, (name, score, quotes)| {
            judgment.score(*name, *score, quotes)
        })
}

pub(super) fn started_session(rubric: Arc<Rubric>) -> InterviewSession {
    let mut session = InterviewSession::new(interview("interview-test"), rubric);
    session.start(at(1)).expect("fresh session starts");
    session.mark_persisted();
    session
}

/// Runs every answer through the session, one minute apart.
pub(super) async fn answer_all<J: TurnJudge>(
    session: &mut InterviewSession,
    judge: &J,
    answers: &[&str],
) {
    for (offset, answer) in answers.iter().enumerate() {
        session
            .submit_answer(judge, answer, at(2 + offset as i64))
            .await
            .expect("answer accepted");
        session.mark_persisted();
    }
}

/// Replays judgments but refuses to generate follow-ups for some dimensions or a summary.
pub(super) struct ScriptedJudge {
    pub(super) replay: ReplayJudge,
    pub(super) failing_follow_ups: BTreeSet<String>,
    pub(super) summary: Option<String>,
}

impl ScriptedJudge {
    pub(super) fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            replay: ReplayJudge::new(steps),
            failing_follow_ups: BTreeSet::new(),
            summary: None,
        }
    }

    pub(super) fn failing_follow_up(mut self, dimension: &str) -> Self {
        self.failing_follow_ups.insert(dimension.to_string());
        self
    }

    pub(super) fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }
}

#[async_trait]
impl TurnJudge for ScriptedJudge {
    async fn judge(
        &self,
        rubric: &Rubric,
        transcript: &[Turn],
        question: &str,
        answer: &str,
    ) -> Result<Judgment, JudgeError> {
        self.replay.judge(rubric, transcript, question, answer).await
    }

    async fn follow_up_question(
        &self,
        _rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        let name = request.dimension.name();
        if self.failing_follow_ups.contains(name) {
            return Err(JudgeError::ProviderError("generation refused".to_string()));
        }
        Ok(format!("Tell me more about {name}?"))
    }

    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        match &self.summary {
            Some(summary) => Ok(format!("{summary} ({})", request.recommendation)),
            None => Err(JudgeError::Timeout),
        }
    }
}

/// Flips the session's cancellation flag while the judgment is "in flight".
pub(super) struct CancellingJudge {
    pub(super) flag: Arc<AtomicBool>,
}

#[async_trait]
impl TurnJudge for CancellingJudge {
    async fn judge(
        &self,
        _rubric: &Rubric,
        _transcript: &[Turn],
        _question: &str,
        _answer: &str,
    ) -> Result<Judgment, JudgeError> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(Judgment::new().with_dimension(
            "Technical",
            crate::assessment::judge::DimensionJudgment::new(
                5.0,
                vec![EvidenceQuote::new("discarded", "")],
            ),
        ))
    }

    async fn follow_up_question(
        &self,
        _rubric: &Rubric,
        _request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        Err(JudgeError::Timeout)
    }

    async fn summarize(&self, _request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        Err(JudgeError::Timeout)
    }
}
