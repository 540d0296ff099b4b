use super::{
    FollowUpRequest, JudgeError, JudgeErrorKind, Judgment, SummaryRequest, TurnJudge,
};
use crate::assessment::domain::Turn;
use crate::assessment::rubric::Rubric;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// One recorded judge outcome for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Judged(Judgment),
    Failed(JudgeErrorKind),
}

/// Deterministic judge that plays back recorded outcomes in answer order.
///
/// Used to regenerate a report from a recorded interview and as the scripted stand-in for
/// the model in tests. Follow-up questions and the summary come from recorded text when
/// present and from fixed templates otherwise.
#[derive(Debug, Default)]
pub struct ReplayJudge {
    steps: Mutex<VecDeque<ReplayStep>>,
    follow_ups: BTreeMap<String, String>,
    summary: Option<String>,
}

impl ReplayJudge {
    pub fn new(steps: impl IntoIterator<Item = ReplayStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            follow_ups: BTreeMap::new(),
            summary: None,
        }
    }

    pub fn with_follow_up(mut self, dimension: impl Into<String>, question: impl Into<String>) -> Self {
        self.follow_ups.insert(dimension.into(), question.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl TurnJudge for ReplayJudge {
    async fn judge(
        &self,
        _rubric: &Rubric,
        transcript: &[Turn],
        _question: &str,
        _answer: &str,
    ) -> Result<Judgment, JudgeError> {
        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            Some(ReplayStep::Judged(judgment)) => Ok(judgment),
            Some(ReplayStep::Failed(JudgeErrorKind::Timeout)) => Err(JudgeError::Timeout),
            Some(ReplayStep::Failed(JudgeErrorKind::MalformedOutput)) => Err(
                JudgeError::MalformedOutput("recorded malformed output".to_string()),
            ),
            Some(ReplayStep::Failed(JudgeErrorKind::ProviderError)) => Err(
                JudgeError::ProviderError("recorded provider error".to_string()),
            ),
            None => Err(JudgeError::ProviderError(format!(
                "no recorded judgment for answer {}",
                transcript.len() + 1
            ))),
        }
    }

    async fn follow_up_question(
        &self,
        _rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        let name = request.dimension.name();
        if let Some(question) = self.follow_ups.get(name) {
            return Ok(question.clone());
        }

        Ok(match request.score {
            Some(_) => format!(
                "Walk me through a recent project where your {} was put to the test. What would you do differently now?",
                name.to_lowercase()
            ),
            None => format!(
                "We did not get to {} today. Can you describe a situation that shows how you approach it?",
                name.to_lowercase()
            ),
        })
    }

    async fn summarize(&self, _request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        self.summary
            .clone()
            .ok_or_else(|| JudgeError::ProviderError("no summary recorded".to_string()))
    }
}
