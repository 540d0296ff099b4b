use super::{FollowUpRequest, JudgeError, Judgment, SummaryRequest, TurnJudge};
use crate::assessment::domain::Turn;
use crate::assessment::rubric::Rubric;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Bounds every call to an inner judge, mapping an elapsed deadline to [`JudgeError::Timeout`].
#[derive(Debug)]
pub struct TimeoutJudge<J> {
    inner: J,
    limit: Duration,
}

impl<J> TimeoutJudge<J> {
    pub fn new(inner: J, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn into_inner(self) -> J {
        self.inner
    }
}

#[async_trait]
impl<J> TurnJudge for TimeoutJudge<J>
where
    J: TurnJudge,
{
    async fn judge(
        &self,
        rubric: &Rubric,
        transcript: &[Turn],
        question: &str,
        answer: &str,
    ) -> Result<Judgment, JudgeError> {
        match tokio::time::timeout(
            self.limit,
            self.inner.judge(rubric, transcript, question, answer),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(limit_ms = self.limit.as_millis() as u64, "judge call timed out");
                Err(JudgeError::Timeout)
            }
        }
    }

    async fn follow_up_question(
        &self,
        rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError> {
        tokio::time::timeout(self.limit, self.inner.follow_up_question(rubric, request))
            .await
            .unwrap_or(Err(JudgeError::Timeout))
    }

    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, JudgeError> {
        tokio::time::timeout(self.limit, self.inner.summarize(request))
            .await
            .unwrap_or(Err(JudgeError::Timeout))
    }
}
