use super::aggregator::DimensionAggregator;
use super::domain::{Interview, InterviewState, Turn};
use super::judge::{JudgeErrorKind, TurnJudge};
use super::report::{self, AssessmentReport, LiveAssessment, ReportSynthesizer, SynthesisInput};
use super::rubric::Rubric;
use super::scoring::{ScoringEngine, TurnTally};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Invalid lifecycle operation or not enough data to assess.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {operation} while interview is {state}")]
    InvalidState {
        operation: &'static str,
        state: InterviewState,
    },
    #[error("interview has no judged turns to assess")]
    InsufficientData,
}

/// Result of one `submit_answer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub turn_index: usize,
    pub judged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_error: Option<JudgeErrorKind>,
    /// Judgment entries that were dropped while folding this turn.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub snapshot: LiveAssessment,
}

/// Most recent mutation not yet acknowledged by the store. Every save writes the whole
/// record, so only the latest one matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnsavedChange {
    Started,
    Question,
    Answer(usize),
    Completed,
    Abandoned,
}

/// One interview's state machine together with its running aggregation.
///
/// The session never persists anything itself; callers save [`InterviewSession::interview`]
/// after each mutation and acknowledge with [`InterviewSession::mark_persisted`].
#[derive(Debug)]
pub struct InterviewSession {
    interview: Interview,
    rubric: Arc<Rubric>,
    aggregator: DimensionAggregator,
    report: Option<Arc<AssessmentReport>>,
    cancel: Arc<AtomicBool>,
    unsaved: Option<UnsavedChange>,
}

impl InterviewSession {
    pub fn new(interview: Interview, rubric: Arc<Rubric>) -> Self {
        let aggregator = DimensionAggregator::new(&rubric);
        Self {
            interview,
            rubric,
            aggregator,
            report: None,
            cancel: Arc::new(AtomicBool::new(false)),
            unsaved: None,
        }
    }

    /// Restores a stored interview, re-folding its judged turns.
    pub fn resume(interview: Interview, rubric: Arc<Rubric>) -> Self {
        let aggregator = DimensionAggregator::rebuild(&rubric, &interview.turns);
        Self {
            interview,
            rubric,
            aggregator,
            report: None,
            cancel: Arc::new(AtomicBool::new(false)),
            unsaved: None,
        }
    }

    pub fn interview(&self) -> &Interview {
        &self.interview
    }

    pub fn rubric(&self) -> &Arc<Rubric> {
        &self.rubric
    }

    pub fn aggregator(&self) -> &DimensionAggregator {
        &self.aggregator
    }

    pub fn state(&self) -> InterviewState {
        self.interview.state
    }

    pub fn report(&self) -> Option<&Arc<AssessmentReport>> {
        self.report.as_ref()
    }

    /// Flag that `abandon` flips without waiting for an in-flight judge call.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn require(&self, expected: InterviewState, operation: &'static str) -> Result<(), SessionError> {
        if self.interview.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.interview.state,
            })
        }
    }

    /// Whether a mutation has not been acknowledged with [`InterviewSession::mark_persisted`].
    pub fn is_dirty(&self) -> bool {
        self.unsaved.is_some()
    }

    /// Created → InProgress. Repeating a start whose save failed is accepted.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.unsaved == Some(UnsavedChange::Started) {
            return Ok(());
        }
        self.require(InterviewState::Created, "start")?;
        self.interview.state = InterviewState::InProgress;
        self.interview.started_at = Some(now);
        self.unsaved = Some(UnsavedChange::Started);
        info!(interview_id = %self.interview.id, "interview started");
        Ok(())
    }

    /// Stores the interviewer's question; the next answer's turn carries it.
    pub fn record_question(&mut self, question: &str) -> Result<(), SessionError> {
        self.require(InterviewState::InProgress, "record_question")?;
        self.interview.pending_question = Some(question.trim().to_string());
        self.unsaved = Some(UnsavedChange::Question);
        Ok(())
    }

    pub async fn submit_answer<J>(
        &mut self,
        judge: &J,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError>
    where
        J: TurnJudge + ?Sized,
    {
        self.require(InterviewState::InProgress, "submit_answer")?;
        if self.cancel.load(Ordering::SeqCst) {
            self.abandon(now);
            return Err(SessionError::InvalidState {
                operation: "submit_answer",
                state: self.interview.state,
            });
        }

        // A resubmission after a failed save must not append a second turn.
        if let Some(outcome) = self.replay_unsaved(answer) {
            return Ok(outcome);
        }

        let question = self.interview.pending_question.clone().unwrap_or_default();
        let index = self.interview.turns.len();
        let result = judge
            .judge(&self.rubric, &self.interview.turns, &question, answer)
            .await;

        if self.cancel.load(Ordering::SeqCst) {
            info!(
                interview_id = %self.interview.id,
                turn_index = index,
                "discarding judgment for abandoned interview"
            );
            self.abandon(now);
            return Err(SessionError::InvalidState {
                operation: "submit_answer",
                state: self.interview.state,
            });
        }

        let mut turn = Turn {
            index,
            question,
            answer_text: answer.to_string(),
            timestamp: now,
            judgment: None,
            judge_error: None,
        };
        let mut warnings = Vec::new();

        match result {
            Ok(judgment) => {
                let fold = self.aggregator.apply(index, &judgment);
                warnings = fold.warnings;
                turn.judgment = Some(judgment);
            }
            Err(err) => {
                warn!(
                    interview_id = %self.interview.id,
                    turn_index = index,
                    error = %err,
                    "judge failed, keeping turn unassessed"
                );
                turn.judge_error = Some(err.kind());
            }
        }

        self.interview.warnings.extend(warnings.iter().cloned());
        self.interview.pending_question = None;
        self.interview.turns.push(turn);
        self.unsaved = Some(UnsavedChange::Answer(index));

        Ok(self.outcome_for(index, warnings))
    }

    fn replay_unsaved(&self, answer: &str) -> Option<AnswerOutcome> {
        let Some(UnsavedChange::Answer(index)) = self.unsaved else {
            return None;
        };
        let turn = self.interview.turns.get(index)?;
        (turn.answer_text == answer).then(|| self.outcome_for(index, Vec::new()))
    }

    fn outcome_for(&self, index: usize, warnings: Vec<String>) -> AnswerOutcome {
        let turn = &self.interview.turns[index];
        AnswerOutcome {
            turn_index: index,
            judged: turn.is_judged(),
            judge_error: turn.judge_error,
            warnings,
            snapshot: self.live_assessment(),
        }
    }

    /// Acknowledges that the current record reached the store.
    pub fn mark_persisted(&mut self) {
        self.unsaved = None;
    }

    /// Freezes the turns and builds the report once. Later calls return the same report.
    pub async fn complete<J>(
        &mut self,
        judge: &J,
        scoring: &ScoringEngine,
        now: DateTime<Utc>,
    ) -> Result<Arc<AssessmentReport>, SessionError>
    where
        J: TurnJudge + ?Sized,
    {
        if let Some(report) = &self.report {
            return Ok(Arc::clone(report));
        }

        match self.interview.state {
            InterviewState::InProgress => {
                if self.interview.judged_turns() == 0 || self.aggregator.total_samples() == 0 {
                    return Err(SessionError::InsufficientData);
                }
                self.interview.state = InterviewState::Completed;
                self.interview.ended_at = Some(now);
                self.interview.pending_question = None;
                self.unsaved = Some(UnsavedChange::Completed);
            }
            // Completed but loaded without its report.
            InterviewState::Completed => {}
            state => {
                return Err(SessionError::InvalidState {
                    operation: "complete",
                    state,
                })
            }
        }

        let scorecard = scoring.score(
            &self.rubric,
            &self.aggregator,
            TurnTally {
                answered: self.interview.turns.len(),
                failed: self.interview.failed_turns(),
            },
        );
        let report = ReportSynthesizer::new(judge)
            .synthesize(SynthesisInput {
                interview: &self.interview,
                rubric: &self.rubric,
                aggregator: &self.aggregator,
                scorecard: &scorecard,
                generated_at: now,
            })
            .await;

        info!(
            interview_id = %self.interview.id,
            turns = self.interview.turns.len(),
            "interview completed"
        );
        let report = Arc::new(report);
        self.report = Some(Arc::clone(&report));
        Ok(report)
    }

    /// Moves a live interview to Abandoned, keeping its turns.
    ///
    /// Returns whether the record needs saving: true after a transition, and also for a
    /// terminal interview whose last change never reached the store.
    pub fn abandon(&mut self, now: DateTime<Utc>) -> bool {
        if self.interview.state.is_terminal() {
            return self.is_dirty();
        }
        self.interview.state = InterviewState::Abandoned;
        self.interview.ended_at = Some(now);
        self.unsaved = Some(UnsavedChange::Abandoned);
        info!(
            interview_id = %self.interview.id,
            turns = self.interview.turns.len(),
            "interview abandoned"
        );
        true
    }

    pub fn live_assessment(&self) -> LiveAssessment {
        report::live_assessment(&self.interview, &self.rubric, &self.aggregator)
    }
}
