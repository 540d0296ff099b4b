use super::judge::{JudgeErrorKind, Judgment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for interview sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterviewId(pub String);

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a single interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    Created,
    InProgress,
    Completed,
    Abandoned,
}

impl InterviewState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who is being interviewed and for what role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub position: String,
}

impl CandidateProfile {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
        }
    }
}

/// One question/answer exchange. Append-only; a judged turn is never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub index: usize,
    pub question: String,
    pub answer_text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judgment: Option<Judgment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_error: Option<JudgeErrorKind>,
}

impl Turn {
    pub fn is_judged(&self) -> bool {
        self.judgment.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.judge_error.is_some()
    }
}

/// Interview record as handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub template_id: String,
    pub candidate: CandidateProfile,
    pub state: InterviewState,
    pub turns: Vec<Turn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_question: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Data-quality notes such as dropped judgment entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Interview {
    pub fn new(
        id: InterviewId,
        template_id: impl Into<String>,
        candidate: CandidateProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            template_id: template_id.into(),
            candidate,
            state: InterviewState::Created,
            turns: Vec::new(),
            pending_question: None,
            created_at,
            started_at: None,
            ended_at: None,
            warnings: Vec::new(),
        }
    }

    pub fn judged_turns(&self) -> usize {
        self.turns.iter().filter(|turn| turn.is_judged()).count()
    }

    pub fn failed_turns(&self) -> usize {
        self.turns.iter().filter(|turn| turn.is_failed()).count()
    }

    /// Minutes between start and end, to one decimal.
    pub fn duration_minutes(&self) -> Option<f64> {
        let (started, ended) = (self.started_at?, self.ended_at?);
        let seconds = (ended - started).num_milliseconds() as f64 / 1000.0;
        Some((seconds / 60.0 * 10.0).round() / 10.0)
    }
}
