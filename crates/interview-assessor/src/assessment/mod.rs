//! Interview assessment engine.
//!
//! Answers flow session → judge → aggregator; on completion the scoring engine and the
//! report synthesizer run once over the final aggregation.

pub mod aggregator;
pub mod domain;
pub mod judge;
pub mod report;
pub mod repository;
pub mod rubric;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use aggregator::{
    AggregationError, CollectedEvidence, DimensionAggregator, DimensionState, FoldSummary,
    MAX_SCORE, MIN_SCORE,
};
pub use domain::{CandidateProfile, Interview, InterviewId, InterviewState, Turn};
pub use judge::{
    parse_judgment, parse_text, DimensionJudgment, EvidenceQuote, FollowUpRequest, JudgeError,
    JudgeErrorKind, Judgment, ReplayJudge, ReplayStep, SummaryRequest, TimeoutJudge, TurnJudge,
};
pub use report::{
    live_assessment, score_level_label, AssessmentReport, ConcernSeverity, FollowUpQuestion,
    LiveAssessment, LiveDimension, QuoteHighlight, ReportConcern, ReportDimensionScore,
    ReportStrength, ReportSynthesizer, SynthesisInput, REPORT_VERSION,
};
pub use repository::{InterviewRepository, RepositoryError};
pub use rubric::{
    load_rubric_file, parse_rubric, Dimension, DimensionDocument, DirectoryRubricSource, Rubric,
    RubricCatalog, RubricDocument, RubricError, RubricFormat, RubricSource, ScoreLevel,
    SourceDocument, StaticRubricSource,
};
pub use scoring::{
    ConfidenceLevel, DimensionScore, Recommendation, ScoreCard, ScoringEngine, ScoringPolicy,
    TurnTally,
};
pub use service::{AssessmentService, AssessmentServiceError};
pub use session::{AnswerOutcome, InterviewSession, SessionError};
