//! Final report assembly.
//!
//! Scores, highlights and quotes are derived deterministically from the aggregation.
//! Only the follow-up questions and the summary paragraph come from the judge, and both
//! degrade gracefully when it fails: a failed follow-up is skipped, a failed summary falls
//! back to a fixed sentence.

mod synthesizer;
mod transcript;
mod views;

pub use views::{
    score_level_label, AssessmentReport, ConcernSeverity, FollowUpQuestion, LiveAssessment,
    LiveDimension, QuoteHighlight, ReportConcern, ReportDimensionScore, ReportStrength,
    REPORT_VERSION,
};

use super::aggregator::{DimensionAggregator, MAX_SCORE};
use super::domain::Interview;
use super::judge::{parse_text, FollowUpRequest, SummaryRequest, TurnJudge};
use super::rubric::Rubric;
use super::scoring::{weigh, ScoreCard};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything a report is computed from.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub interview: &'a Interview,
    pub rubric: &'a Rubric,
    pub aggregator: &'a DimensionAggregator,
    pub scorecard: &'a ScoreCard,
    pub generated_at: DateTime<Utc>,
}

pub struct ReportSynthesizer<'a, J: TurnJudge + ?Sized> {
    judge: &'a J,
}

impl<'a, J: TurnJudge + ?Sized> ReportSynthesizer<'a, J> {
    pub fn new(judge: &'a J) -> Self {
        Self { judge }
    }

    pub async fn synthesize(&self, input: SynthesisInput<'_>) -> AssessmentReport {
        let SynthesisInput {
            interview,
            rubric,
            aggregator,
            scorecard,
            generated_at,
        } = input;

        let dimension_scores = dimension_scores(scorecard, aggregator);
        let strengths = synthesizer::strengths(scorecard, aggregator);
        let concerns = synthesizer::concerns(scorecard, aggregator);
        let notable_quotes = synthesizer::notable_quotes(scorecard, aggregator);

        let mut warnings = interview.warnings.clone();
        let follow_up_questions = self
            .follow_ups(rubric, scorecard, aggregator, &mut warnings)
            .await;

        let strength_names: Vec<String> = strengths.iter().map(|s| s.dimension.clone()).collect();
        let concern_names: Vec<String> = concerns.iter().map(|c| c.dimension.clone()).collect();
        let summary = self
            .summary(
                SummaryRequest {
                    candidate: &interview.candidate,
                    overall_score: scorecard.overall_score,
                    recommendation: scorecard.recommendation,
                    questions_asked: interview.turns.len(),
                    strengths: &strength_names,
                    concerns: &concern_names,
                },
                &mut warnings,
            )
            .await;

        info!(
            interview_id = %interview.id,
            overall_score = scorecard.overall_score,
            recommendation = %scorecard.recommendation,
            confidence = %scorecard.confidence,
            "assessment report generated"
        );

        AssessmentReport {
            interview_id: interview.id.clone(),
            template_id: rubric.template_id().to_string(),
            candidate_name: interview.candidate.name.clone(),
            position: interview.candidate.position.clone(),
            interview_date: interview.started_at,
            duration_minutes: interview.duration_minutes(),
            overall_score: scorecard.overall_score,
            confidence: scorecard.confidence,
            recommendation: scorecard.recommendation,
            coverage: scorecard.coverage,
            judged_turns: interview.judged_turns(),
            failed_turns: interview.failed_turns(),
            dimension_scores,
            strengths,
            concerns,
            notable_quotes,
            follow_up_questions,
            summary,
            full_transcript: transcript::build_transcript(interview),
            warnings,
            generated_at,
            report_version: REPORT_VERSION,
        }
    }

    async fn follow_ups(
        &self,
        rubric: &Rubric,
        scorecard: &ScoreCard,
        aggregator: &DimensionAggregator,
        warnings: &mut Vec<String>,
    ) -> Vec<FollowUpQuestion> {
        let mut questions = Vec::new();

        for target in synthesizer::follow_up_targets(scorecard) {
            let Some(dimension) = rubric.dimension(&target.name) else {
                continue;
            };
            let reasoning = aggregator
                .state(&target.name)
                .and_then(|state| state.latest_reasoning());
            let request = FollowUpRequest {
                dimension,
                score: target.score,
                reasoning,
            };

            match self
                .judge
                .follow_up_question(rubric, request)
                .await
                .and_then(|text| parse_text(&text))
            {
                Ok(question) => questions.push(FollowUpQuestion {
                    question,
                    reason: match target.score {
                        Some(score) => format!(
                            "Further assess {} (current score: {score:.1}/5.0)",
                            target.name
                        ),
                        None => format!("{} was not assessed during the interview", target.name),
                    },
                    dimension: target.name.clone(),
                }),
                Err(err) => {
                    warn!(dimension = %target.name, error = %err, "follow-up generation failed");
                    warnings.push(format!(
                        "follow-up question for {} unavailable: {err}",
                        target.name
                    ));
                }
            }
        }

        questions
    }

    async fn summary(&self, request: SummaryRequest<'_>, warnings: &mut Vec<String>) -> String {
        let overall_score = request.overall_score;
        match self
            .judge
            .summarize(request)
            .await
            .and_then(|text| parse_text(&text))
        {
            Ok(summary) => summary,
            Err(err) => {
                warn!(error = %err, "summary generation failed, using fallback");
                warnings.push(format!("summary unavailable: {err}"));
                fallback_summary(overall_score)
            }
        }
    }
}

pub(crate) fn fallback_summary(overall_score: f64) -> String {
    format!("Candidate scored {overall_score:.2}/5.0 overall in the interview.")
}

fn dimension_scores(
    scorecard: &ScoreCard,
    aggregator: &DimensionAggregator,
) -> Vec<ReportDimensionScore> {
    scorecard
        .dimensions
        .iter()
        .map(|dimension| {
            let state = aggregator.state(&dimension.name);
            ReportDimensionScore {
                dimension_name: dimension.name.clone(),
                score: dimension.score,
                max_score: MAX_SCORE,
                percentage: dimension
                    .score
                    .map(|score| (score / MAX_SCORE * 1000.0).round() / 10.0),
                level: dimension.score.map(score_level_label),
                weight: dimension.weight,
                effective_weight: dimension.effective_weight,
                sample_count: dimension.sample_count,
                reasoning: state
                    .and_then(|state| state.latest_reasoning())
                    .map(str::to_string),
                evidence: state
                    .map(|state| {
                        state
                            .evidence()
                            .iter()
                            .filter(|item| !item.quote.trim().is_empty())
                            .map(|item| item.quote.clone())
                            .collect()
                    })
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Progress view over the current aggregation. Never calls the judge.
pub fn live_assessment(
    interview: &Interview,
    rubric: &Rubric,
    aggregator: &DimensionAggregator,
) -> LiveAssessment {
    let weighted = weigh(rubric, aggregator);

    LiveAssessment {
        interview_id: interview.id.clone(),
        state: interview.state,
        answered_turns: interview.turns.len(),
        judged_turns: interview.judged_turns(),
        failed_turns: interview.failed_turns(),
        coverage: weighted.coverage,
        provisional_score: weighted
            .overall_score
            .map(|score| score.clamp(0.0, MAX_SCORE)),
        dimensions: aggregator
            .iter()
            .map(|(name, state)| LiveDimension {
                name: name.to_string(),
                weight: rubric
                    .dimension(name)
                    .map(|dimension| dimension.weight())
                    .unwrap_or(0.0),
                sample_count: state.sample_count(),
                running_mean: state.running_mean(),
                evidence_count: state.evidence().len(),
                latest_quote: state.evidence().last().map(|item| item.quote.clone()),
            })
            .collect(),
    }
}
