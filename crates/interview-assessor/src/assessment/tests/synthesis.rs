use super::common::*;
use crate::assessment::judge::{JudgeErrorKind, ReplayJudge, ReplayStep};
use crate::assessment::report::{score_level_label, AssessmentReport, ConcernSeverity};
use crate::assessment::rubric::Rubric;
use crate::assessment::scoring::{Recommendation, ScoringEngine};
use crate::assessment::session::InterviewSession;
use std::sync::Arc;

async fn report_for(
    rubric: Arc<Rubric>,
    judge: &ScriptedJudge,
    answers: &[&str],
) -> Arc<AssessmentReport> {
    let mut session = started_session(rubric);
    answer_all(&mut session, judge, answers).await;
    session
        .complete(judge, &ScoringEngine::default(), at(31))
        .await
        .expect("interview completes")
}

#[tokio::test]
async fn strengths_take_top_three_with_earliest_quotes() {
    let judge = ScriptedJudge::new(vec![
        judged(&[
            ("Technical", 4.0, &["a1", "a2"]),
            ("Communication", 5.0, &["c1"]),
            ("Problem Solving", 4.0, &[]),
            ("Culture", 4.2, &["cu"]),
            ("Leadership", 2.0, &["l1"]),
        ]),
        judged(&[("Technical", 5.0, &["a3"])]),
    ]);

    let report = report_for(five_dimension_rubric(), &judge, &["first", "second"]).await;

    let ranked: Vec<_> = report
        .strengths
        .iter()
        .map(|strength| (strength.dimension.as_str(), strength.score))
        .collect();
    assert_eq!(
        ranked,
        vec![("Communication", 5.0), ("Technical", 4.5), ("Culture", 4.2)]
    );
    let technical = &report.strengths[1];
    assert_eq!(technical.title, "Strong Technical");
    assert_eq!(technical.evidence, vec!["a1".to_string(), "a2".to_string()]);
    assert_eq!(technical.description, "Scored 4.5/5.0 in Technical");
}

#[tokio::test]
async fn concerns_rank_weakest_first_with_severity() {
    let judge = ScriptedJudge::new(vec![judged(&[
        ("Technical", 4.5, &[]),
        ("Communication", 1.0, &["um"]),
        ("Problem Solving", 1.5, &[]),
        ("Culture", 2.5, &[]),
        ("Leadership", 3.0, &[]),
    ])]);

    let report = report_for(five_dimension_rubric(), &judge, &["only answer"]).await;

    let ranked: Vec<_> = report
        .concerns
        .iter()
        .map(|concern| (concern.dimension.as_str(), concern.severity))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Communication", ConcernSeverity::Major),
            ("Problem Solving", ConcernSeverity::Major),
            ("Culture", ConcernSeverity::Moderate),
        ]
    );
    assert_eq!(report.concerns[0].title, "Improvement Needed in Communication");
    assert_eq!(report.concerns[0].evidence, vec!["um".to_string()]);
}

#[test]
fn severity_bands_are_closed_above() {
    assert_eq!(ConcernSeverity::from_score(3.0), ConcernSeverity::Minor);
    assert_eq!(ConcernSeverity::from_score(2.51), ConcernSeverity::Minor);
    assert_eq!(ConcernSeverity::from_score(2.5), ConcernSeverity::Moderate);
    assert_eq!(ConcernSeverity::from_score(1.51), ConcernSeverity::Moderate);
    assert_eq!(ConcernSeverity::from_score(1.5), ConcernSeverity::Major);
}

#[tokio::test]
async fn notable_quotes_prefer_longest_then_earliest_turn() {
    let judge = ScriptedJudge::new(vec![
        judged(&[
            ("Technical", 4.0, &["tied quote A", "tiny"]),
            ("Communication", 5.0, &["longest communication quote here", "short"]),
        ]),
        judged(&[("Technical", 4.0, &["tied quote B"])]),
    ]);

    let report = report_for(two_dimension_rubric(), &judge, &["one", "two"]).await;

    let quotes: Vec<_> = report
        .notable_quotes
        .iter()
        .map(|quote| (quote.dimension.as_str(), quote.quote.as_str(), quote.turn_index))
        .collect();
    assert_eq!(
        quotes,
        vec![
            ("Communication", "longest communication quote here", 0),
            ("Technical", "tied quote A", 0),
        ]
    );
}

#[tokio::test]
async fn dimensions_without_evidence_yield_no_quote() {
    let judge = ScriptedJudge::new(vec![judged(&[("Technical", 4.0, &[])])]);

    let report = report_for(two_dimension_rubric(), &judge, &["terse"]).await;

    assert!(report.notable_quotes.is_empty());
    assert!(report.strengths[0].evidence.is_empty());
}

#[tokio::test]
async fn follow_ups_cover_weak_and_unassessed_dimensions() {
    let rubric = rubric(&[("Technical", 0.4), ("Communication", 0.3), ("Culture", 0.3)]);
    let judge = ScriptedJudge::new(vec![judged(&[
        ("Technical", 4.0, &[]),
        ("Communication", 3.5, &[]),
    ])]);

    let report = report_for(rubric, &judge, &["answer"]).await;

    let follow_ups: Vec<_> = report
        .follow_up_questions
        .iter()
        .map(|item| (item.dimension.as_str(), item.reason.as_str()))
        .collect();
    assert_eq!(
        follow_ups,
        vec![
            (
                "Communication",
                "Further assess Communication (current score: 3.5/5.0)"
            ),
            ("Culture", "Culture was not assessed during the interview"),
        ]
    );
    assert_eq!(
        report.follow_up_questions[1].question,
        "Tell me more about Culture?"
    );
}

#[tokio::test]
async fn failed_follow_up_is_omitted_without_failing_completion() {
    let rubric = rubric(&[("Technical", 0.4), ("Communication", 0.3), ("Culture", 0.3)]);
    let judge = ScriptedJudge::new(vec![judged(&[
        ("Technical", 2.0, &[]),
        ("Communication", 3.0, &[]),
    ])])
    .failing_follow_up("Communication");

    let report = report_for(rubric, &judge, &["answer"]).await;

    let dimensions: Vec<_> = report
        .follow_up_questions
        .iter()
        .map(|item| item.dimension.as_str())
        .collect();
    assert_eq!(dimensions, vec!["Technical", "Culture"]);
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.starts_with("follow-up question for Communication unavailable")));
}

#[tokio::test]
async fn summary_comes_from_judge_or_falls_back() {
    let steps = || {
        vec![
            judged(&[("Technical", 4.0, &[]), ("Communication", 3.0, &[])]),
            judged(&[("Technical", 5.0, &[])]),
        ]
    };

    let drafted = ScriptedJudge::new(steps()).with_summary("Solid backend candidate");
    let report = report_for(two_dimension_rubric(), &drafted, &["a", "b"]).await;
    assert_eq!(report.recommendation, Recommendation::Hire);
    assert_eq!(report.summary, "Solid backend candidate (Hire)");

    let silent = ScriptedJudge::new(steps());
    let report = report_for(two_dimension_rubric(), &silent, &["a", "b"]).await;
    assert_eq!(
        report.summary,
        "Candidate scored 3.75/5.0 overall in the interview."
    );
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.starts_with("summary unavailable")));
}

#[tokio::test]
async fn dimension_scores_carry_percentage_and_level() {
    let judge = ScriptedJudge::new(vec![
        judged(&[("Technical", 4.0, &["t"]), ("Communication", 3.0, &[])]),
        judged(&[("Technical", 5.0, &[])]),
    ]);

    let report = report_for(two_dimension_rubric(), &judge, &["a", "b"]).await;

    let technical = &report.dimension_scores[0];
    assert_eq!(technical.dimension_name, "Technical");
    assert_eq!(technical.percentage, Some(90.0));
    assert_eq!(technical.level, Some("Excellent"));
    assert_eq!(technical.effective_weight, Some(0.5));
    assert_eq!(technical.evidence, vec!["t".to_string()]);
    let communication = &report.dimension_scores[1];
    assert_eq!(communication.percentage, Some(60.0));
    assert_eq!(communication.level, Some("Good"));
    assert_eq!(report.duration_minutes, Some(30.0));
    assert_eq!(report.interview_date, Some(at(1)));
    assert_eq!(report.template_id, "backend-engineer");
}

#[test]
fn score_levels_follow_half_point_bands() {
    let labels: Vec<_> = [1.0, 1.49, 1.5, 2.5, 3.49, 3.5, 4.49, 4.5, 5.0]
        .into_iter()
        .map(score_level_label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "Poor",
            "Poor",
            "Fair",
            "Good",
            "Good",
            "Very Good",
            "Very Good",
            "Excellent",
            "Excellent"
        ]
    );
}

#[tokio::test]
async fn transcript_numbers_entries_and_flags_unjudged_turns() {
    let judge = ReplayJudge::new(vec![
        judged(&[("Technical", 4.0, &[])]),
        ReplayStep::Failed(JudgeErrorKind::Timeout),
    ]);
    let mut session = InterviewSession::new(interview("interview-test"), two_dimension_rubric());
    session.start(at(1)).expect("starts");
    session
        .record_question("Describe your last outage.")
        .expect("question recorded");
    session
        .submit_answer(&judge, "We lost a replica.", at(2))
        .await
        .expect("first answer");
    session.mark_persisted();
    session
        .submit_answer(&judge, "Then we rebuilt it.", at(3))
        .await
        .expect("second answer");

    let report = session
        .complete(&judge, &ScoringEngine::default(), at(10))
        .await
        .expect("completes");
    let transcript = &report.full_transcript;

    assert!(transcript.starts_with("Interview Transcript - interview-test\nStarted: "));
    assert!(transcript.contains("[1] Interviewer ("));
    assert!(transcript.contains("Describe your last outage.\n"));
    assert!(transcript.contains("[2] Candidate ("));
    assert!(transcript.contains("[3] Candidate ("));
    assert!(!transcript.contains("[4]"));
    assert!(transcript.contains("Then we rebuilt it.\n(not assessed: judge timeout)"));
}
