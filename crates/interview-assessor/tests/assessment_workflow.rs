//! End-to-end interview lifecycle through the public service facade, scored against the
//! shipped backend-engineer template.

mod common;

use std::sync::Arc;

use common::*;
use interview_assessor::assessment::{
    AssessmentServiceError, ConfidenceLevel, InterviewId, InterviewState, JudgeErrorKind,
    Recommendation, ReplayJudge, ReplayStep, RubricError, SessionError,
};

fn recorded_steps() -> Vec<ReplayStep> {
    vec![
        judged(&[
            (TECHNICAL, 4.5, &["tail latency shows queueing first"]),
            (PROBLEM_SOLVING, 4.0, &["check the deploy log"]),
        ]),
        ReplayStep::Failed(JudgeErrorKind::Timeout),
        judged(&[(TECHNICAL, 4.0, &[]), (COMMUNICATION, 3.0, &["um, so"])]),
    ]
}

#[tokio::test]
async fn interview_runs_from_creation_to_report() {
    let repository = Arc::new(MemoryRepository::default());
    let judge = Arc::new(ReplayJudge::new(recorded_steps()).with_summary("Promising candidate."));
    let service = service(Arc::clone(&repository), judge);

    let interview = service
        .create_interview(TEMPLATE_ID, candidate())
        .expect("template loads");
    let id = interview.id.clone();
    assert_eq!(interview.state, InterviewState::Created);
    assert_eq!(
        repository.stored(&id).expect("saved on creation").state,
        InterviewState::Created
    );

    match service.submit_answer(&id, "too early").await {
        Err(AssessmentServiceError::Session(SessionError::InvalidState {
            state: InterviewState::Created,
            ..
        })) => {}
        other => panic!("expected invalid state, got {other:?}"),
    }

    service.start(&id).await.expect("starts");
    service
        .record_question(&id, "How would you debug a latency spike?")
        .await
        .expect("question recorded");
    let first = service
        .submit_answer(&id, "I would check the deploy log first.")
        .await
        .expect("first answer");
    assert!(first.judged);
    let second = service
        .submit_answer(&id, "Something about replicas.")
        .await
        .expect("judge timeout is absorbed");
    assert_eq!(second.judge_error, Some(JudgeErrorKind::Timeout));
    let third = service
        .submit_answer(&id, "Um, so, we would add an index.")
        .await
        .expect("third answer");
    assert_eq!(third.snapshot.answered_turns, 3);

    let live = service.live_assessment(&id).expect("snapshot available");
    assert_eq!(live.judged_turns, 2);
    assert_eq!(live.failed_turns, 1);
    assert_eq!(live.coverage, 0.75);

    let report = service.complete(&id).await.expect("completes");
    // (4.25 * 0.35 + 4.0 * 0.30 + 3.0 * 0.20) / 0.85
    assert!((report.overall_score - 3.2875 / 0.85).abs() < 1e-9);
    assert_eq!(report.recommendation, Recommendation::Hire);
    assert_eq!(report.coverage, 0.75);
    // Medium by coverage, lowered by one unjudged answer in three.
    assert_eq!(report.confidence, ConfidenceLevel::Low);
    assert_eq!(report.summary, "Promising candidate.");
    assert_eq!(report.candidate_name, "Sam Okafor");
    assert!(report
        .follow_up_questions
        .iter()
        .any(|item| item.dimension == COLLABORATION));

    let again = service.complete(&id).await.expect("idempotent");
    assert!(Arc::ptr_eq(&report, &again));

    service.abandon(&id).await.expect("abandon is always permitted");
    let stored = repository.stored(&id).expect("persisted");
    assert_eq!(stored.state, InterviewState::Completed);
    assert_eq!(stored.turns.len(), 3);
    assert_eq!(
        stored.turns[0].question,
        "How would you debug a latency spike?"
    );
    assert_eq!(repository.reports().last(), Some(report.as_ref()));
}

#[tokio::test]
async fn unknown_templates_and_interviews_are_rejected() {
    let repository = Arc::new(MemoryRepository::default());
    let service = service(repository, Arc::new(ReplayJudge::default()));

    match service.create_interview("astronaut", candidate()) {
        Err(AssessmentServiceError::Rubric(RubricError::NotFound(id))) => {
            assert_eq!(id, "astronaut")
        }
        other => panic!("expected missing template, got {other:?}"),
    }

    let missing = InterviewId("interview-missing".to_string());
    assert!(matches!(
        service.live_assessment(&missing),
        Err(AssessmentServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.resume_interview(&missing).await,
        Err(AssessmentServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn completion_requires_a_judged_turn() {
    let repository = Arc::new(MemoryRepository::default());
    let judge = Arc::new(ReplayJudge::new(vec![ReplayStep::Failed(
        JudgeErrorKind::ProviderError,
    )]));
    let service = service(repository, judge);
    let id = service
        .create_interview(TEMPLATE_ID, candidate())
        .expect("created")
        .id;
    service.start(&id).await.expect("started");
    service
        .submit_answer(&id, "an answer nobody judged")
        .await
        .expect("failure absorbed");

    assert!(matches!(
        service.complete(&id).await,
        Err(AssessmentServiceError::Session(SessionError::InsufficientData))
    ));
    let live = service.live_assessment(&id).expect("still live");
    assert_eq!(live.state, InterviewState::InProgress);
}

#[tokio::test]
async fn resumed_interview_continues_where_it_stopped() {
    let repository = Arc::new(MemoryRepository::default());
    let first_service = service(
        Arc::clone(&repository),
        Arc::new(ReplayJudge::new(recorded_steps())),
    );
    let id = first_service
        .create_interview(TEMPLATE_ID, candidate())
        .expect("created")
        .id;
    first_service.start(&id).await.expect("started");
    first_service
        .submit_answer(&id, "first")
        .await
        .expect("judged");

    let second_service = service(
        Arc::clone(&repository),
        Arc::new(ReplayJudge::new(vec![judged(&[(COLLABORATION, 5.0, &[])])])),
    );
    let resumed = second_service
        .resume_interview(&id)
        .await
        .expect("loaded from store");
    assert_eq!(resumed.turns.len(), 1);

    let live = second_service.live_assessment(&id).expect("registered");
    assert_eq!(live.judged_turns, 1);
    assert_eq!(live.coverage, 0.5);

    let outcome = second_service
        .submit_answer(&id, "second")
        .await
        .expect("continues");
    assert_eq!(outcome.turn_index, 1);
    assert_eq!(outcome.snapshot.coverage, 0.75);
}
