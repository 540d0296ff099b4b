use interview_assessor::assessment::{AnswerOutcome, AssessmentReport, Rubric};

pub(crate) fn render_rubric(rubric: &Rubric) {
    println!(
        "Rubric {} (version {})",
        rubric.template_id(),
        rubric.version()
    );
    for dimension in rubric.dimensions() {
        println!(
            "  - {:<28} weight {:.2}  keywords {}",
            dimension.name(),
            dimension.weight(),
            dimension.keywords().len()
        );
    }
    println!("  {} dimension(s), weights sum to 1.0", rubric.dimensions().len());
}

pub(crate) fn render_progress(outcome: &AnswerOutcome) {
    let snapshot = &outcome.snapshot;
    let status = match outcome.judge_error {
        Some(kind) => format!("not assessed ({})", kind.label()),
        None => "judged".to_string(),
    };
    let provisional = snapshot
        .provisional_score
        .map(|score| format!("{score:.2}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  answer {:>2}: {:<28} provisional {}  coverage {:.0}%",
        outcome.turn_index + 1,
        status,
        provisional,
        snapshot.coverage * 100.0
    );
}

pub(crate) fn render_report(report: &AssessmentReport) {
    println!("\nAssessment report for {} ({})", report.candidate_name, report.position);
    println!(
        "Interview {} | template {} | {} judged, {} not assessed",
        report.interview_id, report.template_id, report.judged_turns, report.failed_turns
    );
    if let Some(minutes) = report.duration_minutes {
        println!("Duration: {minutes:.1} minutes");
    }
    println!(
        "Overall: {:.2}/5.0  Recommendation: {}  Confidence: {}  Coverage: {:.0}%",
        report.overall_score,
        report.recommendation,
        report.confidence,
        report.coverage * 100.0
    );

    println!("\nDimensions");
    for dimension in &report.dimension_scores {
        match (dimension.score, dimension.level) {
            (Some(score), Some(level)) => println!(
                "  - {:<28} {:.2}/5.0 {:<10} weight {:.2} samples {}",
                dimension.dimension_name, score, level, dimension.weight, dimension.sample_count
            ),
            _ => println!(
                "  - {:<28} not assessed    weight {:.2}",
                dimension.dimension_name, dimension.weight
            ),
        }
    }

    if !report.strengths.is_empty() {
        println!("\nStrengths");
        for strength in &report.strengths {
            println!("  - {} ({:.1})", strength.title, strength.score);
            for quote in &strength.evidence {
                println!("      \"{quote}\"");
            }
        }
    }

    if !report.concerns.is_empty() {
        println!("\nConcerns");
        for concern in &report.concerns {
            println!(
                "  - {} ({:.1}, {})",
                concern.title,
                concern.score,
                concern.severity.label()
            );
        }
    }

    if !report.notable_quotes.is_empty() {
        println!("\nNotable quotes");
        for highlight in &report.notable_quotes {
            println!(
                "  - [{}] \"{}\" (answer {})",
                highlight.dimension,
                highlight.quote,
                highlight.turn_index + 1
            );
        }
    }

    if !report.follow_up_questions.is_empty() {
        println!("\nFollow-up questions");
        for follow_up in &report.follow_up_questions {
            println!("  - {}", follow_up.question);
            println!("      {}", follow_up.reason);
        }
    }

    println!("\nSummary\n  {}", report.summary);

    if !report.warnings.is_empty() {
        println!("\nWarnings");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
}
