use super::super::domain::Interview;

const RULE_WIDTH: usize = 80;

/// Numbered Interviewer/Candidate transcript with failed judgments annotated.
pub(crate) fn build_transcript(interview: &Interview) -> String {
    let mut lines = Vec::with_capacity(interview.turns.len() * 6 + 4);
    lines.push(format!("Interview Transcript - {}", interview.id));
    lines.push(match interview.started_at {
        Some(started) => format!("Started: {}", started.to_rfc3339()),
        None => "Started: not started".to_string(),
    });
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(String::new());

    let mut entry = 0;
    for turn in &interview.turns {
        let timestamp = turn.timestamp.to_rfc3339();
        if !turn.question.trim().is_empty() {
            entry += 1;
            lines.push(format!("[{entry}] Interviewer ({timestamp}):"));
            lines.push(turn.question.clone());
            lines.push(String::new());
        }

        entry += 1;
        lines.push(format!("[{entry}] Candidate ({timestamp}):"));
        lines.push(turn.answer_text.clone());
        if let Some(kind) = turn.judge_error {
            lines.push(format!("(not assessed: judge {})", kind.label()));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
