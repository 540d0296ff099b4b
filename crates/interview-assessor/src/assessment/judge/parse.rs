use super::{JudgeError, Judgment};

/// Parses raw model text into a [`Judgment`].
///
/// Models often wrap JSON in a Markdown fence, sometimes tagged `json`; both forms are
/// accepted. Anything that does not deserialize is [`JudgeError::MalformedOutput`].
pub fn parse_judgment(raw: &str) -> Result<Judgment, JudgeError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(JudgeError::MalformedOutput("empty response".to_string()));
    }
    serde_json::from_str(body).map_err(|err| JudgeError::MalformedOutput(err.to_string()))
}

/// Trims free-text model output; an empty reply counts as malformed.
pub fn parse_text(raw: &str) -> Result<String, JudgeError> {
    let text = strip_code_fence(raw).trim_matches('"').trim();
    if text.is_empty() {
        return Err(JudgeError::MalformedOutput("empty response".to_string()));
    }
    Ok(text.to_string())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    let inner = inner.trim_start();
    inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner)
        .trim()
}
