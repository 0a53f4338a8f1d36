use panelqc_types::{ExternalFindings, Violation};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FindingsLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },

    #[error("no JSON payload found")]
    NoPayload,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<Violation>),
    Envelope(ExternalFindings),
}

impl From<Payload> for ExternalFindings {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::List(violations) => ExternalFindings::from_violations(violations),
            Payload::Envelope(findings) => findings,
        }
    }
}

/// Parse findings out of raw collaborator output.
///
/// Candidates are tried in order: the whole text, fenced code blocks, then the widest
/// `{...}` and `[...]` spans. The first candidate that deserializes wins.
pub fn parse_findings(text: &str) -> Result<ExternalFindings, FindingsLoadError> {
    let mut last_error = None;

    for candidate in candidates(text) {
        match serde_json::from_str::<Payload>(candidate) {
            Ok(payload) => return Ok(payload.into()),
            Err(e) => {
                debug!(error = %e, "findings candidate rejected");
                last_error = Some(FindingsLoadError::Json {
                    message: e.to_string(),
                });
            }
        }
    }

    Err(last_error.unwrap_or(FindingsLoadError::NoPayload))
}

fn candidates(text: &str) -> Vec<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut out = vec![text];
    out.extend(fenced_blocks(text));
    out.extend(span(text, '{', '}'));
    out.extend(span(text, '[', ']'));
    out.retain(|c| c.starts_with('{') || c.starts_with('['));
    out.dedup();
    out
}

/// Bodies of ``` fenced blocks, with any info string (`json`) stripped.
fn fenced_blocks(text: &str) -> Vec<&str> {
    text.split("```")
        .skip(1)
        .step_by(2)
        .map(|block| {
            let body = block.strip_prefix("json").unwrap_or(block);
            body.trim()
        })
        .filter(|body| !body.is_empty())
        .collect()
}

fn span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_has_no_payload() {
        assert_eq!(parse_findings("  \n"), Err(FindingsLoadError::NoPayload));
        assert_eq!(
            parse_findings("no structured output here"),
            Err(FindingsLoadError::NoPayload)
        );
    }

    #[test]
    fn fenced_block_is_extracted() {
        let text = "Here is my review:\n```json\n{\"violations\": [{\"violation_id\": \"LLM_1\"}]}\n```\nThanks.";
        let findings = parse_findings(text).expect("parse");
        assert_eq!(findings.violations[0].violation_id, "LLM_1");
    }

    #[test]
    fn bare_array_is_accepted() {
        let findings = parse_findings(r#"[{"violation_id": "A"}, {"violation_id": "B"}]"#)
            .expect("parse");
        assert_eq!(findings.violations.len(), 2);
        assert!(!findings.needs_engineer_review);
    }

    #[test]
    fn prose_wrapped_object_is_extracted() {
        let text = r#"Final answer: {"additional_violations": [], "needs_engineer_review": true} done"#;
        assert!(parse_findings(text).expect("parse").needs_engineer_review);
    }

    #[test]
    fn envelope_with_two_violation_keys_is_rejected() {
        let text = r#"{"additional_violations": [{"violation_id": "A"}], "violations": [{"violation_id": "B"}]}"#;
        let err = parse_findings(text).unwrap_err();
        assert!(matches!(err, FindingsLoadError::Json { .. }), "{err}");
    }

    #[test]
    fn broken_json_reports_parse_error() {
        let err = parse_findings(r#"{"violations": [ "#).unwrap_err();
        assert!(matches!(err, FindingsLoadError::Json { .. }));
    }
}
