use crate::constants::CONTENT_TYPE_JSON;
use http::StatusCode;

/// Outcome of classifying a Chef Server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Human readable description of the status.
    pub description: String,
    /// Whether the response must be treated as a failure.
    pub error: bool,
}

impl Verdict {
    fn ok(description: &str) -> Self {
        Self {
            description: description.to_string(),
            error: false,
        }
    }

    fn error(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            error: true,
        }
    }
}

/// Map a status code and content type to a verdict.
///
/// The payload is never looked at. A success status is still an error unless
/// the whole content type is `application/json`, ignoring case. A `charset`
/// or any other parameter makes it a different content type.
pub fn classify(status: StatusCode, content_type: Option<&str>) -> Verdict {
    let verdict = match status.as_u16() {
        200 => Verdict::ok("ok"),
        201 => Verdict::ok("created"),
        400 => Verdict::error("contents not formatted correctly"),
        401 => Verdict::error("not authorized"),
        403 => Verdict::error("forbidden"),
        404 => Verdict::error("not found"),
        409 => Verdict::error("conflict, object already exists"),
        code => Verdict::error(format!("unexpected status code: {code}")),
    };

    if !verdict.error && !is_json(content_type) {
        return Verdict::error("unexpected response content type");
    }
    verdict
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|v| v.trim().eq_ignore_ascii_case(CONTENT_TYPE_JSON))
}
