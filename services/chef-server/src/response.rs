use http::StatusCode;

/// Outcome of executing one [`ChefCommand`](crate::ChefCommand).
///
/// Protocol failures are not errors here, check [`ChefResponse::is_error`].
#[derive(Debug, Clone)]
pub struct ChefResponse<T> {
    /// Http status code.
    pub status: StatusCode,
    /// Human readable description of the status.
    pub description: String,
    /// Set for any non success status or a non json content type.
    pub error: bool,
    /// Decoded body, only for successful non raw commands.
    pub result: Option<T>,
    /// Body as string, only for raw commands.
    pub raw: Option<String>,
    /// base64(sha1(response body)).
    pub content_hash: String,
}

impl<T> ChefResponse<T> {
    /// Whether the response must be treated as a failure.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Take the decoded result.
    pub fn into_result(self) -> Option<T> {
        self.result
    }
}
