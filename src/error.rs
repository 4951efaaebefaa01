use thiserror::Error;

/// Longest response body fragment kept in a [`PollError::Request`].
const BODY_SNIPPET_LEN: usize = 500;

/// Startup configuration failures. Fatal: the poll loop never starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfiguration(Vec<&'static str>),
}

/// Everything that can go wrong inside a single poll cycle.
///
/// All variants are recoverable: the orchestrator reports them and tries
/// again after the next sleep.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Failed to connect to API {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Endpoint {endpoint} is unavailable. Status: {status} ({reason}), body: {body}")]
    Request {
        endpoint: String,
        status: u16,
        reason: String,
        body: String,
    },
    #[error("Failed to decode API response: {0}")]
    Decode(String),
    #[error("Unexpected API response: {0}")]
    ResponseShape(String),
    #[error("Wrong type in API response: {0}")]
    Type(String),
    #[error("Homework record is missing the \"{0}\" field")]
    MissingField(&'static str),
    #[error("Undocumented homework status: {0}")]
    UnknownStatus(String),
}

/// Cut a response body down to a loggable fragment without splitting a char.
pub fn body_snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LEN;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_lists_every_name() {
        let err = ConfigError::MissingConfiguration(vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: PRACTICUM_TOKEN, TELEGRAM_CHAT_ID"
        );
    }

    #[test]
    fn test_short_body_kept_whole() {
        assert_eq!(body_snippet("not found"), "not found");
    }

    #[test]
    fn test_long_body_truncated_on_char_boundary() {
        let body = "ж".repeat(400);
        let snippet = body_snippet(&body);
        assert!(snippet.ends_with("..."));
        assert!(snippet.len() <= BODY_SNIPPET_LEN + 3);
    }

    #[test]
    fn test_request_error_message() {
        let err = PollError::Request {
            endpoint: "https://example.com/api/".to_string(),
            status: 503,
            reason: "Service Unavailable".to_string(),
            body: "down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Endpoint https://example.com/api/ is unavailable. Status: 503 (Service Unavailable), body: down"
        );
    }
}
