//! Client-side error type.

use serde::Deserialize;

/// Failure reported by an API call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The resource does not exist on the server.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request with a structured error body.
    #[error("request rejected ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the response body.
        code: String,
        /// Human-readable message from the response body.
        message: String,
    },

    /// The request never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Subset of the server's error body we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl ClientError {
    /// Build an API error from a status and a (possibly unparseable) body.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: Option<ErrorBody>) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Self::NotFound;
        }
        let body = body.unwrap_or(ErrorBody {
            code: None,
            message: None,
        });
        Self::Api {
            status: status.as_u16(),
            code: body.code.unwrap_or_else(|| "unknown".to_owned()),
            message: body
                .message
                .unwrap_or_else(|| "no error detail provided".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_statuses_collapse_to_the_variant() {
        let error = ClientError::from_status(reqwest::StatusCode::NOT_FOUND, None);
        assert!(matches!(error, ClientError::NotFound));
    }

    #[rstest]
    fn structured_bodies_are_surfaced() {
        let error = ClientError::from_status(
            reqwest::StatusCode::CONFLICT,
            Some(ErrorBody {
                code: Some("conflict".to_owned()),
                message: Some("username already taken".to_owned()),
            }),
        );
        match error {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "conflict");
                assert!(message.contains("username"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn missing_bodies_fall_back_to_placeholders() {
        let error = ClientError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, None);
        match error {
            ClientError::Api { code, .. } => assert_eq!(code, "unknown"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
