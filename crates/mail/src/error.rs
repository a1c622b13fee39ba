//! Error taxonomy for authentication and remote API calls

use thiserror::Error;

/// Failures while obtaining or persisting a credential
#[derive(Debug, Error)]
pub enum AuthError {
    /// Interactive consent is required but no client secret could be loaded
    #[error("no client secret available for interactive consent: {0}")]
    MissingClientSecret(String),

    /// The consent flow was cancelled by the user or failed
    #[error("OAuth consent failed: {0}")]
    ConsentFailed(String),

    /// The remote refused to exchange the refresh token
    #[error("refresh token rejected: {0}")]
    RefreshRejected(String),

    /// The token endpoint could not be reached; the stored token is still usable later
    #[error("token endpoint unreachable: {0}")]
    Unreachable(String),

    /// The token store could not be read or written
    #[error("token store error: {0}")]
    TokenStore(String),
}

/// Failures returned by a remote API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote answered with a non-success status
    #[error("{operation} failed with HTTP status {status}")]
    Status { operation: &'static str, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset...)
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The response body could not be decoded
    #[error("{operation} returned a malformed payload: {message}")]
    Payload {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    /// Map a ureq error for `operation` onto the API taxonomy
    pub(crate) fn from_ureq(operation: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => ApiError::Status { operation, status },
            ureq::Error::Json(e) => ApiError::Payload {
                operation,
                message: e.to_string(),
            },
            other => ApiError::Transport {
                operation,
                message: other.to_string(),
            },
        }
    }
}

/// Any failure surfaced by the mail crate
#[derive(Debug, Error)]
pub enum MailError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ApiError::Status {
            operation: "list messages",
            status: 503,
        };
        assert_eq!(err.to_string(), "list messages failed with HTTP status 503");
    }

    #[test]
    fn test_mail_error_is_transparent() {
        let err: MailError = AuthError::RefreshRejected("invalid_grant".into()).into();
        assert_eq!(err.to_string(), "refresh token rejected: invalid_grant");
        assert!(matches!(err, MailError::Auth(AuthError::RefreshRejected(_))));
    }

    #[test]
    fn test_from_ureq_status() {
        let err = ApiError::from_ureq("get message", ureq::Error::StatusCode(404));
        assert!(matches!(
            err,
            ApiError::Status {
                operation: "get message",
                status: 404
            }
        ));
    }
}
