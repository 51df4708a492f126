//! Provider error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model or deployment was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The API answered but the reply had no text in it.
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Retrying cannot help: bad credentials or an unknown model.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Server-suggested wait before the next attempt.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a failed `send()` to a provider error.
pub(crate) fn send_error(err: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(err.to_string())
    }
}

/// Pass successful responses through; turn HTTP failures into errors.
///
/// `{"error": {"message": ...}}` bodies are unwrapped to their message.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            .saturating_mul(1000);
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 404 {
        return Err(ProviderError::ModelNotFound(model.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(message));
    }
    Err(ProviderError::ApiError { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanence() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("gpt-9".into()).is_permanent());
        assert!(!ProviderError::Timeout(120).is_permanent());
        assert!(!ProviderError::EmptyCompletion.is_permanent());
        assert!(!ProviderError::RateLimited { retry_after_ms: 1 }.is_permanent());
    }

    #[test]
    fn retry_hint_only_for_rate_limits() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(ProviderError::NetworkError("x".into()).retry_after_ms(), None);
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err: anyhow::Error = ProviderError::ModelNotFound("gpt-4o".into()).into();
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert!(provider_err.is_permanent());
    }
}
