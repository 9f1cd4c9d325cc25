use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storefront answered with a non-200 status. The page endpoints
    /// return 200 even for unknown SKUs, so anything else is treated as a
    /// transient upstream problem.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// All retry attempts were consumed without a success.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },

    /// Expected markup was missing or malformed. Retrying fetches the same
    /// document, so this is never retried.
    #[error("parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    /// No credential set has ever been published to the store.
    #[error("no session credentials available")]
    CredentialsUnavailable,

    /// The current credential set aged past its TTL and no refresh arrived
    /// within the wait bound.
    #[error("session credentials stale for {age_secs}s and no refresh arrived")]
    CredentialsStale { age_secs: i64 },

    /// A configured endpoint could not be parsed as a URL base.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`ScrapeError::Http`] — network-level failure (connection reset, timeout, DNS).
/// - [`ScrapeError::Status`] — the storefront intermittently serves 403/5xx to
///   authenticated sessions; a fresh attempt usually clears it.
///
/// Not retriable (propagated immediately):
/// - [`ScrapeError::Parse`] — the same document would fail the same way.
/// - [`ScrapeError::CredentialsUnavailable`] / [`ScrapeError::CredentialsStale`]
///   — waiting on the refresher, not re-requesting, is the fix.
/// - [`ScrapeError::RetryExhausted`] — already the result of a retry loop.
/// - [`ScrapeError::InvalidBaseUrl`] — configuration defect.
pub(crate) fn is_retriable(err: &ScrapeError) -> bool {
    matches!(err, ScrapeError::Http(_) | ScrapeError::Status { .. })
}
