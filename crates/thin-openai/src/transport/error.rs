/// Boxed source error carried by the transport failure kinds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Failure of a single HTTP round-trip, one variant per step that can fail.
///
/// A non-2xx status is not a transport failure: it comes back as an ordinary
/// [`super::Response`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to initialize http session: {0}")]
    SessionInit(#[source] BoxError),
    #[error("failed to parse url `{url}`: {reason}")]
    UrlParse { url: String, reason: String },
    #[error("failed to connect to server: {0}")]
    Connection(#[source] BoxError),
    #[error("failed to create request: {0}")]
    RequestCreate(#[source] BoxError),
    #[error("failed to send request: {0}")]
    Send(#[source] BoxError),
    #[error("failed to receive response: {0}")]
    Receive(#[source] BoxError),
    #[error("http session is closed")]
    SessionClosed,
}

impl TransportError {
    pub(crate) fn url_parse(url: &str, reason: impl ToString) -> Self {
        Self::UrlParse {
            url: url.to_owned(),
            reason: reason.to_string(),
        }
    }
}
