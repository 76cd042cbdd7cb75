//! Blocking HTTP round-trips.
//!
//! A [`Transport`] owns one [`Session`] and turns every call to
//! [`Transport::request`] into a fresh connection and request pair. Both are
//! released before `request` returns, whether it succeeded or not. Bodies are
//! opaque bytes and status codes are handed back uninterpreted.

use std::{borrow::Cow, fmt};

use indexmap::IndexMap;
use tracing::{debug, instrument, trace, warn};

mod error;
mod reqwest_stack;
mod stack;
mod target;

pub use error::{BoxError, TransportError, TransportResult};
pub use reqwest_stack::{ReqwestConnection, ReqwestRequest, ReqwestSession, TransportConfig};
pub use stack::{Connection, PendingRequest, Session};
pub use target::{Scheme, Target};

/// Request headers, sent in insertion order. Inserting an existing name replaces its value.
pub type Headers = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete response. There is no partial variant: a call either produces
/// one of these or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// `0` when the stack could not report a status.
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Performs synchronous HTTP requests over a single session.
///
/// Not meant to be shared between threads; use one transport per thread or
/// serialize the calls.
pub struct Transport<S = ReqwestSession> {
    session: Option<S>,
}

impl Transport<ReqwestSession> {
    /// Opens a `reqwest` backed session with the default configuration.
    pub fn open() -> TransportResult<Self> {
        Self::open_with(&TransportConfig::default())
    }

    pub fn open_with(config: &TransportConfig) -> TransportResult<Self> {
        ReqwestSession::open(config).map(Self::with_session)
    }
}

impl<S> Transport<S>
where
    S: Session,
{
    /// Wraps an already opened session.
    pub fn with_session(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The live session, or `None` once [`Transport::close`] has run.
    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    /// Sends one request and reads the whole response.
    ///
    /// `body` is sent as-is when non-empty; an empty body means no entity at
    /// all. Headers are attached in iteration order.
    ///
    /// If the body stream fails midway, the bytes read so far are returned as
    /// the body and the failure is only logged.
    #[instrument(level = "debug", skip(self, body, headers), fields(body_len = body.len()))]
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: &[u8],
        headers: &Headers,
    ) -> TransportResult<Response> {
        let session = self.session.as_ref().ok_or(TransportError::SessionClosed)?;
        let target = Target::parse(url)?;

        // `request` is declared after `connection`, so it is always dropped first.
        let connection = session.connect(&target)?;
        let mut request = connection.open_request(method, target.path(), target.is_secure())?;

        for (name, value) in headers {
            request.add_header(name, value);
        }

        request.send(body)?;
        request.receive_response()?;

        let status_code = request.status_code().unwrap_or(0);
        let body = drain(&mut request);
        debug!(status_code, response_len = body.len(), "response received");

        Ok(Response { status_code, body })
    }

    /// Releases the session. Further requests fail with
    /// [`TransportError::SessionClosed`]. Calling this twice is harmless.
    pub fn close(&mut self) {
        self.release();
    }
}

impl<S> Transport<S> {
    fn release(&mut self) {
        if self.session.take().is_some() {
            trace!("http session released");
        }
    }
}

impl<S> Drop for Transport<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Reads whatever the request has available until it reports nothing more.
/// A failing query or read ends the loop with what was gathered so far.
fn drain<R: PendingRequest>(request: &mut R) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let available = match request.query_data_available() {
            Ok(0) => break,
            Ok(available) => available,
            Err(err) => {
                warn!(error = %err, received = body.len(), "response body truncated");
                break;
            }
        };

        let mut chunk = vec![0; available];
        match request.read_data(&mut chunk) {
            Ok(0) => break,
            Ok(read) => body.extend_from_slice(&chunk[..read]),
            Err(err) => {
                warn!(error = %err, received = body.len(), "response body truncated");
                break;
            }
        }
    }
    body
}
