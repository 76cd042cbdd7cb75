//! A thin, blocking wrapper around three endpoints of the
//! [OpenAI API](https://platform.openai.com/docs/api-reference): chat completions,
//! embeddings and image generation.
//!
//! Requests go through [`transport::Transport`], which opens a fresh connection per
//! call and releases it before returning.

mod auth;
pub mod endpoints;
pub mod error;
pub mod transport;

pub use auth::{AuthTokenProvider, EnvironmentAuthTokenProvider, StaticAuthTokenProvider};
use endpoints::OpenAIRequestProvider;
pub use error::{OpenAIError, OpenAIResult};
use serde::Deserialize;
use transport::{ReqwestSession, Session, Transport};

/// The base URL used by [`OpenAI::new`].
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

/// A handle to OpenAI.
pub struct OpenAI<Auth, S = ReqwestSession> {
    transport: Transport<S>,
    auth: Auth,
    base_url: String,
}

impl<Auth> OpenAI<Auth>
where
    Auth: AuthTokenProvider,
{
    /// Creates a new instance of OpenAI with the provided auth, talking to [`API_BASE_URL`].
    pub fn new(auth: Auth) -> OpenAIResult<Self> {
        Self::with_base_url(auth, API_BASE_URL)
    }

    /// Creates a new instance of OpenAI that sends requests under `base_url`
    /// instead, e.g. a proxy or a compatible server.
    pub fn with_base_url(auth: Auth, base_url: impl Into<String>) -> OpenAIResult<Self> {
        Ok(Self::with_transport(auth, base_url, Transport::open()?))
    }
}

impl<Auth, S> OpenAI<Auth, S>
where
    Auth: AuthTokenProvider,
    S: Session,
{
    /// Creates a new instance of OpenAI on top of an already opened transport.
    pub fn with_transport(auth: Auth, base_url: impl Into<String>, transport: Transport<S>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            transport,
            auth,
            base_url,
        }
    }

    /// Sends a request to the OpenAI API.
    pub fn req<R: OpenAIRequestProvider>(&self, r: &R) -> OpenAIResult<R::Response> {
        endpoints::send_request(self, r)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Releases the underlying HTTP session. Later requests fail with a transport error.
    pub fn close(&mut self) {
        self.transport.close();
    }
}

/// The token usage of a request. Counters the API leaves out read as zero.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
