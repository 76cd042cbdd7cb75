use serde::Deserialize;

use crate::transport::{Response, TransportError};

pub type OpenAIResult<T> = std::result::Result<T, OpenAIError>;

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to (de)serialize api payload: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("missing auth token")]
    MissingAuthToken,
    #[error("OpenAI API error: {0}")]
    API(OpenAIAPIError),
    #[error("API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: String },
    #[error("OpenAI refused to generate response: {0}")]
    Refusal(String),
}

#[derive(Debug, Deserialize, Clone, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAIAPIError {
    #[error("invalid request: {}", .0.message)]
    InvalidRequestError(OpenAIAPIErrorData),
    #[error("model context length exceeded")]
    ContextLengthExceeded(OpenAIAPIErrorData),
    #[error("cloudflare service unavailable")]
    CfServiceUnavailable(OpenAIAPIErrorData),
    #[error("transient server error")]
    ServerError(OpenAIAPIErrorData),
    #[error("cloudflare bad gateway")]
    CfBadGateway(OpenAIAPIErrorData),
    #[error("quota exceeded")]
    QuotaExceeded(OpenAIAPIErrorData),
    #[error("insufficient quota")]
    InsufficientQuota(OpenAIAPIErrorData),
    #[error("internal error")]
    InternalError(OpenAIAPIErrorData),
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAIAPIErrorData {
    pub message: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

pub(crate) trait OpenAIResponseExt {
    /// Decodes a successful body, turning a top level `error` object into [`OpenAIError::API`].
    fn openai_response_json<T>(&self) -> OpenAIResult<T>
    where
        T: for<'de> Deserialize<'de>;

    /// The error for a non-2xx response: the API's own error when the body carries
    /// a recognizable one, [`OpenAIError::ApiRequestFailed`] otherwise.
    fn openai_failure(&self) -> OpenAIError;
}

impl OpenAIResponseExt for Response {
    fn openai_response_json<T>(&self) -> OpenAIResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let json = serde_json::from_slice::<serde_json::Value>(&self.body)?;
        match json.get("error") {
            Some(err) => {
                let api_err = serde_json::from_value(err.clone())?;
                Err(OpenAIError::API(api_err))
            }
            None => serde_json::from_value(json).map_err(Into::into),
        }
    }

    fn openai_failure(&self) -> OpenAIError {
        match self.openai_response_json::<serde_json::Value>() {
            Err(api_err @ OpenAIError::API(_)) => api_err,
            _ => OpenAIError::ApiRequestFailed {
                status: self.status_code,
                body: self.text().into_owned(),
            },
        }
    }
}
