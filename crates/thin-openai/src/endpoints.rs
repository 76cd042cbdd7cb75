use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    auth,
    error::OpenAIResponseExt,
    transport::{Headers, Method, Session},
    OpenAI, OpenAIResult,
};

pub mod chat;
pub mod embeddings;
pub mod images;

#[instrument(level = "debug", skip_all, fields(method = %R::METHOD, path = %R::path_with_leading_slash()))]
pub(super) fn send_request<Auth, S, R>(
    openai: &OpenAI<Auth, S>,
    request: &R,
) -> OpenAIResult<R::Response>
where
    Auth: auth::AuthTokenProvider,
    S: Session,
    R: OpenAIRequestProvider,
{
    let bearer_token = openai
        .auth
        .resolve()
        .ok_or(crate::error::OpenAIError::MissingAuthToken)?;

    let mut headers = Headers::new();
    headers.insert(
        "Authorization".to_owned(),
        format!("Bearer {bearer_token}"),
    );
    headers.insert("Content-Type".to_owned(), "application/json".to_owned());

    // only POST carries a payload, GET and DELETE go out bodyless
    let body = match R::METHOD {
        Method::Post => serde_json::to_vec(request)?,
        Method::Get | Method::Delete => Vec::new(),
    };

    let url = format!("{}{}", openai.base_url, R::path_with_leading_slash());
    let response = openai
        .transport
        .request(R::METHOD, &url, &body, &headers)?;

    if !response.is_success() {
        error!(
            status = response.status_code,
            body = %response.text(),
            "API request failed"
        );
        return Err(response.openai_failure());
    }

    debug!(status = response.status_code, "API request succeeded");
    response.openai_response_json()
}

mod private {
    pub trait Sealed {}
}

/// Any type that can be sent to the client's `req` method.
pub trait OpenAIRequestProvider: Serialize + private::Sealed {
    type Response: for<'de> Deserialize<'de>;
    const METHOD: Method;

    fn path_with_leading_slash() -> String;
}
