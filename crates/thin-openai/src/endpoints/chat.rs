use std::borrow::Cow;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{transport::Method, OpenAIError, OpenAIResult, Usage};

use super::OpenAIRequestProvider;

/// The model used for a chat completion.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Model {
    #[serde(rename = "gpt-4o-2024-11-20")]
    Gpt4o_2024_11_20,
    #[serde(rename = "gpt-4o-2024-08-06")]
    Gpt4o_2024_08_06,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    /// Any other model id, sent verbatim.
    #[serde(untagged)]
    Other(String),
}

/// The role of the message used for the chat completion.
#[derive(Serialize, Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The system message, describing the task to the model.
    System,
    /// The user message, i.e. the payload into the model.
    User,
    /// The assistant message, i.e. the model's response.
    Assistant,
}

/// A chat completion message. You can pre-populate the request with user and
/// assistant messages (alongside the system message) to provide context for the
/// completion.
#[derive(Serialize, Debug, Clone, Builder)]
#[builder(start_fn = role)]
pub struct Message<'a> {
    #[builder(start_fn)]
    role: Role,
    content: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Cow<'a, str>>,
}

#[macro_export]
macro_rules! system_message {
    ($($arg:tt)*) => {
        $crate::endpoints::chat::Message::role(
            $crate::endpoints::chat::Role::System
        )
        .content(format!($($arg)*).into())
        .build()
    };
}

#[macro_export]
macro_rules! user_message {
    ($($arg:tt)*) => {
        $crate::endpoints::chat::Message::role(
            $crate::endpoints::chat::Role::User
        )
        .content(format!($($arg)*).into())
        .build()
    };
}

#[macro_export]
macro_rules! assistant_message {
    ($($arg:tt)*) => {
        $crate::endpoints::chat::Message::role(
            $crate::endpoints::chat::Role::Assistant
        )
        .content(format!($($arg)*).into())
        .build()
    };
}

/// Builds a conversation out of plain turns: the first is the user's, then
/// assistant and user alternate.
pub fn alternating_messages<T>(turns: &[T]) -> Vec<Message<'_>>
where
    T: AsRef<str>,
{
    turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let role = if i % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            Message::role(role)
                .content(Cow::Borrowed(turn.as_ref()))
                .build()
        })
        .collect()
}

/// A chat completion request. Options left unset are omitted from the payload
/// and fall back to the API's defaults.
///
/// Construct with `ChatCompletion::model`.
#[derive(Serialize, Debug, Clone, Builder)]
#[builder(start_fn = model)]
pub struct ChatCompletion<'a> {
    #[builder(start_fn)]
    model: Model,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
}

impl OpenAIRequestProvider for ChatCompletion<'_> {
    type Response = ChatCompletionResponse;

    const METHOD: Method = Method::Post;

    fn path_with_leading_slash() -> String {
        "/chat/completions".to_string()
    }
}

impl super::private::Sealed for ChatCompletion<'_> {}

/// A response from a chat completion request.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    id: String,
    object: String,
    created: i64,
    model: String,
    choices: Vec<ChatCompletionResponseChoice>,
    #[serde(default)]
    usage: Usage,
}

impl ChatCompletionResponse {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Unix timestamp (seconds) of when the completion was created.
    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn choices(&self) -> &[ChatCompletionResponseChoice] {
        &self.choices
    }

    /// Takes the first message in the response consumes the response.
    pub fn take_first_choice(self) -> Option<ChatCompletionResponseChoice> {
        self.choices.into_iter().next()
    }

    /// Content of the first choice, or an empty string when there is none.
    pub fn first_message_content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
    }

    /// Gives the usage tokens of the response.
    pub fn usage(&self) -> &Usage {
        &self.usage
    }
}

/// A response choice from a chat completion request.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponseChoice {
    finish_reason: Option<FinishReason>,
    index: i32,
    message: ChatCompletionResponseMessage,
}

impl ChatCompletionResponseChoice {
    /// Takes the message and returns a result that may contain a refusal.
    pub fn message(self) -> OpenAIResult<String> {
        match self.message.refusal {
            Some(refusal) => Err(OpenAIError::Refusal(refusal)),
            None => Ok(self.message.content.unwrap_or_default()),
        }
    }

    pub fn role(&self) -> Role {
        self.message.role
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn index(&self) -> i32 {
        self.index
    }
}

// leave private, messages should only be interacted with through the choice.
#[derive(Deserialize, Debug, Clone)]
struct ChatCompletionResponseMessage {
    role: Role,
    content: Option<String>,
    refusal: Option<String>,
}

/// The reason the response was terminated.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    FunctionCall,
}
