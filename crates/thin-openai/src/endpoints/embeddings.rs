use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{transport::Method, Usage};

use super::OpenAIRequestProvider;

/// The model used to create text embeddings.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingsModel {
    #[serde(rename = "text-embedding-3-large")]
    TextEmbedding3Large,
    #[serde(rename = "text-embedding-3-small")]
    TextEmbedding3Small,
    #[serde(rename = "text-embedding-ada-002")]
    TextEmbeddingAda002,
}

/// A text embeddings creation request.
///
/// Construct with `Embeddings::model`
#[derive(Serialize, Debug, Clone, Builder)]
#[builder(start_fn = model)]
pub struct Embeddings<'a> {
    #[builder(start_fn)]
    model: EmbeddingsModel,
    input: &'a str,
}

impl OpenAIRequestProvider for Embeddings<'_> {
    type Response = EmbeddingsResponse;

    const METHOD: Method = Method::Post;

    fn path_with_leading_slash() -> String {
        "/embeddings".to_string()
    }
}

impl super::private::Sealed for Embeddings<'_> {}

#[derive(Deserialize, Debug, Clone)]
pub struct EmbeddingsResponse {
    object: String,
    model: String,
    data: Vec<EmbeddingsData>,
    #[serde(default)]
    usage: Usage,
}

impl EmbeddingsResponse {
    /// Consumes the response and gives the first embedding.
    pub fn embedding(self) -> Vec<f32> {
        self.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default()
    }

    /// Gives a reference to the first embedding, empty if there is none.
    pub fn embedding_ref(&self) -> &[f32] {
        self.data
            .first()
            .map(|d| d.embedding.as_slice())
            .unwrap_or_default()
    }

    /// Consumes the response and gives every embedding, in input order.
    pub fn embeddings(self) -> Vec<Vec<f32>> {
        self.data.into_iter().map(|d| d.embedding).collect()
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gives the usage tokens of the response. Embeddings never report completion tokens.
    pub fn usage(&self) -> &Usage {
        &self.usage
    }
}

#[derive(Deserialize, Debug, Clone)]
struct EmbeddingsData {
    embedding: Vec<f32>,
}
