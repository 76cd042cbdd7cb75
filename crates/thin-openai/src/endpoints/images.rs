use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::transport::Method;

use super::OpenAIRequestProvider;

/// The model used to generate images. Left unset, the API picks its default.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageModel {
    #[serde(rename = "dall-e-2")]
    DallE2,
    #[serde(rename = "dall-e-3")]
    DallE3,
}

/// Dimensions of the generated images.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792x1024,
    #[serde(rename = "1024x1792")]
    Portrait1024x1792,
}

/// How the generated images are handed back.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    /// A temporary URL per image.
    #[default]
    Url,
    /// The image itself, base64 encoded.
    B64Json,
}

/// An image generation request.
///
/// Construct with `ImageGeneration::prompt`. Generates one 1024x1024 image
/// returned as a URL unless told otherwise.
#[derive(Serialize, Debug, Clone, Builder)]
#[builder(start_fn = prompt)]
pub struct ImageGeneration<'a> {
    #[builder(start_fn)]
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ImageModel>,
    #[builder(default = 1)]
    n: u32,
    #[builder(default)]
    size: ImageSize,
    #[builder(default)]
    response_format: ImageResponseFormat,
}

impl OpenAIRequestProvider for ImageGeneration<'_> {
    type Response = ImageGenerationResponse;

    const METHOD: Method = Method::Post;

    fn path_with_leading_slash() -> String {
        "/images/generations".to_string()
    }
}

impl super::private::Sealed for ImageGeneration<'_> {}

#[derive(Deserialize, Debug, Clone)]
pub struct ImageGenerationResponse {
    created: i64,
    data: Vec<GeneratedImage>,
}

impl ImageGenerationResponse {
    /// Unix timestamp (seconds) of when the images were created.
    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn data(&self) -> &[GeneratedImage] {
        &self.data
    }

    /// Consumes the response and gives one string per image: the URL, or the
    /// base64 payload when that is what was requested.
    pub fn images(self) -> Vec<String> {
        self.data
            .into_iter()
            .filter_map(|image| image.url.or(image.b64_json))
            .collect()
    }
}

/// One generated image. Exactly one of `url` and `b64_json` is set, depending
/// on the requested [`ImageResponseFormat`].
#[derive(Deserialize, Debug, Clone)]
pub struct GeneratedImage {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

impl GeneratedImage {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn b64_json(&self) -> Option<&str> {
        self.b64_json.as_deref()
    }

    /// The prompt the model actually used, when it rewrote the original.
    pub fn revised_prompt(&self) -> Option<&str> {
        self.revised_prompt.as_deref()
    }
}
