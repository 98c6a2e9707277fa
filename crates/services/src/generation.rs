//! Image generation via the Nebula API.
//!
//! One endpoint (`/images/generations`) serves both model families; the
//! request body differs per provider and per mode (text-to-image vs
//! image-to-image with reference images).

use crate::models::{default_model, find_model, GeminiImageSize, ImageModel, Provider};
use crate::ServiceError;
use serde::Deserialize;
use serde_json::{json, Value};

pub const NEBULA_BASE_URL: &str = "https://llm.ai-nebula.com/v1";

/// Parameters for one generation call.
#[derive(Clone, Debug, Default)]
pub struct GenerateImageParams {
    pub prompt: String,
    /// Appended to the prompt as a trailing "Negative prompt:" block.
    pub negative_prompt: Option<String>,
    /// Model id from the catalog; the default model when absent.
    pub model_id: Option<String>,
    /// Data URLs or URLs used as image-to-image references.
    pub reference_images: Vec<String>,
    /// Gemini: aspect ratio override (e.g. "16:9").
    pub aspect_ratio: Option<String>,
    /// Gemini: output resolution tier.
    pub image_size: Option<GeminiImageSize>,
    /// Seedream: pixel dimensions override (e.g. "2048x2048").
    pub size: Option<String>,
}

/// A generated image, base64-encoded.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    pub base64: String,
    pub mime_type: String,
}

// Nebula wraps the OpenAI-style images payload in a code/msg envelope.
#[derive(Debug, Deserialize)]
struct NebulaResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<NebulaData>,
}

#[derive(Debug, Deserialize)]
struct NebulaData {
    #[serde(default)]
    data: Vec<NebulaImage>,
}

#[derive(Debug, Deserialize)]
struct NebulaImage {
    b64_json: Option<String>,
    #[allow(dead_code)]
    url: Option<String>,
}

/// Client for the Nebula image generation endpoint.
pub struct NebulaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NebulaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: NEBULA_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Generate an image. Unknown model ids fall back to the default
    /// model, matching the picker's behavior.
    pub async fn generate(
        &self,
        params: &GenerateImageParams,
    ) -> Result<GeneratedImage, ServiceError> {
        let model = match params.model_id.as_deref() {
            Some(id) => find_model(id).unwrap_or_else(|| {
                log::warn!("unknown model id {:?}, using {}", id, default_model().id);
                default_model()
            }),
            None => default_model(),
        };

        let body = build_request(model, params);
        log::debug!("generating with {} ({:?})", model.id, model.provider);

        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: "Nebula",
                status: status.as_u16(),
                body,
            });
        }

        let result: NebulaResponse = response.json().await?;
        if result.code != 200 {
            return Err(ServiceError::Vendor {
                code: result.code,
                msg: result.msg,
            });
        }

        let image = result
            .data
            .and_then(|d| d.data.into_iter().next())
            .ok_or(ServiceError::EmptyResponse)?;
        let base64 = image.b64_json.ok_or(ServiceError::EmptyResponse)?;

        Ok(GeneratedImage {
            base64,
            mime_type: "image/png".to_string(),
        })
    }
}

/// Build the request body for a model and parameter set.
fn build_request(model: &ImageModel, params: &GenerateImageParams) -> Value {
    let mut prompt = params.prompt.clone();
    if let Some(negative) = &params.negative_prompt {
        prompt.push_str("\n\nNegative prompt: ");
        prompt.push_str(negative);
    }

    match model.provider {
        Provider::Gemini => build_gemini_request(model, &prompt, params),
        Provider::Seedream => build_seedream_request(model, &prompt, params),
    }
}

fn build_gemini_request(model: &ImageModel, prompt: &str, params: &GenerateImageParams) -> Value {
    let size = params.aspect_ratio.as_deref().unwrap_or(model.size);
    let mut body = json!({
        "model": model.id,
        "size": size,
        "response_format": "b64_json",
    });
    if let Some(image_size) = params.image_size {
        body["image_size"] = json!(image_size.as_str());
    }

    if params.reference_images.is_empty() {
        // Text-to-image
        body["prompt"] = json!(prompt);
    } else {
        // Image-to-image: contents array, text part first
        let mut parts = vec![json!({ "text": prompt })];
        parts.extend(
            params
                .reference_images
                .iter()
                .map(|img| json!({ "image": img })),
        );
        body["contents"] = json!([{ "role": "user", "parts": parts }]);
    }

    body
}

fn build_seedream_request(model: &ImageModel, prompt: &str, params: &GenerateImageParams) -> Value {
    let size = params.size.as_deref().unwrap_or(model.size);
    let mut body = json!({
        "model": model.id,
        "size": size,
        "watermark": false,
    });

    if params.reference_images.is_empty() {
        // Text-to-image
        body["prompt"] = json!(prompt);
    } else {
        // Image-to-image: contents array, text part last
        let mut parts: Vec<Value> = params
            .reference_images
            .iter()
            .map(|img| json!({ "image": img }))
            .collect();
        parts.push(json!({ "text": prompt }));
        body["contents"] = json!([{ "role": "user", "parts": parts }]);
    }

    body
}
