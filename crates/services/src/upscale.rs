//! Image upscaling via Real-ESRGAN on Replicate.
//!
//! Replicate runs models as predictions: create one, then poll until it
//! reaches a terminal state. Polling is bounded; there is no
//! cancellation of an in-flight prediction.

use crate::{ProcessedImage, ServiceError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";

/// nightmareai/real-esrgan, pinned.
pub const REAL_ESRGAN_VERSION: &str =
    "42fed1c4974146d4d2414e2be2c5277c7fcf05fcc3a73abf41610695738c1d7b";

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: u32 = 60;

/// Supported upscale factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpscaleFactor {
    X2,
    X4,
}

impl UpscaleFactor {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X4 => 4,
        }
    }

    pub fn as_f32(self) -> f32 {
        self.as_u32() as f32
    }

    pub fn parse(value: u32) -> Option<Self> {
        match value {
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            _ => None,
        }
    }
}

/// An upscaled image, by URL (Replicate hosts the output).
#[derive(Clone, Debug)]
pub struct UpscaledImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the Replicate predictions API.
pub struct ReplicateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ReplicateClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: REPLICATE_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Upscale an image given as a data URL.
    pub async fn upscale(
        &self,
        image_data_url: &str,
        factor: UpscaleFactor,
    ) -> Result<UpscaledImage, ServiceError> {
        let body = json!({
            "version": REAL_ESRGAN_VERSION,
            "input": {
                "image": image_data_url,
                "scale": factor.as_u32(),
                "face_enhance": false,
            },
        });

        log::debug!("upscaling {}x via Real-ESRGAN", factor.as_u32());
        let mut prediction = self
            .request(
                self.http
                    .post(format!("{}/predictions", self.base_url))
                    .json(&body),
            )
            .await?;

        for _ in 0..MAX_POLLS {
            match prediction.status.as_str() {
                "succeeded" => return output_url(prediction),
                "failed" | "canceled" => {
                    return Err(ServiceError::UpscaleFailed(
                        prediction
                            .error
                            .unwrap_or_else(|| prediction.status.clone()),
                    ))
                }
                _ => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    prediction = self
                        .request(self.http.get(format!(
                            "{}/predictions/{}",
                            self.base_url, prediction.id
                        )))
                        .await?;
                }
            }
        }

        Err(ServiceError::Timeout {
            service: "Replicate",
            attempts: MAX_POLLS,
        })
    }

    /// Download a prediction output (hosted on replicate.delivery) into
    /// a base64 payload usable as a canvas asset.
    pub async fn fetch_image(&self, url: &str) -> Result<ProcessedImage, ServiceError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: "Replicate",
                status: status.as_u16(),
                body,
            });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?;
        Ok(ProcessedImage {
            base64: STANDARD.encode(&bytes),
            mime_type,
        })
    }

    async fn request(&self, builder: reqwest::RequestBuilder) -> Result<Prediction, ServiceError> {
        let response = builder
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: "Replicate",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

/// Real-ESRGAN outputs a single URL; some models output a list.
fn output_url(prediction: Prediction) -> Result<UpscaledImage, ServiceError> {
    let url = match prediction.output {
        Some(Value::String(url)) => Some(url),
        Some(Value::Array(items)) => items.into_iter().find_map(|v| match v {
            Value::String(url) => Some(url),
            _ => None,
        }),
        _ => None,
    };
    url.map(|url| UpscaledImage { url })
        .ok_or(ServiceError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(output: Value) -> Prediction {
        Prediction {
            id: "p1".into(),
            status: "succeeded".into(),
            output: Some(output),
            error: None,
        }
    }

    #[test]
    fn string_output_is_the_url() {
        let result = output_url(prediction(json!("https://replicate.delivery/out.png"))).unwrap();
        assert_eq!(result.url, "https://replicate.delivery/out.png");
    }

    #[test]
    fn list_output_takes_the_first_url() {
        let result = output_url(prediction(json!(["https://a.png", "https://b.png"]))).unwrap();
        assert_eq!(result.url, "https://a.png");
    }

    #[test]
    fn missing_output_is_an_empty_response() {
        let p = Prediction {
            id: "p1".into(),
            status: "succeeded".into(),
            output: None,
            error: None,
        };
        assert!(matches!(output_url(p), Err(ServiceError::EmptyResponse)));
    }

    #[test]
    fn factors_are_restricted_to_two_and_four() {
        assert_eq!(UpscaleFactor::parse(2), Some(UpscaleFactor::X2));
        assert_eq!(UpscaleFactor::parse(4), Some(UpscaleFactor::X4));
        assert_eq!(UpscaleFactor::parse(3), None);
        assert_eq!(UpscaleFactor::X4.as_f32(), 4.0);
    }

    #[test]
    fn prediction_decodes_from_replicate_json() {
        let json = r#"{
            "id": "abc123",
            "status": "processing",
            "output": null,
            "error": null
        }"#;
        let p: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "abc123");
        assert_eq!(p.status, "processing");
        assert!(p.output.is_none());
    }
}
