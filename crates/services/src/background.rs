//! Background removal via the remove.bg API.

use crate::{data_url, ServiceError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::multipart;

pub const REMOVE_BG_API_URL: &str = "https://api.remove.bg/v1.0/removebg";

/// An image that came back from a processing call, base64-encoded.
#[derive(Clone, Debug)]
pub struct ProcessedImage {
    pub base64: String,
    pub mime_type: String,
}

/// Client for the remove.bg endpoint.
pub struct RemoveBgClient {
    http: reqwest::Client,
    api_key: String,
}

impl RemoveBgClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Remove the background from an image given as a data URL.
    ///
    /// The API returns the cut-out image bytes directly; the result
    /// keeps the response's content type (PNG with alpha in practice).
    pub async fn remove_background(
        &self,
        image_data_url: &str,
    ) -> Result<ProcessedImage, ServiceError> {
        let (_, bytes) = data_url::parse(image_data_url)?;

        let form = multipart::Form::new()
            .part(
                "image_file",
                multipart::Part::bytes(bytes).file_name("image.png"),
            )
            .text("size", "auto");

        let response = self
            .http
            .post(REMOVE_BG_API_URL)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: "remove.bg",
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
}
