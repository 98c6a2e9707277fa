use thiserror::Error;

/// Error type for AI service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No key found in the environment or the keys file.
    #[error("{provider} API key is not configured. Set {env_var} or run `popart keys set`")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// Transport-level failure (DNS, TLS, connect, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from a vendor.
    #[error("{service} request failed: {status} - {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The Nebula envelope reported an error code.
    #[error("Nebula API error: {msg} (code {code})")]
    Vendor { code: i64, msg: String },

    /// A prediction finished in a failed or canceled state.
    #[error("upscale failed: {0}")]
    UpscaleFailed(String),

    /// 2xx response with no usable image payload.
    #[error("no image data in response")]
    EmptyResponse,

    /// Input was not a `data:<mime>;base64,...` URL.
    #[error("invalid data URL")]
    InvalidDataUrl,

    /// Polling gave up before the vendor finished.
    #[error("{service} did not finish within {attempts} polls")]
    Timeout {
        service: &'static str,
        attempts: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
