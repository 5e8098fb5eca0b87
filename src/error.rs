use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0} must be set")]
    MissingConfig(&'static str),

    #[error("Invalid configuration for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Language model error: {0}")]
    LanguageModel(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
