use thiserror::Error;

#[derive(Error, Debug)]
pub enum RideopsError {
    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid vehicle type '{0}'")]
    InvalidVehicleType(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("admin session expired")]
    AuthExpired,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RideopsError>;
