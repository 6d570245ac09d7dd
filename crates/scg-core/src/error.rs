use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to parse document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported spec version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("a contract named {0:?} already exists")]
    DuplicateName(String),

    #[error("a contract already registered for url {0}")]
    DuplicateUrl(String),

    #[error("no contract with uid {0}")]
    UnknownUid(String),
}
