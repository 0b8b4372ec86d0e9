use thiserror::Error;

/// Problems with configuration or secrets; fatal for the process
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingSecret(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failures that abort an analysis request.
///
/// A page that cannot be fetched is not an error: it degrades to empty
/// signals and is reported in the notes instead.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Missing keyword or unusable target URL
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The search API answered with a non-success status
    #[error("search API error: {status} {body}")]
    Upstream { status: u16, body: String },

    /// The search API could not be reached or its response decoded
    #[error("search API request failed: {0}")]
    Transport(String),

    #[error("analysis timed out after {0} seconds")]
    Timeout(u64),
}

impl AnalyzeError {
    /// HTTP status the error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzeError::Input(_) => 400,
            _ => 500,
        }
    }
}
