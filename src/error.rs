use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForgeError>;

// The two failure kinds a generation call can surface to its caller.
#[derive(Debug, Error)]
pub enum ForgeError {
    // Bad input context, an unparseable payload, or a field failing a
    // required/enum check. Not worth retrying as is.
    #[error("Validation error: {0}")]
    Validation(String),

    // The upstream call failed, timed out, or came back empty.
    #[error("Generation error: {message}")]
    Generation {
        message: String,
        #[source]
        source: Option<UpstreamError>,
    },
}

impl ForgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        ForgeError::Validation(message.into())
    }

    pub fn generation(message: impl Into<String>, source: UpstreamError) -> Self {
        ForgeError::Generation {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ForgeError::Validation(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, ForgeError::Generation { .. })
    }

    /// Generation failures are transient; validation failures point at the
    /// caller or at a broken response contract.
    pub fn is_retryable(&self) -> bool {
        self.is_generation()
    }
}

// Errors raised by a completion backend, before any parsing happens.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError), // Errors from the OpenAI API.

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout occurred after {0} seconds")]
    Timeout(u64),

    #[error("No content in completion response")]
    EmptyResponse,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<String> for UpstreamError {
    fn from(error: String) -> Self {
        UpstreamError::Backend(error)
    }
}

// Errors for loading and saving the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
