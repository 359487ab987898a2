use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Failed to parse HTML or an API payload
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlError(String),
    /// Regex compilation failed
    #[error("Regex error: {0}")]
    RegexError(String),
    /// Selector parsing failed
    #[error("CSS selector error: {0}")]
    SelectorError(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
    /// None of the awaited page conditions appeared before the deadline
    #[error("Timed out after {waited_ms} ms waiting for {selectors}")]
    NavigationTimeout { waited_ms: u128, selectors: String },
    /// The browser session rejected a command
    #[error("Browser error: {0}")]
    BrowserError(String),
    /// Session, credential or ledger initialization failed
    #[error("Setup failed: {0}")]
    SetupFailure(String),
    /// A ledger write or read failed
    #[error("Ledger error: {0}")]
    PersistenceError(String),
    /// Service account authentication failed
    #[error("Authentication error: {0}")]
    AuthError(String),
}

impl AppError {
    /// Returns `true` for failures that only cost the current unit of work.
    ///
    /// Timeouts and markup mismatches degrade to defaults or skips; everything else
    /// is surfaced to the caller as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NavigationTimeout { .. } | AppError::ParseError(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::NavigationTimeout { .. })
    }
}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::UrlError(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::RegexError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::AuthError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::BrowserError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
