use std::time::Duration;

/// Reasons a results link is rejected before any network access.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The link was empty or whitespace only.
    #[error("empty link")]
    EmptyInput,

    /// The link could not be split into scheme, host and query.
    #[error("malformed link: {0}")]
    UnparseableUrl(String),

    /// The link is not a web (`http`/`https`) link.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The host is not one of the supported results sites.
    #[error("wrong host: {0}")]
    WrongHost(String),

    /// A required query parameter is absent or empty.
    #[error("missing `{0}` parameter")]
    MissingField(&'static str),
}

/// Failures raised by the headless-browser capability.
#[derive(thiserror::Error, Debug)]
pub enum BrowserError {
    /// The browser process could not be started.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// A DevTools command failed (navigation, evaluation, screenshot, ...).
    #[error("browser protocol error: {0}")]
    Protocol(String),

    /// The browser was shut down while a page was requested.
    #[error("browser is closed")]
    Closed,

    /// A value returned by an in-page script had an unexpected shape.
    #[error("unexpected script result: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(err.to_string())
    }
}

/// Failures while pulling raw content out of a results page.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    /// Navigation did not settle before the configured deadline.
    #[error("navigation to {url} timed out after {}s", timeout.as_secs())]
    NavigationTimeout { url: String, timeout: Duration },

    /// Any other browser failure during extraction.
    #[error("extraction failed: {0}")]
    Failed(#[from] BrowserError),
}

/// Failures while producing card images.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A template references a value the renderer did not provide.
    #[error("template {template} has no value for `{key}`")]
    MissingPlaceholder {
        template: &'static str,
        key: String,
    },

    /// Browser failure while loading markup or taking a screenshot.
    #[error("rendering failed: {0}")]
    Browser(#[from] BrowserError),
}

/// The single error type visible to callers of [`crate::RaceCardService`].
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// The link was rejected or its page could not be read.
    #[error("could not load data: {0}")]
    LoadData(String),

    /// The result was read but the card images could not be produced.
    #[error("could not generate cards: {0}")]
    GenerateCards(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::LoadData(err.to_string())
    }
}

impl From<ExtractionError> for ServiceError {
    fn from(err: ExtractionError) -> Self {
        ServiceError::LoadData(err.to_string())
    }
}

impl From<RenderError> for ServiceError {
    fn from(err: RenderError) -> Self {
        ServiceError::GenerateCards(err.to_string())
    }
}

/// Failures while loading [`crate::Settings`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML or has wrongly typed values.
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
