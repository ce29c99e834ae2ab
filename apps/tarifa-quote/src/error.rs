//! CLI error type.

use tarifa_core::PricingError;
use thiserror::Error;

/// Result type alias for the quote CLI.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Everything that can stop a quote from being printed.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The engine rejected the request or the policy.
    #[error("{0}")]
    Pricing(#[from] PricingError),

    /// Policy file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Policy file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Effective policy could not be rendered as TOML.
    #[error("Failed to render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Result could not be rendered as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
