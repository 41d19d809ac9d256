use chromiumoxide::error::CdpError;
use std::time::Duration;
use thiserror::Error;

use crate::OutputFormat;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("{0} output is not implemented yet")]
    NotImplemented(OutputFormat),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Browser configuration error: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Browser {
        context: String,
        #[source]
        source: CdpError,
    },

    #[error("Timed out after {timeout:?} waiting for {url} to reach network idle")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("Timed out after {0:?} waiting for images to finish loading")]
    ImageLoadTimeout(Duration),

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn browser(context: impl Into<String>, source: CdpError) -> Self {
        ConvertError::Browser {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
