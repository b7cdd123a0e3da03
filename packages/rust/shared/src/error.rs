//! Error types for StratBuilder.
//!
//! Library crates use [`StratBuilderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all StratBuilder operations.
#[derive(Debug, thiserror::Error)]
pub enum StratBuilderError {
    /// Invalid or missing required input in the brand/app configuration.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Network/HTTP failure while fetching a sitemap.
    #[error("sitemap fetch error: {0}")]
    SitemapFetch(String),

    /// Malformed sitemap XML.
    #[error("sitemap parse error: {message}")]
    SitemapParse { message: String },

    /// A downstream stage received an ontology with zero entities.
    #[error("empty ontology: no entities available for this stage")]
    EmptyOntology,

    /// A cross-reference in the assembled output failed to resolve.
    /// Indicates an upstream bug, not user error.
    #[error("referential integrity error: {message}")]
    ReferentialIntegrity { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Export serialization/formatting error.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StratBuilderError>;

impl StratBuilderError {
    /// Create a configuration error from any displayable message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create a sitemap parse error from any displayable message.
    pub fn sitemap_parse(msg: impl Into<String>) -> Self {
        Self::SitemapParse {
            message: msg.into(),
        }
    }

    /// Create a referential integrity error from any displayable message.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::ReferentialIntegrity {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
