//! Error types for ns-trigval.

use thiserror::Error;

/// Trigger validation error type.
#[derive(Error, Debug)]
pub enum TrigValError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Cut expression failed to parse or referenced an unknown variable.
    #[error("cut expression error: {0}")]
    Expression(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Two histograms could not be merged (different binning or dimension).
    #[error("histogram merge error: {0}")]
    HistogramMerge(String),

    /// Numerator and denominator histograms have different binning.
    #[error("incompatible binning: {0}")]
    IncompatibleBinning(String),

    /// A 1D fill was issued on a 2D histogram or vice versa.
    #[error("histogram '{name}' is {booked}D, got a {filled}D fill")]
    DimensionMismatch {
        /// Histogram name.
        name: String,
        /// Dimension at booking time.
        booked: usize,
        /// Dimension of the attempted fill.
        filled: usize,
    },

    /// Fill or lookup on a name that was never booked.
    #[error("unknown histogram: '{0}'")]
    UnknownHistogram(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TrigValError>;
