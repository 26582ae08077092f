//! Centralized error handling for clim-diag
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`ClimDiagError`] that describes what went wrong with enough context to
//! report it to the user.

use thiserror::Error;

/// Main error type for clim-diag operations
#[derive(Debug, Error)]
pub enum ClimDiagError {
    /// Units can only be raised to integer powers
    #[error("Expected integer-like power for units exponentiation, got {power}")]
    NonIntegerPower { power: f64 },

    /// Unit expression could not be parsed
    #[error("Invalid unit specification '{spec}': {message}")]
    InvalidUnit { spec: String, message: String },

    /// Exponent arithmetic left the `i64` range
    #[error("Exponent overflow raising '{symbol}' to power {power}")]
    ExponentOverflow { symbol: String, power: f64 },

    /// Algebra on unknown or no-unit markers
    #[error("Cannot combine units '{left}' and '{right}'")]
    IncompatibleUnits { left: String, right: String },

    /// Table construction or shape error
    #[error("Table shape error: {0}")]
    TableShape(String),

    /// Column not found in a table
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// Statistics computation errors
    #[error("Statistics computation error: {0}")]
    StatisticsError(String),

    /// Time coordinate errors
    #[error("Time axis error: {0}")]
    TimeAxis(String),

    /// Requested model type is not registered
    #[error("Unknown MLR model type '{name}', available: {available:?}")]
    UnknownModel { name: String, available: Vec<String> },

    /// A model type was registered twice
    #[error("MLR model type '{name}' is already registered")]
    DuplicateModel { name: String },

    /// Model fitting or prediction failed
    #[error("MLR model '{model}' failed: {message}")]
    Model { model: String, message: String },

    /// Settings dictionary is missing or has invalid options
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Dataset record is missing a required attribute
    #[error("Dataset record is missing attribute '{key}'")]
    MissingAttribute { key: String },

    /// Variable not available for a dataset
    #[error("Variable '{var}' not found for dataset '{alias}'")]
    VariableNotFound { alias: String, var: String },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),
}

/// Result type alias for clim-diag operations
pub type Result<T> = std::result::Result<T, ClimDiagError>;
