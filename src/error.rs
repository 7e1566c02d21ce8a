//! Error types for the tbgen CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Errors raised while generating a single unit of work are not `TbgenError`s;
//! they are [`crate::generation::GenerationError`] values recorded in that
//! unit's outcome so sibling units keep running.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for tbgen operations.
#[derive(Error, Debug)]
pub enum TbgenError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// The verification plan could not be opened or a sheet is missing.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// The run produced no usable output from the generation service.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Output files or directories could not be written.
    #[error("Output error: {0}")]
    Output(String),
}

impl TbgenError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TbgenError::UserError(_) => exit_codes::USER_ERROR,
            TbgenError::DataSource(_) => exit_codes::DATA_SOURCE_FAILURE,
            TbgenError::Generation(_) => exit_codes::GENERATION_FAILURE,
            TbgenError::Output(_) => exit_codes::OUTPUT_FAILURE,
        }
    }
}

/// Result type alias for tbgen operations.
pub type Result<T> = std::result::Result<T, TbgenError>;
