//! Generation backends.
//!
//! A [`Generator`] turns a prompt into a [`Completion`]. Failures are
//! [`GenerationError`]s, which the pipeline records per unit rather than
//! aborting the run.

mod command;
mod gemini;

pub use command::CommandGenerator;
pub use gemini::GeminiClient;

use crate::config::{Backend, GeneratorConfig};
use crate::error::Result;
use crate::prompt::Prompt;
use thiserror::Error;

/// Text returned by the service, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    /// The service produced no candidate (or a candidate without text).
    Empty,
}

impl Completion {
    /// Wrap text, treating blank text as [`Completion::Empty`].
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(text)
        }
    }
}

/// Failure of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("command failed: {0}")]
    Command(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// A generation service.
pub trait Generator {
    fn generate(&mut self, prompt: &Prompt) -> std::result::Result<Completion, GenerationError>;
}

/// Build the backend selected by the configuration.
pub fn from_config(config: &GeneratorConfig) -> Result<Box<dyn Generator>> {
    let generator: Box<dyn Generator> = match config.backend {
        Backend::Gemini => Box::new(GeminiClient::new(config)?),
        Backend::Command => Box::new(CommandGenerator::new(config)?),
    };
    tracing::debug!(backend = ?config.backend, model = %config.model, "generator ready");
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_from_text() {
        assert_eq!(
            Completion::from_text("module m;".to_string()),
            Completion::Text("module m;".to_string())
        );
        assert_eq!(Completion::from_text(" \n\t".to_string()), Completion::Empty);
        assert_eq!(Completion::from_text(String::new()), Completion::Empty);
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Service {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "service returned HTTP 429: quota exceeded");
        assert_eq!(GenerationError::Timeout(30).to_string(), "timed out after 30s");
    }

    #[test]
    fn test_from_config_command_requires_command() {
        let config = GeneratorConfig {
            backend: Backend::Command,
            ..GeneratorConfig::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_gemini_builds_without_key() {
        let config = GeneratorConfig {
            api_key_env: "TBGEN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(from_config(&config).is_ok());
    }
}
