//! Error handling and custom error types
//!
//! Provides unified error handling across the orchestration layer using thiserror.

use crate::voice::PipelineStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("No content produced for {modality}: {detail}")]
    NoContent {
        modality: &'static str,
        detail: String,
    },

    #[error("Generation timed out: {0}")]
    Timeout(String),

    #[error("Operation cancelled by caller")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("{modality} request failed: {source}")]
    Request {
        modality: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Voice pipeline failed during {stage}: {source}")]
    Pipeline {
        stage: PipelineStage,
        #[source]
        source: Box<Error>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl Error {
    pub(crate) fn no_content(modality: &'static str, detail: impl Into<String>) -> Self {
        Error::NoContent {
            modality,
            detail: detail.into(),
        }
    }

    /// Modality of the gateway request that failed, if tagged.
    pub fn modality(&self) -> Option<&'static str> {
        match self {
            Error::Request { modality, .. } => Some(modality),
            _ => None,
        }
    }

    /// The error beneath any [`Error::Request`] tags.
    pub fn root(&self) -> &Error {
        match self {
            Error::Request { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the provider call itself failed (network, status, or body).
    pub fn is_upstream(&self) -> bool {
        matches!(self.root(), Error::Http(_) | Error::AiProvider(_))
    }

    /// Stage tag for voice pipeline failures.
    pub fn pipeline_stage(&self) -> Option<PipelineStage> {
        match self.root() {
            Error::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
