//! Centralized error types for the Chilly ATC core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Gives every error a machine-readable code via [`ErrorCode`]
//! - Maps media collaborator failures onto [`PlayerError`]
//!
//! Player errors never escape as faults. The orchestrator converts them into
//! an observable message on the state snapshot.

use serde::Serialize;
use thiserror::Error;

use crate::media::{MediaError, SessionError};

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for MediaError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "stream_unreachable",
            Self::HttpStatus(_, _) => "stream_http_status",
            Self::Rejected(_) => "stream_rejected",
            Self::Unsupported(_) => "stream_unsupported",
        }
    }
}

impl ErrorCode for SessionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "session_unavailable",
            Self::Activation(_) => "session_activation_failed",
        }
    }
}

/// Application-wide error type for the playback orchestrator.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum PlayerError {
    /// A stream URL could not be constructed from its template or config.
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(String),

    /// The media collaborator reported that a stream failed to load.
    #[error("Failed to load stream: {0}")]
    PlaybackFailed(String),

    /// The shared audio output session could not be activated.
    #[error("Failed to setup audio: {0}")]
    SessionSetupFailed(String),

    /// Player configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The player task has stopped and no longer accepts commands.
    #[error("Player stopped: {0}")]
    Stopped(String),
}

impl ErrorCode for PlayerError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::PlaybackFailed(_) => "playback_failed",
            Self::SessionSetupFailed(_) => "session_setup_failed",
            Self::Configuration(_) => "configuration_error",
            Self::Stopped(_) => "player_stopped",
        }
    }
}

/// Convenient Result alias for player operations.
pub type PlayerResult<T> = Result<T, PlayerError>;

impl From<MediaError> for PlayerError {
    fn from(err: MediaError) -> Self {
        Self::PlaybackFailed(err.to_string())
    }
}

impl From<SessionError> for PlayerError {
    fn from(err: SessionError) -> Self {
        Self::SessionSetupFailed(err.to_string())
    }
}
