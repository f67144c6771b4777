//! Trait abstractions for the platform media stack.
//!
//! These traits enable dependency injection for testability. The orchestrator
//! depends on traits rather than concrete players.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;

/// Errors reported by the media collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    /// The stream host could not be reached.
    #[error("Stream unreachable: {0}")]
    Unreachable(String),

    /// The stream host answered with a non-success status.
    #[error("HTTP {0}: {1}")]
    HttpStatus(u16, String),

    /// The player rejected the stream (bad format, decoder error, etc.).
    #[error("Stream rejected: {0}")]
    Rejected(String),

    /// The backend cannot create a resource for this URL.
    #[error("Unsupported stream: {0}")]
    Unsupported(String),
}

/// Result type for media collaborator operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// A live handle to one streaming media session bound to a URL.
///
/// Transport commands are synchronous and must not block; the only
/// asynchronous operation is waiting for the initial ready/failed outcome.
#[async_trait]
pub trait MediaResource: Send + Sync {
    /// The URL this resource is bound to.
    fn url(&self) -> &str;

    /// Resolves once the stream is ready to play, or with the load failure.
    ///
    /// Called at most once per resource. Dropping the returned future stops
    /// waiting but does not release the resource.
    async fn wait_ready(&self) -> MediaResult<()>;

    /// Starts or resumes playback.
    fn play(&self);

    /// Pauses playback immediately, keeping the resource attached.
    fn pause(&self);

    /// Sets the output volume (0.0 - 1.0).
    fn set_volume(&self, volume: f32);

    /// Stops playback and frees the underlying session. Idempotent.
    fn release(&self);
}

/// Factory for media resources.
pub trait MediaBackend: Send + Sync {
    /// Creates a resource bound to `url` with its initial volume applied.
    ///
    /// Creation is synchronous; loading happens in [`MediaResource::wait_ready`].
    fn create(&self, url: &Url, volume: f32) -> MediaResult<Arc<dyn MediaResource>>;
}
