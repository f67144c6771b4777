//! Media collaborator abstractions.
//!
//! The orchestrator never decodes audio itself. It creates resources through a
//! [`MediaBackend`], waits for each resource to report ready or failed, and
//! issues play/pause/volume commands. The shared audio output is modelled as an
//! explicit [`AudioSession`] held by a [`SessionGuard`].

pub mod http;
pub mod session;
mod traits;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use http::HttpProbeBackend;
pub use session::{AudioSession, NullAudioSession, SessionError, SessionGuard};
pub use traits::{MediaBackend, MediaError, MediaResource, MediaResult};
