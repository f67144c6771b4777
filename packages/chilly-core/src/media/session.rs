//! Shared audio output session.
//!
//! Both channels mix into one process-wide output session. It is acquired
//! once when the player is built and released exactly once, either by an
//! explicit teardown or when the [`SessionGuard`] is dropped.

use std::sync::Arc;

/// Errors activating the audio output session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// No output device or platform session exists.
    #[error("Audio session unavailable: {0}")]
    Unavailable(String),

    /// The platform refused to activate the session.
    #[error("Audio session activation failed: {0}")]
    Activation(String),
}

/// Platform audio output session.
///
/// Implementations configure mixing (both channels audible at once, other
/// apps not interrupted) when activated.
pub trait AudioSession: Send + Sync {
    /// Activates the session for playback.
    fn activate(&self) -> Result<(), SessionError>;

    /// Deactivates the session, notifying other audio clients.
    fn deactivate(&self);
}

/// Session for hosts without a platform audio session.
///
/// Activation always succeeds. Used by the headless host and in tests.
pub struct NullAudioSession;

impl AudioSession for NullAudioSession {
    fn activate(&self) -> Result<(), SessionError> {
        log::debug!("[Session] Activated (no platform session)");
        Ok(())
    }

    fn deactivate(&self) {
        log::debug!("[Session] Deactivated (no platform session)");
    }
}

/// Scoped ownership of an activated [`AudioSession`].
pub struct SessionGuard {
    session: Arc<dyn AudioSession>,
    active: bool,
}

impl SessionGuard {
    /// Activates `session` and returns a guard that deactivates it on release.
    ///
    /// # Errors
    ///
    /// Returns the activation error; the session is left inactive.
    pub fn acquire(session: Arc<dyn AudioSession>) -> Result<Self, SessionError> {
        session.activate()?;
        log::info!("[Session] Audio session active");
        Ok(Self {
            session,
            active: true,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivates the session. Returns `true` only on the first call.
    pub fn release(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.session.deactivate();
        log::info!("[Session] Audio session released");
        true
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release();
    }
}
