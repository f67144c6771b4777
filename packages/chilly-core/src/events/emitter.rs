//! Event emitter abstraction for decoupling the orchestrator from transport.
//!
//! The orchestrator depends on the [`EventEmitter`] trait rather than concrete
//! broadcast channels, enabling testing and alternative transports.

use super::{ChannelEvent, FeedEvent, SessionEvent};

/// Trait for emitting player events without knowledge of transport.
///
/// # Example
///
/// ```ignore
/// struct MyHost {
///     emitter: Arc<dyn EventEmitter>,
/// }
///
/// impl MyHost {
///     fn announce(&self) {
///         self.emitter.emit_session(SessionEvent::Activated { timestamp: now_millis() });
///     }
/// }
/// ```
pub trait EventEmitter: Send + Sync {
    /// Emits a channel load/transport event.
    fn emit_channel(&self, event: ChannelEvent);

    /// Emits a feed selection/status event.
    fn emit_feed(&self, event: FeedEvent);

    /// Emits an audio session event.
    fn emit_session(&self, event: SessionEvent);
}

/// No-op emitter for hosts that only consume snapshots, and for tests.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_channel(&self, _event: ChannelEvent) {}

    fn emit_feed(&self, _event: FeedEvent) {}

    fn emit_session(&self, _event: SessionEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_channel(&self, event: ChannelEvent) {
        tracing::debug!(?event, "channel_event");
    }

    fn emit_feed(&self, event: FeedEvent) {
        tracing::debug!(?event, "feed_event");
    }

    fn emit_session(&self, event: SessionEvent) {
        tracing::debug!(?event, "session_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChannelKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test emitter that counts events.
    struct CountingEventEmitter {
        channel_count: AtomicUsize,
        feed_count: AtomicUsize,
    }

    impl CountingEventEmitter {
        fn new() -> Self {
            Self {
                channel_count: AtomicUsize::new(0),
                feed_count: AtomicUsize::new(0),
            }
        }
    }

    impl EventEmitter for CountingEventEmitter {
        fn emit_channel(&self, _event: ChannelEvent) {
            self.channel_count.fetch_add(1, Ordering::SeqCst);
        }

        fn emit_feed(&self, _event: FeedEvent) {
            self.feed_count.fetch_add(1, Ordering::SeqCst);
        }

        fn emit_session(&self, _event: SessionEvent) {}
    }

    #[test]
    fn counting_emitter_tracks_events() {
        let emitter = Arc::new(CountingEventEmitter::new());

        emitter.emit_channel(ChannelEvent::PowerChanged {
            channel: ChannelKind::Music,
            powered: false,
            timestamp: 0,
        });
        emitter.emit_channel(ChannelEvent::PlaybackChanged {
            channel: ChannelKind::Music,
            playing: false,
            timestamp: 0,
        });
        emitter.emit_feed(FeedEvent::StatusChanged {
            city: "Tokyo".to_string(),
            online: true,
            timestamp: 0,
        });

        assert_eq!(emitter.channel_count.load(Ordering::SeqCst), 2);
        assert_eq!(emitter.feed_count.load(Ordering::SeqCst), 1);
    }
}
