//! Per-channel playback state.
//!
//! A [`Channel`] owns at most one [`ActiveLoad`]. Attaching a new load always
//! detaches the previous one first: its watcher is cancelled and its resource
//! released before the new resource is stored.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::context::StreamTarget;
use crate::media::MediaResource;
use crate::state::{ChannelKind, ChannelSnapshot};

/// Progress of the attached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadPhase {
    Loading,
    Ready,
    Failed,
}

/// A resource attached to a channel, tagged with the load that created it.
pub(crate) struct ActiveLoad {
    /// Load attempt id. Outcomes carrying any other id are stale.
    pub generation: u64,
    pub target: StreamTarget,
    pub resource: Arc<dyn MediaResource>,
    pub phase: LoadPhase,
    /// Cancels the watcher awaiting this resource's outcome.
    pub cancel: CancellationToken,
}

impl ActiveLoad {
    pub fn new(generation: u64, target: StreamTarget, resource: Arc<dyn MediaResource>) -> Self {
        Self {
            generation,
            target,
            resource,
            phase: LoadPhase::Loading,
            cancel: CancellationToken::new(),
        }
    }
}

pub(crate) struct Channel {
    pub kind: ChannelKind,
    pub powered: bool,
    pub playing: bool,
    pub volume: f32,
    pub loading: bool,
    pub last_error: Option<String>,
    pub active: Option<ActiveLoad>,
}

impl Channel {
    pub fn new(kind: ChannelKind, powered: bool, volume: f32) -> Self {
        Self {
            kind,
            powered,
            playing: false,
            volume,
            loading: false,
            last_error: None,
            active: None,
        }
    }

    /// Attaches `load`, detaching any previous load first.
    pub fn attach(&mut self, load: ActiveLoad) {
        self.detach();
        self.active = Some(load);
    }

    /// Cancels and releases the attached load. Returns whether one existed.
    pub fn detach(&mut self) -> bool {
        match self.active.take() {
            Some(old) => {
                old.cancel.cancel();
                old.resource.release();
                log::debug!(
                    "[Orchestrator] {} released resource {} (generation {})",
                    self.kind,
                    old.resource.url(),
                    old.generation
                );
                true
            }
            None => false,
        }
    }

    /// The attached load, only if it was created by `generation` and is still loading.
    pub fn pending(&mut self, generation: u64) -> Option<&mut ActiveLoad> {
        self.active
            .as_mut()
            .filter(|load| load.generation == generation && load.phase == LoadPhase::Loading)
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            powered: self.powered,
            playing: self.playing,
            volume: self.volume,
            loading: self.loading,
            last_error: self.last_error.clone(),
            url: self
                .active
                .as_ref()
                .map(|load| load.resource.url().to_string()),
        }
    }
}
