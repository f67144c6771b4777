//! Scripted media backend for tests.
//!
//! Every resource waits until the test resolves it with
//! [`ScriptedResource::resolve_ready`] or [`ScriptedResource::resolve_failed`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::oneshot;

use super::traits::{MediaBackend, MediaError, MediaResource, MediaResult};

pub(crate) struct ScriptedResource {
    url: String,
    volume: Mutex<f32>,
    playing: AtomicBool,
    released: AtomicBool,
    outcome_tx: Mutex<Option<oneshot::Sender<MediaResult<()>>>>,
    outcome_rx: Mutex<Option<oneshot::Receiver<MediaResult<()>>>>,
}

impl ScriptedResource {
    fn new(url: &str, volume: f32) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            url: url.to_string(),
            volume: Mutex::new(volume),
            playing: AtomicBool::new(false),
            released: AtomicBool::new(false),
            outcome_tx: Mutex::new(Some(tx)),
            outcome_rx: Mutex::new(Some(rx)),
        }
    }

    pub fn resolve_ready(&self) {
        self.resolve(Ok(()));
    }

    pub fn resolve_failed(&self, reason: &str) {
        self.resolve(Err(MediaError::Unreachable(reason.to_string())));
    }

    fn resolve(&self, outcome: MediaResult<()>) {
        if let Some(tx) = self.outcome_tx.lock().take() {
            let _ = tx.send(outcome);
        }
    }

    pub fn url_str(&self) -> &str {
        &self.url
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaResource for ScriptedResource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn wait_ready(&self) -> MediaResult<()> {
        let rx = self.outcome_rx.lock().take();
        match rx {
            Some(rx) => match rx.await {
                Ok(outcome) => outcome,
                Err(_) => std::future::pending().await,
            },
            None => std::future::pending().await,
        }
    }

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume;
    }

    fn release(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Backend recording every resource it creates.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    created: Mutex<Vec<Arc<ScriptedResource>>>,
    /// URLs for which `create` fails synchronously.
    reject: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject_url(&self, url: &str) {
        self.reject.lock().push(url.to_string());
    }

    pub fn created(&self) -> Vec<Arc<ScriptedResource>> {
        self.created.lock().clone()
    }

    /// The most recently created resource.
    pub fn last(&self) -> Arc<ScriptedResource> {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no resource created")
    }

    /// Resources that have not been released.
    pub fn live(&self) -> Vec<Arc<ScriptedResource>> {
        self.created
            .lock()
            .iter()
            .filter(|r| !r.is_released())
            .cloned()
            .collect()
    }
}

impl MediaBackend for ScriptedBackend {
    fn create(&self, url: &Url, volume: f32) -> MediaResult<Arc<dyn MediaResource>> {
        if self.reject.lock().iter().any(|u| u == url.as_str()) {
            return Err(MediaError::Unsupported(url.to_string()));
        }
        let resource = Arc::new(ScriptedResource::new(url.as_str(), volume));
        self.created.lock().push(resource.clone());
        Ok(resource)
    }
}
