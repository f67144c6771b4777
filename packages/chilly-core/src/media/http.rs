//! HTTP reachability backend.
//!
//! [`HttpProbeBackend`] stands in for a platform player on hosts without one.
//! A resource is "ready" once its URL answers a GET with a success status;
//! transport commands only update the tracked state. No audio is decoded.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Url};

use super::traits::{MediaBackend, MediaError, MediaResource, MediaResult};

/// Transport state tracked by an [`HttpStreamResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Loading,
    Ready,
    Failed,
    Playing,
    Paused,
    Released,
}

/// Creates [`HttpStreamResource`]s sharing one HTTP client.
#[derive(Clone, Default)]
pub struct HttpProbeBackend {
    client: Client,
}

impl HttpProbeBackend {
    /// Creates a backend with the given shared client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl MediaBackend for HttpProbeBackend {
    fn create(&self, url: &Url, volume: f32) -> MediaResult<Arc<dyn MediaResource>> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(MediaError::Unsupported(format!(
                    "scheme '{other}' in {url}"
                )))
            }
        }
        log::debug!("[HttpProbe] Created resource for {}", url);
        Ok(Arc::new(HttpStreamResource {
            client: self.client.clone(),
            url: url.to_string(),
            state: Mutex::new(TransportState::Loading),
            volume: Mutex::new(volume),
        }))
    }
}

/// A stream URL whose reachability has been (or is being) probed.
pub struct HttpStreamResource {
    client: Client,
    url: String,
    state: Mutex<TransportState>,
    volume: Mutex<f32>,
}

impl HttpStreamResource {
    pub fn state(&self) -> TransportState {
        *self.state.lock()
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    /// Moves to `next` unless the resource has been released.
    fn transition(&self, next: TransportState) {
        let mut state = self.state.lock();
        if *state != TransportState::Released {
            *state = next;
        }
    }
}

#[async_trait]
impl MediaResource for HttpStreamResource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn wait_ready(&self) -> MediaResult<()> {
        if self.state() == TransportState::Released {
            return Err(MediaError::Rejected("resource released".into()));
        }

        let result = match self.client.get(&self.url).send().await {
            Ok(res) if res.status().is_success() => {
                if let Some(name) = res.headers().get("icy-name") {
                    log::debug!("[HttpProbe] {} announces station {:?}", self.url, name);
                }
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                Err(MediaError::HttpStatus(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown").to_string(),
                ))
            }
            Err(e) => Err(MediaError::Unreachable(e.to_string())),
        };

        match &result {
            Ok(()) => {
                log::info!("[HttpProbe] {} is reachable", self.url);
                self.transition(TransportState::Ready);
            }
            Err(e) => {
                log::warn!("[HttpProbe] {} failed: {}", self.url, e);
                self.transition(TransportState::Failed);
            }
        }
        result
    }

    fn play(&self) {
        log::debug!("[HttpProbe] play {}", self.url);
        self.transition(TransportState::Playing);
    }

    fn pause(&self) {
        log::debug!("[HttpProbe] pause {}", self.url);
        self.transition(TransportState::Paused);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume.clamp(0.0, 1.0);
    }

    fn release(&self) {
        let mut state = self.state.lock();
        if *state != TransportState::Released {
            log::debug!("[HttpProbe] release {}", self.url);
            *state = TransportState::Released;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(url: &str) -> Arc<dyn MediaResource> {
        HttpProbeBackend::default()
            .create(&Url::parse(url).unwrap(), 0.3)
            .unwrap()
    }

    #[test]
    fn create_rejects_non_http_urls() {
        let err = HttpProbeBackend::default()
            .create(&Url::parse("file:///tmp/a.mp3").unwrap(), 0.5)
            .err()
            .unwrap();
        assert!(matches!(err, MediaError::Unsupported(_)));
    }

    #[test]
    fn transport_commands_update_state_until_released() {
        let backend = HttpProbeBackend::default();
        let url = Url::parse("http://127.0.0.1:9/stream").unwrap();
        let res = HttpStreamResource {
            client: backend.client.clone(),
            url: url.to_string(),
            state: Mutex::new(TransportState::Ready),
            volume: Mutex::new(0.5),
        };

        res.play();
        assert_eq!(res.state(), TransportState::Playing);
        res.pause();
        assert_eq!(res.state(), TransportState::Paused);
        res.set_volume(2.0);
        assert_eq!(res.volume(), 1.0);

        res.release();
        res.play();
        assert_eq!(res.state(), TransportState::Released);
    }

    #[tokio::test]
    async fn released_resource_does_not_probe() {
        let res = resource("http://127.0.0.1:9/stream");
        res.release();
        assert_eq!(
            res.wait_ready().await,
            Err(MediaError::Rejected("resource released".into()))
        );
    }

    #[tokio::test]
    async fn unreachable_host_reports_failure() {
        // Port 9 (discard) is not expected to accept HTTP on loopback.
        let res = resource("http://127.0.0.1:9/stream");
        assert!(matches!(
            res.wait_ready().await,
            Err(MediaError::Unreachable(_))
        ));
    }
}
