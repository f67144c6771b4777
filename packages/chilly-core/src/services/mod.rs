//! Playback services.
//!
//! The orchestrator owns both channels and runs on the player task started by
//! [`PlayerService`]; hosts talk to it only through [`PlayerHandle`].

mod channel;
mod orchestrator;
mod player_service;

pub use player_service::{PlayerHandle, PlayerService};
