//! Transport Accessor
//!
//! Playback, recording, song position, loop mode and tempo.

use super::{flag, number_or};
use crate::bridge::{Envelope, FlStudioBridge, RemoteCall};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_TEMPO: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportStatus {
    pub playing: bool,
    pub recording: bool,
    pub position_beats: f64,
}

pub struct TransportApi {
    bridge: Arc<FlStudioBridge>,
}

impl TransportApi {
    pub fn new(bridge: Arc<FlStudioBridge>) -> Self {
        Self { bridge }
    }

    async fn call(&self, call: RemoteCall) -> Envelope {
        self.bridge.safe_execute(call).await
    }

    fn transport(function: &str) -> RemoteCall {
        RemoteCall::new("transport", function)
    }

    pub async fn start(&self) -> bool {
        self.call(Self::transport("start")).await.is_success()
    }

    pub async fn stop(&self) -> bool {
        self.call(Self::transport("stop")).await.is_success()
    }

    /// Pause playback.
    ///
    /// The host's start call toggles play/pause, so it is only sent while
    /// playing. Pausing a stopped transport succeeds without a call.
    pub async fn pause(&self) -> bool {
        if self.is_playing().await {
            self.start().await
        } else {
            true
        }
    }

    pub async fn record(&self) -> bool {
        self.call(Self::transport("record")).await.is_success()
    }

    pub async fn is_playing(&self) -> bool {
        flag(&self.call(Self::transport("isPlaying")).await)
    }

    pub async fn is_recording(&self) -> bool {
        flag(&self.call(Self::transport("isRecording")).await)
    }

    pub async fn position(&self) -> f64 {
        number_or(&self.call(Self::transport("getSongPos")).await, 0.0)
    }

    pub async fn status(&self) -> TransportStatus {
        TransportStatus {
            playing: self.is_playing().await,
            recording: self.is_recording().await,
            position_beats: self.position().await,
        }
    }

    /// Move the song position, in beats
    pub async fn jump_to(&self, position: f64) -> bool {
        self.call(Self::transport("setSongPos").arg(position))
            .await
            .is_success()
    }

    pub async fn set_loop_mode(&self, enabled: bool) -> bool {
        self.call(Self::transport("setLoopMode").arg(i64::from(enabled)))
            .await
            .is_success()
    }

    pub async fn loop_mode(&self) -> bool {
        number_or(&self.call(Self::transport("getLoopMode")).await, 0.0) > 0.0
    }

    pub async fn set_tempo(&self, bpm: f64) -> bool {
        self.call(Self::transport("setTempo").arg(bpm))
            .await
            .is_success()
    }

    pub async fn tempo(&self) -> f64 {
        number_or(&self.call(Self::transport("getTempo")).await, DEFAULT_TEMPO)
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;
