//! Mixer Accessor
//!
//! Track 0 is the master track.

use super::{count_or_zero, number_or, text_or};
use crate::bridge::{Envelope, FlStudioBridge, RemoteCall};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_VOLUME: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLevels {
    pub track_id: u32,
    pub name: String,
    pub volume: f64,
    pub pan: f64,
}

pub struct MixerApi {
    bridge: Arc<FlStudioBridge>,
}

impl MixerApi {
    pub fn new(bridge: Arc<FlStudioBridge>) -> Self {
        Self { bridge }
    }

    async fn call(&self, call: RemoteCall) -> Envelope {
        self.bridge.safe_execute(call).await
    }

    fn mixer(function: &str) -> RemoteCall {
        RemoteCall::new("mixer", function)
    }

    pub async fn track_count(&self) -> u32 {
        count_or_zero(&self.call(Self::mixer("trackCount")).await)
    }

    pub async fn track_name(&self, track_id: u32) -> String {
        let envelope = self.call(Self::mixer("getTrackName").arg(track_id)).await;
        text_or(&envelope, || format!("Track {}", track_id))
    }

    pub async fn set_track_name(&self, track_id: u32, name: &str) -> bool {
        self.call(Self::mixer("setTrackName").arg(track_id).arg(name))
            .await
            .is_success()
    }

    /// Fader level, `0.0..=1.0`
    pub async fn volume(&self, track_id: u32) -> f64 {
        let envelope = self.call(Self::mixer("getTrackVolume").arg(track_id)).await;
        number_or(&envelope, DEFAULT_VOLUME)
    }

    pub async fn set_volume(&self, track_id: u32, volume: f64) -> bool {
        self.call(Self::mixer("setTrackVolume").arg(track_id).arg(volume))
            .await
            .is_success()
    }

    /// Pan position, `-1.0` (left) to `1.0` (right)
    pub async fn pan(&self, track_id: u32) -> f64 {
        let envelope = self.call(Self::mixer("getTrackPan").arg(track_id)).await;
        number_or(&envelope, 0.0)
    }

    pub async fn set_pan(&self, track_id: u32, pan: f64) -> bool {
        self.call(Self::mixer("setTrackPan").arg(track_id).arg(pan))
            .await
            .is_success()
    }

    pub async fn all_levels(&self) -> Vec<TrackLevels> {
        let count = self.track_count().await;

        let mut tracks = Vec::with_capacity(count as usize);
        for track_id in 0..count {
            tracks.push(TrackLevels {
                track_id,
                name: self.track_name(track_id).await,
                volume: self.volume(track_id).await,
                pan: self.pan(track_id).await,
            });
        }
        tracks
    }

    /// Route a channel rack channel to a mixer insert
    pub async fn route_channel(&self, channel_id: u32, track_id: u32) -> bool {
        let call = RemoteCall::new("channels", "routeToMixerTrack")
            .arg(channel_id)
            .arg(track_id);
        self.call(call).await.is_success()
    }

    pub async fn meter_level(&self, track_id: u32) -> f64 {
        let envelope = self
            .call(Self::mixer("getTrackMeterLevel").arg(track_id))
            .await;
        number_or(&envelope, 0.0)
    }

    pub async fn solo(&self, track_id: u32, solo: bool) -> bool {
        self.call(Self::mixer("soloTrack").arg(track_id).arg(solo))
            .await
            .is_success()
    }

    pub async fn mute(&self, track_id: u32, mute: bool) -> bool {
        self.call(Self::mixer("muteTrack").arg(track_id).arg(mute))
            .await
            .is_success()
    }
}

#[cfg(test)]
#[path = "mixer_test.rs"]
mod mixer_test;
