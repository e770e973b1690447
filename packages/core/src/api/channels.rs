//! Channel Rack Accessor

use super::{count_or_zero, integer_or, text_or};
use crate::bridge::{Envelope, FlStudioBridge, RemoteCall};
use crate::error::Result;
use crate::validation::{color_to_hex, hex_to_color};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub selected: bool,
}

pub struct ChannelApi {
    bridge: Arc<FlStudioBridge>,
}

impl ChannelApi {
    pub fn new(bridge: Arc<FlStudioBridge>) -> Self {
        Self { bridge }
    }

    async fn call(&self, call: RemoteCall) -> Envelope {
        self.bridge.safe_execute(call).await
    }

    fn channels(function: &str) -> RemoteCall {
        RemoteCall::new("channels", function)
    }

    /// Number of channels in the rack
    pub async fn count(&self) -> u32 {
        count_or_zero(&self.call(Self::channels("channelCount")).await)
    }

    pub async fn name(&self, channel_id: u32) -> String {
        let envelope = self
            .call(Self::channels("getChannelName").arg(channel_id))
            .await;
        text_or(&envelope, || format!("Channel {}", channel_id))
    }

    pub async fn set_name(&self, channel_id: u32, name: &str) -> bool {
        self.call(Self::channels("setChannelName").arg(channel_id).arg(name))
            .await
            .is_success()
    }

    /// Channel color as `#RRGGBB`
    pub async fn color(&self, channel_id: u32) -> String {
        let envelope = self
            .call(Self::channels("getChannelColor").arg(channel_id))
            .await;
        let color = envelope
            .data()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.trunc() as i64)));
        match color {
            Some(color) => color_to_hex(color),
            None => "#000000".to_string(),
        }
    }

    /// Set the channel color from `#RRGGBB` / `RRGGBB`.
    ///
    /// Fails with `InvalidParameter` before any host call when the color is
    /// not valid hex.
    pub async fn set_color(&self, channel_id: u32, color: &str) -> Result<bool> {
        let color = hex_to_color(color)?;
        Ok(self
            .call(Self::channels("setChannelColor").arg(channel_id).arg(color))
            .await
            .is_success())
    }

    pub async fn select(&self, channel_id: u32) -> bool {
        self.call(Self::channels("selectChannel").arg(channel_id))
            .await
            .is_success()
    }

    /// Index of the selected channel, `-1` when none
    pub async fn selected(&self) -> i64 {
        integer_or(&self.call(Self::channels("selectedChannel")).await, -1)
    }

    pub async fn all(&self) -> Vec<ChannelInfo> {
        let count = self.count().await;
        let selected = self.selected().await;

        let mut channels = Vec::with_capacity(count as usize);
        for id in 0..count {
            channels.push(ChannelInfo {
                id,
                name: self.name(id).await,
                color: self.color(id).await,
                selected: i64::from(id) == selected,
            });
        }
        channels
    }

    /// Add a piano roll note. Position and duration are in beats.
    pub async fn add_note(
        &self,
        channel_id: u32,
        position: f64,
        key: u8,
        duration: f64,
        velocity: u8,
    ) -> bool {
        let call = Self::channels("addNote")
            .arg(channel_id)
            .arg(position)
            .arg(key)
            .arg(duration)
            .arg(velocity);
        self.call(call).await.is_success()
    }

    /// Mixer insert the channel is routed to
    pub async fn target_mixer_track(&self, channel_id: u32) -> i64 {
        let envelope = self
            .call(Self::channels("getTargetFxTrack").arg(channel_id))
            .await;
        integer_or(&envelope, 0)
    }
}

#[cfg(test)]
#[path = "channels_test.rs"]
mod channels_test;
