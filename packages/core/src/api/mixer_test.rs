//! Tests for the mixer accessor

use super::*;
use crate::bridge::test_support::connected_bridge;
use serde_json::json;

#[tokio::test]
async fn test_track_names() {
    let (_transport, bridge) = connected_bridge().await;
    let api = MixerApi::new(bridge);

    assert_eq!(api.track_count().await, 3);
    assert_eq!(api.track_name(0).await, "Master");
    assert!(api.set_track_name(1, "Drums").await);
    assert_eq!(api.track_name(1).await, "Drums");
    assert_eq!(api.track_name(50).await, "Track 50");
}

#[tokio::test]
async fn test_volume_and_pan() {
    let (transport, bridge) = connected_bridge().await;
    let api = MixerApi::new(bridge);

    assert!(api.set_volume(2, 0.25).await);
    assert!(api.set_pan(2, -0.5).await);
    assert_eq!(api.volume(2).await, 0.25);
    assert_eq!(api.pan(2).await, -0.5);
    assert_eq!(transport.host().tracks[2].pan, -0.5);

    // Missing tracks fall back to defaults
    assert_eq!(api.volume(50).await, DEFAULT_VOLUME);
    assert_eq!(api.pan(50).await, 0.0);
    assert_eq!(api.meter_level(50).await, 0.0);
}

#[tokio::test]
async fn test_all_levels() {
    let (_transport, bridge) = connected_bridge().await;
    let api = MixerApi::new(bridge);

    let levels = api.all_levels().await;
    assert_eq!(levels.len(), 3);
    assert_eq!(
        serde_json::to_value(&levels[2]).unwrap(),
        json!({"track_id": 2, "name": "Insert 2", "volume": 0.5, "pan": 0.0})
    );
}

#[tokio::test]
async fn test_route_channel() {
    let (transport, bridge) = connected_bridge().await;
    let api = MixerApi::new(bridge);

    assert!(api.route_channel(0, 2).await);
    assert_eq!(transport.host().channels[0].target, 2);
    assert!(!api.route_channel(9, 2).await);
}

#[tokio::test]
async fn test_solo_and_mute_send_structured_calls() {
    let (transport, bridge) = connected_bridge().await;
    let api = MixerApi::new(bridge);

    assert!(api.solo(1, true).await);
    assert!(api.mute(2, true).await);
    assert!(api.mute(2, false).await);

    let host = transport.host();
    assert!(host.tracks[1].solo);
    assert!(!host.tracks[2].mute);
    assert_eq!(
        host.called(),
        vec!["mixer.soloTrack", "mixer.muteTrack", "mixer.muteTrack"]
    );
}
