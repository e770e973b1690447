//! In-process stand-in for the host, used by unit tests across the crate.
//!
//! `FakeHost` keeps a tiny project (channels, mixer tracks, transport) and
//! answers the same module calls the accessors make. `FakeTransport` opens
//! sessions on it and counts opens and closes.

use crate::bridge::executor::FlStudioBridge;
use crate::bridge::protocol::{Expression, RemoteCall, RemoteRequest};
use crate::bridge::transport::{RemoteSession, Transport};
use crate::connection::{ConnectionConfig, ConnectionManager};
use crate::error::{BridgeError, Result};
use crate::mcp::server::McpServices;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct FakeChannel {
    pub name: String,
    pub color: i64,
    pub target: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeTrack {
    pub name: String,
    pub volume: f64,
    pub pan: f64,
    pub meter: f64,
    pub solo: bool,
    pub mute: bool,
}

#[derive(Debug)]
pub(crate) struct FakeHost {
    pub tempo: f64,
    pub playing: bool,
    pub recording: bool,
    pub song_pos: f64,
    pub loop_mode: bool,
    pub channels: Vec<FakeChannel>,
    pub selected: i64,
    pub tracks: Vec<FakeTrack>,
    pub notes: Vec<Vec<Value>>,
    pub calls: Vec<Expression>,
    /// Reply to numeric getters with floats, as some host builds do
    pub float_replies: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        let channel = |name: &str, color: i64, target: i64| FakeChannel {
            name: name.to_string(),
            color,
            target,
        };
        let track = |name: &str, volume: f64| FakeTrack {
            name: name.to_string(),
            volume,
            pan: 0.0,
            meter: 0.0,
            solo: false,
            mute: false,
        };

        Self {
            tempo: 140.0,
            playing: false,
            recording: false,
            song_pos: 0.0,
            loop_mode: false,
            channels: vec![
                channel("Kick", 0xFF5733, 1),
                channel("Snare", -11_773_245, 2),
                channel("Hat", 0x00FF00, 0),
            ],
            selected: 0,
            tracks: vec![
                track("Master", 0.8),
                track("Insert 1", 0.8),
                track("Insert 2", 0.5),
            ],
            notes: Vec::new(),
            calls: Vec::new(),
            float_replies: false,
        }
    }

    /// Names of the module functions called so far, e.g. `transport.start`
    pub fn called(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|expr| match expr {
                Expression::Call(call) => Some(format!("{}.{}", call.module, call.function)),
                Expression::Eval { .. } => None,
            })
            .collect()
    }

    fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        self.calls.push(expr.clone());
        match expr {
            Expression::Eval { source } => match source.as_str() {
                "1 + 1" => Ok(json!(2)),
                "panic" => panic!("host exploded"),
                other => Err(BridgeError::remote_execution(
                    format!("invalid syntax: {}", other),
                    "executor",
                )),
            },
            Expression::Call(call) => self.call(call),
        }
    }

    fn call(&mut self, call: &RemoteCall) -> Result<Value> {
        let args = Args(call);
        match (call.module.as_str(), call.function.as_str()) {
            ("transport", "start") => {
                self.playing = !self.playing;
                Ok(Value::Null)
            }
            ("transport", "stop") => {
                self.playing = false;
                self.song_pos = 0.0;
                Ok(Value::Null)
            }
            ("transport", "record") => {
                self.recording = !self.recording;
                Ok(Value::Null)
            }
            ("transport", "isPlaying") => Ok(json!(self.playing)),
            ("transport", "isRecording") => Ok(json!(self.recording)),
            ("transport", "getSongPos") => Ok(json!(self.song_pos)),
            ("transport", "setSongPos") => {
                self.song_pos = args.f64(0)?;
                Ok(Value::Null)
            }
            ("transport", "getLoopMode") => Ok(json!(i64::from(self.loop_mode))),
            ("transport", "setLoopMode") => {
                self.loop_mode = args.i64(0)? != 0;
                Ok(Value::Null)
            }
            ("transport", "getTempo") => Ok(json!(self.tempo)),
            ("transport", "setTempo") => {
                self.tempo = args.f64(0)?;
                Ok(Value::Null)
            }

            ("channels", "channelCount") => Ok(json!(self.channels.len())),
            ("channels", "getChannelName") => Ok(json!(self.channel(&args)?.name)),
            ("channels", "setChannelName") => {
                let name = args.str(1)?;
                self.channel_mut(&args)?.name = name;
                Ok(Value::Null)
            }
            ("channels", "getChannelColor") => {
                let color = self.channel(&args)?.color;
                Ok(if self.float_replies {
                    json!(color as f64)
                } else {
                    json!(color)
                })
            }
            ("channels", "setChannelColor") => {
                let color = args.i64(1)?;
                self.channel_mut(&args)?.color = color;
                Ok(Value::Null)
            }
            ("channels", "selectChannel") => {
                self.channel(&args)?;
                self.selected = args.i64(0)?;
                Ok(Value::Null)
            }
            ("channels", "selectedChannel") => Ok(json!(self.selected)),
            ("channels", "addNote") => {
                self.channel(&args)?;
                self.notes.push(call.args.clone());
                Ok(Value::Null)
            }
            ("channels", "getTargetFxTrack") => Ok(json!(self.channel(&args)?.target)),
            ("channels", "routeToMixerTrack") => {
                let target = args.i64(1)?;
                self.channel_mut(&args)?.target = target;
                Ok(Value::Null)
            }

            ("mixer", "trackCount") => Ok(json!(self.tracks.len())),
            ("mixer", "getTrackName") => Ok(json!(self.track(&args)?.name)),
            ("mixer", "setTrackName") => {
                let name = args.str(1)?;
                self.track_mut(&args)?.name = name;
                Ok(Value::Null)
            }
            ("mixer", "getTrackVolume") => Ok(json!(self.track(&args)?.volume)),
            ("mixer", "setTrackVolume") => {
                let volume = args.f64(1)?;
                self.track_mut(&args)?.volume = volume;
                Ok(Value::Null)
            }
            ("mixer", "getTrackPan") => Ok(json!(self.track(&args)?.pan)),
            ("mixer", "setTrackPan") => {
                let pan = args.f64(1)?;
                self.track_mut(&args)?.pan = pan;
                Ok(Value::Null)
            }
            ("mixer", "getTrackMeterLevel") => Ok(json!(self.track(&args)?.meter)),
            ("mixer", "soloTrack") => {
                let solo = args.bool(1)?;
                self.track_mut(&args)?.solo = solo;
                Ok(Value::Null)
            }
            ("mixer", "muteTrack") => {
                let mute = args.bool(1)?;
                self.track_mut(&args)?.mute = mute;
                Ok(Value::Null)
            }

            (module, function) => Err(BridgeError::remote_execution(
                format!("module '{}' has no attribute '{}'", module, function),
                module,
            )),
        }
    }

    fn channel(&self, args: &Args<'_>) -> Result<&FakeChannel> {
        let index = args.index(0)?;
        self.channels
            .get(index)
            .ok_or_else(|| out_of_range("channels", index))
    }

    fn channel_mut(&mut self, args: &Args<'_>) -> Result<&mut FakeChannel> {
        let index = args.index(0)?;
        self.channels
            .get_mut(index)
            .ok_or_else(|| out_of_range("channels", index))
    }

    fn track(&self, args: &Args<'_>) -> Result<&FakeTrack> {
        let index = args.index(0)?;
        self.tracks
            .get(index)
            .ok_or_else(|| out_of_range("mixer", index))
    }

    fn track_mut(&mut self, args: &Args<'_>) -> Result<&mut FakeTrack> {
        let index = args.index(0)?;
        self.tracks
            .get_mut(index)
            .ok_or_else(|| out_of_range("mixer", index))
    }
}

fn out_of_range(module: &str, index: usize) -> BridgeError {
    BridgeError::remote_execution(format!("index {} out of range", index), module)
}

struct Args<'a>(&'a RemoteCall);

impl Args<'_> {
    fn get(&self, n: usize) -> Result<&Value> {
        self.0.args.get(n).ok_or_else(|| {
            BridgeError::remote_execution(
                format!("{}() missing argument {}", self.0.function, n),
                self.0.module.as_str(),
            )
        })
    }

    fn bad_arg(&self, n: usize) -> BridgeError {
        BridgeError::remote_execution(
            format!("{}() bad argument {}", self.0.function, n),
            self.0.module.as_str(),
        )
    }

    fn f64(&self, n: usize) -> Result<f64> {
        self.get(n)?.as_f64().ok_or_else(|| self.bad_arg(n))
    }

    fn i64(&self, n: usize) -> Result<i64> {
        self.get(n)?.as_i64().ok_or_else(|| self.bad_arg(n))
    }

    fn index(&self, n: usize) -> Result<usize> {
        self.get(n)?
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| self.bad_arg(n))
    }

    fn str(&self, n: usize) -> Result<String> {
        self.get(n)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.bad_arg(n))
    }

    fn bool(&self, n: usize) -> Result<bool> {
        self.get(n)?.as_bool().ok_or_else(|| self.bad_arg(n))
    }
}

pub(crate) struct FakeTransport {
    host: Arc<Mutex<FakeHost>>,
    available: AtomicBool,
    open_error: Mutex<Option<BridgeError>>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            host: Arc::new(Mutex::new(FakeHost::new())),
            available: AtomicBool::new(true),
            open_error: Mutex::new(None),
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        let transport = Self::new();
        transport.set_available(false);
        transport
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make the next `open` fail with `error`
    pub fn fail_next_open(&self, error: BridgeError) {
        *self.open_error.lock().unwrap() = Some(error);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn host(&self) -> MutexGuard<'_, FakeHost> {
        self.host.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn name(&self) -> &str {
        "fake"
    }

    fn version(&self) -> Option<String> {
        Some("fake-1.0".to_string())
    }

    fn probe(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::dependency_unavailable(
                "fake dependency is not installed",
            ))
        }
    }

    async fn open(
        &self,
        _request_port: &str,
        _response_port: &str,
    ) -> Result<Box<dyn RemoteSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.open_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(Box::new(FakeSession {
            host: Arc::clone(&self.host),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeSession {
    host: Arc<Mutex<FakeHost>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn evaluate(&mut self, request: &RemoteRequest) -> Result<Value> {
        if request.expr == Expression::eval("sleep") {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.host
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .evaluate(&request.expr)
    }

    async fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Bridge already connected to a fresh fake host
pub(crate) async fn connected_bridge() -> (Arc<FakeTransport>, Arc<FlStudioBridge>) {
    let transport = FakeTransport::new();
    let bridge = Arc::new(FlStudioBridge::with_timeout(
        transport.clone(),
        Duration::from_millis(200),
    ));
    bridge
        .connect("Flapi Request", "Flapi Response")
        .await
        .unwrap();
    (transport, bridge)
}

/// Tool services over a fresh fake host; nothing is connected yet
pub(crate) fn fake_services(auto_connect: bool) -> (Arc<FakeTransport>, McpServices) {
    let transport = FakeTransport::new();
    let config = ConnectionConfig {
        auto_connect,
        timeout: Duration::from_millis(200),
        ..ConnectionConfig::default()
    };
    let manager = ConnectionManager::with_transport(transport.clone(), config);
    (transport, McpServices::new(Arc::new(manager)))
}
