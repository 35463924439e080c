//! The channel client: one connection, one demo run
//!
//! Owns the connection state machine and wires the three cooperative
//! futures together on the current-thread runtime: the outbound writer,
//! the inbound dispatch loop, and the demo script. The futures interleave
//! at await points only; there are no worker threads.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace};

use super::dispatcher::{AckPolicy, Dispatch, EventDispatcher};
use super::gate::element_gate;
use super::protocol::{outbound, Frame, SessionContext};
use super::script::{DemoScript, ScriptTiming};
use crate::config::HostConfig;
use crate::constants::demo;
use crate::settings::SettingsStore;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    Registered,
    Running,
    Terminated,
}

fn transition(state: &mut ConnState, next: ConnState) {
    debug!(from = ?state, to = ?next, "Channel state");
    *state = next;
}

/// One client instance per connection; independent instances can coexist
pub struct ChannelClient {
    endpoint: String,
    settings: SettingsStore,
    ack_policy: AckPolicy,
    topic: Option<String>,
    timing: ScriptTiming,
}

impl ChannelClient {
    pub fn new(host: &HostConfig, settings: SettingsStore) -> Self {
        Self {
            endpoint: host.endpoint_url(),
            settings,
            ack_policy: AckPolicy::default(),
            topic: None,
            timing: ScriptTiming::default(),
        }
    }

    /// Perform the topic registration handshake after connecting
    /// (required by older host versions; newer hosts scope events by
    /// category key instead)
    pub fn with_topic(mut self, topic: String) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn with_ack_policy(mut self, policy: AckPolicy) -> Self {
        self.ack_policy = policy;
        self
    }

    pub fn with_timing(mut self, timing: ScriptTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Connect, run the demo script, then hold the connection open for
    /// inbound events until the host disconnects
    ///
    /// Returning from this method means the connection is gone; the caller
    /// exits the process.
    pub async fn run(self) -> Result<()> {
        let ChannelClient {
            endpoint,
            settings,
            ack_policy,
            topic,
            timing,
        } = self;
        let mut state = ConnState::Disconnected;

        transition(&mut state, ConnState::Connecting);
        info!(%endpoint, "Connecting to host event channel");
        let (ws, _) = connect_async(endpoint.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", endpoint))?;
        transition(&mut state, ConnState::Connected);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Frame>();

        // Liveness probe goes out first
        out_tx
            .send(outbound::echo(demo::ECHO_PROBE))
            .context("Outbound channel closed before the probe")?;

        let session = match topic {
            Some(topic) => {
                let ctx = SessionContext::generate(topic);
                info!(topic = %ctx.topic, "Registering topic context");
                out_tx
                    .send(outbound::register_topic(&ctx))
                    .context("Outbound channel closed during registration")?;
                transition(&mut state, ConnState::Registered);
                Some(ctx)
            }
            None => None,
        };

        let snapshot = settings.settings().clone();
        let (counter, gate) = element_gate();
        let mut dispatcher = EventDispatcher::new(settings, counter, out_tx.clone(), ack_policy);
        let script = DemoScript::new(out_tx, gate, timing, snapshot);

        let writer = async {
            while let Some(frame) = out_rx.recv().await {
                trace!(event = %frame.event, "Emitting");
                let text = frame.encode()?;
                sink.send(Message::text(text))
                    .await
                    .context("WebSocket send failed")?;
            }
            Ok::<(), anyhow::Error>(())
        };

        let reader = async {
            while let Some(msg) = stream.next().await {
                match msg.context("WebSocket receive failed")? {
                    Message::Text(text) => match Frame::decode(text.as_str()) {
                        Ok(frame) => {
                            if dispatcher.handle_frame(frame) == Dispatch::Disconnected {
                                return Ok(());
                            }
                        }
                        Err(e) => trace!(error = %e, "Dropping undecodable frame"),
                    },
                    Message::Close(_) => return Ok(()),
                    _ => {}
                }
            }
            Ok::<(), anyhow::Error>(())
        };

        let script_fut = script.run();
        tokio::pin!(writer, reader, script_fut);

        transition(&mut state, ConnState::Running);
        let mut script_done = false;
        loop {
            tokio::select! {
                res = &mut script_fut, if !script_done => {
                    res?;
                    script_done = true;
                    transition(&mut state, ConnState::Terminated);
                    info!("Holding the connection open for inbound events");
                }
                res = &mut reader => {
                    res?;
                    break;
                }
                res = &mut writer => {
                    res?;
                    break;
                }
            }
        }

        transition(&mut state, ConnState::Disconnected);
        if let Some(ctx) = session {
            debug!(topic = %ctx.topic, "Session context released");
        }
        info!("Transport closed, shutting down");
        Ok(())
    }
}
