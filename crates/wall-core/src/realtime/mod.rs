//! Supabase Realtime change feed.
//!
//! Each [`Subscription`] owns one WebSocket connection driven by a background
//! task. The task joins the table's channel, keeps it alive with heartbeats,
//! forwards row changes, and reconnects after connection loss. Dropping the
//! subscription makes the task leave the channel and close the socket.

pub mod protocol;

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::BoardConfig;
use crate::store::{ChangeFeed, Subscription, SubscriptionSink};
use crate::{Error, Result};
use protocol::{classify, Inbound, PhoenixMessage, RefCounter};

const DEFAULT_HEARTBEAT_SECS: u64 = 25;
const DEFAULT_RECONNECT_DELAYS_MS: [u64; 4] = [1_000, 2_000, 5_000, 10_000];
const DEFAULT_SCHEMA: &str = "public";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketWriter = SplitSink<Socket, Message>;

/// How a single connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// The subscriber went away; stop for good.
    Unsubscribed,
    /// The server or network dropped us; reconnect.
    Dropped { joined: bool },
}

/// Change feed over the project's Realtime WebSocket.
#[derive(Debug, Clone)]
pub struct RealtimeFeed {
    url: String,
    access_token: String,
    schema: String,
    table: String,
    heartbeat_interval: Duration,
    reconnect_delays: Vec<Duration>,
}

impl RealtimeFeed {
    #[must_use]
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            url: config.realtime_url(),
            access_token: config.supabase_anon_key.clone(),
            schema: DEFAULT_SCHEMA.to_string(),
            table: config.table.clone(),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            reconnect_delays: DEFAULT_RECONNECT_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Delays between reconnect attempts; the last one repeats.
    #[must_use]
    pub fn with_reconnect_delays(mut self, delays: Vec<Duration>) -> Self {
        self.reconnect_delays = delays;
        self
    }

    /// Channel topic for the table, e.g. `realtime:public:notes`.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }

    fn reconnect_delay(&self, attempt: usize) -> Duration {
        self.reconnect_delays
            .get(attempt)
            .or_else(|| self.reconnect_delays.last())
            .copied()
            .unwrap_or(Duration::from_millis(DEFAULT_RECONNECT_DELAYS_MS[0]))
    }

    async fn run(self, sink: SubscriptionSink) {
        let mut attempt = 0usize;
        loop {
            if sink.is_closed() {
                break;
            }

            match self.run_connection(&sink).await {
                Ok(ConnectionEnd::Unsubscribed) => break,
                Ok(ConnectionEnd::Dropped { joined }) => {
                    tracing::warn!("Realtime connection for {} dropped", self.topic());
                    if joined {
                        attempt = 0;
                    }
                }
                Err(error) => {
                    tracing::warn!("Realtime connection for {} failed: {}", self.topic(), error);
                }
            }

            let delay = self.reconnect_delay(attempt);
            attempt = attempt.saturating_add(1);
            tracing::debug!("Reconnecting realtime in {:?}", delay);
            tokio::select! {
                () = sink.closed() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
        tracing::info!("Realtime subscription for {} closed", self.topic());
    }

    async fn run_connection(&self, sink: &SubscriptionSink) -> Result<ConnectionEnd> {
        let topic = self.topic();
        let (socket, _response) = connect_async(self.url.as_str()).await?;
        let (mut writer, mut reader) = socket.split();
        let mut refs = RefCounter::default();

        let join_ref = refs.next_ref();
        let join = PhoenixMessage::join(
            &topic,
            &self.schema,
            &self.table,
            &self.access_token,
            &join_ref,
        );
        send_frame(&mut writer, &join).await?;

        let mut heartbeat = tokio::time::interval(self.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;

        let mut joined = false;
        loop {
            tokio::select! {
                () = sink.closed() => {
                    let leave = PhoenixMessage::leave(&topic, &refs.next_ref(), &join_ref);
                    if let Err(error) = send_frame(&mut writer, &leave).await {
                        tracing::debug!("Failed to send leave for {}: {}", topic, error);
                    }
                    let _ = writer.close().await;
                    return Ok(ConnectionEnd::Unsubscribed);
                }
                _ = heartbeat.tick() => {
                    send_frame(&mut writer, &PhoenixMessage::heartbeat(&refs.next_ref())).await?;
                }
                frame = reader.next() => {
                    let text = match frame {
                        None | Some(Ok(Message::Close(_))) => {
                            return Ok(ConnectionEnd::Dropped { joined });
                        }
                        Some(Err(error)) => return Err(error.into()),
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(_)) => continue,
                    };

                    let message: PhoenixMessage = match serde_json::from_str(&text) {
                        Ok(message) => message,
                        Err(error) => {
                            tracing::warn!("Ignoring malformed realtime frame: {}", error);
                            continue;
                        }
                    };

                    match classify(&message, &topic, &join_ref) {
                        Ok(Inbound::Joined) => {
                            joined = true;
                            tracing::info!("Subscribed to {}", topic);
                        }
                        Ok(Inbound::JoinRejected(reason)) => {
                            return Err(Error::Realtime(format!(
                                "join for {topic} refused: {reason}"
                            )));
                        }
                        Ok(Inbound::ChannelClosed) => {
                            return Ok(ConnectionEnd::Dropped { joined });
                        }
                        Ok(Inbound::Change(event)) => {
                            tracing::debug!("Realtime change: {:?}", event);
                            if !sink.send(event) {
                                return Ok(ConnectionEnd::Unsubscribed);
                            }
                        }
                        Ok(Inbound::Ignored) => {}
                        Err(error) => {
                            tracing::warn!("Ignoring unreadable realtime change: {}", error);
                        }
                    }
                }
            }
        }
    }
}

impl ChangeFeed for RealtimeFeed {
    fn subscribe(&self) -> Subscription {
        let (sink, subscription) = Subscription::channel();
        tokio::spawn(self.clone().run(sink));
        subscription
    }
}

async fn send_frame(writer: &mut SocketWriter, message: &PhoenixMessage) -> Result<()> {
    writer.send(Message::Text(message.to_json()?.into())).await?;
    Ok(())
}
