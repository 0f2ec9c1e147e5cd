//! Live viewer channel — line-delimited JSON events over TCP.
//!
//! Strictly fire-and-forget: a failed connect or write logs once,
//! marks the channel unavailable, and every later broadcast is
//! silently skipped. Nothing here may ever stall the session loop.

use async_trait::async_trait;
use chrono::Utc;
use hatchling_core::action::{Action, ActionResult};
use hatchling_core::broadcast::Broadcaster;
use hatchling_core::domain::Domain;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, warn};

/// Broadcasts session events to a viewer process.
pub struct ViewerBroadcaster {
    addr: String,
    stream: Option<TcpStream>,
}

impl ViewerBroadcaster {
    /// Connect to the viewer. A refused connection is not an error:
    /// the broadcaster starts unavailable and stays quiet.
    pub async fn connect(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!(%addr, "Connected to live viewer");
                Some(stream)
            }
            Err(e) => {
                warn!(%addr, error = %e, "Live viewer unreachable, broadcasts disabled");
                None
            }
        };
        Self { addr, stream }
    }

    /// Whether the channel is currently usable.
    pub fn is_available(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, event: serde_json::Value) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let mut line = event.to_string();
        line.push('\n');

        if let Err(e) = stream.write_all(line.as_bytes()).await {
            warn!(addr = %self.addr, error = %e, "Broadcast failed, channel marked unavailable");
            self.stream = None;
        }
    }
}

#[async_trait]
impl Broadcaster for ViewerBroadcaster {
    async fn broadcast_screen(&mut self, content: &str, domain: Domain, actions_remaining: u32) {
        self.send(json!({
            "type": "screen_update",
            "timestamp": Utc::now().to_rfc3339(),
            "data": {
                "screen_content": content,
                "domain": domain.as_str().to_uppercase(),
                "actions_remaining": actions_remaining,
            },
        }))
        .await;
    }

    async fn broadcast_action_start(&mut self, action: &Action, domain: Domain) {
        self.send(json!({
            "type": "action_start",
            "timestamp": Utc::now().to_rfc3339(),
            "data": {
                "action_type": action.action_type,
                "params": action.params,
                "reasoning": action.reasoning,
                "emotions": action.emotions,
                "self_criticism": action.self_criticism,
                "next_move_preview": action.next_move_preview,
                "domain": domain.as_str().to_uppercase(),
            },
        }))
        .await;
    }

    async fn broadcast_result(&mut self, action_type: &str, result: &ActionResult) {
        self.send(json!({
            "type": "action_result",
            "timestamp": Utc::now().to_rfc3339(),
            "data": {
                "action_type": action_type,
                "success": result.success,
                "result_data": result.data,
                "error": result.error,
            },
        }))
        .await;
    }

    async fn broadcast_session_end(&mut self, session_id: &str, summary: &str) {
        self.send(json!({
            "type": "session_end",
            "timestamp": Utc::now().to_rfc3339(),
            "data": {
                "session_id": session_id,
                "summary": summary,
            },
        }))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn refused_connection_disables_channel_silently() {
        // Bind a port, then drop the listener so connecting to it is
        // refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut broadcaster = ViewerBroadcaster::connect(&addr).await;
        assert!(!broadcaster.is_available());

        // Broadcasting on a dead channel must be a quiet no-op.
        broadcaster
            .broadcast_screen("screen", Domain::Home, 10)
            .await;
    }

    #[tokio::test]
    async fn events_arrive_as_json_lines() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut lines = tokio::io::BufReader::new(stream).lines();
            lines.next_line().await.unwrap().unwrap()
        });

        let mut broadcaster = ViewerBroadcaster::connect(&addr).await;
        assert!(broadcaster.is_available());
        broadcaster
            .broadcast_result("wiki_search", &ActionResult::ok("3 hits"))
            .await;

        let line = server.await.unwrap();
        let event: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(event["type"], "action_result");
        assert_eq!(event["data"]["action_type"], "wiki_search");
        assert_eq!(event["data"]["success"], true);
    }
}
