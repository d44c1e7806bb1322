//! per-license-key broadcast relay for live pattern sync.
//!
//! each license key owns one actor task holding the set of open sessions
//! for that key. the session set is only ever touched from inside the
//! actor's own loop, so attach, detach, heartbeat, and eviction need no
//! locking and cannot race. lookups for the same key always land on the
//! same actor; different keys fan out on independent actors.
//!
//! delivery is fire-and-forget: a session whose channel is gone is evicted
//! on the failed send and never retried. persistence happens before any
//! broadcast, so a lost message only costs a client the live update, not
//! the data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use axum::extract::ws::Message;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// heartbeat request clients may send over a session.
const PING: &str = "ping";
/// heartbeat reply.
const PONG: &str = "pong";

/// one live session attached to a key's relay.
struct RelaySession {
    id: u64,
    outbound: mpsc::UnboundedSender<Message>,
}

enum RelayCommand {
    Attach(RelaySession),
    Inbound { session_id: u64, text: String },
    Detach { session_id: u64 },
    Broadcast(Message),
    SessionCount(oneshot::Sender<usize>),
}

struct RelayInner {
    actors: RwLock<HashMap<String, mpsc::UnboundedSender<RelayCommand>>>,
    next_session_id: AtomicU64,
}

/// registry of broadcast actors, one per license key.
///
/// all clones share the same actors. actors are spawned on first use and
/// live for the rest of the process; an idle actor is just a parked task.
#[derive(Clone)]
pub struct RelayRegistry {
    inner: Arc<RelayInner>,
}

impl RelayRegistry {
    /// create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                actors: RwLock::new(HashMap::new()),
                next_session_id: AtomicU64::new(1),
            }),
        }
    }

    /// resolve the actor for `key`, spawning it on first use.
    fn actor(&self, key: &str) -> mpsc::UnboundedSender<RelayCommand> {
        {
            let actors = self.inner.actors.read().expect("relay lock poisoned");
            if let Some(handle) = actors.get(key) {
                return handle.clone();
            }
        }

        let mut actors = self.inner.actors.write().expect("relay lock poisoned");
        // a racing caller may have spawned it between the locks
        if let Some(handle) = actors.get(key) {
            return handle.clone();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_actor(key.to_string(), rx));
        actors.insert(key.to_string(), tx.clone());
        debug!(key, "spawned relay actor");
        tx
    }

    /// look up the actor for `key` without spawning one.
    fn existing_actor(&self, key: &str) -> Option<mpsc::UnboundedSender<RelayCommand>> {
        let actors = self.inner.actors.read().expect("relay lock poisoned");
        actors.get(key).cloned()
    }

    /// attach a session's outbound channel to the key's relay.
    ///
    /// returns the session id to use for [`inbound`](Self::inbound) and
    /// [`detach_session`](Self::detach_session).
    pub fn attach_session(&self, key: &str, outbound: mpsc::UnboundedSender<Message>) -> u64 {
        let id = self.inner.next_session_id.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .actor(key)
            .send(RelayCommand::Attach(RelaySession { id, outbound }));
        debug!(key, session_id = id, "session attached");
        id
    }

    /// remove a session after its connection closed.
    pub fn detach_session(&self, key: &str, session_id: u64) {
        if let Some(actor) = self.existing_actor(key) {
            let _ = actor.send(RelayCommand::Detach { session_id });
        }
    }

    /// hand a text frame received on a session to the key's actor.
    pub fn inbound(&self, key: &str, session_id: u64, text: String) {
        if let Some(actor) = self.existing_actor(key) {
            let _ = actor.send(RelayCommand::Inbound { session_id, text });
        }
    }

    /// broadcast a pattern batch to every session attached to `key`.
    ///
    /// the envelope is serialized once here; sessions receive cheap clones
    /// of the same frame. a key with no actor has no sessions, so this is
    /// a no-op for it.
    pub fn broadcast_patterns(&self, key: &str, patterns: &serde_json::Value) {
        let Some(actor) = self.existing_actor(key) else {
            debug!(key, "no relay actor for key, skipping broadcast");
            return;
        };

        let envelope = serde_json::json!({
            "type": "pattern-sync",
            "patterns": patterns,
        })
        .to_string();

        if actor
            .send(RelayCommand::Broadcast(Message::Text(envelope.into())))
            .is_err()
        {
            warn!(key, "relay actor gone, broadcast dropped");
        }
    }

    /// number of sessions currently attached to `key`.
    pub async fn session_count(&self, key: &str) -> usize {
        let Some(actor) = self.existing_actor(key) else {
            return 0;
        };

        let (tx, rx) = oneshot::channel();
        if actor.send(RelayCommand::SessionCount(tx)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

impl Default for RelayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// the actor loop. sole owner of the key's session set.
async fn run_actor(key: String, mut rx: mpsc::UnboundedReceiver<RelayCommand>) {
    let mut sessions: Vec<RelaySession> = Vec::new();

    while let Some(command) = rx.recv().await {
        match command {
            RelayCommand::Attach(session) => {
                sessions.push(session);
            }
            RelayCommand::Inbound { session_id, text } => {
                if text != PING {
                    // heartbeat is the only inbound message the relay interprets
                    continue;
                }
                let alive = match sessions.iter().find(|s| s.id == session_id) {
                    Some(session) => session.outbound.send(Message::Text(PONG.into())).is_ok(),
                    None => true,
                };
                if !alive {
                    sessions.retain(|s| s.id != session_id);
                    debug!(key, session_id, "evicted session on failed pong");
                }
            }
            RelayCommand::Detach { session_id } => {
                sessions.retain(|s| s.id != session_id);
                debug!(key, session_id, "session detached");
            }
            RelayCommand::Broadcast(message) => {
                let before = sessions.len();
                sessions.retain(|s| s.outbound.send(message.clone()).is_ok());
                let evicted = before - sessions.len();
                if evicted > 0 {
                    debug!(key, evicted, "evicted sessions on failed send");
                }
                debug!(key, delivered = sessions.len(), "broadcast relayed");
            }
            RelayCommand::SessionCount(reply) => {
                let _ = reply.send(sessions.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    fn session() -> (
        mpsc::UnboundedSender<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        mpsc::unbounded_channel()
    }

    async fn recv_text(rx: &mut mpsc::UnboundedReceiver<Message>) -> String {
        let message = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timed out waiting for relay message")
            .expect("channel closed");
        match message {
            Message::Text(text) => text.as_str().to_string(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sessions_for_same_key_share_an_actor() {
        let relay = RelayRegistry::new();
        let (tx1, _rx1) = session();
        let (tx2, _rx2) = session();

        let id1 = relay.attach_session("slv-a", tx1);
        let id2 = relay.attach_session("slv-a", tx2);

        assert_ne!(id1, id2, "session ids should be distinct");
        assert_eq!(relay.session_count("slv-a").await, 2);
        assert_eq!(relay.session_count("slv-b").await, 0);
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let relay = RelayRegistry::new();
        let (tx, mut rx) = session();
        let id = relay.attach_session("slv-a", tx);

        relay.inbound("slv-a", id, "ping".to_string());

        assert_eq!(recv_text(&mut rx).await, "pong");
    }

    #[tokio::test]
    async fn non_ping_inbound_is_ignored() {
        let relay = RelayRegistry::new();
        let (tx, mut rx) = session();
        let id = relay.attach_session("slv-a", tx);

        relay.inbound("slv-a", id, "hello".to_string());

        let got = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(got.is_err(), "no reply expected for non-ping frames");
    }

    #[tokio::test]
    async fn broadcast_reaches_every_session() {
        let relay = RelayRegistry::new();
        let (tx1, mut rx1) = session();
        let (tx2, mut rx2) = session();
        relay.attach_session("slv-a", tx1);
        relay.attach_session("slv-a", tx2);

        relay.broadcast_patterns("slv-a", &serde_json::json!([{"a": 1}]));

        for rx in [&mut rx1, &mut rx2] {
            let text = recv_text(rx).await;
            let envelope: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(envelope["type"], "pattern-sync");
            assert_eq!(envelope["patterns"], serde_json::json!([{"a": 1}]));
        }
    }

    #[tokio::test]
    async fn failed_send_evicts_only_the_broken_session() {
        let relay = RelayRegistry::new();
        let (tx1, mut rx1) = session();
        let (tx2, rx2) = session();
        let (tx3, mut rx3) = session();
        relay.attach_session("slv-a", tx1);
        relay.attach_session("slv-a", tx2);
        relay.attach_session("slv-a", tx3);

        // one client goes away without a close frame
        drop(rx2);

        relay.broadcast_patterns("slv-a", &serde_json::json!([{"b": 2}]));

        // healthy sessions still get the batch, the broken one is gone
        assert!(recv_text(&mut rx1).await.contains("pattern-sync"));
        assert!(recv_text(&mut rx3).await.contains("pattern-sync"));
        assert_eq!(relay.session_count("slv-a").await, 2);
    }

    #[tokio::test]
    async fn detach_removes_the_session() {
        let relay = RelayRegistry::new();
        let (tx, mut rx) = session();
        let id = relay.attach_session("slv-a", tx);

        relay.detach_session("slv-a", id);
        assert_eq!(relay.session_count("slv-a").await, 0);

        relay.broadcast_patterns("slv-a", &serde_json::json!([]));
        let got = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(got.is_err(), "detached session should not receive");
    }

    #[tokio::test]
    async fn broadcast_to_unknown_key_is_a_noop() {
        let relay = RelayRegistry::new();
        // no actor exists yet; must not spawn one either
        relay.broadcast_patterns("slv-nobody", &serde_json::json!([]));
        assert_eq!(relay.session_count("slv-nobody").await, 0);
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let relay = RelayRegistry::new();
        let (tx_a, mut rx_a) = session();
        let (tx_b, mut rx_b) = session();
        relay.attach_session("slv-a", tx_a);
        relay.attach_session("slv-b", tx_b);

        relay.broadcast_patterns("slv-a", &serde_json::json!([{"only": "a"}]));

        assert!(recv_text(&mut rx_a).await.contains("only"));
        let got = timeout(Duration::from_millis(100), rx_b.recv()).await;
        assert!(got.is_err(), "other key's session must not receive");
    }

    #[tokio::test]
    async fn clones_share_actors() {
        let relay = RelayRegistry::new();
        let clone = relay.clone();

        let (tx, mut rx) = session();
        relay.attach_session("slv-a", tx);
        clone.broadcast_patterns("slv-a", &serde_json::json!([1]));

        assert!(recv_text(&mut rx).await.contains("pattern-sync"));
        assert_eq!(clone.session_count("slv-a").await, 1);
    }
}
