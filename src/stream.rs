//! Conversation stream: the live, ordered view of one conversation.
//!
//! Reconciles the authoritative message feed with read receipts and typing
//! presence. Messages are append-only immutable records ordered by their
//! server timestamp; read receipts and typing updates are best-effort
//! presence signals whose failures never surface past this module.

use crate::message::{Message, TypingStatus};
use crate::store::{ConversationStore, MessageFeed, TypingFeed};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default input-inactivity window before a typing indicator expires.
pub const DEFAULT_TYPING_EXPIRY: Duration = Duration::from_secs(3);

/// Live view of one conversation for one local participant.
///
/// Owns the local user's typing debounce timer. Teardown via
/// [`ConversationStream::close`] is mandatory cleanup: it cancels the timer
/// and deterministically flips the local typing status to false.
pub struct ConversationStream {
    store: Arc<dyn ConversationStore>,
    conversation_id: String,
    local_id: String,
    messages: MessageFeed,
    typing: TypingFeed,
    typing_expiry: Duration,
    expiry_task: Option<JoinHandle<()>>,
    delivered_initial: bool,
    closed: bool,
}

impl ConversationStream {
    /// Open the stream: subscribes to the conversation's message and typing
    /// feeds.
    pub fn open(
        store: Arc<dyn ConversationStore>,
        conversation_id: impl Into<String>,
        local_id: impl Into<String>,
    ) -> Self {
        let conversation_id = conversation_id.into();
        let messages = store.subscribe_messages(&conversation_id);
        let typing = store.subscribe_typing(&conversation_id);
        Self {
            store,
            conversation_id,
            local_id: local_id.into(),
            messages,
            typing,
            typing_expiry: DEFAULT_TYPING_EXPIRY,
            expiry_task: None,
            delivered_initial: false,
            closed: false,
        }
    }

    /// Override the typing expiry window.
    pub fn with_typing_expiry(mut self, expiry: Duration) -> Self {
        self.typing_expiry = expiry;
        self
    }

    /// Await the next message snapshot, sorted by server timestamp.
    ///
    /// The first call yields the current snapshot immediately; later calls
    /// wait for a change. Returns `None` once the feed has ended. Incoming
    /// messages not yet read by the local user are marked read as a side
    /// effect, fire-and-forget.
    pub async fn next_messages(&mut self) -> Option<Vec<Message>> {
        if self.delivered_initial && self.messages.changed().await.is_err() {
            return None;
        }
        self.delivered_initial = true;

        let mut snapshot = self.messages.borrow_and_update().clone();
        // The feed may deliver insertions in any order; the timestamp is
        // the only ordering that holds across devices.
        snapshot.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });

        self.mark_incoming_read(&snapshot);
        Some(snapshot)
    }

    /// Mark every unread message from the other participant as read.
    ///
    /// Failures are non-critical: the next snapshot retries implicitly.
    fn mark_incoming_read(&self, snapshot: &[Message]) {
        for message in snapshot {
            if message.sender_id == self.local_id || message.read_by.contains(&self.local_id) {
                continue;
            }
            let store = Arc::clone(&self.store);
            let conversation_id = self.conversation_id.clone();
            let message_id = message.id.clone();
            let reader = self.local_id.clone();
            tokio::spawn(async move {
                if let Err(e) = store.mark_read(&conversation_id, &message_id, &reader).await {
                    warn!("Failed to mark message {} as read: {}", message_id, e);
                }
            });
        }
    }

    /// Whether any participant other than the local user is typing, per the
    /// latest typing snapshot.
    pub fn other_is_typing(&self) -> bool {
        self.typing
            .borrow()
            .iter()
            .any(|t| t.uid != self.local_id && t.is_typing)
    }

    /// Await the next typing snapshot and return the derived indicator.
    /// Returns `None` once the feed has ended.
    pub async fn typing_changed(&mut self) -> Option<bool> {
        if self.typing.changed().await.is_err() {
            return None;
        }
        let other_typing = self
            .typing
            .borrow_and_update()
            .iter()
            .any(|t| t.uid != self.local_id && t.is_typing);
        Some(other_typing)
    }

    /// React to a composer input change.
    ///
    /// Non-empty input publishes `is_typing = true` immediately and re-arms
    /// the expiry timer; after the inactivity window the status flips to
    /// false exactly once. Clearing the input flips it false immediately.
    pub async fn input_changed(&mut self, text: &str) {
        self.cancel_expiry();

        if text.trim().is_empty() {
            self.publish_typing(false).await;
            return;
        }

        self.publish_typing(true).await;
        self.arm_expiry();
    }

    /// The message was sent; the composer is empty again.
    pub async fn message_sent(&mut self) {
        self.cancel_expiry();
        self.publish_typing(false).await;
    }

    /// Mandatory teardown: cancel the pending debounce timer and flip the
    /// local typing status to false.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_expiry();
        self.publish_typing(false).await;
        self.closed = true;
        debug!("Conversation stream {} closed", self.conversation_id);
    }

    fn arm_expiry(&mut self) {
        let store = Arc::clone(&self.store);
        let conversation_id = self.conversation_id.clone();
        let uid = self.local_id.clone();
        let delay = self.typing_expiry;
        self.expiry_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let status = TypingStatus {
                uid,
                is_typing: false,
                timestamp: Utc::now(),
            };
            if let Err(e) = store.set_typing(&conversation_id, status).await {
                warn!("Typing expiry write failed: {}", e);
            }
        }));
    }

    fn cancel_expiry(&mut self) {
        if let Some(task) = self.expiry_task.take() {
            task.abort();
        }
    }

    async fn publish_typing(&self, is_typing: bool) {
        let status = TypingStatus {
            uid: self.local_id.clone(),
            is_typing,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.store.set_typing(&self.conversation_id, status).await {
            // Presence is best-effort; never propagate
            warn!("Typing status write failed: {}", e);
        }
    }
}

impl Drop for ConversationStream {
    fn drop(&mut self) {
        self.cancel_expiry();
        if !self.closed {
            // Backstop for callers that skipped close(); only possible from
            // within a runtime.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let store = Arc::clone(&self.store);
                let conversation_id = self.conversation_id.clone();
                let uid = self.local_id.clone();
                handle.spawn(async move {
                    let status = TypingStatus {
                        uid,
                        is_typing: false,
                        timestamp: Utc::now(),
                    };
                    let _ = store.set_typing(&conversation_id, status).await;
                });
            }
        }
    }
}
