//! Realtime conversation store seam.
//!
//! The hosted backend provides append-only message collections with
//! server-assigned timestamps, per-document read-state updates, and one
//! typing document per user, all observable as live snapshots. This module
//! captures that contract as a trait so the composer and stream can run
//! against fakes, plus an in-process implementation used by tests and local
//! development.
//!
//! Subscriptions are `tokio::sync::watch` channels: a lazy, unbounded
//! sequence of collection snapshots with last-snapshot-wins semantics.
//! Unsubscribing is dropping the receiver.

use crate::message::{Message, MessageDraft, TypingStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

/// Failures surfaced by a conversation store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message {0} not found")]
    NotFound(String),

    #[error("store backend unavailable: {0}")]
    Backend(String),
}

/// Live feed of message-collection snapshots for one conversation.
pub type MessageFeed = watch::Receiver<Vec<Message>>;

/// Live feed of typing-status snapshots for one conversation.
pub type TypingFeed = watch::Receiver<Vec<TypingStatus>>;

/// The narrow interface the core needs from the realtime document store.
///
/// Messages are independent immutable records, so the collection is
/// multi-writer without locking; `read_by` is only ever mutated by the
/// non-author; typing documents are single-writer-per-user.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist one message, assigning its id and a server timestamp that is
    /// strictly increasing within the conversation.
    async fn append_message(
        &self,
        conversation_id: &str,
        draft: MessageDraft,
    ) -> Result<Message, StoreError>;

    /// Add `reader_id` to the message's `read_by` set (union semantics) and
    /// bump `read_at`. Idempotent.
    async fn mark_read(
        &self,
        conversation_id: &str,
        message_id: &str,
        reader_id: &str,
    ) -> Result<(), StoreError>;

    /// Overwrite the caller's typing document. Last writer wins.
    async fn set_typing(
        &self,
        conversation_id: &str,
        status: TypingStatus,
    ) -> Result<(), StoreError>;

    /// Subscribe to message snapshots, ordered as stored.
    fn subscribe_messages(&self, conversation_id: &str) -> MessageFeed;

    /// Subscribe to typing-status snapshots.
    fn subscribe_typing(&self, conversation_id: &str) -> TypingFeed;
}

/// Per-conversation state of the in-memory store.
struct ConversationState {
    messages: Vec<Message>,
    typing: HashMap<String, TypingStatus>,
    message_tx: watch::Sender<Vec<Message>>,
    typing_tx: watch::Sender<Vec<TypingStatus>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl ConversationState {
    fn new() -> Self {
        let (message_tx, _) = watch::channel(Vec::new());
        let (typing_tx, _) = watch::channel(Vec::new());
        Self {
            messages: Vec::new(),
            typing: HashMap::new(),
            message_tx,
            typing_tx,
            last_timestamp: None,
        }
    }

    /// Server timestamp assignment: wall clock, nudged forward when the
    /// clock stalls or steps back, so ordering within a conversation never
    /// regresses.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn publish_messages(&self) {
        self.message_tx.send_replace(self.messages.clone());
    }

    fn publish_typing(&self) {
        let mut statuses: Vec<TypingStatus> = self.typing.values().cloned().collect();
        statuses.sort_by(|a, b| a.uid.cmp(&b.uid));
        self.typing_tx.send_replace(statuses);
    }
}

/// In-process [`ConversationStore`].
///
/// Mirrors the hosted backend's observable behavior closely enough for the
/// whole pipeline to be exercised offline.
pub struct MemoryStore {
    conversations: Mutex<HashMap<String, ConversationState>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ConversationState>>, StoreError> {
        self.conversations
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn append_message(
        &self,
        conversation_id: &str,
        draft: MessageDraft,
    ) -> Result<Message, StoreError> {
        let mut conversations = self.lock()?;
        let state = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationState::new);

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message {
            id: format!("msg-{}", id),
            text: draft.text,
            shadow: draft.shadow,
            translated: draft.translated,
            sender_id: draft.sender_id,
            sender_name: draft.sender_name,
            timestamp: state.next_timestamp(),
            read_by: Default::default(),
            read_at: None,
            media_url: draft.media_url,
            media_type: draft.media_type,
        };

        state.messages.push(message.clone());
        state.publish_messages();
        Ok(message)
    }

    async fn mark_read(
        &self,
        conversation_id: &str,
        message_id: &str,
        reader_id: &str,
    ) -> Result<(), StoreError> {
        let mut conversations = self.lock()?;
        let state = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| StoreError::NotFound(message_id.to_string()))?;

        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| StoreError::NotFound(message_id.to_string()))?;

        // Union semantics; an already-present reader is a no-op and
        // publishes no snapshot.
        if message.read_by.insert(reader_id.to_string()) {
            message.read_at = Some(Utc::now());
            state.publish_messages();
        }
        Ok(())
    }

    async fn set_typing(
        &self,
        conversation_id: &str,
        status: TypingStatus,
    ) -> Result<(), StoreError> {
        let mut conversations = self.lock()?;
        let state = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationState::new);

        state.typing.insert(status.uid.clone(), status);
        state.publish_typing();
        Ok(())
    }

    fn subscribe_messages(&self, conversation_id: &str) -> MessageFeed {
        let mut conversations = self.conversations.lock().expect("store mutex poisoned");
        conversations
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationState::new)
            .message_tx
            .subscribe()
    }

    fn subscribe_typing(&self, conversation_id: &str) -> TypingFeed {
        let mut conversations = self.conversations.lock().expect("store mutex poisoned");
        conversations
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationState::new)
            .typing_tx
            .subscribe()
    }
}
