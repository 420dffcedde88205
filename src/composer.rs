//! Message composition: one send operation end to end.
//!
//! Resolves the two participants' languages, runs direction disambiguation,
//! derives the receiver-facing rendering, and persists the finished record.
//! Translation is strictly best-effort; only a persistence failure surfaces
//! to the caller, and it carries the draft back for the input field.

use crate::direction::{derive_shadow, translate_for_receiver};
use crate::i18n::Language;
use crate::message::{MediaKind, Message, MessageDraft, Participant};
use crate::store::{ConversationStore, StoreError};
use crate::translation::Translator;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a send operation.
///
/// Translation problems never appear here; a degraded message is still
/// delivered. Only the persistence write can fail a send.
#[derive(Debug, Error)]
pub enum SendError {
    /// The message record could not be written. `draft` is the composed
    /// text, returned so the caller can restore it for a retry; nothing
    /// partial was persisted.
    #[error("failed to persist message: {source}")]
    Persist {
        draft: String,
        #[source]
        source: StoreError,
    },
}

impl SendError {
    /// The text to restore into the composer input.
    pub fn draft(&self) -> &str {
        match self {
            SendError::Persist { draft, .. } => draft,
        }
    }
}

/// Builds and persists message records for one sender/receiver pair.
pub struct MessageComposer {
    translator: Arc<dyn Translator>,
    store: Arc<dyn ConversationStore>,
}

impl MessageComposer {
    pub fn new(translator: Arc<dyn Translator>, store: Arc<dyn ConversationStore>) -> Self {
        Self { translator, store }
    }

    /// Compose and persist one text message.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only input (nothing is
    /// sent, no translation is attempted). At most four translation calls
    /// are made, sequenced because each retry decision depends on the prior
    /// result.
    pub async fn send(
        &self,
        conversation_id: &str,
        sender: &Participant,
        receiver: &Participant,
        text: &str,
    ) -> Result<Option<Message>, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let native = Language::resolve(&sender.languages.native_language);
        let target = Language::resolve(&sender.languages.target_language);
        let receiver_target = Language::resolve(&receiver.languages.target_language);

        let direction = derive_shadow(self.translator.as_ref(), text, native, target).await;
        debug!(
            "Composed shadow ({} chars), detected source {}",
            direction.shadow.len(),
            direction.detected_source.code()
        );

        let translated = translate_for_receiver(
            self.translator.as_ref(),
            text,
            direction.detected_source,
            target,
            receiver_target,
        )
        .await;

        let draft = MessageDraft {
            text: text.to_string(),
            shadow: direction.shadow,
            translated,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name.clone(),
            media_url: None,
            media_type: None,
        };

        self.persist(conversation_id, draft).await.map(Some)
    }

    /// Persist a media message.
    ///
    /// The stored `text` is the media kind's placeholder caption; no
    /// translation is attempted for media.
    pub async fn send_media(
        &self,
        conversation_id: &str,
        sender: &Participant,
        media_url: &str,
        kind: MediaKind,
    ) -> Result<Message, SendError> {
        let caption = kind.caption();
        let draft = MessageDraft {
            text: caption.to_string(),
            shadow: String::new(),
            translated: caption.to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.display_name.clone(),
            media_url: Some(media_url.to_string()),
            media_type: Some(kind),
        };

        self.persist(conversation_id, draft).await
    }

    async fn persist(
        &self,
        conversation_id: &str,
        draft: MessageDraft,
    ) -> Result<Message, SendError> {
        let restore = draft.text.clone();
        match self.store.append_message(conversation_id, draft).await {
            Ok(message) => Ok(message),
            Err(source) => {
                warn!("Message persistence failed, restoring draft: {}", source);
                Err(SendError::Persist {
                    draft: restore,
                    source,
                })
            }
        }
    }
}
