//! Conversation data model: messages, typing status, participants.
//!
//! Field names serialize in camelCase to match the hosted document store's
//! wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user's language pair, as free-text names from their profile.
///
/// The profile store never holds codes; resolution happens in `i18n` at the
/// point of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePreference {
    /// The language the user already speaks (e.g., "English")
    pub native_language: String,
    /// The language the user is learning (e.g., "French")
    pub target_language: String,
}

/// A conversation participant: opaque identity plus language preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub languages: LanguagePreference,
}

/// Kind of media payload attached to a non-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Placeholder caption stored in `text` for media messages.
    pub fn caption(&self) -> &'static str {
        match self {
            MediaKind::Image => "📷 Photo",
            MediaKind::Audio => "🎤 Voice message",
        }
    }
}

/// A message as composed locally, before the store assigns identity.
///
/// `text` is the literal string the sender typed; `shadow` and `translated`
/// are the best-effort derived renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub text: String,
    pub shadow: String,
    pub translated: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
}

/// A persisted message: the unit of conversation state.
///
/// `id` and `timestamp` are assigned by the store on creation and immutable
/// thereafter, as are `text`, `sender_id` and `sender_name`. `read_by` only
/// ever grows (set union, no removal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    /// Reinforcement rendering in the sender's own language; empty when
    /// translation failed.
    pub shadow: String,
    /// Rendering for the receiver's target language; equals `text` when
    /// translation failed.
    pub translated: String,
    pub sender_id: String,
    pub sender_name: String,
    /// Server-assigned ordering key, monotonically increasing per conversation.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read_by: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
}

/// Ephemeral per-user typing record. Overwritten on every debounced update,
/// never part of message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatus {
    pub uid: String,
    pub is_typing: bool,
    pub timestamp: DateTime<Utc>,
}

/// What a viewer should see for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// The authoritative display text.
    pub primary: String,
    /// Auxiliary rendering, suppressed when it adds nothing over `primary`.
    pub secondary: Option<String>,
}

/// Case-insensitive text equality (Unicode lowercase).
///
/// Equality-to-original is the signal for "no useful translation"; both the
/// disambiguation retries and the rendering rule key on it.
pub(crate) fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Message {
    /// Whether this message was authored by `user_id`.
    pub fn is_own(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }

    /// The delivery-side rendering rule.
    ///
    /// For the author, the original `text` is authoritative and the shadow is
    /// shown only when it carries a useful distinct rendering. For the other
    /// participant, `translated` is authoritative (falling back to `text`)
    /// with the original as secondary context.
    pub fn render_for(&self, viewer_id: &str) -> RenderedMessage {
        if self.is_own(viewer_id) {
            let secondary = if !self.shadow.is_empty() && !same_text(&self.shadow, &self.text) {
                Some(self.shadow.clone())
            } else {
                None
            };
            RenderedMessage {
                primary: self.text.clone(),
                secondary,
            }
        } else {
            let primary = if self.translated.is_empty() {
                self.text.clone()
            } else {
                self.translated.clone()
            };
            let secondary = if !same_text(&self.text, &primary) {
                Some(self.text.clone())
            } else {
                None
            };
            RenderedMessage { primary, secondary }
        }
    }
}

/// Derive the identifier both participants compute for their conversation.
///
/// The pair is sorted lexicographically before joining, so the result is
/// independent of who initiates. Exactly two participants; group chats do
/// not exist in this design.
pub fn conversation_id(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{}_{}", first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: &str, text: &str, shadow: &str, translated: &str) -> Message {
        Message {
            id: "m1".to_string(),
            text: text.to_string(),
            shadow: shadow.to_string(),
            translated: translated.to_string(),
            sender_id: sender.to_string(),
            sender_name: "Alice".to_string(),
            timestamp: Utc::now(),
            read_by: BTreeSet::new(),
            read_at: None,
            media_url: None,
            media_type: None,
        }
    }

    // ==================== conversation_id Tests ====================

    #[test]
    fn test_conversation_id_is_symmetric() {
        assert_eq!(conversation_id("alice", "bob"), conversation_id("bob", "alice"));
    }

    #[test]
    fn test_conversation_id_sorts_lexicographically() {
        assert_eq!(conversation_id("zed", "amy"), "amy_zed");
        assert_eq!(conversation_id("amy", "zed"), "amy_zed");
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_render_own_message_shows_shadow() {
        let msg = message("alice", "Bonjour", "Hello", "Bonjour");
        let rendered = msg.render_for("alice");
        assert_eq!(rendered.primary, "Bonjour");
        assert_eq!(rendered.secondary.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_render_own_message_suppresses_empty_shadow() {
        let msg = message("alice", "Bonjour", "", "Bonjour");
        let rendered = msg.render_for("alice");
        assert_eq!(rendered.primary, "Bonjour");
        assert_eq!(rendered.secondary, None);
    }

    #[test]
    fn test_render_own_message_suppresses_identical_shadow() {
        // Cognates and proper nouns survive translation unchanged
        let msg = message("alice", "Taxi", "taxi", "Taxi");
        let rendered = msg.render_for("alice");
        assert_eq!(rendered.secondary, None);
    }

    #[test]
    fn test_render_other_message_prefers_translated() {
        let msg = message("alice", "Bonjour", "Hello", "Hola");
        let rendered = msg.render_for("bob");
        assert_eq!(rendered.primary, "Hola");
        assert_eq!(rendered.secondary.as_deref(), Some("Bonjour"));
    }

    #[test]
    fn test_render_other_message_falls_back_to_text() {
        let msg = message("alice", "Bonjour", "", "");
        let rendered = msg.render_for("bob");
        assert_eq!(rendered.primary, "Bonjour");
        assert_eq!(rendered.secondary, None);
    }

    #[test]
    fn test_render_other_message_suppresses_identical_original() {
        let msg = message("alice", "Bonjour", "Hello", "bonjour");
        let rendered = msg.render_for("bob");
        assert_eq!(rendered.primary, "bonjour");
        assert_eq!(rendered.secondary, None);
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_message_serializes_camel_case() {
        let mut msg = message("alice", "hi", "", "hi");
        msg.read_by.insert("bob".to_string());
        msg.read_at = Some(Utc::now());

        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("senderId"));
        assert!(json.contains("senderName"));
        assert!(json.contains("readBy"));
        assert!(json.contains("readAt"));
        assert!(!json.contains("mediaUrl")); // None fields are skipped
    }

    #[test]
    fn test_message_roundtrip() {
        let mut original = message("alice", "hi there", "salut", "hola");
        original.media_url = Some("https://example.com/pic.png".to_string());
        original.media_type = Some(MediaKind::Image);
        original.read_by.insert("bob".to_string());

        let json = serde_json::to_string(&original).expect("serialize");
        let restored: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_message_deserializes_without_read_fields() {
        // Documents written before a reader ever saw them carry no readBy
        let json = r#"{
            "id": "m9",
            "text": "hey",
            "shadow": "",
            "translated": "hey",
            "senderId": "alice",
            "senderName": "Alice",
            "timestamp": "2025-03-01T12:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).expect("deserialize");
        assert!(msg.read_by.is_empty());
        assert_eq!(msg.read_at, None);
    }

    #[test]
    fn test_media_kind_captions() {
        assert_eq!(MediaKind::Image.caption(), "📷 Photo");
        assert_eq!(MediaKind::Audio.caption(), "🎤 Voice message");
    }

    #[test]
    fn test_same_text_is_unicode_aware() {
        assert!(same_text("Bonjour", "bonjour"));
        assert!(same_text("ÊTRE", "être"));
        assert!(!same_text("Hello", "Bonjour"));
    }
}
