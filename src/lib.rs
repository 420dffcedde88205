//! Bilingual message translation and delivery core for a language-exchange
//! chat application.
//!
//! Two users pair up; each message is translated twice: once into the
//! sender's own language as a reinforcement ("shadow") rendering, once into
//! the receiver's target language. Because the composer lets users type in
//! either of their two languages without saying which, the input language is
//! detected heuristically from the first translation's result.
//!
//! The crate owns decision logic only. Identity, profiles, the realtime
//! document store and the translation engine are external collaborators
//! behind narrow seams ([`translation::Translator`],
//! [`store::ConversationStore`]), injected where they are used so everything
//! here runs against fakes in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tandem_chat::{
//!     Config, ConversationStream, MessageComposer, MemoryStore, MyMemoryTranslator,
//!     conversation_id,
//! };
//!
//! let config = Config::from_env()?;
//! let translator = Arc::new(MyMemoryTranslator::new(&config)?);
//! let store = Arc::new(MemoryStore::new());
//!
//! let composer = MessageComposer::new(translator, store.clone());
//! let chat_id = conversation_id(&alice.id, &bob.id);
//! composer.send(&chat_id, &alice, &bob, "Bonjour").await?;
//!
//! let mut stream = ConversationStream::open(store, &chat_id, &bob.id);
//! while let Some(messages) = stream.next_messages().await {
//!     for message in &messages {
//!         let rendered = message.render_for(&bob.id);
//!         println!("{}", rendered.primary);
//!     }
//! }
//! ```

pub mod composer;
pub mod config;
pub mod direction;
pub mod i18n;
pub mod message;
pub mod metrics;
pub mod retry;
pub mod store;
pub mod stream;
pub mod translation;

pub use composer::{MessageComposer, SendError};
pub use config::Config;
pub use i18n::Language;
pub use message::{
    conversation_id, LanguagePreference, MediaKind, Message, MessageDraft, Participant,
    RenderedMessage, TypingStatus,
};
pub use store::{ConversationStore, MemoryStore, MessageFeed, StoreError, TypingFeed};
pub use stream::ConversationStream;
pub use translation::{MyMemoryTranslator, Translation, Translator};

/// Initialize tracing output for binaries embedding the crate.
///
/// Respects `RUST_LOG`, defaulting this crate to `info`.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tandem_chat=info".parse()?),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;
    Ok(())
}
