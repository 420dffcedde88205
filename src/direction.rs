//! Direction disambiguation for outgoing messages.
//!
//! The composer lets a user type in either their native or target language
//! without declaring which. A fixed "translate from target to native"
//! assumption misfires whenever the user typed in their native language, so
//! the first attempt's result is inspected: if the engine handed back the
//! original text unchanged (case-insensitively), that direction found no
//! meaningful transformation and the pair is swapped for one retry.
//!
//! Known limitation, preserved on purpose: a word that is genuinely
//! identical across both languages (proper nouns, cognates like "taxi")
//! produces the same identity signal as a failed translation. The two cases
//! cannot be told apart from the engine's output alone.

use crate::i18n::Language;
use crate::message::same_text;
use crate::metrics::TranslationMetrics;
use crate::translation::{Translation, Translator};
use tracing::debug;

/// States of the shadow derivation machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowState {
    /// Assume the text is in the sender's target language.
    TryTargetToNative,
    /// Identity signal observed; retry with the pair swapped.
    RetryNativeToTarget,
    /// A final shadow (possibly empty) has been settled on.
    Resolved,
}

/// The tie-break logic of §direction, separated from I/O so it can be
/// unit-tested with canned outcomes.
#[derive(Debug)]
pub struct DirectionMachine {
    native: Language,
    target: Language,
    state: ShadowState,
    retried: bool,
}

impl DirectionMachine {
    pub fn new(native: Language, target: Language) -> Self {
        Self {
            native,
            target,
            state: ShadowState::TryTargetToNative,
            retried: false,
        }
    }

    /// Current state, for tests and logging.
    pub fn state(&self) -> ShadowState {
        self.state
    }

    /// Whether the identity signal forced a swapped retry.
    pub fn retried(&self) -> bool {
        self.retried
    }

    /// The (source, target) pair to attempt next, or `None` once resolved.
    pub fn pending_attempt(&self) -> Option<(Language, Language)> {
        match self.state {
            ShadowState::TryTargetToNative => Some((self.target, self.native)),
            ShadowState::RetryNativeToTarget => Some((self.native, self.target)),
            ShadowState::Resolved => None,
        }
    }

    /// Feed the outcome of the pending attempt and advance.
    ///
    /// A candidate identical to the original (case-insensitively) on the
    /// first attempt is read as "the text was probably already in the
    /// native language" and triggers the swap. Failed translations keep the
    /// first assumption; the shadow just ends up empty.
    pub fn observe(&mut self, original: &str, outcome: &Translation) {
        match self.state {
            ShadowState::TryTargetToNative => {
                if !outcome.is_unavailable() && same_text(&outcome.text, original) {
                    debug!("Shadow candidate identical to original, retrying swapped");
                    self.state = ShadowState::RetryNativeToTarget;
                    self.retried = true;
                } else {
                    self.state = ShadowState::Resolved;
                }
            }
            ShadowState::RetryNativeToTarget => {
                self.state = ShadowState::Resolved;
            }
            ShadowState::Resolved => {}
        }
    }

    /// The language the text is detected to have been written in: the
    /// source of whichever attempt was settled on.
    pub fn detected_source(&self) -> Language {
        if self.retried {
            self.native
        } else {
            self.target
        }
    }
}

/// Result of shadow derivation for one outgoing message.
#[derive(Debug, Clone)]
pub struct DirectionOutcome {
    /// Reinforcement rendering for the sender; empty when translation failed.
    pub shadow: String,
    /// Best-effort guess at the language the sender typed in.
    pub detected_source: Language,
    /// Whether the identity signal forced the swapped retry.
    pub retried: bool,
}

/// Run the shadow machine against a live translator.
pub async fn derive_shadow(
    translator: &dyn Translator,
    text: &str,
    native: Language,
    target: Language,
) -> DirectionOutcome {
    let mut machine = DirectionMachine::new(native, target);
    let mut last = Translation::ok("");

    while let Some((source, dest)) = machine.pending_attempt() {
        let outcome = translator.translate(text, source, dest).await;
        machine.observe(text, &outcome);
        last = outcome;
    }

    if machine.retried() {
        TranslationMetrics::global().record_direction_retry();
    }

    let shadow = if last.is_unavailable() {
        String::new()
    } else {
        last.text
    };

    DirectionOutcome {
        shadow,
        detected_source: machine.detected_source(),
        retried: machine.retried(),
    }
}

/// Produce the receiver-facing rendering from the detected source language.
///
/// If the result carries the identity signature as well, one fallback retry
/// is made from the sender's target code, unless that would repeat the exact
/// pair already attempted. Identity and failed results both fall back to the
/// original text.
pub async fn translate_for_receiver(
    translator: &dyn Translator,
    text: &str,
    detected_source: Language,
    sender_target: Language,
    receiver_target: Language,
) -> String {
    let mut result = translator
        .translate(text, detected_source, receiver_target)
        .await;

    let identity = !result.is_unavailable() && same_text(&result.text, text);
    if identity && sender_target != detected_source {
        debug!("Receiver rendering identical to original, retrying from sender target");
        result = translator
            .translate(text, sender_target, receiver_target)
            .await;
    }

    if result.is_unavailable() || result.text.is_empty() {
        text.to_string()
    } else {
        result.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted translator: maps (text, source, target) to a canned outcome.
    /// Mirrors the gateway's short-circuits so scenarios behave as they
    /// would against the real thing.
    struct ScriptedTranslator {
        responses: HashMap<(String, &'static str, &'static str), Translation>,
        calls: AtomicUsize,
    }

    impl ScriptedTranslator {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn on(mut self, text: &str, source: Language, target: Language, out: Translation) -> Self {
            self.responses
                .insert((text.to_string(), source.code(), target.code()), out);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, text: &str, source: Language, target: Language) -> Translation {
            if text.trim().is_empty() {
                return Translation::ok("");
            }
            if source.code() == target.code() {
                return Translation::ok(text);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(&(text.to_string(), source.code(), target.code()))
                .cloned()
                .unwrap_or_else(|| Translation::unavailable("no scripted response"))
        }
    }

    fn english() -> Language {
        Language::ENGLISH
    }

    fn french() -> Language {
        Language::resolve("French")
    }

    fn spanish() -> Language {
        Language::resolve("Spanish")
    }

    // ==================== Machine Tests ====================

    #[test]
    fn test_machine_starts_with_target_to_native() {
        let machine = DirectionMachine::new(english(), french());
        assert_eq!(machine.state(), ShadowState::TryTargetToNative);
        assert_eq!(machine.pending_attempt(), Some((french(), english())));
    }

    #[test]
    fn test_machine_resolves_on_distinct_candidate() {
        let mut machine = DirectionMachine::new(english(), french());
        machine.observe("Bonjour", &Translation::ok("Hello"));

        assert_eq!(machine.state(), ShadowState::Resolved);
        assert!(!machine.retried());
        assert_eq!(machine.detected_source(), french());
        assert_eq!(machine.pending_attempt(), None);
    }

    #[test]
    fn test_machine_swaps_on_identity_signal() {
        let mut machine = DirectionMachine::new(english(), french());
        machine.observe("Hello", &Translation::ok("Hello"));

        assert_eq!(machine.state(), ShadowState::RetryNativeToTarget);
        assert_eq!(machine.pending_attempt(), Some((english(), french())));

        machine.observe("Hello", &Translation::ok("Bonjour"));
        assert_eq!(machine.state(), ShadowState::Resolved);
        assert!(machine.retried());
        assert_eq!(machine.detected_source(), english());
    }

    #[test]
    fn test_machine_identity_is_case_insensitive() {
        let mut machine = DirectionMachine::new(english(), french());
        machine.observe("Hello", &Translation::ok("hello"));
        assert_eq!(machine.state(), ShadowState::RetryNativeToTarget);
    }

    #[test]
    fn test_machine_keeps_assumption_on_failure() {
        // An unavailable outcome is not an identity signal
        let mut machine = DirectionMachine::new(english(), french());
        machine.observe("Hello", &Translation::unavailable("engine down"));

        assert_eq!(machine.state(), ShadowState::Resolved);
        assert!(!machine.retried());
        assert_eq!(machine.detected_source(), french());
    }

    // ==================== derive_shadow Tests ====================

    #[tokio::test]
    async fn test_shadow_when_typed_in_target_language() {
        // Sender native=English target=French types "Bonjour"
        let translator = ScriptedTranslator::new().on(
            "Bonjour",
            french(),
            english(),
            Translation::ok("Hello"),
        );

        let outcome = derive_shadow(&translator, "Bonjour", english(), french()).await;
        assert_eq!(outcome.shadow, "Hello");
        assert_eq!(outcome.detected_source, french());
        assert!(!outcome.retried);
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_shadow_when_typed_in_native_language() {
        // Same sender types "Hello": French->English hands it back unchanged,
        // the swap retry English->French produces the shadow
        let translator = ScriptedTranslator::new()
            .on("Hello", french(), english(), Translation::ok("Hello"))
            .on("Hello", english(), french(), Translation::ok("Bonjour"));

        let outcome = derive_shadow(&translator, "Hello", english(), french()).await;
        assert_eq!(outcome.shadow, "Bonjour");
        assert_eq!(outcome.detected_source, english());
        assert!(outcome.retried);
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn test_shadow_empty_on_failure() {
        let translator = ScriptedTranslator::new().on(
            "Hello",
            french(),
            english(),
            Translation::unavailable("engine down"),
        );

        let outcome = derive_shadow(&translator, "Hello", english(), french()).await;
        assert_eq!(outcome.shadow, "");
        assert_eq!(outcome.detected_source, french());
    }

    #[tokio::test]
    async fn test_shadow_cognate_stays_identical() {
        // "Taxi" translates to itself in both directions; the heuristic
        // cannot distinguish this from failure and settles on the retry's
        // identical result
        let translator = ScriptedTranslator::new()
            .on("Taxi", french(), english(), Translation::ok("Taxi"))
            .on("Taxi", english(), french(), Translation::ok("Taxi"));

        let outcome = derive_shadow(&translator, "Taxi", english(), french()).await;
        assert_eq!(outcome.shadow, "Taxi");
        assert!(outcome.retried);
    }

    // ==================== translate_for_receiver Tests ====================

    #[tokio::test]
    async fn test_receiver_translation_from_detected_source() {
        let translator = ScriptedTranslator::new().on(
            "Bonjour",
            french(),
            spanish(),
            Translation::ok("Hola"),
        );

        let translated =
            translate_for_receiver(&translator, "Bonjour", french(), french(), spanish()).await;
        assert_eq!(translated, "Hola");
    }

    #[tokio::test]
    async fn test_receiver_same_target_short_circuits() {
        // Receiver's target is the detected language; no call, text unchanged
        let translator = ScriptedTranslator::new();

        let translated =
            translate_for_receiver(&translator, "Bonjour", french(), french(), french()).await;
        assert_eq!(translated, "Bonjour");
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_receiver_identity_triggers_fallback_retry() {
        // Detected source was native English; English->Spanish echoes the
        // original, so the fallback retries from the sender's target (French)
        let translator = ScriptedTranslator::new()
            .on("Chat", english(), spanish(), Translation::ok("Chat"))
            .on("Chat", french(), spanish(), Translation::ok("Gato"));

        let translated =
            translate_for_receiver(&translator, "Chat", english(), french(), spanish()).await;
        assert_eq!(translated, "Gato");
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn test_receiver_identity_skips_repeat_pair() {
        // Detected source IS the sender's target; the fallback would repeat
        // the same pair, so it is skipped
        let translator = ScriptedTranslator::new().on(
            "Taxi",
            french(),
            spanish(),
            Translation::ok("Taxi"),
        );

        let translated =
            translate_for_receiver(&translator, "Taxi", french(), french(), spanish()).await;
        assert_eq!(translated, "Taxi");
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_receiver_falls_back_to_original_on_failure() {
        let translator = ScriptedTranslator::new().on(
            "Bonjour",
            french(),
            spanish(),
            Translation::unavailable("engine down"),
        );

        let translated =
            translate_for_receiver(&translator, "Bonjour", french(), french(), spanish()).await;
        assert_eq!(translated, "Bonjour");
    }
}
