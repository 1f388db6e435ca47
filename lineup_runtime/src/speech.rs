//! Speech output.
//!
//! The runtime hands plain reading text to a [`SpeechSink`]; the sink
//! talks to whatever synthesizer the host provides. The controller keeps
//! at most one utterance playing: every `speak` cancels first.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceParams {
    pub voice: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

pub trait SpeechSink {
    /// Start reading `text`. Text is plain readings, no markup.
    fn speak(&mut self, text: &str, params: &VoiceParams);
    /// Stop whatever is playing. Safe to call when idle.
    fn cancel(&mut self);
}

/// Single-utterance wrapper around a sink.
#[derive(Debug)]
pub struct SpeechController<K: SpeechSink> {
    sink: K,
    params: VoiceParams,
    speaking: bool,
}

impl<K: SpeechSink> SpeechController<K> {
    pub fn new(sink: K, params: VoiceParams) -> Self {
        Self {
            sink,
            params,
            speaking: false,
        }
    }

    pub fn speak(&mut self, text: &str) {
        self.sink.cancel();
        if text.is_empty() {
            self.speaking = false;
            return;
        }
        debug!(chars = text.chars().count(), "speak");
        self.sink.speak(text, &self.params);
        self.speaking = true;
    }

    pub fn cancel(&mut self) {
        if self.speaking {
            debug!("speech cancelled");
        }
        self.sink.cancel();
        self.speaking = false;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn set_params(&mut self, params: VoiceParams) {
        self.params = params;
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Speak(String),
    Cancel,
}

/// Sink that records every call, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SpeechEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SpeechEvent::Speak(text) => Some(text.as_str()),
                SpeechEvent::Cancel => None,
            })
            .collect()
    }
}

impl SpeechSink for RecordingSink {
    fn speak(&mut self, text: &str, _params: &VoiceParams) {
        self.events.push(SpeechEvent::Speak(text.to_string()));
    }

    fn cancel(&mut self) {
        self.events.push(SpeechEvent::Cancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_speak_cancels_first() {
        let mut speech = SpeechController::new(RecordingSink::new(), VoiceParams::default());
        speech.speak("いち");
        speech.speak("に");
        assert_eq!(
            speech.sink().events,
            vec![
                SpeechEvent::Cancel,
                SpeechEvent::Speak("いち".to_string()),
                SpeechEvent::Cancel,
                SpeechEvent::Speak("に".to_string()),
            ]
        );
        assert!(speech.is_speaking());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut speech = SpeechController::new(RecordingSink::new(), VoiceParams::default());
        speech.cancel();
        speech.cancel();
        assert!(!speech.is_speaking());
        assert!(speech.sink().spoken().is_empty());
    }

    #[test]
    fn empty_text_only_cancels() {
        let mut speech = SpeechController::new(RecordingSink::new(), VoiceParams::default());
        speech.speak("");
        assert_eq!(speech.into_sink().events, vec![SpeechEvent::Cancel]);
    }
}
