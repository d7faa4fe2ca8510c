use anyhow::{anyhow, Result};
use copypasta::{ClipboardContext, ClipboardProvider};
use log::info;

/// Destination for transcript copies.
pub trait ClipboardSink: Send {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via copypasta. The platform context is not
/// guaranteed to be Send, so it is created per copy rather than held.
#[derive(Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        // Probe once so an unusable platform surfaces at startup.
        ClipboardContext::new().map_err(|err| anyhow!("clipboard unavailable: {err}"))?;
        Ok(Self)
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        let mut context =
            ClipboardContext::new().map_err(|err| anyhow!("clipboard unavailable: {err}"))?;
        context
            .set_contents(text.to_string())
            .map_err(|err| anyhow!("clipboard write failed: {err}"))
    }
}

/// A single piece of speech to play back.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Seam over the platform speech engine. Implementations must cancel
/// any in-flight utterance before starting a new one.
pub trait SpeechService: Send {
    fn available(&self) -> bool;

    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    fn cancel(&mut self);
}

/// Headless speech backend: logs what would be spoken. Keeps the
/// cancel-before-speak contract observable in logs.
#[derive(Default)]
pub struct LogSpeech {
    speaking: bool,
}

impl SpeechService for LogSpeech {
    fn available(&self) -> bool {
        true
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        if self.speaking {
            self.cancel();
        }
        self.speaking = true;
        info!(
            "speaking (rate {}, pitch {}): {}",
            utterance.rate, utterance.pitch, utterance.text
        );
        Ok(())
    }

    fn cancel(&mut self) {
        if self.speaking {
            info!("cancelling in-flight utterance");
            self.speaking = false;
        }
    }
}

/// Stands in when the platform has no speech engine at all.
#[derive(Default)]
pub struct UnavailableSpeech;

impl SpeechService for UnavailableSpeech {
    fn available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<()> {
        Err(anyhow!("speech synthesis is not available"))
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Records everything it is asked to do, for controller tests.
    #[derive(Default)]
    pub struct RecordingClipboard {
        pub copied: Vec<String>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn copy_text(&mut self, text: &str) -> Result<()> {
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingSpeech {
        pub utterances: Vec<Utterance>,
        pub cancels: usize,
        pub speaking: bool,
    }

    impl SpeechService for RecordingSpeech {
        fn available(&self) -> bool {
            true
        }

        fn speak(&mut self, utterance: Utterance) -> Result<()> {
            if self.speaking {
                self.cancel();
            }
            self.speaking = true;
            self.utterances.push(utterance);
            Ok(())
        }

        fn cancel(&mut self) {
            self.cancels += 1;
            self.speaking = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingSpeech;
    use super::*;
    use pretty_assertions::assert_eq;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }

    #[test]
    fn speak_cancels_previous_utterance() {
        let mut speech = RecordingSpeech::default();
        speech.speak(utterance("first")).unwrap();
        assert_eq!(speech.cancels, 0);

        speech.speak(utterance("second")).unwrap();
        assert_eq!(speech.cancels, 1);
        assert_eq!(speech.utterances.len(), 2);
    }

    #[test]
    fn unavailable_speech_reports_itself() {
        let mut speech = UnavailableSpeech;
        assert!(!speech.available());
        assert!(speech.speak(utterance("hello")).is_err());
    }
}
