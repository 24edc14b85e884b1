//! Values handed to the collaborators around the normalizer.
//!
//! The speech engine itself (model loading, voice design, audio encoding)
//! lives outside this crate. It receives plain normalized text together with
//! a language and a voice description that the normalizer passes through
//! untouched.

use serde::{Deserialize, Serialize};

/// Language and voice settings owned by the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub language: String,
    /// Free-form description or a reference to a voice sample.
    pub voice_description: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            voice_description: "Clear academic lecturer voice, measured pace".to_string(),
        }
    }
}

/// Everything a speech engine needs for one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Plain text, no markup.
    pub text: String,
    pub language: String,
    pub voice_description: String,
    /// Whether `text` went through the normalizer.
    pub preprocessed: bool,
}

/// Side-by-side view of a normalization, for checking a text before
/// sending it to synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub original: String,
    pub processed: String,
    /// Lengths in characters.
    pub original_chars: usize,
    pub processed_chars: usize,
}

impl Preview {
    pub fn new(original: &str, processed: String) -> Self {
        Self {
            original_chars: original.chars().count(),
            processed_chars: processed.chars().count(),
            original: original.to_string(),
            processed,
        }
    }

    pub fn changed(&self) -> bool {
        self.original != self.processed
    }
}
