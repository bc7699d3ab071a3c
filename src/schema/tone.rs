use serde::{Deserialize, Serialize};

/// Coarse delivery register derived from the brief's free-text tone.
///
/// Templates gate on the register, not the raw text, so "hype", "punchy"
/// and "high-energy" all select the same subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneRegister {
    Energetic,
    Comedic,
    Serious,
    Calm,
    Neutral,
}

const ENERGETIC: &[&str] = &["energy", "energetic", "hype", "punchy", "bold", "fast", "excited", "intense"];
const COMEDIC: &[&str] = &["funny", "comedic", "comedy", "humor", "humour", "playful", "witty", "silly", "sarcastic"];
const SERIOUS: &[&str] = &["serious", "professional", "authoritative", "expert", "formal", "educational", "informative"];
const CALM: &[&str] = &["calm", "chill", "relaxed", "cozy", "soft", "warm", "gentle", "friendly"];

impl ToneRegister {
    pub const ALL: [ToneRegister; 5] = [
        ToneRegister::Energetic,
        ToneRegister::Comedic,
        ToneRegister::Serious,
        ToneRegister::Calm,
        ToneRegister::Neutral,
    ];

    /// Classify free text. The first register with a matching word wins,
    /// checked in the order comedic, energetic, serious, calm.
    pub fn classify(tone: &str) -> Self {
        let lowered = tone.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let hit = |list: &[&str]| words.iter().any(|w| list.contains(w));

        if hit(COMEDIC) {
            Self::Comedic
        } else if hit(ENERGETIC) {
            Self::Energetic
        } else if hit(SERIOUS) {
            Self::Serious
        } else if hit(CALM) {
            Self::Calm
        } else {
            Self::Neutral
        }
    }

    /// Returns the tag string for this register (e.g., "tone:comedic").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Energetic => "tone:energetic",
            Self::Comedic => "tone:comedic",
            Self::Serious => "tone:serious",
            Self::Calm => "tone:calm",
            Self::Neutral => "tone:neutral",
        }
    }
}
