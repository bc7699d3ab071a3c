use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::assembler::PlanError;

/// Target runtime of the video. A closed set of four options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Length {
    Fifteen,
    Thirty,
    FortyFive,
    Sixty,
}

impl Length {
    pub const ALL: [Length; 4] = [
        Length::Fifteen,
        Length::Thirty,
        Length::FortyFive,
        Length::Sixty,
    ];

    pub fn seconds(&self) -> u32 {
        match self {
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::FortyFive => 45,
            Self::Sixty => 60,
        }
    }
}

impl TryFrom<u32> for Length {
    type Error = PlanError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        match seconds {
            15 => Ok(Self::Fifteen),
            30 => Ok(Self::Thirty),
            45 => Ok(Self::FortyFive),
            60 => Ok(Self::Sixty),
            other => Err(PlanError::invalid(
                "length",
                format!("{} is not one of 15, 30, 45, 60", other),
            )),
        }
    }
}

impl From<Length> for u32 {
    fn from(length: Length) -> Self {
        length.seconds()
    }
}

impl FromStr for Length {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('s');
        let seconds: u32 = trimmed
            .parse()
            .map_err(|_| PlanError::invalid("length", format!("'{}' is not a number", s)))?;
        Self::try_from(seconds)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

/// Publishing platform. Only biases template selection and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    YouTube,
    Instagram,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::Instagram, Platform::TikTok];

    /// Display name, as the UI lists it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
        }
    }

    /// Returns the tag string for this platform (e.g., "platform:tiktok").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::YouTube => "platform:youtube",
            Self::Instagram => "platform:instagram",
            Self::TikTok => "platform:tiktok",
        }
    }

    /// Probability of taking the longer beat count for a runtime.
    pub fn extra_beat_chance(&self) -> f64 {
        match self {
            Self::YouTube => 0.4,
            Self::Instagram => 0.5,
            Self::TikTok => 0.65,
        }
    }
}

impl FromStr for Platform {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Self::YouTube),
            "instagram" => Ok(Self::Instagram),
            "tiktok" => Ok(Self::TikTok),
            _ => Err(PlanError::invalid(
                "platform",
                format!("'{}' is not one of YouTube, Instagram, TikTok", s),
            )),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.name().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A creative brief. The sole input to plan generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub topic: String,
    pub audience: String,
    pub tone: String,
    pub goal: String,
    pub product: String,
    pub call_to_action: String,
    pub keywords: Vec<String>,
    pub length: Length,
    pub platform: Platform,
    pub seed: i64,
}

impl PlanRequest {
    /// An empty brief for the given runtime and platform.
    pub fn new(length: Length, platform: Platform, seed: i64) -> Self {
        Self {
            topic: String::new(),
            audience: String::new(),
            tone: String::new(),
            goal: String::new(),
            product: String::new(),
            call_to_action: String::new(),
            keywords: Vec::new(),
            length,
            platform,
            seed,
        }
    }

    /// The same brief with the next seed.
    pub fn remixed(&self) -> Self {
        Self {
            seed: self.seed.wrapping_add(1),
            ..self.clone()
        }
    }

    /// Keywords with surrounding whitespace trimmed and empty entries removed.
    pub fn usable_keywords(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Length as the form submits it: a select value that may arrive as text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormLength {
    Number(u32),
    Text(String),
}

impl Default for FormLength {
    fn default() -> Self {
        Self::Number(30)
    }
}

/// Raw form state from the UI, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanForm {
    pub topic: String,
    pub audience: String,
    pub tone: String,
    pub goal: String,
    pub product: String,
    pub call_to_action: String,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub length: FormLength,
    pub platform: String,
    pub seed: i64,
}

impl PlanForm {
    /// Convert form state into a well-formed request.
    ///
    /// Free text is trimmed, keywords are comma-split with empty entries
    /// dropped, and `length`/`platform` must name one of the fixed options.
    pub fn normalize(&self) -> Result<PlanRequest, PlanError> {
        let length = match &self.length {
            FormLength::Number(n) => Length::try_from(*n)?,
            FormLength::Text(s) => s.parse()?,
        };
        let platform: Platform = self.platform.parse()?;

        let keywords = self
            .keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        Ok(PlanRequest {
            topic: self.topic.trim().to_string(),
            audience: self.audience.trim().to_string(),
            tone: self.tone.trim().to_string(),
            goal: self.goal.trim().to_string(),
            product: self.product.trim().to_string(),
            call_to_action: self.call_to_action.trim().to_string(),
            keywords,
            length,
            platform,
            seed: self.seed,
        })
    }
}
