use serde::{Deserialize, Serialize};

/// One timed segment of the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beat {
    pub id: String,
    pub title: String,
    /// Whole seconds, always positive.
    pub duration: u32,
    pub voiceover: String,
    pub visuals: String,
    pub editor_note: String,
}

/// A complete short-video content plan.
///
/// Owned entirely by the caller; carries no reference back to the request
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub hook: String,
    pub promise: String,
    pub call_to_action: String,
    pub music_cue: String,
    pub beats: Vec<Beat>,
    pub broll_ideas: Vec<String>,
    pub transitions: Vec<String>,
    pub captions: Vec<String>,
    pub hashtags: Vec<String>,
    pub posting_notes: Vec<String>,
}

impl Plan {
    /// Sum of all beat durations in seconds.
    pub fn total_duration(&self) -> u32 {
        self.beats.iter().map(|b| b.duration).sum()
    }

    /// Every generated string in the plan, top-level fields first.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        [
            self.hook.as_str(),
            self.promise.as_str(),
            self.call_to_action.as_str(),
            self.music_cue.as_str(),
        ]
        .into_iter()
        .chain(self.beats.iter().flat_map(|b| {
            [
                b.title.as_str(),
                b.voiceover.as_str(),
                b.visuals.as_str(),
                b.editor_note.as_str(),
            ]
        }))
        .chain(self.broll_ideas.iter().map(String::as_str))
        .chain(self.transitions.iter().map(String::as_str))
        .chain(self.captions.iter().map(String::as_str))
        .chain(self.hashtags.iter().map(String::as_str))
        .chain(self.posting_notes.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_beat(id: &str, duration: u32) -> Beat {
        Beat {
            id: id.to_string(),
            title: "Hook".to_string(),
            duration,
            voiceover: "vo".to_string(),
            visuals: "vis".to_string(),
            editor_note: "note".to_string(),
        }
    }

    #[test]
    fn total_duration_sums_beats() {
        let plan = Plan {
            hook: String::new(),
            promise: String::new(),
            call_to_action: String::new(),
            music_cue: String::new(),
            beats: vec![make_beat("beat-1", 4), make_beat("beat-2", 11)],
            broll_ideas: vec![],
            transitions: vec![],
            captions: vec![],
            hashtags: vec!["#a".to_string()],
            posting_notes: vec![],
        };
        assert_eq!(plan.total_duration(), 15);
        assert_eq!(plan.texts().count(), 4 + 2 * 4 + 1);
    }

    #[test]
    fn beat_serializes_camel_case() {
        let json = serde_json::to_value(make_beat("beat-1", 3)).unwrap();
        assert_eq!(json["editorNote"], "note");
        assert_eq!(json["duration"], 3);
    }
}
