/// Export renderings consumed by the UI: clipboard script text and the JSON download.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::core::assembler::PlanError;
use crate::schema::plan::Plan;
use crate::schema::request::PlanRequest;

/// Human-readable beat-by-beat script for the clipboard.
pub fn script_text(plan: &Plan) -> String {
    let mut out = String::new();
    for (i, beat) in plan.beats.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}. {} ({}s)", i + 1, beat.title, beat.duration);
        let _ = writeln!(out, "VO: {}", beat.voiceover);
        let _ = writeln!(out, "Visuals: {}", beat.visuals);
        let _ = writeln!(out, "Edit: {}", beat.editor_note);
    }
    out
}

/// The `{ request, plan }` document offered as a file download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExport {
    pub request: PlanRequest,
    pub plan: Plan,
}

impl PlanExport {
    pub fn new(request: PlanRequest, plan: Plan) -> Self {
        Self { request, plan }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<PlanExport, PlanError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Suggested download file name, e.g. `shorts-plan-youtube-30s-42.json`.
    pub fn file_name(&self) -> String {
        format!(
            "shorts-plan-{}-{}s-{}.json",
            self.request.platform.name().to_lowercase(),
            self.request.length.seconds(),
            self.request.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::generate;
    use crate::schema::request::{Length, Platform};

    fn make_request() -> PlanRequest {
        let mut request = PlanRequest::new(Length::Thirty, Platform::Instagram, 5);
        request.topic = "Desk setup".to_string();
        request
    }

    #[test]
    fn script_text_lists_every_beat() {
        let plan = generate(&make_request()).unwrap();
        let text = script_text(&plan);
        for (i, beat) in plan.beats.iter().enumerate() {
            let header = format!("{}. {} ({}s)", i + 1, beat.title, beat.duration);
            assert!(text.contains(&header), "missing header {:?} in\n{}", header, text);
            assert!(text.contains(&beat.voiceover));
            assert!(text.contains(&beat.visuals));
            assert!(text.contains(&beat.editor_note));
        }
        assert!(text.starts_with("1. Hook ("));
    }

    #[test]
    fn json_export_round_trips() {
        let request = make_request();
        let plan = generate(&request).unwrap();
        let export = PlanExport::new(request, plan);
        let json = export.to_json().unwrap();
        assert!(json.contains("\"brollIdeas\""));
        assert!(json.contains("\"callToAction\""));
        assert_eq!(PlanExport::from_json(&json).unwrap(), export);
    }

    #[test]
    fn file_name_reflects_request() {
        let request = make_request();
        let plan = generate(&request).unwrap();
        let export = PlanExport::new(request, plan);
        assert_eq!(export.file_name(), "shorts-plan-instagram-30s-5.json");
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(PlanExport::from_json("{"), Err(PlanError::Json(_))));
    }
}
