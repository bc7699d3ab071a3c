/// The plan assembler: request → plan orchestration.
///
/// Wires together the seeded PRNG, the beat timeline, and the template bank.

use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::rng::PlanRng;
use crate::core::template::{Entry, Field, LintReport, RenderContext, TemplateBank, TemplateError};
use crate::core::timeline::{self, BeatSlot};
use crate::schema::plan::{Beat, Plan};
use crate::schema::request::{Platform, PlanRequest};
use crate::schema::tone::ToneRegister;

/// The built-in template bank, compiled into the binary.
pub const BUILTIN_BANK: &str = include_str!("../../bank_data/templates.ron");

/// Slots every bank must define for a plan to be assembled.
pub const REQUIRED_SLOTS: &[&str] = &[
    "hook",
    "promise",
    "call_to_action",
    "music_cue",
    "beat_hook",
    "beat_problem",
    "beat_context",
    "beat_proof",
    "beat_detail",
    "beat_payoff",
    "visuals",
    "editor_note",
    "broll",
    "transition",
    "caption",
    "hashtag",
    "posting_note",
];

/// Slots are expected to offer at least this many entries.
pub const MIN_SLOT_ENTRIES: usize = 5;

/// Hashtags built from the topic are skipped past this many characters.
const MAX_TOPIC_TAG_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid argument for '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("template bank failed validation: {}", .0.join("; "))]
    InvalidBank(Vec<String>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// How many items each auxiliary list aims for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTargets {
    pub broll: usize,
    pub transitions: usize,
    pub captions: usize,
    pub hashtags: usize,
    /// Hashtags drawn from keywords, counted within `hashtags`.
    pub keyword_hashtags: usize,
    pub posting_notes: usize,
}

impl Default for ListTargets {
    fn default() -> Self {
        Self {
            broll: 5,
            transitions: 4,
            captions: 4,
            hashtags: 6,
            keyword_hashtags: 3,
            posting_notes: 4,
        }
    }
}

impl ListTargets {
    /// Load targets from a RON file. Missing fields keep their defaults.
    pub fn load_from_ron(path: &Path) -> Result<ListTargets, PlanError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Slot name and target count for each template-backed list.
    fn per_slot(&self) -> [(&'static str, usize); 5] {
        [
            ("broll", self.broll),
            ("transition", self.transitions),
            ("caption", self.captions),
            ("hashtag", self.hashtags),
            ("posting_note", self.posting_notes),
        ]
    }
}

/// The plan generator. Built via `Planner::builder()`.
///
/// Immutable once built; every call to `generate` owns its own PRNG.
#[derive(Debug, Clone)]
pub struct Planner {
    bank: TemplateBank,
    targets: ListTargets,
}

/// Builder for constructing a `Planner`.
#[derive(Debug, Default)]
pub struct PlannerBuilder {
    bank_files: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    /// Directly provided bank (replaces the built-in one).
    bank: Option<TemplateBank>,
    /// Directly provided targets (override any config file).
    targets: Option<ListTargets>,
}

/// Parse the embedded bank once per process.
pub fn builtin_bank() -> Result<&'static TemplateBank, PlanError> {
    static BANK: OnceLock<Result<TemplateBank, String>> = OnceLock::new();
    BANK.get_or_init(|| TemplateBank::parse_ron(BUILTIN_BANK).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| PlanError::InvalidBank(vec![e.clone()]))
}

fn default_planner() -> Result<&'static Planner, PlanError> {
    static PLANNER: OnceLock<Result<Planner, String>> = OnceLock::new();
    PLANNER
        .get_or_init(|| Planner::builder().build().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| PlanError::InvalidBank(vec![e.clone()]))
}

/// Generate a plan with the built-in bank and default list targets.
pub fn generate(request: &PlanRequest) -> Result<Plan, PlanError> {
    default_planner()?.generate(request)
}

impl Planner {
    pub fn builder() -> PlannerBuilder {
        PlannerBuilder::default()
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    pub fn targets(&self) -> &ListTargets {
        &self.targets
    }

    /// Generate the plan for a request. Same request, same plan.
    pub fn generate(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        let mut rng = PlanRng::from_seed_i64(request.seed);
        let ctx = RenderContext::for_request(request);
        let keywords = request.usable_keywords();

        let shape = timeline::plan(request.length, request.platform, &mut rng);

        let hook = self.bank.expand("hook", &ctx, &mut rng)?;
        let promise = self.bank.expand("promise", &ctx, &mut rng)?;

        let mut beats = Vec::with_capacity(shape.len());
        for (i, slot) in shape.iter().enumerate() {
            let keyword = round_robin(&keywords, i);
            beats.push(self.render_beat(i, slot, keyword, &ctx, &mut rng)?);
        }

        let call_to_action = self.bank.expand("call_to_action", &ctx, &mut rng)?;
        let music_cue = self.bank.expand("music_cue", &ctx, &mut rng)?;

        let broll_ideas = self.render_list("broll", self.targets.broll, &keywords, &ctx, &mut rng)?;
        let transitions =
            self.render_list("transition", self.targets.transitions, &keywords, &ctx, &mut rng)?;
        let captions = self.render_list("caption", self.targets.captions, &keywords, &ctx, &mut rng)?;
        let hashtags = self.render_hashtags(request, &keywords, &ctx, &mut rng)?;
        let posting_notes =
            self.render_list("posting_note", self.targets.posting_notes, &keywords, &ctx, &mut rng)?;

        debug!(
            "generated {} beats for seed {} ({}, {})",
            beats.len(),
            request.seed,
            request.length,
            request.platform
        );

        Ok(Plan {
            hook,
            promise,
            call_to_action,
            music_cue,
            beats,
            broll_ideas,
            transitions,
            captions,
            hashtags,
            posting_notes,
        })
    }

    /// Plans for `count` consecutive seeds starting at the request's own.
    pub fn generate_variants(
        &self,
        request: &PlanRequest,
        count: usize,
    ) -> Result<Vec<Plan>, PlanError> {
        let mut results = Vec::with_capacity(count);
        let mut current = request.clone();
        for _ in 0..count {
            results.push(self.generate(&current)?);
            current = current.remixed();
        }
        Ok(results)
    }

    fn render_beat(
        &self,
        index: usize,
        slot: &BeatSlot,
        keyword: Option<&str>,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
    ) -> Result<Beat, PlanError> {
        let title = slot.role.title();
        let beat_ctx = ctx.for_beat(title, slot.duration, keyword);
        // Keyword-bearing templates when there is a keyword, keyword-free ones otherwise.
        let wants_keyword = keyword.is_some();
        let prefer = |e: &Entry| {
            e.template.references(Field::Keyword) == wants_keyword
        };

        let vo_slot = slot.role.voiceover_slot();
        let vo_index = self.bank.choose(vo_slot, &beat_ctx, rng, prefer)?;
        let voiceover = self.bank.render(vo_slot, vo_index, &beat_ctx, rng)?;

        let vis_index = self.bank.choose("visuals", &beat_ctx, rng, prefer)?;
        let visuals = self.bank.render("visuals", vis_index, &beat_ctx, rng)?;

        let editor_note = self.bank.expand("editor_note", &beat_ctx, rng)?;

        Ok(Beat {
            id: format!("beat-{}", index + 1),
            title: title.to_string(),
            duration: slot.duration,
            voiceover,
            visuals,
            editor_note,
        })
    }

    /// Distinct entries of a slot, each rendered with the next keyword in rotation.
    fn render_list(
        &self,
        slot: &str,
        count: usize,
        keywords: &[&str],
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
    ) -> Result<Vec<String>, PlanError> {
        let picks = self.bank.sample(slot, ctx, rng, count, |_| true)?;
        let mut out: Vec<String> = Vec::with_capacity(picks.len());
        for (j, index) in picks.into_iter().enumerate() {
            let item_ctx = RenderContext {
                keyword: round_robin(keywords, j),
                ..ctx.clone()
            };
            let text = self.bank.render(slot, index, &item_ctx, rng)?;
            if !out.contains(&text) {
                out.push(text);
            }
        }
        Ok(out)
    }

    /// Keyword slugs first, then a short topic tag, then at least one
    /// platform tag, then the rest of the eligible hashtag pool.
    fn render_hashtags(
        &self,
        request: &PlanRequest,
        keywords: &[&str],
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
    ) -> Result<Vec<String>, PlanError> {
        let target = self.targets.hashtags;
        let mut tags: Vec<String> = Vec::with_capacity(target);
        let push_unique = |tags: &mut Vec<String>, tag: String, limit: usize| {
            if tags.len() < limit && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                tags.push(tag);
            }
        };

        // Keyword and topic tags leave one place for the platform tag.
        let room = target.saturating_sub(1);
        for keyword in keywords.iter().take(self.targets.keyword_hashtags) {
            if let Some(tag) = hashtag(keyword) {
                push_unique(&mut tags, tag, room);
            }
        }
        if let Some(tag) = hashtag(&request.topic) {
            if tag.len() <= MAX_TOPIC_TAG_LEN + 1 {
                push_unique(&mut tags, tag, room);
            }
        }

        let platform_pick = self.bank.choose("hashtag", ctx, rng, is_platform_tag)?;
        let text = self.bank.render("hashtag", platform_pick, ctx, rng)?;
        push_unique(&mut tags, text, target);

        // Draw the whole eligible pool in weighted order so collisions with
        // keyword tags can be skipped without running short.
        let pool = self.bank.eligible("hashtag", ctx)?.len();
        let picks = self.bank.sample("hashtag", ctx, rng, pool, |_| true)?;
        for index in picks {
            if tags.len() >= target {
                break;
            }
            if index == platform_pick {
                continue;
            }
            let text = self.bank.render("hashtag", index, ctx, rng)?;
            push_unique(&mut tags, text, target);
        }
        Ok(tags)
    }
}

fn is_platform_tag(entry: &Entry) -> bool {
    entry.requires.iter().any(|t| t.starts_with("platform:"))
}

fn round_robin<'k>(keywords: &[&'k str], i: usize) -> Option<&'k str> {
    if keywords.is_empty() {
        None
    } else {
        Some(keywords[i % keywords.len()])
    }
}

/// Lowercase alphanumeric slug, Unicode letters kept: "Shorts Workflow!" → "shortsworkflow".
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `#slug`, or None when nothing alphanumeric remains.
pub fn hashtag(text: &str) -> Option<String> {
    let slug = slugify(text);
    if slug.is_empty() {
        None
    } else {
        Some(format!("#{}", slug))
    }
}

/// Lint a bank against what the assembler needs: required slots, keyword
/// coverage in visuals, and enough eligible list entries for every
/// platform and tone register.
pub fn lint_bank(bank: &TemplateBank, targets: &ListTargets) -> LintReport {
    let mut report = bank.lint(REQUIRED_SLOTS, MIN_SLOT_ENTRIES);

    if let Some(visuals) = bank.slots.get("visuals") {
        let bare = visuals
            .entries
            .iter()
            .filter(|e| !e.template.references(Field::Keyword))
            .count();
        if bare == visuals.entries.len() {
            report
                .warnings
                .push("no 'visuals' entry references {keyword}; keywords may not appear in beats".to_string());
        }
    }

    for platform in Platform::ALL {
        for register in ToneRegister::ALL {
            let tags: FxHashSet<String> = [platform.tag(), register.tag()]
                .iter()
                .map(|t| t.to_string())
                .collect();
            for (slot_name, target) in targets.per_slot() {
                let Some(slot) = bank.slots.get(slot_name) else {
                    continue;
                };
                let eligible = slot.entries.iter().filter(|e| e.admits(&tags)).count();
                if eligible < target {
                    report.warnings.push(format!(
                        "slot '{}' has {} eligible entries for {} + {} (target {})",
                        slot_name,
                        eligible,
                        platform.tag(),
                        register.tag(),
                        target
                    ));
                }
            }
        }
    }

    report
}

impl PlannerBuilder {
    /// Merge a bank file over the base bank. May be called more than once.
    pub fn bank_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.bank_files.push(path.into());
        self
    }

    /// Read `ListTargets` from a RON file.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Provide a bank directly (replaces the built-in one).
    pub fn with_bank(mut self, bank: TemplateBank) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn list_targets(mut self, targets: ListTargets) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn build(self) -> Result<Planner, PlanError> {
        let mut bank = match self.bank {
            Some(bank) => bank,
            None => builtin_bank()?.clone(),
        };
        for path in &self.bank_files {
            bank.merge(TemplateBank::load_from_ron(path)?);
        }

        let targets = match (self.targets, &self.config_path) {
            (Some(targets), _) => targets,
            (None, Some(path)) => ListTargets::load_from_ron(path)?,
            (None, None) => ListTargets::default(),
        };

        let report = lint_bank(&bank, &targets);
        for warning in &report.warnings {
            warn!("template bank: {}", warning);
        }
        if !report.is_clean() {
            return Err(PlanError::InvalidBank(report.errors));
        }

        Ok(Planner { bank, targets })
    }
}
