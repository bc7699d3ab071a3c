/// Template bank runtime — template parsing, RON loading, selection, and rendering.

use log::{trace, warn};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::rng::PlanRng;
use crate::schema::request::PlanRequest;
use crate::schema::tone::ToneRegister;

/// Nested slot references deeper than this are treated as a cycle.
const MAX_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("slot not found: {0}")]
    SlotNotFound(String),
    #[error("slot '{0}' has no entries")]
    EmptySlot(String),
    #[error("entry {index} out of range for slot '{slot}'")]
    EntryOutOfRange { slot: String, index: usize },
    #[error("slot references nest too deeply at '{0}'")]
    RecursionLimit(String),
}

/// A request value or beat extra that a template can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Topic,
    Audience,
    Tone,
    Goal,
    Product,
    CallToAction,
    Platform,
    Keyword,
    Beat,
    Seconds,
}

impl Field {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "topic" => Some(Self::Topic),
            "audience" => Some(Self::Audience),
            "tone" => Some(Self::Tone),
            "goal" => Some(Self::Goal),
            "product" => Some(Self::Product),
            "cta" => Some(Self::CallToAction),
            "platform" => Some(Self::Platform),
            "keyword" => Some(Self::Keyword),
            "beat" => Some(Self::Beat),
            "seconds" => Some(Self::Seconds),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Audience => "audience",
            Self::Tone => "tone",
            Self::Goal => "goal",
            Self::Product => "product",
            Self::CallToAction => "cta",
            Self::Platform => "platform",
            Self::Keyword => "keyword",
            Self::Beat => "beat",
            Self::Seconds => "seconds",
        }
    }

    /// Neutral stand-in used when the value is empty outside an optional group.
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::Topic => "this idea",
            Self::Audience => "viewers",
            Self::Tone => "confident",
            Self::Goal => "get better results",
            Self::Product => "the tool you already use",
            Self::CallToAction => "follow for more",
            Self::Platform => "your feed",
            Self::Keyword => "the key step",
            Self::Beat => "this moment",
            Self::Seconds => "a few",
        }
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Request or beat value: `{topic}`, `{keyword}`, ...
    Field(Field),
    /// Reference to another slot, expanded with a fresh draw: `{opener}`.
    SlotRef(String),
    /// `[ ... ]`: dropped whole when any field inside is empty.
    Optional(Vec<TemplateSegment>),
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{field}` → `Field` for known field names
    /// - `{name}` → `SlotRef` for anything else
    /// - `[ ... ]` → `Optional` group (no nesting)
    /// - `{{` `}}` `[[` `]]` → literal braces and brackets
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut top: Vec<TemplateSegment> = Vec::new();
        let mut group: Option<Vec<TemplateSegment>> = None;
        let mut literal_buf = String::new();
        let mut i = 0;

        while i < len {
            let c = chars[i];
            let doubled = i + 1 < len && chars[i + 1] == c;
            match c {
                '{' | '}' | '[' | ']' if doubled => {
                    literal_buf.push(c);
                    i += 2;
                }
                '{' => {
                    let target = group.as_mut().unwrap_or(&mut top);
                    flush_literal(&mut literal_buf, target);

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::TemplateParse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::TemplateParse("unclosed brace".to_string()));
                    }

                    let content: String = chars[start..end].iter().collect();
                    let content = content.trim();
                    if content.is_empty() {
                        return Err(TemplateError::TemplateParse("empty braces".to_string()));
                    }
                    target.push(Self::parse_segment(content));
                    i = end + 1;
                }
                '}' => {
                    return Err(TemplateError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                '[' => {
                    if group.is_some() {
                        return Err(TemplateError::TemplateParse(
                            "nested optional groups are not allowed".to_string(),
                        ));
                    }
                    flush_literal(&mut literal_buf, &mut top);
                    group = Some(Vec::new());
                    i += 1;
                }
                ']' => {
                    let mut inner = group.take().ok_or_else(|| {
                        TemplateError::TemplateParse("unmatched closing bracket".to_string())
                    })?;
                    flush_literal(&mut literal_buf, &mut inner);
                    if !inner.is_empty() {
                        top.push(TemplateSegment::Optional(inner));
                    }
                    i += 1;
                }
                _ => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if group.is_some() {
            return Err(TemplateError::TemplateParse(
                "unclosed optional group".to_string(),
            ));
        }
        flush_literal(&mut literal_buf, &mut top);

        Ok(Template { segments: top })
    }

    fn parse_segment(content: &str) -> TemplateSegment {
        match Field::from_name(content) {
            Some(field) => TemplateSegment::Field(field),
            None => TemplateSegment::SlotRef(content.to_string()),
        }
    }

    /// All fields referenced anywhere in the template, optional groups included.
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        walk(&self.segments, &mut |seg| {
            if let TemplateSegment::Field(f) = seg {
                out.push(*f);
            }
        });
        out
    }

    /// All slot names this template expands.
    pub fn slot_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        walk(&self.segments, &mut |seg| {
            if let TemplateSegment::SlotRef(name) = seg {
                out.push(name.as_str());
            }
        });
        out
    }

    pub fn references(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

fn flush_literal(buf: &mut String, target: &mut Vec<TemplateSegment>) {
    if !buf.is_empty() {
        target.push(TemplateSegment::Literal(std::mem::take(buf)));
    }
}

fn walk<'a, F>(segments: &'a [TemplateSegment], visit: &mut F)
where
    F: FnMut(&'a TemplateSegment),
{
    for seg in segments {
        if let TemplateSegment::Optional(inner) = seg {
            walk(inner, visit);
        } else {
            visit(seg);
        }
    }
}

/// A weighted, optionally gated template within a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub weight: u32,
    pub template: Template,
    /// Every tag here must be in the selection context.
    pub requires: Vec<String>,
    /// No tag here may be in the selection context.
    pub excludes: Vec<String>,
}

impl Entry {
    /// True when every required tag is present and no excluded tag is.
    pub fn admits(&self, tags: &FxHashSet<String>) -> bool {
        self.requires.iter().all(|t| tags.contains(t))
            && !self.excludes.iter().any(|t| tags.contains(t))
    }
}

/// A named category of generated text and its ordered entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// A set of named slots.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TemplateBank {
    pub slots: HashMap<String, Slot>,
}

// The RON shape is flatter than the internal types; entries carry raw text
// that is parsed into templates on load.

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RonEntry {
    #[serde(default = "default_weight")]
    weight: u32,
    text: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Slot")]
struct RonSlot {
    entries: Vec<RonEntry>,
}

/// Values and tags a template is rendered against.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub tags: FxHashSet<String>,
    pub topic: &'a str,
    pub audience: &'a str,
    pub tone: &'a str,
    pub goal: &'a str,
    pub product: &'a str,
    pub call_to_action: &'a str,
    pub platform: &'a str,
    pub keyword: Option<&'a str>,
    pub beat: Option<&'a str>,
    pub seconds: Option<u32>,
}

impl<'a> RenderContext<'a> {
    /// Context for the top-level fields of a request, tagged by platform and tone register.
    pub fn for_request(request: &'a PlanRequest) -> Self {
        let mut tags = FxHashSet::default();
        tags.insert(request.platform.tag().to_string());
        tags.insert(ToneRegister::classify(&request.tone).tag().to_string());

        Self {
            tags,
            topic: request.topic.trim(),
            audience: request.audience.trim(),
            tone: request.tone.trim(),
            goal: request.goal.trim(),
            product: request.product.trim(),
            call_to_action: request.call_to_action.trim(),
            platform: request.platform.name(),
            keyword: None,
            beat: None,
            seconds: None,
        }
    }

    /// Derived context for one beat.
    pub fn for_beat<'b>(
        &self,
        title: &'b str,
        seconds: u32,
        keyword: Option<&'b str>,
    ) -> RenderContext<'b>
    where
        'a: 'b,
    {
        RenderContext {
            tags: self.tags.clone(),
            topic: self.topic,
            audience: self.audience,
            tone: self.tone,
            goal: self.goal,
            product: self.product,
            call_to_action: self.call_to_action,
            platform: self.platform,
            keyword,
            beat: Some(title),
            seconds: Some(seconds),
        }
    }

    /// The non-empty value of a field, if any.
    pub fn value(&self, field: Field) -> Option<String> {
        let text = match field {
            Field::Topic => self.topic,
            Field::Audience => self.audience,
            Field::Tone => self.tone,
            Field::Goal => self.goal,
            Field::Product => self.product,
            Field::CallToAction => self.call_to_action,
            Field::Platform => self.platform,
            Field::Keyword => self.keyword.unwrap_or(""),
            Field::Beat => self.beat.unwrap_or(""),
            Field::Seconds => return self.seconds.map(|s| s.to_string()),
        };
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn is_eligible(&self, entry: &Entry) -> bool {
        entry.admits(&self.tags)
    }
}

impl TemplateBank {
    /// Load a template bank from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TemplateBank, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a template bank from a RON string.
    pub fn parse_ron(input: &str) -> Result<TemplateBank, TemplateError> {
        let raw: HashMap<String, RonSlot> = ron::from_str(input)?;
        let mut slots = HashMap::new();

        for (name, ron_slot) in raw {
            let mut entries = Vec::with_capacity(ron_slot.entries.len());
            for entry in ron_slot.entries {
                let template = Template::parse(&entry.text).map_err(|e| match e {
                    TemplateError::TemplateParse(msg) => TemplateError::TemplateParse(format!(
                        "slot '{}', entry '{}': {}",
                        name, entry.text, msg
                    )),
                    other => other,
                })?;
                entries.push(Entry {
                    weight: entry.weight,
                    template,
                    requires: entry.requires,
                    excludes: entry.excludes,
                });
            }
            slots.insert(name.clone(), Slot { name, entries });
        }

        Ok(TemplateBank { slots })
    }

    /// Merge another bank into this one. Slots from `other`
    /// replace slots in `self` with the same name.
    pub fn merge(&mut self, other: TemplateBank) {
        for (name, slot) in other.slots {
            self.slots.insert(name, slot);
        }
    }

    pub fn slot(&self, name: &str) -> Result<&Slot, TemplateError> {
        self.slots
            .get(name)
            .ok_or_else(|| TemplateError::SlotNotFound(name.to_string()))
    }

    /// Indices of entries eligible under the context's tags, in bank order.
    ///
    /// Falls back to every entry when no entry passes the tag gate.
    pub fn eligible(&self, slot: &str, ctx: &RenderContext<'_>) -> Result<Vec<usize>, TemplateError> {
        let slot = self.slot(slot)?;
        if slot.entries.is_empty() {
            return Err(TemplateError::EmptySlot(slot.name.clone()));
        }
        let gated: Vec<usize> = slot
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| ctx.is_eligible(e))
            .map(|(i, _)| i)
            .collect();
        if gated.is_empty() {
            warn!(
                "no entry in slot '{}' matches tags {:?}; using the full slot",
                slot.name, ctx.tags
            );
            return Ok((0..slot.entries.len()).collect());
        }
        Ok(gated)
    }

    /// Draw one entry index by weight among eligible entries, preferring
    /// those that satisfy `prefer` when any do.
    pub fn choose<P>(
        &self,
        slot: &str,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
        prefer: P,
    ) -> Result<usize, TemplateError>
    where
        P: Fn(&Entry) -> bool,
    {
        let picked = self.sample(slot, ctx, rng, 1, prefer)?;
        picked
            .first()
            .copied()
            .ok_or_else(|| TemplateError::EmptySlot(slot.to_string()))
    }

    /// Draw up to `count` distinct entry indices by weight, without replacement.
    pub fn sample<P>(
        &self,
        slot: &str,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
        count: usize,
        prefer: P,
    ) -> Result<Vec<usize>, TemplateError>
    where
        P: Fn(&Entry) -> bool,
    {
        let entries = &self.slot(slot)?.entries;
        let eligible = self.eligible(slot, ctx)?;
        let preferred: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|i| prefer(&entries[*i]))
            .collect();
        let mut pool = if preferred.is_empty() { eligible } else { preferred };

        let mut picked = Vec::with_capacity(count.min(pool.len()));
        while picked.len() < count && !pool.is_empty() {
            let weights: Vec<u32> = pool.iter().map(|i| entries[*i].weight.max(1)).collect();
            let dist = WeightedIndex::new(&weights)
                .map_err(|_| TemplateError::EmptySlot(slot.to_string()))?;
            let at = dist.sample(rng);
            picked.push(pool.remove(at));
        }
        trace!("slot '{}' picked entries {:?}", slot, picked);
        Ok(picked)
    }

    /// Render entry `index` of `slot` against the context.
    ///
    /// Nested slot references draw from `rng`; the result never contains
    /// template markup.
    pub fn render(
        &self,
        slot: &str,
        index: usize,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
    ) -> Result<String, TemplateError> {
        let raw = self.render_entry(slot, index, ctx, rng, 0)?;
        Ok(tidy(&raw))
    }

    /// Choose an eligible entry and render it.
    pub fn expand(
        &self,
        slot: &str,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
    ) -> Result<String, TemplateError> {
        let index = self.choose(slot, ctx, rng, |_| true)?;
        self.render(slot, index, ctx, rng)
    }

    fn render_entry(
        &self,
        slot: &str,
        index: usize,
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
        depth: usize,
    ) -> Result<String, TemplateError> {
        if depth > MAX_DEPTH {
            return Err(TemplateError::RecursionLimit(slot.to_string()));
        }
        let entry = self
            .slot(slot)?
            .entries
            .get(index)
            .ok_or_else(|| TemplateError::EntryOutOfRange {
                slot: slot.to_string(),
                index,
            })?;

        let mut out = String::new();
        for seg in &entry.template.segments {
            match seg {
                TemplateSegment::Optional(inner) => {
                    let mut group = String::new();
                    if self.render_segments(inner, ctx, rng, depth, &mut group, true)? {
                        out.push_str(&group);
                    }
                }
                other => {
                    self.render_segments(std::slice::from_ref(other), ctx, rng, depth, &mut out, false)?;
                }
            }
        }
        Ok(out)
    }

    /// Returns false when `strict` and a field had no value.
    fn render_segments(
        &self,
        segments: &[TemplateSegment],
        ctx: &RenderContext<'_>,
        rng: &mut PlanRng,
        depth: usize,
        out: &mut String,
        strict: bool,
    ) -> Result<bool, TemplateError> {
        for seg in segments {
            match seg {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Field(field) => match ctx.value(*field) {
                    Some(value) => out.push_str(&value),
                    None if strict => return Ok(false),
                    None => out.push_str(field.fallback()),
                },
                TemplateSegment::SlotRef(name) => {
                    let index = self.choose(name, ctx, rng, |_| true)?;
                    out.push_str(&self.render_entry(name, index, ctx, rng, depth + 1)?);
                }
                TemplateSegment::Optional(inner) => {
                    self.render_segments(inner, ctx, rng, depth, out, strict)?;
                }
            }
        }
        Ok(true)
    }

    /// Structural checks: dangling slot references, missing or empty
    /// required slots, thin slots, and self-references.
    pub fn lint(&self, required: &[&str], min_entries: usize) -> LintReport {
        let mut report = LintReport::default();

        for name in required {
            match self.slots.get(*name) {
                None => report.errors.push(format!("missing required slot '{}'", name)),
                Some(slot) if slot.entries.is_empty() => {
                    report.errors.push(format!("required slot '{}' has no entries", name))
                }
                Some(_) => {}
            }
        }

        let mut names: Vec<&String> = self.slots.keys().collect();
        names.sort();
        for name in names {
            let slot = &self.slots[name];
            if slot.entries.len() < min_entries {
                report.warnings.push(format!(
                    "slot '{}' has {} entries (at least {} recommended)",
                    name,
                    slot.entries.len(),
                    min_entries
                ));
            }
            for entry in &slot.entries {
                for target in entry.template.slot_refs() {
                    if target == name {
                        report
                            .errors
                            .push(format!("slot '{}' references itself", name));
                    } else if !self.slots.contains_key(target) {
                        report.errors.push(format!(
                            "slot '{}' references unknown slot or field '{}'",
                            name, target
                        ));
                    }
                }
                if entry.weight == 0 {
                    report
                        .warnings
                        .push(format!("slot '{}' has an entry with weight 0", name));
                }
            }
        }

        report
    }
}

/// Outcome of a bank lint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collapse whitespace, drop spaces before punctuation, squash doubled
/// punctuation, and capitalize the start of every sentence.
fn tidy(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        let attaches = word.starts_with(['.', ',', '!', '?', ':', ';']);
        if !joined.is_empty() && !attaches {
            joined.push(' ');
        }
        joined.push_str(word);
    }

    let chars: Vec<char> = joined.chars().collect();
    let mut out = String::with_capacity(joined.len());
    let mut sentence_start = true;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '.' {
            let run = chars[i..].iter().take_while(|d| **d == '.').count();
            if run >= 3 {
                // An ellipsis absorbs any stop glued onto it.
                out.push_str("...");
                i += run;
                sentence_start = chars.get(i).map_or(false, |n| n.is_whitespace());
                continue;
            }
        }
        // A field value that already ends a sentence swallows the template's stop.
        if matches!(c, '.' | ',') && out.ends_with(['.', '!', '?']) {
            i += 1;
            sentence_start = chars.get(i).map_or(false, |n| n.is_whitespace());
            continue;
        }
        if sentence_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            sentence_start = false;
        } else {
            out.push(c);
            if matches!(c, '.' | '!' | '?') {
                // Only a following space opens a sentence: "2.5x" stays put.
                sentence_start = chars.get(i + 1).map_or(false, |n| n.is_whitespace());
            } else if !c.is_whitespace() {
                sentence_start = false;
            }
        }
        i += 1;
    }
    out
}
