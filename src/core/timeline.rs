/// Beat timeline planner — beat count and integer-second duration split.

use serde::{Deserialize, Serialize};

use crate::core::rng::PlanRng;
use crate::schema::request::{Length, Platform};

/// Narrative function of a beat. Order of declaration is story order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatRole {
    Hook,
    Problem,
    Context,
    Proof,
    Detail,
    Payoff,
}

impl BeatRole {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Hook => "Hook",
            Self::Problem => "Problem",
            Self::Context => "Context",
            Self::Proof => "Proof",
            Self::Detail => "Detail",
            Self::Payoff => "Payoff",
        }
    }

    /// Template slot holding this role's voiceover lines.
    pub fn voiceover_slot(&self) -> &'static str {
        match self {
            Self::Hook => "beat_hook",
            Self::Problem => "beat_problem",
            Self::Context => "beat_context",
            Self::Proof => "beat_proof",
            Self::Detail => "beat_detail",
            Self::Payoff => "beat_payoff",
        }
    }

    /// Interior roles for `count` middle beats, in story order.
    fn interior(count: usize) -> &'static [BeatRole] {
        match count {
            0 => &[],
            1 => &[Self::Problem],
            2 => &[Self::Problem, Self::Proof],
            3 => &[Self::Problem, Self::Context, Self::Proof],
            _ => &[Self::Problem, Self::Context, Self::Proof, Self::Detail],
        }
    }
}

/// One planned beat before any text is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatSlot {
    pub role: BeatRole,
    pub duration: u32,
}

/// Allowed beat counts for a runtime, inclusive.
pub fn beat_count_range(length: Length) -> (usize, usize) {
    match length {
        Length::Fifteen => (2, 2),
        Length::Thirty => (3, 4),
        Length::FortyFive => (4, 5),
        Length::Sixty => (5, 6),
    }
}

/// Upper bound for the opening and closing beats: 20% of the runtime, rounded, at least 3s.
pub fn edge_cap(length: Length) -> u32 {
    let seconds = length.seconds();
    ((seconds * 20 + 50) / 100).max(3)
}

/// Plan the beat sequence for a runtime.
///
/// Durations are positive and sum exactly to `length`. The opening beat is
/// at most `edge_cap`; so is the closing beat whenever interior beats exist.
pub fn plan(length: Length, platform: Platform, rng: &mut PlanRng) -> Vec<BeatSlot> {
    let total = length.seconds();
    let (min_beats, max_beats) = beat_count_range(length);
    let count = if max_beats > min_beats && rng.chance(platform.extra_beat_chance()) {
        max_beats
    } else {
        min_beats
    };

    let cap = edge_cap(length);
    let floor = (cap / 2).max(3);
    let hook = rng.between(floor, cap);

    if count == 2 {
        return vec![
            BeatSlot { role: BeatRole::Hook, duration: hook },
            BeatSlot { role: BeatRole::Payoff, duration: total - hook },
        ];
    }

    let payoff = rng.between(floor, cap);
    let interior_roles = BeatRole::interior(count - 2);
    let interior = split_interior(total - hook - payoff, interior_roles.len(), rng);

    let mut beats = Vec::with_capacity(count);
    beats.push(BeatSlot { role: BeatRole::Hook, duration: hook });
    for (role, duration) in interior_roles.iter().zip(interior) {
        beats.push(BeatSlot { role: *role, duration });
    }
    beats.push(BeatSlot { role: BeatRole::Payoff, duration: payoff });
    beats
}

/// Split `seconds` over `parts` beats by random weights in `[1, 2)`.
///
/// Each share is floored; the rounding remainder goes to the last part.
fn split_interior(seconds: u32, parts: usize, rng: &mut PlanRng) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let weights: Vec<f64> = (0..parts).map(|_| 1.0 + rng.next_f64()).collect();
    let sum: f64 = weights.iter().sum();

    let mut out = Vec::with_capacity(parts);
    let mut assigned = 0u32;
    for w in &weights[..parts - 1] {
        // Leave at least one second for every part still to come.
        let remaining_parts = (parts - out.len()) as u32;
        let ceiling = seconds - assigned - (remaining_parts - 1);
        let share = ((seconds as f64 * w / sum).floor() as u32).clamp(1, ceiling);
        out.push(share);
        assigned += share;
    }
    out.push(seconds - assigned);
    out
}
