//! # Summary
//!
//! The short second-person sentence shown under the color orb.

use crate::score::Score;
use crate::taxonomy::EmotionKey;
use crate::types::Candidate;

/// Below this confidence the summary is hedged (0.50).
const HEDGE_BELOW_PPM: u32 = 500_000;

/// A runner-up within this distance of the decision is mentioned (0.10).
const MIXED_WITHIN_PPM: u32 = 100_000;

const EMPTY: &str = "You didn't write anything today. Add a few lines and try again.";

const HEDGE: &str = "It's hard to say for sure, but ";

fn sentence(key: EmotionKey) -> &'static str {
    match key {
        EmotionKey::Joy => "You seem to be in a happy, joyful place today.",
        EmotionKey::Calm => "You come across as calm and at ease today.",
        EmotionKey::Sad => "You seem to be carrying some sadness today.",
        EmotionKey::Angry => "Something seems to have frustrated or angered you today.",
        EmotionKey::Fearful => "You seem to be feeling anxious or on edge today.",
        EmotionKey::Disgusted => "Something seems to have left a bad taste for you today.",
        EmotionKey::Surprised => "You seem surprised or inspired by something today.",
        EmotionKey::Anticipation => "You sound hopeful and optimistic about what's ahead.",
        EmotionKey::Neutral => "Your day reads as fairly even, without one feeling standing out.",
    }
}

/// Summarize a decision.
///
/// `chosen` is `None` for an empty entry. `candidates` are in the order the
/// prediction reports them.
#[must_use]
pub fn summarize(chosen: Option<EmotionKey>, score: Score, candidates: &[Candidate]) -> String {
    let Some(key) = chosen else {
        return EMPTY.to_string();
    };

    let base = sentence(key);
    if key == EmotionKey::Neutral {
        return base.to_string();
    }

    let mut out = if score.ppm() < HEDGE_BELOW_PPM {
        format!("{HEDGE}{}", lowercase_first(base))
    } else {
        base.to_string()
    };

    if let Some(runner_up) = runner_up(key, score, candidates) {
        out.push_str(&format!(
            " There's also a hint of feeling {}.",
            runner_up.label().to_lowercase()
        ));
    }
    out
}

/// First candidate of a different, non-neutral category scoring close to the decision.
fn runner_up(chosen: EmotionKey, score: Score, candidates: &[Candidate]) -> Option<EmotionKey> {
    let floor = score.saturating_sub(Score::from_ppm(MIXED_WITHIN_PPM));
    candidates
        .iter()
        .filter(|c| c.score >= floor)
        .filter_map(|c| EmotionKey::from_key(&c.label))
        .find(|k| *k != chosen && *k != EmotionKey::Neutral)
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
