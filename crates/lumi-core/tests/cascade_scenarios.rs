//! # Cascade Scenarios
//!
//! End-to-end decisions for representative journal entries, with classifier
//! outputs recorded as fixtures.

#![allow(clippy::unwrap_used, clippy::panic)]

use lumi_core::{
    Cascade, EmotionKey, LabelScore, Method, ModelVersions, Score, Step, Thresholds,
    ZeroShotOutput, entry_text,
};

fn scores(pairs: &[(&str, f64)]) -> Vec<LabelScore> {
    pairs
        .iter()
        .map(|(l, p)| LabelScore::new(*l, Score::from_probability(*p)))
        .collect()
}

fn zero_shot(pairs: &[(&str, f64)]) -> ZeroShotOutput {
    ZeroShotOutput {
        labels: pairs.iter().map(|(l, _)| (*l).to_string()).collect(),
        scores: pairs
            .iter()
            .map(|(_, p)| Score::from_probability(*p))
            .collect(),
    }
}

// =============================================================================
// EMOTION MODEL DECIDES
// =============================================================================

#[test]
fn emotion_model_detects_sad() {
    let lines = ["My dog died"];
    let p = Cascade::default().decide(
        &entry_text(&lines),
        &scores(&[("sadness", 0.90), ("joy", 0.05)]),
        |_| panic!("zero-shot must not be called"),
    );

    assert_eq!(p.emotion, "Sad");
    assert!(p.method.as_str().starts_with("emotion-model"));
    assert_eq!(p.raw_emotion, Some(EmotionKey::Sad));
}

#[test]
fn uppercase_model_labels_are_accepted() {
    let p = Cascade::default().decide(
        "furious",
        &scores(&[("ANGER", 0.81), ("Disgust", 0.11)]),
        |_| ZeroShotOutput::empty(),
    );
    assert_eq!(p.emotion, "Angry");
    assert_eq!(p.hue, Some(0));
}

// =============================================================================
// ZERO-SHOT FALLBACK
// =============================================================================

#[test]
fn zero_shot_fallback() {
    let lines = ["It was such a loss"];
    let p = Cascade::default().decide(
        &entry_text(&lines),
        &scores(&[("joy", 0.10), ("sadness", 0.09)]),
        |_| zero_shot(&[("Sad/Depressed", 0.95)]),
    );

    assert_eq!(p.emotion, "Sad");
    assert_eq!(p.method, Method::ZeroShot);
}

#[test]
fn two_phase_api_exposes_pending_context() {
    let cascade = Cascade::default();
    let step = cascade.begin(
        "  quiet afternoon  ",
        &scores(&[("neutral", 0.19), ("joy", 0.18)]),
    );
    let Step::NeedsZeroShot(pending) = step else {
        panic!("expected zero-shot to be needed");
    };
    assert_eq!(pending.text(), "quiet afternoon");
    assert_eq!(
        pending.model_top(),
        Some(("neutral", Score::from_probability(0.19)))
    );

    let p = pending.resolve(&zero_shot(&[
        ("Calm/Relaxed", 0.61),
        ("Neutral/Mixed", 0.2),
        ("Joy/Happy", 0.1),
        ("Sad/Depressed", 0.05),
    ]));
    assert_eq!(p.emotion, "Calm");
    assert_eq!(p.hue, Some(120));
    assert_eq!(p.confidence, "61.0%");
    // two model candidates followed by three zero-shot candidates
    assert_eq!(p.candidates.len(), 5);
}

// =============================================================================
// MULTI-LABEL AGGREGATION
// =============================================================================

#[test]
fn multi_label_below_accept_falls_to_model_top() {
    // fear 0.26 and surprise 0.29 after boost, both below 0.3375
    let lines = ["I was terrified but also excited"];
    let p = Cascade::default().decide(
        &entry_text(&lines),
        &scores(&[("fear", 0.22), ("surprise", 0.25), ("joy", 0.08)]),
        |_| ZeroShotOutput::empty(),
    );

    assert_eq!(p.method, Method::EmotionModel);
    assert_eq!(p.emotion, "Inspired");
    assert_eq!(p.hue, Some(30));
    assert_eq!(p.confidence, "25.0%");
    assert_eq!(p.raw_emotion, Some(EmotionKey::Surprised));
    assert_eq!(p.candidates[0].label, "Surprised/Inspired");
}

#[test]
fn multi_label_below_accept_defers_to_stronger_zero_shot() {
    let lines = ["I was terrified but also excited"];
    let p = Cascade::default().decide(
        &entry_text(&lines),
        &scores(&[("fear", 0.22), ("surprise", 0.25), ("joy", 0.08)]),
        |_| zero_shot(&[("Fearful/Anxious", 0.4), ("Surprised/Inspired", 0.35)]),
    );

    assert_eq!(p.method, Method::ZeroShot);
    assert_eq!(p.emotion, "Anxious");
    assert_eq!(p.hue, Some(180));
    assert_eq!(p.confidence, "40.0%");
    assert_eq!(p.raw_emotion, Some(EmotionKey::Fearful));
}

#[test]
fn lower_accept_factor_lets_aggregation_decide() {
    let thresholds = Thresholds {
        multi_label_accept_factor: Score::from_probability(0.5),
        ..Thresholds::default()
    };
    let cascade = Cascade::new(thresholds, ModelVersions::default());
    let p = cascade.decide(
        "I was terrified but also excited",
        &scores(&[("fear", 0.22), ("surprise", 0.25), ("joy", 0.08)]),
        |_| panic!("zero-shot must not be called"),
    );

    assert_eq!(p.method, Method::EmotionModelMulti);
    assert_eq!(p.emotion, "Inspired");
    assert_eq!(p.confidence, "29.0%");
    assert_eq!(p.candidates[0].label, "Surprised/Inspired");
    assert_eq!(p.candidates[1].label, "Fearful/Anxious");
}

// =============================================================================
// EMPTY INPUT & VERSIONS
// =============================================================================

#[test]
fn blank_lines_are_an_empty_entry() {
    let lines = ["", "   ", "\t"];
    let p = Cascade::default().decide(&entry_text(&lines), &[], |_| {
        panic!("zero-shot must not be called")
    });
    assert_eq!(p.method, Method::None);
    assert_eq!(p.confidence, "0%");
    assert!(p.summary.starts_with("You didn't write anything"));
}

#[test]
fn prediction_reports_model_versions() {
    let versions = ModelVersions {
        emotion_model: "local/emotion".to_string(),
        zero_shot: "local/nli".to_string(),
    };
    let cascade = Cascade::new(Thresholds::default(), versions.clone());
    let p = cascade.decide("fine", &[], |_| ZeroShotOutput::empty());
    assert_eq!(p.version, versions);

    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["version"]["emotion_model"], "local/emotion");
    assert_eq!(json["method"], "fallback-neutral");
    assert!(json["hue"].is_null());
}
