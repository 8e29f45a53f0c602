//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::analyzer::Analyzer;
use crate::api;
use crate::config::LumiConfig;
use lumi_core::{GridReport, LumiError, Prediction, ThresholdGrid, grid_search, load_samples};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a journal file for `analyze` (1 MB).
const MAX_ENTRY_FILE_SIZE: u64 = 1024 * 1024;

/// Maximum size of a calibration sample file (10 MB).
const MAX_SAMPLES_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), LumiError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| LumiError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(LumiError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize `path` and ensure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, LumiError> {
    let canonical = path.canonicalize().map_err(|e| {
        LumiError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(LumiError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate and read a file, bounded by `max_size`.
fn read_input_file(path: &Path, max_size: u64) -> Result<Vec<u8>, LumiError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, max_size)?;
    std::fs::read(&path)
        .map_err(|e| LumiError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Human-readable prediction.
fn print_prediction(prediction: &Prediction) {
    match prediction.hue {
        Some(hue) => println!("Emotion:    {} (hue {})", prediction.emotion, hue),
        None => println!("Emotion:    {}", prediction.emotion),
    }
    println!("Confidence: {}", prediction.confidence);
    println!("Method:     {}", prediction.method);
    println!("Summary:    {}", prediction.summary);
    if !prediction.candidates.is_empty() {
        println!("Candidates:");
        for candidate in &prediction.candidates {
            println!(
                "  {:<14} {:<26} {}",
                candidate.source.as_str(),
                candidate.label,
                candidate.score.percent_string()
            );
        }
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &LumiConfig, host: &str, port: u16) -> Result<(), LumiError> {
    println!("Lumi Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:            {}", host);
    println!("  Port:            {}", port);
    println!("  Emotion model:   {}", config.models.emotion_model);
    println!("  Zero-shot model: {}", config.models.zero_shot_model);
    println!("  Inference URL:   {}", config.models.inference_url);
    println!();
    println!("Endpoints:");
    println!("  POST /predict          - Analyze journal lines");
    println!("  POST /predict_text     - Analyze a single text");
    println!("  POST /calibrate        - Analyze a batch of texts");
    println!("  GET  /calibrate_sample - Analyze the built-in samples");
    println!("  GET  /health           - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, Analyzer::from_config(config)).await
}

// =============================================================================
// ANALYZE COMMAND
// =============================================================================

/// Analyze a text or a journal file.
pub async fn cmd_analyze(
    config: &LumiConfig,
    json_mode: bool,
    text: Option<&str>,
    file: Option<&Path>,
) -> Result<(), LumiError> {
    let analyzer = Analyzer::from_config(config);

    let prediction = match (text, file) {
        (Some(text), _) => analyzer.analyze_text(text).await,
        (None, Some(path)) => {
            let bytes = read_input_file(path, MAX_ENTRY_FILE_SIZE)?;
            let contents = String::from_utf8(bytes).map_err(|e| {
                LumiError::InvalidInput(format!("'{}' is not UTF-8: {}", path.display(), e))
            })?;
            let lines: Vec<&str> = contents.lines().collect();
            analyzer.analyze_lines(&lines).await
        }
        (None, None) => {
            return Err(LumiError::InvalidInput(
                "Provide a text or --file to analyze".to_string(),
            ));
        }
    };

    if json_mode {
        print_json(&prediction);
    } else {
        print_prediction(&prediction);
    }
    Ok(())
}

// =============================================================================
// SAMPLES COMMAND
// =============================================================================

/// Analyze the built-in sample texts.
pub async fn cmd_samples(config: &LumiConfig, json_mode: bool) -> Result<(), LumiError> {
    let analyzer = Analyzer::from_config(config);
    let response = api::analyze_batch(&analyzer, &api::sample_texts()).await;

    if json_mode {
        print_json(&response);
        return Ok(());
    }

    for result in &response.results {
        println!("\"{}\"", result.text);
        print_prediction(&result.prediction);
        println!();
    }
    Ok(())
}

// =============================================================================
// CALIBRATE COMMAND
// =============================================================================

/// Grid-search thresholds over a labeled sample file.
pub async fn cmd_calibrate(
    config: &LumiConfig,
    json_mode: bool,
    samples_path: &Path,
) -> Result<(), LumiError> {
    let bytes = read_input_file(samples_path, MAX_SAMPLES_FILE_SIZE)?;
    let samples = load_samples(&bytes)?;
    let analyzer = Analyzer::from_config(config);

    tracing::info!("Classifying {} calibration samples", samples.len());
    let mut observations = Vec::with_capacity(samples.len());
    for sample in &samples {
        observations.push(analyzer.observe(sample).await);
    }

    let report = grid_search(
        &observations,
        &ThresholdGrid::default(),
        config.thresholds,
        &analyzer.pipelines().versions(),
    )?;

    if json_mode {
        print_json(&report);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

/// Every configuration's accuracy in sweep order, then the winner.
fn render_report(report: &GridReport) -> String {
    let mut out = String::new();
    out.push_str("Threshold Calibration\n");
    out.push_str("=====================\n");
    out.push_str("confidence  multi_label  boost   accuracy\n");
    for result in &report.results {
        let t = &result.thresholds;
        out.push_str(&format!(
            "{:<11} {:<12} {:<7} {} ({}/{})\n",
            t.emotion_confidence.percent_string(),
            t.multi_label.percent_string(),
            t.promote_boost.percent_string(),
            result.accuracy().percent_string(),
            result.correct,
            result.total
        ));
    }
    out.push('\n');

    let best = &report.best;
    out.push_str(&format!("Configurations tried: {}\n", report.results.len()));
    out.push_str(&format!(
        "Best accuracy:        {} ({}/{})\n",
        best.accuracy().percent_string(),
        best.correct,
        best.total
    ));
    out.push_str(&format!(
        "  emotion_confidence = {:.2}\n",
        best.thresholds.emotion_confidence.as_probability()
    ));
    out.push_str(&format!(
        "  multi_label        = {:.2}\n",
        best.thresholds.multi_label.as_probability()
    ));
    out.push_str(&format!(
        "  promote_boost      = {:.2}\n",
        best.thresholds.promote_boost.as_probability()
    ));
    out
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration as TOML (or JSON).
pub fn cmd_config(config: &LumiConfig, json_mode: bool) -> Result<(), LumiError> {
    if json_mode {
        print_json(config);
        return Ok(());
    }

    let rendered = toml::to_string_pretty(config)
        .map_err(|e| LumiError::SerializationError(e.to_string()))?;
    print!("{}", rendered);
    if config.models.api_token.is_some() {
        println!("# api_token is set");
    }
    Ok(())
}
