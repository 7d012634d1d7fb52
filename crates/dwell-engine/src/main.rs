use anyhow::{bail, Context, Result};
use dwell_engine::config::EngineConfig;
use dwell_engine::detector::{mock::MockDetector, onnx::OnnxPersonDetector, Detector};
use dwell_engine::report;
use dwell_engine::video::ffmpeg::FfmpegFrameSource;
use std::env;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_with_service("dwelltrack");

    let config = load_config()?;
    config.validate()?;
    info!(
        video = %config.video_path,
        output = %config.output_path,
        skip_interval = config.skip_interval_seconds,
        detector = %config.detector.kind,
        zone = %config.zone.label,
        "dwelltrack configuration loaded"
    );

    let mut detector: Box<dyn Detector> = match config.detector.kind.as_str() {
        "onnx" => Box::new(OnnxPersonDetector::new(config.detector.clone())?),
        "mock" => Box::new(MockDetector::new()),
        other => bail!("unknown detector kind '{other}' (expected 'onnx' or 'mock')"),
    };

    let mut source = FfmpegFrameSource::open(&config.video_path)?;

    let summary = dwell_engine::run(&config, &mut source, detector.as_mut())?;

    report::write_csv(&summary.records, &config.output_path)
        .with_context(|| format!("failed to write report to {}", config.output_path))?;

    info!(
        report = %config.output_path,
        entities = summary.records.len(),
        frames_sampled = summary.frames_sampled,
        "report written"
    );
    Ok(())
}

/// Resolve the config file from argv[1] or DWELLTRACK_CONFIG.
fn load_config() -> Result<EngineConfig> {
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("DWELLTRACK_CONFIG").ok());

    match path {
        Some(path) => EngineConfig::load(&path),
        None => bail!("usage: dwelltrack <config.json> (or set DWELLTRACK_CONFIG)"),
    }
}
