//! Sequential run driver.
//!
//! Frames are read and processed strictly in increasing index order; a
//! sampled frame triggers one synchronous detector call. All run state (the
//! entity table, frame counters) lives in this function's scope and is
//! discarded after the report records are produced.

use crate::accumulator::DwellAccumulator;
use crate::config::EngineConfig;
use crate::detector::Detector;
use crate::entity::EntityTable;
use crate::error::EngineError;
use crate::matcher::IdentityMatcher;
use crate::report::ReportFilter;
use crate::sampler::FrameSampler;
use crate::video::FrameSource;
use anyhow::Result;
use common::tracking::{DwellRecord, FrameStats};
use tracing::{debug, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Filtered, clamped report records in entity creation order
    pub records: Vec<DwellRecord>,

    /// Frames read from the source
    pub frames_seen: u64,

    /// Frames on which detection ran
    pub frames_sampled: u64,

    /// Distinct entities created, including ones later filtered out
    pub entities_created: usize,
}

/// Drive one full run: sample, detect, match, accumulate, filter.
pub fn run(
    config: &EngineConfig,
    source: &mut dyn FrameSource,
    detector: &mut dyn Detector,
) -> Result<RunSummary> {
    config.validate()?;

    let frame_rate = source.frame_rate();
    let total_frames = source.total_frames();
    if total_frames == 0 {
        return Err(EngineError::source_unavailable("source declares zero frames").into());
    }

    let sampler = FrameSampler::new(frame_rate, config.skip_interval_seconds)?;
    let video_duration = total_frames as f64 / frame_rate;
    let matcher = IdentityMatcher::new(config.proximity_threshold);
    let accumulator = DwellAccumulator::new(sampler.seconds_per_sample(), config.zone.clone());
    let mut table = EntityTable::new();

    info!(
        detector = detector.id(),
        fps = frame_rate,
        total_frames = total_frames,
        stride = sampler.stride(),
        zone = %config.zone.label,
        "starting dwell run"
    );

    let mut frames_seen: u64 = 0;
    let mut frames_sampled: u64 = 0;

    loop {
        let frame = match source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                // A failed read before the declared end of stream is a
                // premature end of input, not a fatal error. Whatever was
                // accumulated still flows into the report.
                warn!(error = %e, frame_index = frames_seen, "premature end of stream");
                break;
            }
        };

        let frame_index = frames_seen;
        frames_seen += 1;

        if !sampler.is_sampled(frame_index) {
            continue;
        }
        frames_sampled += 1;

        let boxes = match detector.detect(&frame) {
            Ok(boxes) => boxes,
            Err(e) => {
                // Detector failures are not retried; the frame contributes
                // zero detections and the run continues.
                warn!(error = %e, frame_index = frame_index, "detection failed, skipping frame");
                Vec::new()
            }
        };

        let mut in_zone = 0usize;
        let mut credited = 0usize;
        for bbox in &boxes {
            if !bbox.is_valid() {
                debug!(?bbox, frame_index = frame_index, "ignoring degenerate box");
                continue;
            }
            let resolution = matcher.resolve(bbox, frame_index, &mut table);
            if accumulator.credit(&mut table, resolution.index, bbox) {
                in_zone += 1;
            }
            credited += 1;
        }

        let stats = FrameStats {
            frame_index,
            current_detections: credited,
            in_zone,
            total_entities: table.len(),
        };
        debug!(
            frame_index = stats.frame_index,
            current = stats.current_detections,
            in_zone = stats.in_zone,
            total = stats.total_entities,
            "sampled frame processed"
        );
    }

    let entities_created = table.len();
    let filter = ReportFilter::new(config.min_time_threshold, video_duration);
    let records = filter.finalize(&table);

    info!(
        frames_seen = frames_seen,
        frames_sampled = frames_sampled,
        entities_created = entities_created,
        entities_reported = records.len(),
        "dwell run complete"
    );

    Ok(RunSummary {
        records,
        frames_seen,
        frames_sampled,
        entities_created,
    })
}
