//! FFmpeg-backed frame source.
//!
//! Probes the stream with ffprobe, then decodes it as an MJPEG stream piped
//! from an ffmpeg child process. Frames are split on JPEG start/end markers.

use super::FrameSource;
use crate::error::EngineError;
use anyhow::{Context, Result};
use common::tracking::VideoFrame;
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, warn};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const READ_CHUNK: usize = 64 * 1024;

/// Sequential frame reader over an ffmpeg `image2pipe` MJPEG stream.
pub struct FfmpegFrameSource {
    frame_rate: f64,
    total_frames: u64,
    width: u32,
    height: u32,
    child: Child,
    stdout: ChildStdout,
    buffer: Vec<u8>,
    sequence: u64,
    eof: bool,
}

impl FfmpegFrameSource {
    /// Open and probe a video source. Fails with `SourceUnavailable` if the
    /// source cannot be probed or declares zero frames.
    pub fn open(source_uri: &str) -> Result<Self> {
        let (frame_rate, total_frames, width, height) = probe_stream(source_uri)?;

        if total_frames == 0 {
            return Err(
                EngineError::source_unavailable(format!("{source_uri} has no frames")).into(),
            );
        }

        debug!(
            source = %source_uri,
            fps = frame_rate,
            total_frames = total_frames,
            width = width,
            height = height,
            "opening ffmpeg frame stream"
        );

        let mut child = Command::new("ffmpeg")
            .args([
                "-i",
                source_uri,
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "-q:v",
                "2",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn ffmpeg")?;

        let stdout = child
            .stdout
            .take()
            .context("ffmpeg stdout was not captured")?;

        Ok(Self {
            frame_rate,
            total_frames,
            width,
            height,
            child,
            stdout,
            buffer: Vec::new(),
            sequence: 0,
            eof: false,
        })
    }

    /// Pull bytes from the child until the buffer holds a complete JPEG, or
    /// the stream ends.
    fn next_jpeg(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(frame) = self.take_jpeg() {
                return Ok(Some(frame));
            }
            if self.eof {
                if !self.buffer.is_empty() {
                    warn!(
                        leftover_bytes = self.buffer.len(),
                        "discarding trailing partial frame"
                    );
                    self.buffer.clear();
                }
                return Ok(None);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self
                .stdout
                .read(&mut chunk)
                .context("failed to read from ffmpeg pipe")?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buffer.extend_from_slice(&chunk[..n]);
            }
        }
    }

    /// Extract one complete SOI..EOI span from the front of the buffer.
    fn take_jpeg(&mut self) -> Option<Vec<u8>> {
        let start = find_marker(&self.buffer, &JPEG_SOI)?;
        let end = find_marker(&self.buffer[start + 2..], &JPEG_EOI)? + start + 2;

        let frame = self.buffer[start..end + 2].to_vec();
        self.buffer.drain(..end + 2);
        Some(frame)
    }
}

fn find_marker(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack
        .windows(2)
        .position(|window| window == marker.as_slice())
}

impl FrameSource for FfmpegFrameSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn read_frame(&mut self) -> Result<Option<VideoFrame>> {
        let Some(data) = self.next_jpeg()? else {
            return Ok(None);
        };

        let frame = VideoFrame {
            sequence: self.sequence,
            width: self.width,
            height: self.height,
            format: "jpeg".to_string(),
            data,
        };
        self.sequence += 1;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "ffmpeg child already exited");
        }
        let _ = self.child.wait();
    }
}

/// Probe frame rate, frame count, and dimensions with ffprobe.
///
/// Containers that do not carry `nb_frames` fall back to duration x fps.
fn probe_stream(source_uri: &str) -> Result<(f64, u64, u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate,width,height,nb_frames",
            "-of",
            "csv=p=0",
            source_uri,
        ])
        .output()
        .context("failed to execute ffprobe")?;

    if !output.status.success() {
        return Err(EngineError::source_unavailable(format!(
            "ffprobe failed for {source_uri}: {:?}",
            output.status
        ))
        .into());
    }

    let stdout =
        String::from_utf8(output.stdout).context("ffprobe output is not valid UTF-8")?;
    let fields: Vec<&str> = stdout.trim().split(',').collect();
    if fields.len() < 3 {
        return Err(EngineError::source_unavailable(format!(
            "unexpected ffprobe output for {source_uri}: {stdout}"
        ))
        .into());
    }

    let width: u32 = fields[0].parse().context("failed to parse width")?;
    let height: u32 = fields[1].parse().context("failed to parse height")?;
    let frame_rate = parse_rate(fields[2])
        .ok_or_else(|| EngineError::source_unavailable(format!("bad frame rate {}", fields[2])))?;

    let total_frames = match fields.get(3).and_then(|v| v.parse::<u64>().ok()) {
        Some(n) => n,
        None => {
            let duration = probe_duration(source_uri)?;
            (duration * frame_rate).round() as u64
        }
    };

    Ok((frame_rate, total_frames, width, height))
}

fn probe_duration(source_uri: &str) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
            source_uri,
        ])
        .output()
        .context("failed to execute ffprobe for duration")?;

    if !output.status.success() {
        return Err(EngineError::source_unavailable(format!(
            "ffprobe duration query failed for {source_uri}"
        ))
        .into());
    }

    let stdout =
        String::from_utf8(output.stdout).context("ffprobe output is not valid UTF-8")?;
    stdout
        .trim()
        .parse()
        .with_context(|| format!("failed to parse duration from {stdout:?}"))
}

/// Parse an ffprobe rational rate like "30/1" or "30000/1001".
fn parse_rate(raw: &str) -> Option<f64> {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        raw.parse().ok()
    }
}
