//! Render report

use serde::Serialize;

use fdn_core::{FdnDimension, Sample};

/// Summary of one render, printed as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub dimension: FdnDimension,
    pub powers: Vec<u32>,
    pub delay_lengths: Vec<usize>,
    pub dry_wet: f32,
    pub channels: usize,
    pub frames: usize,
    pub sample_rate: u32,
    pub peak: Sample,
    /// Time until the envelope last exceeds peak − 60 dB
    pub decay_60db_seconds: f32,
}

/// Peak magnitude across channels
pub fn peak(channels: &[Vec<Sample>]) -> Sample {
    channels
        .iter()
        .flatten()
        .fold(0.0, |acc: Sample, s| acc.max(s.abs()))
}

/// Seconds from the start to the last sample above `peak · 10^-3`
pub fn decay_60db_seconds(channels: &[Vec<Sample>], sample_rate: u32) -> f32 {
    let threshold = peak(channels) * 1.0e-3;
    let last = channels
        .iter()
        .filter_map(|channel| channel.iter().rposition(|s| s.abs() > threshold))
        .max()
        .unwrap_or(0);
    last as f32 / sample_rate as f32
}

impl RenderReport {
    pub fn summary(&self) -> String {
        format!(
            "{} network, delays {:?}, {} ch x {} frames @ {} Hz, peak {:.3}, -60 dB after {:.2}s",
            self.dimension,
            self.delay_lengths,
            self.channels,
            self.frames,
            self.sample_rate,
            self.peak,
            self.decay_60db_seconds
        )
    }
}
