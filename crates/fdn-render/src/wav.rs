//! WAV input/output via hound

use std::path::Path;

use anyhow::{Context, Result, bail};
use fdn_core::Sample;

/// Deinterleaved audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    pub channels: Vec<Vec<Sample>>,
    pub sample_rate: u32,
}

impl AudioFile {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Append `frames` of silence to every channel
    pub fn pad(&mut self, frames: usize) {
        for channel in &mut self.channels {
            channel.resize(channel.len() + frames, 0.0);
        }
    }
}

pub fn read_wav(path: &Path) -> Result<AudioFile> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        bail!("{} has no channels", path.display());
    }

    let interleaved: Vec<Sample> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as Sample;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as Sample * scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok(AudioFile {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write 32-bit float WAV
pub fn write_wav(path: &Path, audio: &AudioFile) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels.len() as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for frame in 0..audio.frames() {
        for channel in &audio.channels {
            writer
                .write_sample(channel[frame])
                .context("failed to write sample")?;
        }
    }
    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let audio = AudioFile {
            channels: vec![vec![0.0, 0.5, -0.25], vec![1.0, -1.0, 0.125]],
            sample_rate: 44100,
        };

        write_wav(&path, &audio).unwrap();
        assert_eq!(read_wav(&path).unwrap(), audio);
    }

    #[test]
    fn test_read_16_bit_int() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono16.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(-32768i16).unwrap();
        writer.finalize().unwrap();

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.channels, vec![vec![0.5, -1.0]]);
    }

    #[test]
    fn test_pad() {
        let mut audio = AudioFile {
            channels: vec![vec![1.0], vec![2.0]],
            sample_rate: 48000,
        };
        audio.pad(2);
        assert_eq!(audio.frames(), 3);
        assert_eq!(audio.channels[1], vec![2.0, 0.0, 0.0]);
    }
}
