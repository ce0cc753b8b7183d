//! fdn-render - offline renderer for the FDN reverb
//!
//! Usage:
//!   fdn-render ir --dimension 8 --powers 1,2,3,4,1,1,1,1 -o ir.wav
//!   fdn-render process dry.wav -o wet.wav --dry-wet 0.4 --tail 3
//!   fdn-render ir --dimension 16 --seed 7 -o random.wav --json

mod args;
mod report;
mod wav;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use fdn_core::ReverbSettings;
use fdn_dsp::FeedbackDelayNetwork;
use fdn_engine::ReverbProcessor;

use crate::args::{Cli, Commands};
use crate::report::RenderReport;
use crate::wav::{AudioFile, read_wav, write_wav};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Ir {
            reverb,
            length,
            sample_rate,
            output,
        } => render_impulse_response(&reverb.to_settings()?, length, sample_rate, &output)?,
        Commands::Process {
            input,
            output,
            reverb,
            block_size,
            tail,
        } => process_file(&reverb.to_settings()?, &input, &output, block_size, tail)?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

fn render_impulse_response(
    settings: &ReverbSettings,
    length: usize,
    sample_rate: u32,
    output: &Path,
) -> Result<RenderReport> {
    let network = FeedbackDelayNetwork::new(settings.dimension, &settings.powers)?;
    let response = network
        .impulse_response(length)
        .context("failed to render impulse response")?;

    let audio = AudioFile {
        channels: vec![response],
        sample_rate,
    };
    write_wav(output, &audio)?;
    log::info!("Wrote {} samples to {}", length, output.display());

    Ok(build_report(settings, network.delay_lengths(), &audio))
}

fn process_file(
    settings: &ReverbSettings,
    input: &Path,
    output: &Path,
    block_size: usize,
    tail: f32,
) -> Result<RenderReport> {
    if block_size == 0 {
        bail!("block size must be at least 1");
    }

    let mut audio = read_wav(input)?;
    audio.pad((tail.max(0.0) * audio.sample_rate as f32) as usize);
    log::info!(
        "Processing {} ({} ch, {} frames)",
        input.display(),
        audio.channels.len(),
        audio.frames()
    );

    let (mut processor, _handle) = ReverbProcessor::new(audio.channels.len(), settings.clone())?;

    let frames = audio.frames();
    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let mut blocks: Vec<&mut [f32]> = audio
            .channels
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        processor.process(&mut blocks);
        start = end;
    }

    write_wav(output, &audio)?;
    log::info!("Wrote {}", output.display());

    let delay_lengths = processor
        .networks()
        .first()
        .map(|network| network.delay_lengths().to_vec())
        .unwrap_or_default();
    Ok(build_report(settings, &delay_lengths, &audio))
}

fn build_report(settings: &ReverbSettings, delay_lengths: &[usize], audio: &AudioFile) -> RenderReport {
    RenderReport {
        dimension: settings.dimension,
        powers: settings.powers.clone(),
        delay_lengths: delay_lengths.to_vec(),
        dry_wet: settings.dry_wet,
        channels: audio.channels.len(),
        frames: audio.frames(),
        sample_rate: audio.sample_rate,
        peak: report::peak(&audio.channels),
        decay_60db_seconds: report::decay_60db_seconds(&audio.channels, audio.sample_rate),
    }
}
