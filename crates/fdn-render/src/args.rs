//! Command-line arguments

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use fdn_core::{FdnDimension, MAX_POWER, MIN_POWER, ReverbSettings};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Parser)]
#[command(name = "fdn-render", about = "Offline feedback delay network reverb renderer")]
pub struct Cli {
    /// Print a JSON report instead of a summary line
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the impulse response of a configuration to WAV
    Ir {
        #[command(flatten)]
        reverb: ReverbArgs,
        /// Length in samples
        #[arg(short, long, default_value_t = 96_000)]
        length: usize,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Reverberate a WAV file, one network per channel
    Process {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        reverb: ReverbArgs,
        /// Processing block size in samples
        #[arg(long, default_value_t = 512)]
        block_size: usize,
        /// Seconds of silence appended so the tail rings out
        #[arg(long, default_value_t = 0.0)]
        tail: f32,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReverbArgs {
    /// Number of delay lines (2, 4, 8 or 16)
    #[arg(short, long, default_value_t = 4)]
    pub dimension: usize,
    /// Prime exponent per delay line, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub powers: Vec<u32>,
    /// Dry/wet ratio (0 = dry, 1 = wet)
    #[arg(long, default_value_t = 0.5)]
    pub dry_wet: f32,
    /// Draw random powers from this seed instead of --powers
    #[arg(long, conflicts_with = "powers")]
    pub seed: Option<u64>,
}

impl ReverbArgs {
    pub fn to_settings(&self) -> Result<ReverbSettings> {
        let dimension = FdnDimension::try_from(self.dimension)?;

        let mut settings = ReverbSettings::default().with_dry_wet(self.dry_wet);
        settings.conform_to(dimension);

        if let Some(seed) = self.seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            settings.powers = (0..dimension.lines())
                .map(|_| rng.random_range(MIN_POWER..=MAX_POWER))
                .collect();
        } else if !self.powers.is_empty() {
            if self.powers.len() != dimension.lines() {
                bail!(
                    "{} powers given for {} delay lines",
                    self.powers.len(),
                    dimension.lines()
                );
            }
            settings.powers = self.powers.clone();
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dimension: usize, powers: Vec<u32>, seed: Option<u64>) -> ReverbArgs {
        ReverbArgs {
            dimension,
            powers,
            dry_wet: 0.5,
            seed,
        }
    }

    #[test]
    fn test_defaults_conform_to_dimension() {
        let settings = args(8, vec![], None).to_settings().unwrap();
        assert_eq!(settings.dimension, FdnDimension::D8);
        assert_eq!(settings.powers, vec![1, 2, 3, 4, 1, 1, 1, 1]);
    }

    #[test]
    fn test_explicit_powers() {
        let settings = args(2, vec![7, 3], None).to_settings().unwrap();
        assert_eq!(settings.powers, vec![7, 3]);
        assert!(args(2, vec![7], None).to_settings().is_err());
    }

    #[test]
    fn test_seeded_powers_are_reproducible() {
        let a = args(16, vec![], Some(11)).to_settings().unwrap();
        let b = args(16, vec![], Some(11)).to_settings().unwrap();
        assert_eq!(a.powers, b.powers);
        assert_eq!(a.powers.len(), 16);
    }

    #[test]
    fn test_invalid_dimension() {
        assert!(args(3, vec![], None).to_settings().is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "fdn-render",
            "ir",
            "--dimension",
            "8",
            "--powers",
            "1,2,3,4,5,6,7,8",
            "-o",
            "ir.wav",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Ir { reverb, length, .. } => {
                assert_eq!(reverb.powers, vec![1, 2, 3, 4, 5, 6, 7, 8]);
                assert_eq!(length, 96_000);
            }
            Commands::Process { .. } => panic!("expected ir"),
        }
    }
}
