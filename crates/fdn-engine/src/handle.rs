//! Control-thread side of the engine

use fdn_core::{FdnDimension, FdnError, FdnResult, MAX_POWER, MIN_POWER, ReverbSettings, Sample};
use fdn_dsp::PRIMES;
use rand::Rng;
use rtrb::Producer;

use crate::{ControlMessage, ProcessingFlag};

/// Handle for controlling the processor from the UI/control thread.
///
/// Keeps a mirror of the settings it has sent so callers can display them
/// without touching the audio thread.
pub struct ReverbHandle {
    command_tx: Producer<ControlMessage>,
    settings: ReverbSettings,
}

impl ReverbHandle {
    pub(crate) fn new(command_tx: Producer<ControlMessage>, settings: ReverbSettings) -> Self {
        Self {
            command_tx,
            settings,
        }
    }

    /// Queue messages as one batch; nothing is sent unless all of them fit
    fn send(&mut self, messages: Vec<ControlMessage>) -> FdnResult<()> {
        if self.command_tx.slots() < messages.len() {
            return Err(FdnError::QueueFull);
        }
        for message in messages {
            self.command_tx
                .push(message)
                .map_err(|_| FdnError::QueueFull)?;
        }
        Ok(())
    }

    /// Change dimension and conform the delay powers to it (truncated, or
    /// padded with the smallest power). Processing is forbidden while both
    /// edits are in flight.
    pub fn set_dimension(&mut self, dimension: FdnDimension) -> FdnResult<()> {
        let mut settings = self.settings.clone();
        settings.conform_to(dimension);

        self.send(vec![
            ControlMessage::SetProcessingFlag(ProcessingFlag::Forbidden),
            ControlMessage::SetDimension(dimension),
            ControlMessage::SetDelayPowers(settings.powers.clone()),
            ControlMessage::SetProcessingFlag(ProcessingFlag::Allowed),
        ])?;

        log::debug!("Reverb: dimension {} powers {:?}", dimension, settings.powers);
        self.settings = settings;
        Ok(())
    }

    /// Replace the delay powers. A count different from the dimension is
    /// accepted; the engine passes audio through until it matches. More
    /// powers than there are primes is rejected before anything is sent.
    pub fn set_delay_powers(&mut self, powers: Vec<u32>) -> FdnResult<()> {
        if powers.len() > PRIMES.len() {
            return Err(FdnError::TooManyDelayLines {
                requested: powers.len(),
                available: PRIMES.len(),
            });
        }
        if powers.len() != self.settings.dimension.lines() {
            log::warn!(
                "Reverb: {} delay powers for a {} network, processing will pend",
                powers.len(),
                self.settings.dimension
            );
        }
        self.send(vec![ControlMessage::SetDelayPowers(powers.clone())])?;
        self.settings.powers = powers;
        Ok(())
    }

    /// Replace the coupling vectors. Regenerating delays resets them, so
    /// send these after any dimension or power change.
    pub fn set_gain_vectors(&mut self, b: Vec<Sample>, c: Vec<Sample>) -> FdnResult<()> {
        let expected = self.settings.dimension.lines();
        if b.len() != expected || c.len() != expected {
            return Err(FdnError::GainVectorLength {
                expected,
                b: b.len(),
                c: c.len(),
            });
        }
        self.send(vec![ControlMessage::SetGainVectors { b, c }])
    }

    pub fn set_dry_wet(&mut self, dry_wet: f32) -> FdnResult<()> {
        let dry_wet = dry_wet.clamp(0.0, 1.0);
        self.send(vec![ControlMessage::SetDryWet(dry_wet)])?;
        self.settings.dry_wet = dry_wet;
        Ok(())
    }

    pub fn forbid_processing(&mut self) -> FdnResult<()> {
        self.send(vec![ControlMessage::SetProcessingFlag(
            ProcessingFlag::Forbidden,
        )])
    }

    pub fn allow_processing(&mut self) -> FdnResult<()> {
        self.send(vec![ControlMessage::SetProcessingFlag(ProcessingFlag::Allowed)])
    }

    /// Draw a fresh power per line from `MIN_POWER..=MAX_POWER` using the
    /// caller's generator, and send it
    pub fn randomize_powers<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FdnResult<Vec<u32>> {
        let powers: Vec<u32> = (0..self.settings.dimension.lines())
            .map(|_| rng.random_range(MIN_POWER..=MAX_POWER))
            .collect();
        self.set_delay_powers(powers.clone())?;
        Ok(powers)
    }

    /// Settings as last sent
    #[inline]
    pub fn settings(&self) -> &ReverbSettings {
        &self.settings
    }
}
