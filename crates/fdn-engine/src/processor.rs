//! Audio-thread side of the engine

use fdn_core::{FdnDimension, FdnError, FdnResult, ReverbSettings, Sample};
use fdn_dsp::denormal::ScopedFlushDenormals;
use fdn_dsp::{FeedbackDelayNetwork, Processor};
use rtrb::{Consumer, RingBuffer};

use crate::{ControlMessage, ProcessingFlag, ProcessingState, ReverbHandle};

/// Pending control messages the queue can hold
pub const COMMAND_QUEUE_CAPACITY: usize = 1024;

/// Per-channel reverb processor
pub struct ReverbProcessor {
    networks: Vec<FeedbackDelayNetwork>,
    settings: ReverbSettings,
    state: ProcessingState,
    flag: ProcessingFlag,
    command_rx: Consumer<ControlMessage>,
}

impl ReverbProcessor {
    /// Create a processor for `channels` channels and the handle that
    /// controls it from another thread.
    pub fn new(channels: usize, settings: ReverbSettings) -> FdnResult<(Self, ReverbHandle)> {
        let (command_tx, command_rx) = RingBuffer::new(COMMAND_QUEUE_CAPACITY);

        let template = Self::build_network(&settings)?;
        let mut processor = Self {
            networks: vec![template; channels],
            settings: settings.clone(),
            state: ProcessingState::Pending,
            flag: ProcessingFlag::Allowed,
            command_rx,
        };
        processor.check_processing_state();

        log::info!(
            "Reverb engine: {} channels, {} network, powers {:?}",
            channels,
            settings.dimension,
            settings.powers
        );

        Ok((processor, ReverbHandle::new(command_tx, settings)))
    }

    fn build_network(settings: &ReverbSettings) -> FdnResult<FeedbackDelayNetwork> {
        let mut network = FeedbackDelayNetwork::new(settings.dimension, &settings.powers)?;
        network.set_dry_wet(settings.dry_wet);
        Ok(network)
    }

    /// Process commands from the control thread (start of audio callback)
    fn process_commands(&mut self) {
        while let Ok(message) = self.command_rx.pop() {
            if let Err(e) = self.apply(message) {
                log::warn!("Reverb engine: rejected control message: {}", e);
            }
        }
    }

    /// Apply one control message immediately
    pub fn apply(&mut self, message: ControlMessage) -> FdnResult<()> {
        match message {
            ControlMessage::SetDimension(dimension) => self.set_dimension(dimension),
            ControlMessage::SetDelayPowers(powers) => self.set_delay_powers(powers)?,
            ControlMessage::SetGainVectors { b, c } => self.set_gain_vectors(&b, &c)?,
            ControlMessage::SetDryWet(dry_wet) => self.set_dry_wet(dry_wet),
            ControlMessage::SetProcessingFlag(flag) => self.set_processing_flag(flag),
        }
        Ok(())
    }

    /// Switch every channel's mixing matrix. Processing stays pending until
    /// the delay powers match the new dimension.
    pub fn set_dimension(&mut self, dimension: FdnDimension) {
        self.state = ProcessingState::Pending;
        for network in &mut self.networks {
            network.set_dimension(dimension);
        }
        self.settings.dimension = dimension;
        self.check_processing_state();
    }

    /// Regenerate every channel's delay lines from prime exponents
    pub fn set_delay_powers(&mut self, powers: Vec<u32>) -> FdnResult<()> {
        self.state = ProcessingState::Pending;
        for network in &mut self.networks {
            network.generate_delay_values(&powers)?;
        }
        self.settings.powers = powers;
        self.check_processing_state();
        Ok(())
    }

    /// Overwrite every channel's coupling vectors
    pub fn set_gain_vectors(&mut self, b: &[Sample], c: &[Sample]) -> FdnResult<()> {
        let expected = self.settings.dimension.lines();
        if b.len() != expected || c.len() != expected {
            return Err(FdnError::GainVectorLength {
                expected,
                b: b.len(),
                c: c.len(),
            });
        }
        for network in &mut self.networks {
            network.set_gain_vectors(b, c)?;
        }
        Ok(())
    }

    pub fn set_dry_wet(&mut self, dry_wet: f32) {
        self.settings.dry_wet = dry_wet.clamp(0.0, 1.0);
        for network in &mut self.networks {
            network.set_dry_wet(dry_wet);
        }
    }

    /// Forbid or allow processing; re-evaluated at the next block
    pub fn set_processing_flag(&mut self, flag: ProcessingFlag) {
        self.flag = flag;
        self.state = ProcessingState::Pending;
    }

    /// Run only when allowed, with one delay power per line and every
    /// channel's network ready
    fn check_processing_state(&mut self) {
        if self.flag == ProcessingFlag::Allowed {
            let ready = self.settings.is_consistent()
                && self.networks.iter().all(FeedbackDelayNetwork::is_ready);
            self.state = if ready {
                ProcessingState::Running
            } else {
                ProcessingState::Pending
            };
        }
    }

    /// Main processing function: one in-place buffer per channel.
    ///
    /// While pending, every buffer passes through unmodified.
    pub fn process(&mut self, channels: &mut [&mut [Sample]]) {
        self.process_commands();
        self.check_processing_state();
        if self.state == ProcessingState::Pending {
            return;
        }

        let _flush = ScopedFlushDenormals::new();

        // Hosts may deliver more channels than announced
        while self.networks.len() < channels.len() {
            let network = match self.networks.first() {
                Some(first) => {
                    let mut fresh = first.clone();
                    fresh.reset();
                    fresh
                }
                None => match Self::build_network(&self.settings) {
                    Ok(network) => network,
                    Err(_) => return,
                },
            };
            self.networks.push(network);
        }

        let dry_wet = self.settings.dry_wet;
        for (network, channel) in self.networks.iter_mut().zip(channels.iter_mut()) {
            if let Err(e) = network.process_block(channel, dry_wet) {
                // Channel stays dry; suspend until the next edit fixes it
                log::warn!("Reverb engine: {}", e);
                self.state = ProcessingState::Pending;
            }
        }
    }

    /// Clear every channel's history
    pub fn reset(&mut self) {
        for network in &mut self.networks {
            network.reset();
        }
    }

    #[inline]
    pub fn state(&self) -> ProcessingState {
        self.state
    }

    #[inline]
    pub fn processing_flag(&self) -> ProcessingFlag {
        self.flag
    }

    #[inline]
    pub fn settings(&self) -> &ReverbSettings {
        &self.settings
    }

    pub fn networks(&self) -> &[FeedbackDelayNetwork] {
        &self.networks
    }
}
