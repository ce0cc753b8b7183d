//! Feedback delay network reverberator
//!
//! Signal flow per sample:
//!   taps ← delay lines (read at `write_index - delay`)
//!   wet  = input + Σ c·tap
//!   line[i] ← input·b[i] + Σ_j M[i][j]·tap[j]
//!   out  = dry_wet·wet + (1 - dry_wet)·input
//!
//! Every line shares one write index. All taps for a step are read before any
//! line is written, so the feedback path is delayed by exactly `delay[i]`.

use fdn_core::{
    DEFAULT_DRY_WET, FdnDimension, FdnError, FdnResult, MAX_DELAY, Sample, crossfade,
    flush_denormal,
};

use crate::{DelayLineBank, Processor, mix_matrix};

/// Prime bases for the delay lengths, one per line in order
pub const PRIMES: [usize; 26] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101,
];

/// Default input coupling (b) per line
pub const DEFAULT_INPUT_GAIN: Sample = 1.0;

/// Default output coupling (c) per line
pub const DEFAULT_OUTPUT_GAIN: Sample = 0.8;

/// Largest exponent `k` with `prime^k <= MAX_DELAY`
const fn max_power(prime: usize) -> u32 {
    let mut power = 0;
    let mut value = 1;
    while value * prime <= MAX_DELAY {
        value *= prime;
        power += 1;
    }
    power
}

/// Delay length for the line using `PRIMES[line]` raised to `exponent`.
///
/// The exponent wraps modulo the prime's maximum power, with 0 mapping to
/// that maximum, so the result is always in `1..=MAX_DELAY`.
pub fn delay_length(line: usize, exponent: u32) -> usize {
    let prime = PRIMES[line];
    let max = max_power(prime);
    let reduced = match exponent % max {
        0 => max,
        r => r,
    };
    prime.pow(reduced)
}

/// One channel's reverberator
#[derive(Debug, Clone)]
pub struct FeedbackDelayNetwork {
    dimension: FdnDimension,
    /// Sorted ascending
    delay_lengths: Vec<usize>,
    input_gains: Vec<Sample>,
    output_gains: Vec<Sample>,
    bank: DelayLineBank,
    write_index: usize,
    dry_wet: f32,
}

impl FeedbackDelayNetwork {
    /// Create a network with one delay line per exponent.
    ///
    /// The exponent count does not have to match `dimension`; the network
    /// simply reports itself as not ready until it does.
    pub fn new(dimension: FdnDimension, exponents: &[u32]) -> FdnResult<Self> {
        let mut network = Self {
            dimension,
            delay_lengths: Vec::new(),
            input_gains: Vec::new(),
            output_gains: Vec::new(),
            bank: DelayLineBank::new(0, 1),
            write_index: 0,
            dry_wet: DEFAULT_DRY_WET,
        };
        network.generate_delay_values(exponents)?;
        Ok(network)
    }

    /// Rebuild delay lengths from prime exponents.
    ///
    /// Clears all history, rewinds the write index and resets both gain
    /// vectors to their defaults for the current dimension.
    pub fn generate_delay_values(&mut self, exponents: &[u32]) -> FdnResult<()> {
        if exponents.len() > PRIMES.len() {
            return Err(FdnError::TooManyDelayLines {
                requested: exponents.len(),
                available: PRIMES.len(),
            });
        }

        let mut delays: Vec<usize> = exponents
            .iter()
            .enumerate()
            .map(|(line, &exponent)| delay_length(line, exponent))
            .collect();
        delays.sort_unstable();

        let width = delays.last().copied().unwrap_or(1);
        self.bank.resize(delays.len(), width);
        self.write_index = 0;
        self.delay_lengths = delays;

        let lines = self.dimension.lines();
        self.input_gains = vec![DEFAULT_INPUT_GAIN; lines];
        self.output_gains = vec![DEFAULT_OUTPUT_GAIN; lines];

        log::debug!(
            "FDN {}: delays={:?} width={}",
            self.dimension,
            self.delay_lengths,
            self.bank.width()
        );
        Ok(())
    }

    /// Select the mixing matrix. Delay lines are left alone, so the network
    /// stays not ready until there is one delay per line.
    ///
    /// Gain vectors sized for another dimension are reset to defaults.
    pub fn set_dimension(&mut self, dimension: FdnDimension) {
        self.dimension = dimension;
        let lines = dimension.lines();
        if self.input_gains.len() != lines || self.output_gains.len() != lines {
            self.input_gains = vec![DEFAULT_INPUT_GAIN; lines];
            self.output_gains = vec![DEFAULT_OUTPUT_GAIN; lines];
        }
    }

    /// Overwrite the input (b) and output (c) coupling vectors.
    ///
    /// Both must have one entry per line; on mismatch nothing changes.
    pub fn set_gain_vectors(&mut self, b: &[Sample], c: &[Sample]) -> FdnResult<()> {
        let expected = self.dimension.lines();
        if b.len() != expected || c.len() != expected {
            return Err(FdnError::GainVectorLength {
                expected,
                b: b.len(),
                c: c.len(),
            });
        }
        self.input_gains.clear();
        self.input_gains.extend_from_slice(b);
        self.output_gains.clear();
        self.output_gains.extend_from_slice(c);
        Ok(())
    }

    /// Dry/wet used by [`FeedbackDelayNetwork::process`], clamped to 0..=1
    pub fn set_dry_wet(&mut self, dry_wet: f32) {
        self.dry_wet = dry_wet.clamp(0.0, 1.0);
    }

    /// One delay length, one gain pair per line
    #[inline]
    pub fn is_ready(&self) -> bool {
        let lines = self.dimension.lines();
        self.delay_lengths.len() == lines
            && self.input_gains.len() == lines
            && self.output_gains.len() == lines
    }

    fn check_ready(&self) -> FdnResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(FdnError::NotReady {
                dimension: self.dimension.lines(),
                delay_lines: self.delay_lengths.len(),
            })
        }
    }

    /// Reverberate `buffer` in place with the stored dry/wet
    pub fn process(&mut self, buffer: &mut [Sample]) -> FdnResult<()> {
        let dry_wet = self.dry_wet;
        self.process_block(buffer, dry_wet)
    }

    /// Reverberate `buffer` in place.
    ///
    /// A network that is not ready leaves the buffer untouched and returns
    /// [`FdnError::NotReady`]; the caller passes the audio through.
    pub fn process_block(&mut self, buffer: &mut [Sample], dry_wet: f32) -> FdnResult<()> {
        self.check_ready()?;

        let dry_wet = dry_wet.clamp(0.0, 1.0);
        let matrix = mix_matrix(self.dimension);
        let lines = self.dimension.lines();
        let width = self.bank.width();
        let mut taps = [0.0 as Sample; FdnDimension::MAX_LINES];

        for sample in buffer.iter_mut() {
            let input = *sample;
            let mut wet = input;

            for (line, tap) in taps[..lines].iter_mut().enumerate() {
                let index = self.bank.tap_index(self.write_index, self.delay_lengths[line]);
                *tap = self.bank.read(line, index);
                wet += self.output_gains[line] * *tap;
            }

            for line in 0..lines {
                let mixed: Sample = matrix
                    .row(line)
                    .iter()
                    .zip(&taps[..lines])
                    .map(|(m, t)| m * t)
                    .sum();
                let feedback = input * self.input_gains[line] + mixed;
                self.bank
                    .write(line, self.write_index, flush_denormal(feedback));
            }

            *sample = crossfade(input, wet, dry_wet);
            self.write_index = (self.write_index + 1) % width;
        }

        Ok(())
    }

    /// Fully wet response of the current configuration to a unit impulse.
    ///
    /// Rendered on a fresh copy; this network's history is not touched.
    pub fn impulse_response(&self, length: usize) -> FdnResult<Vec<Sample>> {
        self.check_ready()?;

        let mut probe = self.clone();
        probe.reset();

        let mut response = vec![0.0; length];
        if let Some(first) = response.first_mut() {
            *first = 1.0;
        }
        probe.process_block(&mut response, 1.0)?;
        Ok(response)
    }

    #[inline]
    pub fn dimension(&self) -> FdnDimension {
        self.dimension
    }

    #[inline]
    pub fn delay_lengths(&self) -> &[usize] {
        &self.delay_lengths
    }

    #[inline]
    pub fn input_gains(&self) -> &[Sample] {
        &self.input_gains
    }

    #[inline]
    pub fn output_gains(&self) -> &[Sample] {
        &self.output_gains
    }

    #[inline]
    pub fn dry_wet(&self) -> f32 {
        self.dry_wet
    }

    /// Circular buffer length shared by every line
    #[inline]
    pub fn bank_width(&self) -> usize {
        self.bank.width()
    }

    #[inline]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn delay_bank(&self) -> &DelayLineBank {
        &self.bank
    }
}

impl Processor for FeedbackDelayNetwork {
    fn reset(&mut self) {
        self.bank.clear();
        self.write_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize) -> Vec<Sample> {
        let mut buffer = vec![0.0; len];
        buffer[0] = 1.0;
        buffer
    }

    #[test]
    fn test_max_power() {
        assert_eq!(max_power(2), 15);
        assert_eq!(max_power(3), 9);
        assert_eq!(max_power(101), 2);
        for prime in PRIMES {
            let max = max_power(prime);
            assert!(prime.pow(max) <= MAX_DELAY);
            assert!(prime.pow(max + 1) > MAX_DELAY);
        }
    }

    #[test]
    fn test_delay_length_wraps_exponent() {
        assert_eq!(delay_length(0, 1), 2);
        assert_eq!(delay_length(0, 3), 8);
        // 0 and multiples of the max map back to the max power
        assert_eq!(delay_length(0, 0), 32768);
        assert_eq!(delay_length(0, 15), 32768);
        assert_eq!(delay_length(0, 16), 2);
        assert_eq!(delay_length(1, 9), 19683);
    }

    #[test]
    fn test_delays_sorted_and_bank_sized() {
        let fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[4, 1, 2, 1]).unwrap();
        // 2^4, 3^1, 5^2, 7^1
        assert_eq!(fdn.delay_lengths(), &[3, 7, 16, 25]);
        assert_eq!(fdn.bank_width(), 25);
        assert_eq!(fdn.delay_bank().lines(), 4);
        assert!(fdn.is_ready());
    }

    #[test]
    fn test_default_gains() {
        let fdn = FeedbackDelayNetwork::new(FdnDimension::D8, &[1; 8]).unwrap();
        assert_eq!(fdn.input_gains(), &[DEFAULT_INPUT_GAIN; 8]);
        assert_eq!(fdn.output_gains(), &[DEFAULT_OUTPUT_GAIN; 8]);
    }

    #[test]
    fn test_too_many_exponents() {
        let exponents = vec![1; PRIMES.len() + 1];
        let err = FeedbackDelayNetwork::new(FdnDimension::D16, &exponents).unwrap_err();
        assert_eq!(
            err,
            FdnError::TooManyDelayLines {
                requested: 27,
                available: 26
            }
        );
    }

    #[test]
    fn test_not_ready_leaves_buffer() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3]).unwrap();
        assert!(!fdn.is_ready());

        let mut buffer = vec![0.5; 16];
        let err = fdn.process_block(&mut buffer, 1.0).unwrap_err();
        assert_eq!(
            err,
            FdnError::NotReady {
                dimension: 4,
                delay_lines: 3
            }
        );
        assert!(buffer.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_set_dimension_requires_regeneration() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3, 4]).unwrap();
        fdn.set_dimension(FdnDimension::D8);
        assert!(!fdn.is_ready());

        fdn.generate_delay_values(&[1, 1, 1, 1, 1, 1, 1, 1]).unwrap();
        assert!(fdn.is_ready());
        assert_eq!(fdn.delay_bank().lines(), 8);
    }

    #[test]
    fn test_delays_before_dimension_is_ready() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3, 4]).unwrap();
        fdn.generate_delay_values(&[1; 8]).unwrap();
        assert!(!fdn.is_ready());
        assert_eq!(fdn.input_gains().len(), 4);

        fdn.set_dimension(FdnDimension::D8);
        assert_eq!(fdn.input_gains(), &[DEFAULT_INPUT_GAIN; 8]);
        assert_eq!(fdn.output_gains(), &[DEFAULT_OUTPUT_GAIN; 8]);
        assert!(fdn.is_ready());

        let mut buffer = impulse(64);
        fdn.process_block(&mut buffer, 1.0).unwrap();
        assert_ne!(buffer, impulse(64));
    }

    #[test]
    fn test_same_dimension_keeps_gains() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D2, &[1, 1]).unwrap();
        fdn.set_gain_vectors(&[0.5, 0.25], &[0.1, 0.2]).unwrap();
        fdn.set_dimension(FdnDimension::D2);
        assert_eq!(fdn.input_gains(), &[0.5, 0.25]);
        assert_eq!(fdn.output_gains(), &[0.1, 0.2]);
    }

    #[test]
    fn test_gain_vector_length_checked() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D2, &[1, 1]).unwrap();
        let err = fdn.set_gain_vectors(&[1.0, 1.0], &[0.5]).unwrap_err();
        assert_eq!(
            err,
            FdnError::GainVectorLength {
                expected: 2,
                b: 2,
                c: 1
            }
        );
        assert_eq!(fdn.output_gains(), &[DEFAULT_OUTPUT_GAIN; 2]);

        fdn.set_gain_vectors(&[0.5, 0.25], &[0.1, 0.2]).unwrap();
        assert_eq!(fdn.input_gains(), &[0.5, 0.25]);
        assert_eq!(fdn.output_gains(), &[0.1, 0.2]);
    }

    #[test]
    fn test_first_echo_arrives_at_shortest_delay() {
        // Delays 2 and 3
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D2, &[1, 1]).unwrap();
        let mut buffer = impulse(4);
        fdn.process_block(&mut buffer, 1.0).unwrap();

        assert_eq!(buffer[0], 1.0);
        assert_eq!(buffer[1], 0.0);
        assert!((buffer[2] - DEFAULT_OUTPUT_GAIN).abs() < 1e-6);
        assert!((buffer[3] - DEFAULT_OUTPUT_GAIN).abs() < 1e-6);
    }

    #[test]
    fn test_taps_read_before_write() {
        // Delays 2 and 3, width 3. At step 0 line 1 reads slot 0 before the
        // impulse lands there, so the only tap at step 2 is line 0's.
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D2, &[1, 1]).unwrap();
        let mut buffer = impulse(3);
        fdn.process_block(&mut buffer, 1.0).unwrap();

        // Slot 2 of line 0 was written with the mix of the step-2 taps only
        let gain = mix_matrix(FdnDimension::D2).gain();
        assert!((fdn.delay_bank().read(0, 2) - gain).abs() < 1e-6);
        assert!((fdn.delay_bank().read(1, 2) - gain).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3, 4]).unwrap();
        let mut buffer = impulse(64);
        fdn.process_block(&mut buffer, 1.0).unwrap();
        assert_ne!(fdn.write_index(), 0);

        fdn.reset();
        assert_eq!(fdn.write_index(), 0);
        for line in 0..4 {
            assert!(fdn.delay_bank().line(line).iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_impulse_response_does_not_touch_state() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3, 4]).unwrap();
        let mut buffer = vec![0.25; 10];
        fdn.process_block(&mut buffer, 0.5).unwrap();
        let index = fdn.write_index();

        let ir = fdn.impulse_response(512).unwrap();
        assert_eq!(ir.len(), 512);
        assert_eq!(ir[0], 1.0);
        assert_eq!(fdn.write_index(), index);

        let mut fresh = FeedbackDelayNetwork::new(FdnDimension::D4, &[1, 2, 3, 4]).unwrap();
        let mut expected = impulse(512);
        fresh.process_block(&mut expected, 1.0).unwrap();
        assert_eq!(ir, expected);
    }

    #[test]
    fn test_stored_dry_wet() {
        let mut fdn = FeedbackDelayNetwork::new(FdnDimension::D2, &[1, 1]).unwrap();
        fdn.set_dry_wet(3.0);
        assert_eq!(fdn.dry_wet(), 1.0);
        fdn.set_dry_wet(0.0);

        let mut buffer = impulse(32);
        fdn.process(&mut buffer).unwrap();
        assert_eq!(buffer, impulse(32));
    }
}
