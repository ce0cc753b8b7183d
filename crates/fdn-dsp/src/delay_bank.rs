//! Delay line bank
//!
//! One circular buffer per delay line, all of the same width and addressed
//! with a single shared write index by the network.

use fdn_core::Sample;

use crate::Matrix;

/// `lines × width` history, zero-initialised
#[derive(Debug, Clone, PartialEq)]
pub struct DelayLineBank {
    buffer: Matrix<Sample>,
}

impl DelayLineBank {
    /// `width` is raised to 1 so index arithmetic never divides by zero
    pub fn new(lines: usize, width: usize) -> Self {
        Self {
            buffer: Matrix::new(lines, width.max(1), 0.0),
        }
    }

    /// Reshape and clear all history
    pub fn resize(&mut self, lines: usize, width: usize) {
        self.buffer.resize(lines, width.max(1), 0.0);
    }

    /// Clear all history, keeping the shape
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    #[inline(always)]
    pub fn read(&self, line: usize, index: usize) -> Sample {
        self.buffer.get(line, index)
    }

    #[inline(always)]
    pub fn write(&mut self, line: usize, index: usize, value: Sample) {
        self.buffer.set(line, index, value);
    }

    /// Position `delay` samples behind `write_index`, wrapped to the width
    #[inline(always)]
    pub fn tap_index(&self, write_index: usize, delay: usize) -> usize {
        let width = self.width();
        (write_index + width - delay % width) % width
    }

    /// Full history of one line, in buffer order
    pub fn line(&self, line: usize) -> &[Sample] {
        self.buffer.row(line)
    }

    #[inline]
    pub fn lines(&self) -> usize {
        self.buffer.rows()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.buffer.cols()
    }
}
