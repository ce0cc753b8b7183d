//! Denormal protection for the audio thread
//!
//! Long runs of silence through a feedback loop leave values decaying toward
//! zero; once they go subnormal the FPU slows down dramatically. The guard
//! sets DAZ + FTZ for the current thread and restores the previous mode when
//! dropped.

/// Scoped flush-to-zero. Create one at the top of each processing block.
pub struct ScopedFlushDenormals {
    #[cfg(target_arch = "x86_64")]
    previous: u32,
}

impl ScopedFlushDenormals {
    #[inline]
    #[allow(deprecated)]
    pub fn new() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            // Safety: MXCSR only affects floating-point behavior of this thread
            unsafe {
                use std::arch::x86_64::{_mm_getcsr, _mm_setcsr};
                // DAZ (Denormals Are Zero) = bit 6 (0x0040)
                // FTZ (Flush To Zero) = bit 15 (0x8000)
                let previous = _mm_getcsr();
                _mm_setcsr(previous | 0x8040);
                Self { previous }
            }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            // ARM targets rely on the per-sample flush in the network
            Self {}
        }
    }
}

impl Default for ScopedFlushDenormals {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopedFlushDenormals {
    #[inline]
    #[allow(deprecated)]
    fn drop(&mut self) {
        #[cfg(target_arch = "x86_64")]
        {
            unsafe {
                use std::arch::x86_64::_mm_setcsr;
                _mm_setcsr(self.previous);
            }
        }
    }
}

/// Check if denormals are being flushed to zero on this thread
#[inline]
#[allow(deprecated)]
pub fn denormals_are_zero() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        unsafe {
            use std::arch::x86_64::_mm_getcsr;
            (_mm_getcsr() & 0x8040) == 0x8040
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_guard_sets_and_restores() {
        let before = denormals_are_zero();
        {
            let _guard = ScopedFlushDenormals::new();
            assert!(denormals_are_zero());
        }
        assert_eq!(denormals_are_zero(), before);
    }
}
