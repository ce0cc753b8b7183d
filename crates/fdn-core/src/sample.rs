//! Sample type and small sample helpers

/// Type alias for audio samples (single precision, as hosts deliver them)
pub type Sample = f32;

/// Magnitude below which a sample is treated as a denormal and zeroed
pub const DENORMAL_THRESHOLD: Sample = 1.0e-30;

/// Flush tiny values to exactly zero
#[inline(always)]
pub fn flush_denormal(value: Sample) -> Sample {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Linear dry/wet crossfade (0.0 = fully dry, 1.0 = fully wet)
#[inline(always)]
pub fn crossfade(dry: Sample, wet: Sample, dry_wet: f32) -> Sample {
    dry_wet * wet + (1.0 - dry_wet) * dry
}
