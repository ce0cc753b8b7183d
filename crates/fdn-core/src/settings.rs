//! Reverb settings shared by the engine and the offline renderer

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_DRY_WET, FdnDimension};

/// Smallest delay generator exponent offered to users
pub const MIN_POWER: u32 = 1;

/// Largest delay generator exponent offered to users
pub const MAX_POWER: u32 = 10;

/// Complete user-facing reverb configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverbSettings {
    pub dimension: FdnDimension,
    /// One prime exponent per delay line
    pub powers: Vec<u32>,
    pub dry_wet: f32,
}

impl ReverbSettings {
    pub fn new(dimension: FdnDimension, powers: Vec<u32>) -> Self {
        Self {
            dimension,
            powers,
            dry_wet: DEFAULT_DRY_WET,
        }
    }

    /// True when there is exactly one power per delay line
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.powers.len() == self.dimension.lines()
    }

    /// Switch dimension, truncating the powers or padding them with
    /// [`MIN_POWER`] so the settings stay consistent
    pub fn conform_to(&mut self, dimension: FdnDimension) {
        self.dimension = dimension;
        self.powers.resize(dimension.lines(), MIN_POWER);
    }

    pub fn with_dry_wet(mut self, dry_wet: f32) -> Self {
        self.dry_wet = dry_wet.clamp(0.0, 1.0);
        self
    }
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self::new(FdnDimension::D4, vec![1, 2, 3, 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_consistent() {
        let settings = ReverbSettings::default();
        assert!(settings.is_consistent());
        assert_eq!(settings.dry_wet, DEFAULT_DRY_WET);
    }

    #[test]
    fn test_conform_pads_and_truncates() {
        let mut settings = ReverbSettings::default();

        settings.conform_to(FdnDimension::D8);
        assert_eq!(settings.powers, vec![1, 2, 3, 4, 1, 1, 1, 1]);
        assert!(settings.is_consistent());

        settings.conform_to(FdnDimension::D2);
        assert_eq!(settings.powers, vec![1, 2]);
        assert!(settings.is_consistent());
    }

    #[test]
    fn test_dry_wet_is_clamped() {
        assert_eq!(ReverbSettings::default().with_dry_wet(1.7).dry_wet, 1.0);
        assert_eq!(ReverbSettings::default().with_dry_wet(-0.2).dry_wet, 0.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let settings = ReverbSettings::new(FdnDimension::D2, vec![3, 5]);
        let json = serde_json::to_string(&settings).unwrap();
        let back: ReverbSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }
}
