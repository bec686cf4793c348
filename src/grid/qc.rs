//! Quality flags for a vertical profile.
use super::{config::QcConfig, interp::Sample};
use std::fmt::Display;

/// Four quality bits. Zero means nothing suspicious was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct QcFlags(u8);

impl QcFlags {
    pub const HEIGHT_NOT_MONOTONIC: QcFlags = QcFlags(0b0001);
    pub const PRESSURE_NOT_MONOTONIC: QcFlags = QcFlags(0b0010);
    pub const LARGE_GAP: QcFlags = QcFlags(0b0100);
    pub const SHALLOW_PROFILE: QcFlags = QcFlags(0b1000);

    /// Every flag with the name used in file metadata, lowest bit first.
    pub const ALL: [(QcFlags, &'static str); 4] = [
        (QcFlags::HEIGHT_NOT_MONOTONIC, "height_not_monotonic"),
        (QcFlags::PRESSURE_NOT_MONOTONIC, "pressure_not_monotonic"),
        (QcFlags::LARGE_GAP, "large_gap"),
        (QcFlags::SHALLOW_PROFILE, "shallow_profile"),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_clean(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: QcFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: QcFlags) {
        self.0 |= other.0;
    }
}

impl Display for QcFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{:04b}", self.0)
    }
}

/// Check the raw samples, in archive order, and their height sorted version.
pub fn check(raw: &[Sample], prepared: &[Sample], config: &QcConfig) -> QcFlags {
    let mut flags = QcFlags::default();

    if raw.windows(2).any(|w| !(w[1].height > w[0].height)) {
        flags.insert(QcFlags::HEIGHT_NOT_MONOTONIC);
    }

    if raw.windows(2).any(|w| !(w[1].pressure < w[0].pressure)) {
        flags.insert(QcFlags::PRESSURE_NOT_MONOTONIC);
    }

    if prepared
        .windows(2)
        .any(|w| w[1].height - w[0].height > config.max_gap_m)
    {
        flags.insert(QcFlags::LARGE_GAP);
    }

    let top = prepared.last().map(|s| s.height).unwrap_or(std::f64::MIN);
    if top < config.min_top_m {
        flags.insert(QcFlags::SHALLOW_PROFILE);
    }

    flags
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::grid::interp::prepare;

    fn sample(height: f64, pressure: f64) -> Sample {
        Sample {
            height,
            pressure,
            temperature: 0.0,
            dew_point: None,
            relative_humidity: 50.0,
        }
    }

    fn config() -> QcConfig {
        QcConfig {
            min_levels: 2,
            max_gap_m: 1000.0,
            min_top_m: 2500.0,
        }
    }

    fn flags_for(raw: &[Sample]) -> QcFlags {
        check(raw, &prepare(raw), &config())
    }

    #[test]
    fn test_clean_profile() {
        let raw = [
            sample(0.0, 1000.0),
            sample(900.0, 900.0),
            sample(1800.0, 800.0),
            sample(2600.0, 700.0),
        ];
        let flags = flags_for(&raw);
        assert!(flags.is_clean(), "flags = {}", flags);
    }

    #[test]
    fn test_each_flag() {
        let raw = [
            sample(0.0, 1000.0),
            sample(900.0, 900.0),
            sample(800.0, 910.0),
            sample(2600.0, 700.0),
        ];
        let flags = flags_for(&raw);
        assert!(flags.contains(QcFlags::HEIGHT_NOT_MONOTONIC));
        assert!(flags.contains(QcFlags::PRESSURE_NOT_MONOTONIC));
        assert!(flags.contains(QcFlags::LARGE_GAP));
        assert!(!flags.contains(QcFlags::SHALLOW_PROFILE));
        assert_eq!(flags.to_string(), "0111");

        let raw = [sample(0.0, 1000.0), sample(900.0, 900.0)];
        assert_eq!(flags_for(&raw), QcFlags::SHALLOW_PROFILE);
    }

    #[test]
    fn test_repeated_height_is_not_monotonic() {
        let raw = [
            sample(0.0, 1000.0),
            sample(0.0, 990.0),
            sample(900.0, 900.0),
            sample(1800.0, 800.0),
            sample(2600.0, 700.0),
        ];
        assert_eq!(flags_for(&raw), QcFlags::HEIGHT_NOT_MONOTONIC);
    }

    #[test]
    fn test_bits() {
        let mut flags = QcFlags::default();
        flags.insert(QcFlags::LARGE_GAP);
        flags.insert(QcFlags::SHALLOW_PROFILE);
        assert_eq!(flags.bits(), 12);
        assert_eq!(QcFlags::ALL.iter().filter(|(f, _)| flags.contains(*f)).count(), 2);
    }
}
