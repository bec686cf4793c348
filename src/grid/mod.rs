//! Homogenize soundings onto a fixed altitude grid for radiative transfer work.
//!
//! Each accepted sounding is quality checked, interpolated onto the grid, and run through a toy
//! cloud model. The results can be written as a plain text file for radiative transfer codes or
//! as a NetCDF file.
use crate::{errors::RaobErr, sounding::Sounding, station::StationInfo};
use chrono::NaiveDateTime;

mod cloud;
mod config;
mod interp;
mod netcdf;
mod qc;
mod rt_ascii;

pub use self::cloud::{diagnose, CloudProfile};
pub use self::config::{CloudConfig, GridConfig, GridSpec, QcConfig};
pub use self::interp::{AltitudeGrid, GriddedFields, Sample};
pub use self::netcdf::write_gridded_netcdf;
pub use self::qc::QcFlags;
pub use self::rt_ascii::{write_rt_ascii, write_rt_ascii_file};

/// One sounding on the altitude grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedProfile {
    pub station: StationInfo,
    pub valid_time: NaiveDateTime,
    pub qc: QcFlags,
    /// Pressure (hPa), temperature (C), dew point (C), relative humidity (%).
    pub fields: GriddedFields,
    pub cloud: CloudProfile,
}

/// Put one sounding on the grid.
///
/// Fails with `NotEnoughData` when the sounding has fewer usable levels than the configured
/// minimum.
pub fn homogenize(
    snd: &Sounding,
    config: &GridConfig,
    grid: &AltitudeGrid,
) -> Result<GriddedProfile, RaobErr> {
    let raw: Vec<Sample> = snd.levels.iter().filter_map(Sample::from_level).collect();
    if raw.len() < config.qc.min_levels {
        return Err(RaobErr::NotEnoughData);
    }

    let prepared = interp::prepare(&raw);
    let qc = qc::check(&raw, &prepared, &config.qc);
    let fields = interp::to_grid(&prepared, grid);
    let cloud = diagnose(
        grid.altitudes(),
        &fields.temperature,
        &fields.relative_humidity,
        &config.cloud,
    );

    Ok(GriddedProfile {
        station: snd.station.clone(),
        valid_time: snd.valid_time,
        qc,
        fields,
        cloud,
    })
}

/// Grid every sounding. Returns the profiles and the rejected soundings with the reason.
/// `progress` is called once per sounding.
pub fn grid_all<'a, I, F>(
    soundings: I,
    config: &GridConfig,
    grid: &AltitudeGrid,
    mut progress: F,
) -> (Vec<GriddedProfile>, Vec<(&'a Sounding, RaobErr)>)
where
    I: IntoIterator<Item = &'a Sounding>,
    F: FnMut(),
{
    let mut profiles = vec![];
    let mut rejected = vec![];

    for snd in soundings {
        match homogenize(snd, config, grid) {
            Ok(profile) => profiles.push(profile),
            Err(err) => {
                tracing::warn!(
                    station = %snd.station.number,
                    valid_time = %snd.valid_time,
                    "rejected: {}",
                    err
                );
                rejected.push((snd, err));
            }
        }
        progress();
    }

    (profiles, rejected)
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::{sounding::Level, station::StationNumber};
    use chrono::NaiveDate;

    fn test_sounding(num_levels: usize) -> Sounding {
        let vt = NaiveDate::from_ymd_opt(2022, 3, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut snd = Sounding::new(StationInfo::new(StationNumber::new(72672)), vt);
        snd.levels = (0..num_levels)
            .map(|i| {
                let z = 1500.0 + 500.0 * i as f64;
                Level {
                    pressure: Some(850.0 * (-(z - 1500.0) / 8000.0).exp()),
                    height: Some(z),
                    temperature: Some(10.0 - 6.5 * (z - 1500.0) / 1000.0),
                    relative_humidity: Some(if i == 2 { 100.0 } else { 50.0 }),
                    ..Level::default()
                }
            })
            .collect();
        snd
    }

    fn config() -> GridConfig {
        let mut config = GridConfig::default();
        config.grid = GridSpec {
            bottom_m: 1000.0,
            top_m: 5000.0,
            step_m: 500.0,
        };
        config.qc.min_levels = 5;
        config
    }

    #[test]
    fn test_homogenize() {
        let config = config();
        let grid = AltitudeGrid::new(&config.grid).unwrap();
        let profile = homogenize(&test_sounding(6), &config, &grid).unwrap();

        assert_eq!(profile.fields.temperature.len(), grid.len());
        assert_eq!(profile.fields.temperature[0], None);
        assert_eq!(profile.fields.temperature[1], Some(10.0));
        assert_eq!(profile.fields.temperature[7], None);
        assert_eq!(profile.cloud.cloud[3], Some(true));
        assert_eq!(profile.cloud.cloud[2], Some(false));
        assert!(profile.qc.contains(QcFlags::SHALLOW_PROFILE));
        assert!(!profile.qc.contains(QcFlags::LARGE_GAP));
    }

    #[test]
    fn test_too_few_levels_rejected() {
        let config = config();
        let grid = AltitudeGrid::new(&config.grid).unwrap();
        match homogenize(&test_sounding(4), &config, &grid) {
            Err(RaobErr::NotEnoughData) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_grid_all_counts_rejects() {
        let config = config();
        let grid = AltitudeGrid::new(&config.grid).unwrap();
        let snds = vec![test_sounding(6), test_sounding(2), test_sounding(5)];
        let mut calls = 0;
        let (profiles, rejected) = grid_all(&snds, &config, &grid, || calls += 1);
        assert_eq!(calls, 3);
        assert_eq!(profiles.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0.levels.len(), 2);
    }
}
