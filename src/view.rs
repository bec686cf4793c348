//! Data for the terminal sounding viewer.
//!
//! Each panel is a set of line series of a value against height, ready for a text plot.
use crate::sounding::{LevelColumn, Sounding};
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// The plots the viewer can draw.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Panel {
    Temperature,
    Humidity,
    Wind,
    Theta,
}

impl Panel {
    /// The level columns drawn on this panel.
    pub fn columns(self) -> &'static [LevelColumn] {
        use LevelColumn::*;

        match self {
            Panel::Temperature => &[Temperature, DewPoint],
            Panel::Humidity => &[RelativeHumidity],
            Panel::Wind => &[WindSpeed],
            Panel::Theta => &[Theta, ThetaE],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Temperature => "Temperature and dew point (C) vs height (km)",
            Panel::Humidity => "Relative humidity (%) vs height (km)",
            Panel::Wind => "Wind speed (kt) vs height (km)",
            Panel::Theta => "Potential and equivalent potential temperature (K) vs height (km)",
        }
    }
}

/// One line on a panel, points are (height in km, value).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub column: LevelColumn,
    pub points: Vec<(f32, f32)>,
}

/// The non-empty series for `panel`, each sorted by height.
pub fn panel_series(snd: &Sounding, panel: Panel) -> Vec<Series> {
    panel
        .columns()
        .iter()
        .map(|&column| {
            let mut points: Vec<(f32, f32)> = snd
                .levels
                .iter()
                .filter_map(|lvl| {
                    let z = lvl.height?;
                    let val = lvl.get(column)?;
                    Some(((z / 1000.0) as f32, val as f32))
                })
                .collect();
            points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            Series { column, points }
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Smallest and largest height over all the series, padded when they are equal so a chart
/// always has a non-empty x range.
pub fn height_range(series: &[Series]) -> Option<(f32, f32)> {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .fold(None, |acc: Option<(f32, f32)>, z| match acc {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })?;

    if hi > lo {
        Some((lo, hi))
    } else {
        Some((lo - 0.5, hi + 0.5))
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::{
        sounding::Level,
        station::{StationInfo, StationNumber},
    };
    use chrono::NaiveDate;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn sounding() -> Sounding {
        let vt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut snd = Sounding::new(StationInfo::new(StationNumber::new(72672)), vt);
        snd.levels = vec![
            Level {
                height: Some(3000.0),
                temperature: Some(-5.0),
                wind_speed: Some(30.0),
                ..Level::default()
            },
            Level {
                height: Some(1500.0),
                temperature: Some(5.0),
                dew_point: Some(1.0),
                ..Level::default()
            },
            Level {
                temperature: Some(0.0),
                ..Level::default()
            },
        ];
        snd
    }

    #[test]
    fn test_panel_names() {
        assert_eq!(Panel::from_str("wind").unwrap(), Panel::Wind);
        assert!(Panel::from_str("clouds").is_err());
        assert_eq!(Panel::iter().count(), 4);
        assert_eq!(Panel::Theta.as_ref(), "theta");
    }

    #[test]
    fn test_temperature_series() {
        let series = panel_series(&sounding(), Panel::Temperature);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].column, LevelColumn::Temperature);
        assert_eq!(series[0].points, vec![(1.5, 5.0), (3.0, -5.0)]);
        assert_eq!(series[1].points, vec![(1.5, 1.0)]);
    }

    #[test]
    fn test_empty_panels() {
        assert!(panel_series(&sounding(), Panel::Humidity).is_empty());
        assert!(panel_series(&sounding(), Panel::Theta).is_empty());
        assert_eq!(height_range(&[]), None);
    }

    #[test]
    fn test_height_range() {
        let series = panel_series(&sounding(), Panel::Temperature);
        assert_eq!(height_range(&series), Some((1.5, 3.0)));

        let series = panel_series(&sounding(), Panel::Wind);
        assert_eq!(height_range(&series), Some((2.5, 3.5)));
    }
}
