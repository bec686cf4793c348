//! The in memory record for a single radiosonde sounding.
use crate::station::StationInfo;
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Quantity};
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// One row of the sounding table.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Level {
    pub pressure: Option<f64>,          // hPa
    pub height: Option<f64>,            // m above MSL
    pub temperature: Option<f64>,       // C
    pub dew_point: Option<f64>,         // C
    pub relative_humidity: Option<f64>, // %
    pub mixing_ratio: Option<f64>,      // g/kg
    pub wind_direction: Option<f64>,    // degrees
    pub wind_speed: Option<f64>,        // knots
    pub theta: Option<f64>,             // K
    pub theta_e: Option<f64>,           // K
    pub theta_v: Option<f64>,           // K
}

/// The columns of the archive's sounding table.
///
/// The strum names are the column headers the archive uses, so `LevelColumn::from_str("HGHT")`
/// works directly on the scraped header row.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
pub enum LevelColumn {
    #[strum(serialize = "PRES")]
    Pressure,
    #[strum(serialize = "HGHT")]
    Height,
    #[strum(serialize = "TEMP")]
    Temperature,
    #[strum(serialize = "DWPT")]
    DewPoint,
    #[strum(serialize = "RELH")]
    RelativeHumidity,
    #[strum(serialize = "MIXR")]
    MixingRatio,
    #[strum(serialize = "DRCT")]
    WindDirection,
    #[strum(serialize = "SKNT")]
    WindSpeed,
    #[strum(serialize = "THTA")]
    Theta,
    #[strum(serialize = "THTE")]
    ThetaE,
    #[strum(serialize = "THTV")]
    ThetaV,
}

impl LevelColumn {
    /// Variable name used for this column in NetCDF files.
    pub fn file_name(self) -> &'static str {
        use LevelColumn::*;

        match self {
            Pressure => "pressure",
            Height => "height",
            Temperature => "temperature",
            DewPoint => "dew_point",
            RelativeHumidity => "relative_humidity",
            MixingRatio => "mixing_ratio",
            WindDirection => "wind_direction",
            WindSpeed => "wind_speed",
            Theta => "theta",
            ThetaE => "theta_e",
            ThetaV => "theta_v",
        }
    }

    /// Units as a udunits compatible string.
    pub fn units(self) -> &'static str {
        use LevelColumn::*;

        match self {
            Pressure => "hPa",
            Height => "m",
            Temperature | DewPoint => "degC",
            RelativeHumidity => "%",
            MixingRatio => "g/kg",
            WindDirection => "degree",
            WindSpeed => "knot",
            Theta | ThetaE | ThetaV => "K",
        }
    }

    /// A human readable description.
    pub fn long_name(self) -> &'static str {
        use LevelColumn::*;

        match self {
            Pressure => "air pressure",
            Height => "geopotential height above mean sea level",
            Temperature => "air temperature",
            DewPoint => "dew point temperature",
            RelativeHumidity => "relative humidity",
            MixingRatio => "water vapor mixing ratio",
            WindDirection => "wind from direction",
            WindSpeed => "wind speed",
            Theta => "potential temperature",
            ThetaE => "equivalent potential temperature",
            ThetaV => "virtual potential temperature",
        }
    }
}

impl Level {
    /// Get the value of a column.
    pub fn get(&self, col: LevelColumn) -> Option<f64> {
        use LevelColumn::*;

        match col {
            Pressure => self.pressure,
            Height => self.height,
            Temperature => self.temperature,
            DewPoint => self.dew_point,
            RelativeHumidity => self.relative_humidity,
            MixingRatio => self.mixing_ratio,
            WindDirection => self.wind_direction,
            WindSpeed => self.wind_speed,
            Theta => self.theta,
            ThetaE => self.theta_e,
            ThetaV => self.theta_v,
        }
    }

    /// Set the value of a column.
    pub fn set(&mut self, col: LevelColumn, val: Option<f64>) {
        use LevelColumn::*;

        let slot = match col {
            Pressure => &mut self.pressure,
            Height => &mut self.height,
            Temperature => &mut self.temperature,
            DewPoint => &mut self.dew_point,
            RelativeHumidity => &mut self.relative_humidity,
            MixingRatio => &mut self.mixing_ratio,
            WindDirection => &mut self.wind_direction,
            WindSpeed => &mut self.wind_speed,
            Theta => &mut self.theta,
            ThetaE => &mut self.theta_e,
            ThetaV => &mut self.theta_v,
        };

        *slot = val;
    }

    /// Relative humidity, falling back to a value computed from temperature and dew point.
    pub fn humidity(&self) -> Option<f64> {
        self.relative_humidity.or_else(|| {
            let t = self.temperature?;
            let dp = self.dew_point?;
            metfor::rh(Celsius(t), Celsius(dp)).map(|rh| (rh * 100.0).min(100.0))
        })
    }

    /// Has everything needed for the vertical profile: height, pressure, temperature, humidity.
    pub fn is_usable(&self) -> bool {
        self.height.is_some()
            && self.pressure.is_some()
            && self.temperature.is_some()
            && self.humidity().is_some()
    }
}

/// Well known entries of the "Station information and sounding indices" block.
///
/// The strum names are the labels used by the archive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
pub enum SoundingIndex {
    #[strum(serialize = "Showalter index")]
    Showalter,
    #[strum(serialize = "Lifted index")]
    LiftedIndex,
    #[strum(serialize = "SWEAT index")]
    Sweat,
    #[strum(serialize = "K index")]
    KIndex,
    #[strum(serialize = "Totals totals index")]
    TotalTotals,
    #[strum(serialize = "Convective Available Potential Energy")]
    Cape,
    #[strum(serialize = "Convective Inhibition")]
    Cin,
    #[strum(serialize = "Bulk Richardson Number")]
    BulkRichardson,
    #[strum(serialize = "Temp [K] of the Lifted Condensation Level")]
    LclTemperature,
    #[strum(serialize = "Pres [hPa] of the Lifted Condensation Level")]
    LclPressure,
    #[strum(serialize = "Mean mixed layer potential temperature")]
    MixedLayerTheta,
    #[strum(serialize = "Mean mixed layer mixing ratio")]
    MixedLayerMixingRatio,
    #[strum(serialize = "1000 hPa to 500 hPa thickness")]
    Thickness,
    #[strum(serialize = "Precipitable water [mm] for entire sounding")]
    PrecipitableWater,
}

impl SoundingIndex {
    /// Variable name used in files we write.
    pub fn file_name(self) -> &'static str {
        use SoundingIndex::*;

        match self {
            Showalter => "showalter",
            LiftedIndex => "lifted_index",
            Sweat => "sweat",
            KIndex => "k_index",
            TotalTotals => "total_totals",
            Cape => "cape",
            Cin => "cin",
            BulkRichardson => "bulk_richardson",
            LclTemperature => "lcl_temperature",
            LclPressure => "lcl_pressure",
            MixedLayerTheta => "mixed_layer_theta",
            MixedLayerMixingRatio => "mixed_layer_mixing_ratio",
            Thickness => "thickness_1000_500",
            PrecipitableWater => "precipitable_water",
        }
    }

    /// Units as a udunits compatible string.
    pub fn units(self) -> &'static str {
        use SoundingIndex::*;

        match self {
            Showalter | LiftedIndex | KIndex => "K",
            Sweat | TotalTotals | BulkRichardson => "1",
            Cape | Cin => "J/kg",
            LclTemperature | MixedLayerTheta => "K",
            LclPressure => "hPa",
            MixedLayerMixingRatio => "g/kg",
            Thickness => "m",
            PrecipitableWater => "mm",
        }
    }
}

/// A single sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Sounding {
    /// Station that launched it.
    pub station: StationInfo,
    /// Nominal observation time, UTC.
    pub valid_time: NaiveDateTime,
    /// Table rows in archive order, surface first.
    pub levels: Vec<Level>,
    /// Everything numeric in the station information block that is not station metadata.
    pub indices: BTreeMap<String, f64>,
}

impl Sounding {
    /// Create an empty sounding.
    pub fn new(station: StationInfo, valid_time: NaiveDateTime) -> Self {
        Sounding {
            station,
            valid_time,
            levels: vec![],
            indices: BTreeMap::new(),
        }
    }

    /// Levels with height, pressure, temperature and humidity.
    pub fn usable_levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter().filter(|lvl| lvl.is_usable())
    }

    /// Compute relative humidity and potential temperature where the archive left them blank.
    pub fn fill_derived(&mut self) {
        for lvl in self.levels.iter_mut() {
            if lvl.relative_humidity.is_none() {
                lvl.relative_humidity = lvl.humidity();
            }

            if lvl.theta.is_none() {
                if let (Some(p), Some(t)) = (lvl.pressure, lvl.temperature) {
                    lvl.theta = Some(metfor::theta(HectoPascal(p), Celsius(t)).unpack());
                }
            }
        }
    }

    /// Typed access to a well known index.
    pub fn index(&self, idx: SoundingIndex) -> Option<f64> {
        self.indices.get(idx.as_ref()).cloned()
    }

    /// Lowest level with a height.
    pub fn surface(&self) -> Option<&Level> {
        self.levels.iter().find(|lvl| lvl.height.is_some())
    }

    /// Highest level with a height.
    pub fn top(&self) -> Option<&Level> {
        self.levels.iter().rev().find(|lvl| lvl.height.is_some())
    }
}
