//! Persisting collections of soundings.
//!
//! Three formats are supported: a long format CSV table (with a sibling indices table), the
//! same tables as Parquet, and a NetCDF file with a (sounding, level) layout. Only CSV can be
//! read back, it is the format the other tools work from.
use crate::{
    errors::RaobErr,
    sounding::{LevelColumn, Sounding},
};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

mod csv;
mod netcdf;
mod parquet;

pub use self::csv::{read_csv, write_csv};
pub use self::netcdf::{write_netcdf, FILL_VALUE_F32, FILL_VALUE_F64};
pub use self::parquet::write_parquet;

/// Format for times in the tabular outputs.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns that lead every row of the level table, identifying the sounding and the level.
pub(crate) const ROW_KEY_COLUMNS: [&str; 8] = [
    "station_number",
    "station_id",
    "station_name",
    "valid_time",
    "latitude",
    "longitude",
    "elevation_m",
    "level",
];

/// Name of a level column in the CSV and Parquet level tables.
pub(crate) fn level_column_name(col: LevelColumn) -> &'static str {
    use LevelColumn::*;

    match col {
        Pressure => "pressure_hpa",
        Height => "height_m",
        Temperature => "temperature_c",
        DewPoint => "dew_point_c",
        RelativeHumidity => "relative_humidity_pct",
        MixingRatio => "mixing_ratio_gkg",
        WindDirection => "wind_direction_deg",
        WindSpeed => "wind_speed_kt",
        Theta => "theta_k",
        ThetaE => "theta_e_k",
        ThetaV => "theta_v_k",
    }
}

/// Header of the level table, shared by the CSV and Parquet writers.
pub(crate) fn level_table_columns() -> Vec<&'static str> {
    ROW_KEY_COLUMNS
        .iter()
        .cloned()
        .chain(LevelColumn::iter().map(level_column_name))
        .collect()
}

/// Output file formats.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    #[strum(serialize = "netcdf", serialize = "nc")]
    NetCdf,
}

impl OutputFormat {
    /// File name extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::NetCdf => "nc",
        }
    }

    /// Path for a file named `stem` in `dir` with this format's extension.
    pub fn path_in(self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{}.{}", stem, self.extension()))
    }
}

/// Write the soundings to `path` in the given format.
pub fn write_soundings(
    format: OutputFormat,
    soundings: &[Sounding],
    path: &Path,
) -> Result<(), RaobErr> {
    if soundings.is_empty() {
        return Err(RaobErr::NotEnoughData);
    }

    match format {
        OutputFormat::Csv => write_csv(soundings, path),
        OutputFormat::Parquet => write_parquet(soundings, path),
        OutputFormat::NetCdf => write_netcdf(soundings, path),
    }
}

/// Sort by station then time, and keep only the first of any duplicates.
pub fn sort_and_dedup(soundings: &mut Vec<Sounding>) {
    soundings.sort_by(|a, b| {
        (a.station.number, a.valid_time).cmp(&(b.station.number, b.valid_time))
    });
    soundings
        .dedup_by(|b, a| a.station.number == b.station.number && a.valid_time == b.valid_time);
}

/// The path of the indices table that goes with the level table at `path`.
pub(crate) fn indices_path(path: &Path, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!("{}_indices.{}", stem, extension))
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::station::{StationInfo, StationNumber};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn snd(stn: u32, day: u32, nlevels: usize) -> Sounding {
        let vt = NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut snd = Sounding::new(StationInfo::new(StationNumber::new(stn)), vt);
        snd.levels = vec![Default::default(); nlevels];
        snd
    }

    #[test]
    fn test_sort_and_dedup() {
        let mut snds = vec![
            snd(72672, 2, 1),
            snd(72672, 1, 2),
            snd(72476, 3, 1),
            snd(72672, 1, 3),
        ];
        sort_and_dedup(&mut snds);

        let keys: Vec<(u32, u32)> = snds
            .iter()
            .map(|s| {
                use chrono::Datelike;
                (s.station.number.into(), s.valid_time.day())
            })
            .collect();
        assert_eq!(keys, vec![(72476, 3), (72672, 1), (72672, 2)]);
        // Stable sort, the first duplicate wins.
        assert_eq!(snds[1].levels.len(), 2);
    }

    #[test]
    fn test_level_table_columns() {
        let cols = level_table_columns();
        assert_eq!(cols.len(), 19);
        assert_eq!(cols[2], "station_name");
        assert_eq!(cols[8], "pressure_hpa");
        assert_eq!(cols[18], "theta_v_k");
    }

    #[test]
    fn test_indices_path() {
        assert_eq!(
            indices_path(Path::new("/tmp/out/soundings.csv"), "csv"),
            PathBuf::from("/tmp/out/soundings_indices.csv")
        );
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_str("nc").unwrap(), OutputFormat::NetCdf);
        assert_eq!(OutputFormat::from_str("netcdf").unwrap(), OutputFormat::NetCdf);
        assert_eq!(OutputFormat::from_str("parquet").unwrap(), OutputFormat::Parquet);
        assert_eq!(
            OutputFormat::Csv.path_in(Path::new("/data"), "riw"),
            PathBuf::from("/data/riw.csv")
        );
    }

    #[test]
    fn test_write_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = OutputFormat::Csv.path_in(dir.path(), "empty");
        assert!(write_soundings(OutputFormat::Csv, &[], &path).is_err());
        assert!(!path.exists());
    }
}
