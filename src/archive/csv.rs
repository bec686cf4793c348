//! Long format CSV files, one row per level.
use super::{indices_path, level_table_columns, TIME_FORMAT};
use crate::{
    errors::RaobErr,
    sounding::{Level, Sounding},
    station::{StationInfo, StationNumber},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs::File, path::Path};
use tracing::debug;

/// Field names match `level_table_columns`, the reader finds columns by header name.
#[derive(Debug, Serialize, Deserialize)]
struct LevelRow {
    station_number: u32,
    station_id: Option<String>,
    station_name: Option<String>,
    valid_time: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation_m: Option<f64>,
    level: usize,
    pressure_hpa: Option<f64>,
    height_m: Option<f64>,
    temperature_c: Option<f64>,
    dew_point_c: Option<f64>,
    relative_humidity_pct: Option<f64>,
    mixing_ratio_gkg: Option<f64>,
    wind_direction_deg: Option<f64>,
    wind_speed_kt: Option<f64>,
    theta_k: Option<f64>,
    theta_e_k: Option<f64>,
    theta_v_k: Option<f64>,
}

impl LevelRow {
    fn new(snd: &Sounding, level_num: usize, lvl: &Level) -> Self {
        let stn = &snd.station;

        LevelRow {
            station_number: stn.number.into(),
            station_id: stn.id.clone(),
            station_name: stn.name.clone(),
            valid_time: snd.valid_time.format(TIME_FORMAT).to_string(),
            latitude: stn.latitude,
            longitude: stn.longitude,
            elevation_m: stn.elevation,
            level: level_num,
            pressure_hpa: lvl.pressure,
            height_m: lvl.height,
            temperature_c: lvl.temperature,
            dew_point_c: lvl.dew_point,
            relative_humidity_pct: lvl.relative_humidity,
            mixing_ratio_gkg: lvl.mixing_ratio,
            wind_direction_deg: lvl.wind_direction,
            wind_speed_kt: lvl.wind_speed,
            theta_k: lvl.theta,
            theta_e_k: lvl.theta_e,
            theta_v_k: lvl.theta_v,
        }
    }

    fn level(&self) -> Level {
        Level {
            pressure: self.pressure_hpa,
            height: self.height_m,
            temperature: self.temperature_c,
            dew_point: self.dew_point_c,
            relative_humidity: self.relative_humidity_pct,
            mixing_ratio: self.mixing_ratio_gkg,
            wind_direction: self.wind_direction_deg,
            wind_speed: self.wind_speed_kt,
            theta: self.theta_k,
            theta_e: self.theta_e_k,
            theta_v: self.theta_v_k,
        }
    }

    fn station(&self) -> StationInfo {
        StationInfo {
            number: StationNumber::from(self.station_number),
            id: self.station_id.clone(),
            name: self.station_name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation_m,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexRow {
    station_number: u32,
    valid_time: String,
    index: String,
    value: f64,
}

/// Write the soundings to `path`, and their indices next to it.
pub fn write_csv(soundings: &[Sounding], path: &Path) -> Result<(), RaobErr> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(path)?);
    wtr.write_record(level_table_columns())?;
    for snd in soundings {
        for (i, lvl) in snd.levels.iter().enumerate() {
            wtr.serialize(LevelRow::new(snd, i, lvl))?;
        }
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_writer(File::create(indices_path(path, "csv"))?);
    for snd in soundings {
        let valid_time = snd.valid_time.format(TIME_FORMAT).to_string();
        for (index, &value) in &snd.indices {
            wtr.serialize(IndexRow {
                station_number: snd.station.number.into(),
                valid_time: valid_time.clone(),
                index: index.clone(),
                value,
            })?;
        }
    }
    wtr.flush()?;

    Ok(())
}

/// Read soundings back from a file written by `write_csv`.
///
/// Consecutive rows with the same station and time make up one sounding. The indices file is
/// optional.
pub fn read_csv(path: &Path) -> Result<Vec<Sounding>, RaobErr> {
    let mut rdr = csv::Reader::from_path(path)?;

    let mut soundings: Vec<Sounding> = vec![];
    for row in rdr.deserialize() {
        let row: LevelRow = row?;
        let valid_time = NaiveDateTime::parse_from_str(&row.valid_time, TIME_FORMAT)?;
        let number = StationNumber::from(row.station_number);

        let same_as_last = soundings
            .last()
            .map(|snd| snd.station.number == number && snd.valid_time == valid_time)
            .unwrap_or(false);

        if !same_as_last {
            soundings.push(Sounding::new(row.station(), valid_time));
        }

        if let Some(snd) = soundings.last_mut() {
            snd.levels.push(row.level());
        }
    }

    // Reversed so a repeated (station, time) maps to its first sounding.
    let positions: HashMap<(StationNumber, NaiveDateTime), usize> = soundings
        .iter()
        .enumerate()
        .rev()
        .map(|(i, snd)| ((snd.station.number, snd.valid_time), i))
        .collect();

    let idx_path = indices_path(path, "csv");
    if idx_path.exists() {
        let mut rdr = csv::Reader::from_path(&idx_path)?;
        for row in rdr.deserialize() {
            let row: IndexRow = row?;
            let valid_time = NaiveDateTime::parse_from_str(&row.valid_time, TIME_FORMAT)?;
            let number = StationNumber::from(row.station_number);

            if let Some(&i) = positions.get(&(number, valid_time)) {
                soundings[i].indices.insert(row.index, row.value);
            }
        }
    } else {
        debug!("no indices file at {}", idx_path.display());
    }

    Ok(soundings)
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::sounding::SoundingIndex;
    use chrono::NaiveDate;
    use std::fs;

    fn snd(stn: u32, hour: u32, temps: &[f64], cape: f64) -> Sounding {
        let vt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();

        let mut info = StationInfo::new(StationNumber::new(stn));
        info.id = Some("RIW".to_owned());
        info.latitude = Some(43.06);

        let mut snd = Sounding::new(info, vt);
        snd.levels = temps
            .iter()
            .enumerate()
            .map(|(i, &t)| Level {
                pressure: Some(1000.0 - 100.0 * i as f64),
                temperature: Some(t),
                ..Level::default()
            })
            .collect();
        snd.indices
            .insert("Convective Available Potential Energy".to_owned(), cape);
        snd
    }

    #[test]
    fn test_header_is_the_level_table_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snd.csv");
        write_csv(&[snd(72672, 0, &[5.0], 0.0)], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), level_table_columns().join(","));

        // Missing values are empty fields.
        let row = lines.next().unwrap();
        assert!(row.starts_with("72672,RIW,,2020-01-01 00:00:00,43.06,,,0,1000.0,,5.0,"));
    }

    #[test]
    fn test_read_back_several_soundings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snd.csv");
        let written = vec![
            snd(72672, 0, &[5.0, 1.0, -4.0], 10.0),
            snd(72672, 12, &[8.0, 2.0], 250.0),
            snd(72476, 0, &[-1.0], 0.0),
        ];
        write_csv(&written, &path).unwrap();
        assert!(dir.path().join("snd_indices.csv").exists());

        let read = read_csv(&path).unwrap();
        assert_eq!(read, written);
        assert_eq!(read[1].levels.len(), 2);
        assert_eq!(read[1].index(SoundingIndex::Cape), Some(250.0));
    }

    #[test]
    fn test_indices_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snd.csv");
        write_csv(&[snd(72672, 0, &[5.0, 1.0], 10.0)], &path).unwrap();
        fs::remove_file(dir.path().join("snd_indices.csv")).unwrap();

        let read = read_csv(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].levels.len(), 2);
        assert!(read[0].indices.is_empty());
    }
}
