//! NetCDF output with a (sounding, level) layout, padded with fill values.
use crate::{
    errors::RaobErr,
    sounding::{LevelColumn, Sounding, SoundingIndex},
};
use chrono::Utc;
use ndarray::{Array1, Array2};
use std::{fs, path::Path};
use strum::IntoEnumIterator;

/// Fill value for missing data, the netCDF default for floats.
pub const FILL_VALUE_F32: f32 = 9.969_209_968_386_869e36;
/// Fill value for missing data, the netCDF default for doubles.
pub const FILL_VALUE_F64: f64 = 9.969_209_968_386_869e36;

/// Write all the soundings to one file. Soundings with fewer levels than the longest are padded.
pub fn write_netcdf(soundings: &[Sounding], path: &Path) -> Result<(), RaobErr> {
    if path.exists() {
        fs::remove_file(path)?;
    }

    let num_soundings = soundings.len();
    let max_levels = soundings
        .iter()
        .map(|snd| snd.levels.len())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut file = ::netcdf::create(path)?;
    file.add_dimension("sounding", num_soundings)?;
    file.add_dimension("level", max_levels)?;

    file.add_attribute("title", "Radiosonde soundings")?;
    file.add_attribute("source", "University of Wyoming upper air archive")?;
    file.add_attribute(
        "history",
        format!("Created by raobkit on {}", Utc::now().to_rfc3339()),
    )?;
    file.add_attribute(
        "station_labels",
        soundings
            .iter()
            .map(|snd| snd.station.label())
            .collect::<Vec<String>>()
            .join(","),
    )?;

    {
        let times: Vec<i64> = soundings
            .iter()
            .map(|snd| snd.valid_time.and_utc().timestamp())
            .collect();
        let mut var = file.add_variable::<i64>("time", &["sounding"])?;
        var.put_attribute("standard_name", "time")?;
        var.put_attribute("long_name", "nominal launch time")?;
        var.put_attribute("units", "seconds since 1970-01-01 00:00:00")?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&times, ..)?;
    }

    {
        let numbers: Vec<i32> = soundings
            .iter()
            .map(|snd| i32::from(snd.station.number))
            .collect();
        let mut var = file.add_variable::<i32>("station_number", &["sounding"])?;
        var.put_attribute("long_name", "WMO block and station number")?;
        var.put_values(&numbers, ..)?;
    }

    {
        let counts: Vec<i32> = soundings
            .iter()
            .map(|snd| snd.levels.len() as i32)
            .collect();
        let mut var = file.add_variable::<i32>("num_levels", &["sounding"])?;
        var.put_attribute("long_name", "number of valid entries along the level dimension")?;
        var.put_values(&counts, ..)?;
    }

    let station_vars: [(&str, &str, &str, fn(&Sounding) -> Option<f64>); 3] = [
        ("latitude", "station latitude", "degrees_north", |snd| {
            snd.station.latitude
        }),
        ("longitude", "station longitude", "degrees_east", |snd| {
            snd.station.longitude
        }),
        ("elevation", "station elevation", "m", |snd| {
            snd.station.elevation
        }),
    ];
    for &(name, long_name, units, getter) in &station_vars {
        let vals: Vec<f64> = soundings
            .iter()
            .map(|snd| getter(snd).unwrap_or(FILL_VALUE_F64))
            .collect();
        let mut var = file.add_variable::<f64>(name, &["sounding"])?;
        var.put_attribute("_FillValue", FILL_VALUE_F64)?;
        var.put_attribute("long_name", long_name)?;
        var.put_attribute("units", units)?;
        var.put_values(&vals, ..)?;
    }

    for col in LevelColumn::iter() {
        let mut data = Array2::<f32>::from_elem((num_soundings, max_levels), FILL_VALUE_F32);
        for (i, snd) in soundings.iter().enumerate() {
            for (j, lvl) in snd.levels.iter().enumerate() {
                if let Some(val) = lvl.get(col) {
                    data[[i, j]] = val as f32;
                }
            }
        }

        let mut var = file.add_variable::<f32>(col.file_name(), &["sounding", "level"])?;
        var.put_attribute("_FillValue", FILL_VALUE_F32)?;
        var.put_attribute("long_name", col.long_name())?;
        var.put_attribute("units", col.units())?;
        var.put(data.view(), ..)?;
    }

    for idx in SoundingIndex::iter() {
        let data: Array1<f32> = soundings
            .iter()
            .map(|snd| snd.index(idx).map(|v| v as f32).unwrap_or(FILL_VALUE_F32))
            .collect();

        let mut var = file.add_variable::<f32>(idx.file_name(), &["sounding"])?;
        var.put_attribute("_FillValue", FILL_VALUE_F32)?;
        var.put_attribute("long_name", idx.as_ref())?;
        var.put_attribute("units", idx.units())?;
        var.put(data.view(), ..)?;
    }

    Ok(())
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::{
        sounding::Level,
        station::{StationInfo, StationNumber},
    };
    use chrono::NaiveDate;

    #[test]
    fn test_write_netcdf() {
        let vt = NaiveDate::from_ymd_opt(2021, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut short = Sounding::new(StationInfo::new(StationNumber::new(72476)), vt);
        short.levels = vec![Level {
            pressure: Some(850.0),
            temperature: Some(10.0),
            ..Level::default()
        }];
        let mut long = short.clone();
        long.station.number = StationNumber::new(72672);
        long.levels.push(Level {
            pressure: Some(700.0),
            ..Level::default()
        });
        long.indices
            .insert(SoundingIndex::Cape.as_ref().to_owned(), 150.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soundings.nc");
        write_netcdf(&[short, long], &path).unwrap();

        let file = ::netcdf::open(&path).unwrap();
        assert_eq!(file.dimension("sounding").unwrap().len(), 2);
        assert_eq!(file.dimension("level").unwrap().len(), 2);

        let pres = file.variable("pressure").unwrap();
        let vals: Vec<f32> = pres.get_values(..).unwrap();
        assert_eq!(vals, vec![850.0, FILL_VALUE_F32, 850.0, 700.0]);

        let cape: Vec<f32> = file.variable("cape").unwrap().get_values(..).unwrap();
        assert_eq!(cape, vec![FILL_VALUE_F32, 150.0]);
    }
}
