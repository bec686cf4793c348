//! Parquet tables with the same layout as the CSV files.
use super::{indices_path, level_table_columns, TIME_FORMAT};
use crate::{errors::RaobErr, sounding::LevelColumn, sounding::Sounding};
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use std::{fs::File, path::Path};
use strum::IntoEnumIterator;

/// Write the level table to `path` and the indices table next to it.
pub fn write_parquet(soundings: &[Sounding], path: &Path) -> Result<(), RaobErr> {
    let mut levels = level_frame(soundings)?;
    ParquetWriter::new(File::create(path)?).finish(&mut levels)?;

    let mut indices = index_frame(soundings)?;
    ParquetWriter::new(File::create(indices_path(path, "parquet"))?).finish(&mut indices)?;

    Ok(())
}

fn level_frame(soundings: &[Sounding]) -> Result<DataFrame, RaobErr> {
    let num_rows: usize = soundings.iter().map(|snd| snd.levels.len()).sum();

    let mut station_number: Vec<u32> = Vec::with_capacity(num_rows);
    let mut station_id: Vec<Option<String>> = Vec::with_capacity(num_rows);
    let mut station_name: Vec<Option<String>> = Vec::with_capacity(num_rows);
    let mut valid_time: Vec<String> = Vec::with_capacity(num_rows);
    let mut epoch_seconds: Vec<i64> = Vec::with_capacity(num_rows);
    let mut latitude: Vec<Option<f64>> = Vec::with_capacity(num_rows);
    let mut longitude: Vec<Option<f64>> = Vec::with_capacity(num_rows);
    let mut elevation: Vec<Option<f64>> = Vec::with_capacity(num_rows);
    let mut level: Vec<u32> = Vec::with_capacity(num_rows);
    let mut values: Vec<Vec<Option<f64>>> = LevelColumn::iter()
        .map(|_| Vec::with_capacity(num_rows))
        .collect();

    for snd in soundings {
        let vt_str = snd.valid_time.format(TIME_FORMAT).to_string();
        let vt_secs = snd.valid_time.and_utc().timestamp();

        for (i, lvl) in snd.levels.iter().enumerate() {
            station_number.push(snd.station.number.into());
            station_id.push(snd.station.id.clone());
            station_name.push(snd.station.name.clone());
            valid_time.push(vt_str.clone());
            epoch_seconds.push(vt_secs);
            latitude.push(snd.station.latitude);
            longitude.push(snd.station.longitude);
            elevation.push(snd.station.elevation);
            level.push(i as u32);

            for (col, vals) in LevelColumn::iter().zip(values.iter_mut()) {
                vals.push(lvl.get(col));
            }
        }
    }

    // Same order as the CSV level table.
    let key_columns = vec![
        Series::new("", station_number),
        Series::new("", station_id),
        Series::new("", station_name),
        Series::new("", valid_time),
        Series::new("", latitude),
        Series::new("", longitude),
        Series::new("", elevation),
        Series::new("", level),
    ];
    let level_columns = values.into_iter().map(|vals| Series::new("", vals));

    let mut columns: Vec<Series> = key_columns
        .into_iter()
        .chain(level_columns)
        .zip(level_table_columns())
        .map(|(mut series, name)| {
            series.rename(name);
            series
        })
        .collect();
    columns.push(Series::new("epoch_seconds", epoch_seconds));

    Ok(DataFrame::new(columns)?)
}

fn index_frame(soundings: &[Sounding]) -> Result<DataFrame, RaobErr> {
    let mut station_number: Vec<u32> = vec![];
    let mut valid_time: Vec<String> = vec![];
    let mut index: Vec<String> = vec![];
    let mut value: Vec<f64> = vec![];

    for snd in soundings {
        let vt_str = snd.valid_time.format(TIME_FORMAT).to_string();
        for (name, &val) in &snd.indices {
            station_number.push(snd.station.number.into());
            valid_time.push(vt_str.clone());
            index.push(name.clone());
            value.push(val);
        }
    }

    Ok(DataFrame::new(vec![
        Series::new("station_number", station_number),
        Series::new("valid_time", valid_time),
        Series::new("index", index),
        Series::new("value", value),
    ])?)
}
