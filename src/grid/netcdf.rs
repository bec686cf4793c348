//! NetCDF output for gridded profiles, a (profile, altitude) layout.
use super::{GriddedProfile, QcFlags};
use crate::{
    archive::{FILL_VALUE_F32, FILL_VALUE_F64},
    errors::RaobErr,
};
use chrono::Utc;
use ndarray::Array2;
use std::{fs, path::Path};

const CLOUD_MASK_FILL: u8 = 255;

/// Write the profiles and their grid to `path`, replacing any existing file.
pub fn write_gridded_netcdf(
    profiles: &[GriddedProfile],
    altitudes: &[f64],
    path: &Path,
) -> Result<(), RaobErr> {
    if path.exists() {
        fs::remove_file(path)?;
    }

    let num_profiles = profiles.len();
    let num_alts = altitudes.len();

    let mut file = ::netcdf::create(path)?;
    file.add_dimension("profile", num_profiles)?;
    file.add_dimension("altitude", num_alts)?;

    file.add_attribute("title", "Radiosonde profiles on a fixed altitude grid")?;
    file.add_attribute("source", "University of Wyoming upper air archive")?;
    file.add_attribute(
        "history",
        format!("Created by raobgrid on {}", Utc::now().to_rfc3339()),
    )?;
    file.add_attribute(
        "station_labels",
        profiles
            .iter()
            .map(|p| p.station.label())
            .collect::<Vec<String>>()
            .join(","),
    )?;

    {
        let mut var = file.add_variable::<f64>("altitude", &["altitude"])?;
        var.put_attribute("long_name", "altitude above mean sea level")?;
        var.put_attribute("units", "m")?;
        var.put_attribute("positive", "up")?;
        var.put_values(altitudes, ..)?;
    }

    {
        let times: Vec<i64> = profiles
            .iter()
            .map(|p| p.valid_time.and_utc().timestamp())
            .collect();
        let mut var = file.add_variable::<i64>("time", &["profile"])?;
        var.put_attribute("standard_name", "time")?;
        var.put_attribute("units", "seconds since 1970-01-01 00:00:00")?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&times, ..)?;
    }

    {
        let numbers: Vec<i32> = profiles
            .iter()
            .map(|p| i32::from(p.station.number))
            .collect();
        let mut var = file.add_variable::<i32>("station_number", &["profile"])?;
        var.put_attribute("long_name", "WMO block and station number")?;
        var.put_values(&numbers, ..)?;
    }

    let station_vars: [(&str, &str, fn(&GriddedProfile) -> Option<f64>); 3] = [
        ("latitude", "degrees_north", |p| p.station.latitude),
        ("longitude", "degrees_east", |p| p.station.longitude),
        ("elevation", "m", |p| p.station.elevation),
    ];
    for &(name, units, getter) in &station_vars {
        let vals: Vec<f64> = profiles
            .iter()
            .map(|p| getter(p).unwrap_or(FILL_VALUE_F64))
            .collect();
        let mut var = file.add_variable::<f64>(name, &["profile"])?;
        var.put_attribute("_FillValue", FILL_VALUE_F64)?;
        var.put_attribute("units", units)?;
        var.put_values(&vals, ..)?;
    }

    {
        let flags: Vec<u8> = profiles.iter().map(|p| p.qc.bits()).collect();
        let masks: Vec<u8> = QcFlags::ALL.iter().map(|(f, _)| f.bits()).collect();
        let meanings: Vec<&str> = QcFlags::ALL.iter().map(|&(_, name)| name).collect();

        let mut var = file.add_variable::<u8>("qc_flags", &["profile"])?;
        var.put_attribute("long_name", "profile quality flags")?;
        var.put_attribute("flag_masks", masks)?;
        var.put_attribute("flag_meanings", meanings.join(" "))?;
        var.put_values(&flags, ..)?;
    }

    let fields: [(&str, &str, &str, fn(&GriddedProfile) -> &[Option<f64>]); 8] = [
        ("pressure", "air pressure", "hPa", |p| p.fields.pressure.as_slice()),
        ("temperature", "air temperature", "degC", |p| {
            p.fields.temperature.as_slice()
        }),
        ("dew_point", "dew point temperature", "degC", |p| {
            p.fields.dew_point.as_slice()
        }),
        ("relative_humidity", "relative humidity", "%", |p| {
            p.fields.relative_humidity.as_slice()
        }),
        ("lwc", "cloud liquid water content", "g m-3", |p| p.cloud.lwc.as_slice()),
        ("iwc", "cloud ice water content", "g m-3", |p| p.cloud.iwc.as_slice()),
        ("rwc", "rain water content", "g m-3", |p| p.cloud.rwc.as_slice()),
        ("swc", "snow water content", "g m-3", |p| p.cloud.swc.as_slice()),
    ];
    for &(name, long_name, units, getter) in &fields {
        let mut data = Array2::<f32>::from_elem((num_profiles, num_alts), FILL_VALUE_F32);
        for (i, profile) in profiles.iter().enumerate() {
            for (j, val) in getter(profile).iter().enumerate().take(num_alts) {
                if let Some(val) = val {
                    data[[i, j]] = *val as f32;
                }
            }
        }

        let mut var = file.add_variable::<f32>(name, &["profile", "altitude"])?;
        var.put_attribute("_FillValue", FILL_VALUE_F32)?;
        var.put_attribute("long_name", long_name)?;
        var.put_attribute("units", units)?;
        var.put(data.view(), ..)?;
    }

    {
        let mut data = Array2::<u8>::from_elem((num_profiles, num_alts), CLOUD_MASK_FILL);
        for (i, profile) in profiles.iter().enumerate() {
            for (j, val) in profile.cloud.cloud.iter().enumerate().take(num_alts) {
                if let Some(cloudy) = val {
                    data[[i, j]] = *cloudy as u8;
                }
            }
        }

        let mut var = file.add_variable::<u8>("cloud_mask", &["profile", "altitude"])?;
        var.put_attribute("_FillValue", CLOUD_MASK_FILL)?;
        var.put_attribute("long_name", "diagnosed cloud")?;
        var.put_attribute("flag_values", vec![0u8, 1u8])?;
        var.put_attribute("flag_meanings", "clear cloudy")?;
        var.put(data.view(), ..)?;
    }

    Ok(())
}
