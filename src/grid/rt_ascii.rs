//! Plain text profiles for radiative transfer models.
use super::GriddedProfile;
use crate::errors::RaobErr;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const COLUMNS: &str = concat!(
    "#  z[km]     p[hPa]     T[K]    RH[%]",
    "    LWC[g/m3]    IWC[g/m3]    RWC[g/m3]    SWC[g/m3]"
);

/// Write every profile to `path`, replacing any existing file.
pub fn write_rt_ascii_file(
    profiles: &[GriddedProfile],
    altitudes: &[f64],
    path: &Path,
) -> Result<(), RaobErr> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_rt_ascii(&mut writer, profiles, altitudes)?;
    writer.flush()?;
    Ok(())
}

/// Write one block per profile. Grid levels missing pressure, temperature or humidity are
/// skipped.
pub fn write_rt_ascii<W: Write>(
    out: &mut W,
    profiles: &[GriddedProfile],
    altitudes: &[f64],
) -> Result<(), RaobErr> {
    for (i, profile) in profiles.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write_block(out, profile, altitudes)?;
    }

    Ok(())
}

fn write_block<W: Write>(
    out: &mut W,
    profile: &GriddedProfile,
    altitudes: &[f64],
) -> Result<(), RaobErr> {
    let fields = &profile.fields;
    let cloud = &profile.cloud;

    let rows: Vec<(usize, f64, f64, f64)> = (0..altitudes.len())
        .filter_map(|i| {
            Some((
                i,
                fields.pressure[i]?,
                fields.temperature[i]?,
                fields.relative_humidity[i]?,
            ))
        })
        .collect();

    let stn = &profile.station;
    writeln!(
        out,
        "# station {} valid {} lat {} lon {} elev {} qc {}",
        stn.label(),
        profile.valid_time.format("%Y-%m-%dT%H:%MZ"),
        fmt_opt(stn.latitude, 2),
        fmt_opt(stn.longitude, 2),
        fmt_opt(stn.elevation, 0),
        profile.qc,
    )?;
    writeln!(out, "# levels {}", rows.len())?;
    writeln!(out, "{}", COLUMNS)?;

    for (i, p, t, rh) in rows {
        writeln!(
            out,
            "{:8.3} {:10.3} {:8.2} {:8.2} {:12.5e} {:12.5e} {:12.5e} {:12.5e}",
            altitudes[i] / 1000.0,
            p,
            t + 273.15,
            rh,
            cloud.lwc[i].unwrap_or(0.0),
            cloud.iwc[i].unwrap_or(0.0),
            cloud.rwc[i].unwrap_or(0.0),
            cloud.swc[i].unwrap_or(0.0),
        )?;
    }

    Ok(())
}

fn fmt_opt(val: Option<f64>, precision: usize) -> String {
    match val {
        Some(v) => format!("{:.*}", precision, v),
        None => "NA".to_owned(),
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::{
        grid::{CloudProfile, GriddedFields, QcFlags},
        station::{StationInfo, StationNumber},
    };
    use chrono::NaiveDate;

    fn profile() -> GriddedProfile {
        let mut station = StationInfo::new(StationNumber::new(72672));
        station.id = Some("RIW".to_owned());
        station.latitude = Some(43.06);
        station.longitude = Some(-108.48);
        station.elevation = Some(1688.0);

        let mut qc = QcFlags::default();
        qc.insert(QcFlags::SHALLOW_PROFILE);

        GriddedProfile {
            station,
            valid_time: NaiveDate::from_ymd_opt(2022, 3, 4)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            qc,
            fields: GriddedFields {
                pressure: vec![None, Some(850.0), Some(800.0)],
                temperature: vec![None, Some(10.0), Some(5.0)],
                dew_point: vec![None, None, None],
                relative_humidity: vec![None, Some(50.0), None],
            },
            cloud: CloudProfile {
                cloud: vec![None, Some(false), None],
                lwc: vec![None, Some(0.0), None],
                iwc: vec![None, Some(0.0), None],
                rwc: vec![None, Some(0.25), None],
                swc: vec![None, Some(0.0), None],
            },
        }
    }

    #[test]
    fn test_block() {
        let mut buf: Vec<u8> = vec![];
        write_rt_ascii(&mut buf, &[profile()], &[1000.0, 1500.0, 2000.0]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "# station 72672 RIW valid 2022-03-04T12:00Z lat 43.06 lon -108.48 elev 1688 qc 1000"
        );
        assert_eq!(lines[1], "# levels 1");
        assert_eq!(lines[2], COLUMNS);

        let vals: Vec<f64> = lines[3]
            .split_whitespace()
            .map(|tok| tok.parse().unwrap())
            .collect();
        assert_eq!(vals.len(), 8);
        assert!((vals[0] - 1.5).abs() < 1e-9);
        assert!((vals[1] - 850.0).abs() < 1e-9);
        assert!((vals[2] - 283.15).abs() < 1e-6);
        assert!((vals[6] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_blocks_are_separated() {
        let mut buf: Vec<u8> = vec![];
        let alts = [1000.0, 1500.0, 2000.0];
        write_rt_ascii(&mut buf, &[profile(), profile()], &alts).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.matches("# station").count(), 2);
        assert!(text.contains("\n\n# station"));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.txt");
        write_rt_ascii_file(&[profile()], &[1000.0, 1500.0, 2000.0], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# station 72672 RIW"));
    }
}
