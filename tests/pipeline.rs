use raobkit::{
    archive::{read_csv, sort_and_dedup, write_soundings, OutputFormat},
    grid::{grid_all, write_rt_ascii, AltitudeGrid, GridConfig, QcFlags},
    wyoming::parse_page,
    RaobErr, StationNumber,
};
use strum::IntoEnumIterator;
use tempfile::tempdir;

const PAGE: &str = "<HTML>
<TITLE>University of Wyoming - Radiosonde Data</TITLE>
<BODY BGCOLOR=\"white\">
<H2>72672 RIW Riverton Observations at 00Z 01 Jan 2020</H2>
<PRE>
-----------------------------------------------------------------------------
   PRES   HGHT   TEMP   DWPT   RELH   MIXR   DRCT   SKNT   THTA   THTE   THTV
    hPa     m      C      C      %    g/kg    deg   knot     K      K      K
-----------------------------------------------------------------------------
 1000.0     96
  925.0    748
  836.0   1688   -4.9  -13.9     49   1.64    225      9  271.8  276.6  272.1
  832.0   1722   -3.9  -17.9     33   1.24    229     10  273.2  276.9  273.4
  700.0   3036  -11.1  -28.1     23   0.57    260     27  279.2  281.0  279.3
  500.0   5550  -27.3                         270     48  288.1         288.2
</PRE><H3>Station information and sounding indices</H3><PRE>
                         Station identifier: RIW
                             Station number: 72672
                           Observation time: 200101/0000
                           Station latitude: 43.06
                          Station longitude: -108.47
                          Station elevation: 1688.0
                            Showalter index: 14.31
                               Lifted index: 14.53
                                SWEAT index: 58.99
   Precipitable water [mm] for entire sounding: 4.18
</PRE>
</BODY></HTML>
";

fn config() -> GridConfig {
    GridConfig::from_ron(
        "(grid: (bottom_m: 1500.0, top_m: 3500.0, step_m: 500.0), qc: (min_levels: 3))",
    )
    .unwrap()
}

#[test]
fn test_page_to_rt_ascii() {
    let dir = tempdir().unwrap();
    let csv_path = OutputFormat::Csv.path_in(dir.path(), "soundings");

    let mut soundings = parse_page(PAGE).unwrap();
    soundings.extend(parse_page(PAGE).unwrap());
    sort_and_dedup(&mut soundings);
    assert_eq!(soundings.len(), 1);

    write_soundings(OutputFormat::Csv, &soundings, &csv_path).unwrap();
    assert!(dir.path().join("soundings_indices.csv").exists());

    let read_back = read_csv(&csv_path).unwrap();
    assert_eq!(read_back, soundings);

    let config = config();
    let grid = AltitudeGrid::new(&config.grid).unwrap();
    let (profiles, rejected) = grid_all(&read_back, &config, &grid, || {});
    assert!(rejected.is_empty());
    assert_eq!(profiles.len(), 1);

    let profile = &profiles[0];
    assert_eq!(profile.station.number, StationNumber::new(72672));
    assert!(profile.qc.contains(QcFlags::LARGE_GAP));
    assert!(profile.qc.contains(QcFlags::SHALLOW_PROFILE));
    assert!(!profile.qc.contains(QcFlags::HEIGHT_NOT_MONOTONIC));
    assert!(!profile.qc.contains(QcFlags::PRESSURE_NOT_MONOTONIC));

    let mut buf: Vec<u8> = vec![];
    write_rt_ascii(&mut buf, &profiles, grid.altitudes()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("# station 72672 RIW valid 2020-01-01T00:00Z"));
    assert!(lines[0].ends_with("qc 1100"));
    assert_eq!(lines[1], "# levels 3");
    assert_eq!(lines.len(), 6);
    assert!(lines[3].trim_start().starts_with("2.000"));
    assert!(lines[5].trim_start().starts_with("3.000"));
}

#[test]
fn test_all_formats_write() {
    let dir = tempdir().unwrap();
    let soundings = parse_page(PAGE).unwrap();

    for format in OutputFormat::iter() {
        let path = format.path_in(dir.path(), "all");
        write_soundings(format, &soundings, &path).unwrap();
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn test_nothing_to_write() {
    let dir = tempdir().unwrap();
    let path = OutputFormat::Csv.path_in(dir.path(), "empty");
    match write_soundings(OutputFormat::Csv, &[], &path) {
        Err(RaobErr::NotEnoughData) => {}
        other => panic!("unexpected: {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_strict_config_rejects() {
    let soundings = parse_page(PAGE).unwrap();
    let config = GridConfig::default();
    let grid = AltitudeGrid::new(&config.grid).unwrap();

    let (profiles, rejected) = grid_all(&soundings, &config, &grid, || {});
    assert!(profiles.is_empty());
    assert_eq!(rejected.len(), 1);
    assert!(matches!(rejected[0].1, RaobErr::NotEnoughData));
}
