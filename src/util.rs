use crate::errors::RaobErr;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub fn bail(msg: &str) -> ! {
    println!("{}", msg);
    ::std::process::exit(1);
}

/// Parse a date in the format YYYY-MM-DD-HH, or YYYY-MM-DD meaning 00Z.
pub fn parse_date_string(dt_str: &str) -> Result<NaiveDateTime, RaobErr> {
    let dt_str = dt_str.trim();
    let invalid = || RaobErr::InvalidDate(dt_str.to_owned());

    if dt_str.len() < 10 {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(dt_str.get(..10).ok_or_else(invalid)?, "%Y-%m-%d")?;

    let hour: u32 = match dt_str.get(10..) {
        None | Some("") => 0,
        Some(rest) => rest
            .strip_prefix('-')
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?,
    };

    date.and_hms_opt(hour, 0, 0).ok_or_else(invalid)
}

/// All observation times between `start` and `end`, inclusive, at the given synoptic hours.
///
/// The result is in ascending order. Hours greater than 23 are ignored.
pub fn obs_times(start: NaiveDateTime, end: NaiveDateTime, hours: &[u32]) -> Vec<NaiveDateTime> {
    let mut hours: Vec<u32> = hours.iter().cloned().filter(|&h| h < 24).collect();
    hours.sort_unstable();
    hours.dedup();

    let mut times = vec![];
    let mut day = start.date();
    while day <= end.date() {
        times.extend(
            hours
                .iter()
                .filter_map(|&h| day.and_hms_opt(h, 0, 0))
                .filter(|t| *t >= start && *t <= end),
        );
        day += Duration::days(1);
    }

    times
}

/// The default directory for outputs and the missing-URL database.
pub fn default_root() -> Option<PathBuf> {
    dirs::home_dir().map(|hd| hd.join("raob"))
}

/// Send `tracing` output to stderr, filtered by `RUST_LOG` and defaulting to warnings.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Only fails if a global subscriber is already set, which is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod unit {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_date_string() {
        assert_eq!(parse_date_string("2020-01-02-12").unwrap(), dt(2020, 1, 2, 12));
        assert_eq!(parse_date_string("2020-01-02").unwrap(), dt(2020, 1, 2, 0));
        assert!(parse_date_string("2020-01-02-25").is_err());
        assert!(parse_date_string("2020-13-02-00").is_err());
        assert!(parse_date_string("2020-01-02T00").is_err());
        assert!(parse_date_string("yesterday").is_err());
    }

    #[test]
    fn test_obs_times() {
        let times = obs_times(dt(2020, 1, 1, 6), dt(2020, 1, 3, 0), &[12, 0]);
        assert_eq!(
            times,
            vec![
                dt(2020, 1, 1, 12),
                dt(2020, 1, 2, 0),
                dt(2020, 1, 2, 12),
                dt(2020, 1, 3, 0)
            ]
        );
    }

    #[test]
    fn test_obs_times_across_month_and_bad_hours() {
        let times = obs_times(dt(2020, 2, 28, 0), dt(2020, 3, 1, 23), &[0, 0, 30]);
        assert_eq!(
            times,
            vec![dt(2020, 2, 28, 0), dt(2020, 2, 29, 0), dt(2020, 3, 1, 0)]
        );
    }

    #[test]
    fn test_obs_times_empty_when_reversed() {
        assert!(obs_times(dt(2020, 1, 2, 0), dt(2020, 1, 1, 0), &[0, 12]).is_empty());
    }
}
