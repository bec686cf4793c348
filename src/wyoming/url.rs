use crate::station::StationNumber;
use chrono::{Datelike, NaiveDateTime, Timelike};
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Default location of the archive's sounding CGI.
pub const DEFAULT_BASE_URL: &str = "http://weather.uwyo.edu/cgi-bin/sounding";

/// Regions the archive groups stations into. The archive only uses it for map selection, but it
/// must be a valid value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Naconf,
    Samer,
    Pac,
    Nz,
    Ant,
    Np,
    Europe,
    Africa,
    Seasia,
    Mideast,
}

impl Default for Region {
    fn default() -> Self {
        Region::Naconf
    }
}

/// Build the request URL for a single station and observation time.
pub fn build_url(
    base: &str,
    region: Region,
    station: StationNumber,
    valid_time: &NaiveDateTime,
) -> String {
    let day_hour = format!("{:02}{:02}", valid_time.day(), valid_time.hour());

    format!(
        "{}?region={}&TYPE=TEXT%3ALIST&YEAR={}&MONTH={:02}&FROM={}&TO={}&STNM={}",
        base.trim_end_matches('?'),
        region.as_ref(),
        valid_time.year(),
        valid_time.month(),
        day_hour,
        day_hour,
        station
    )
}
