//! Station identification.
use crate::errors::RaobErr;
use std::{fmt::Display, str::FromStr};

/// New type wrapper for a WMO block and station number, e.g. 72672.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationNumber {
    num: u32,
}

impl From<u32> for StationNumber {
    fn from(val: u32) -> Self {
        StationNumber { num: val }
    }
}

impl From<StationNumber> for u32 {
    fn from(stn: StationNumber) -> u32 {
        stn.num
    }
}

impl From<StationNumber> for i32 {
    fn from(stn: StationNumber) -> i32 {
        // Valid station numbers are at most 5 digits.
        stn.num as i32
    }
}

impl Display for StationNumber {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(formatter, "{:05}", self.num)
    }
}

impl FromStr for StationNumber {
    type Err = RaobErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(RaobErr::InvalidStation(s.to_owned()));
        }

        let num: u32 = s
            .parse()
            .map_err(|_| RaobErr::InvalidStation(s.to_owned()))?;
        let stn = StationNumber { num };

        if stn.is_valid() {
            Ok(stn)
        } else {
            Err(RaobErr::InvalidStation(s.to_owned()))
        }
    }
}

impl StationNumber {
    /// Test to see if this is a valid station number.
    pub fn is_valid(self) -> bool {
        self.num > 0 && self.num < 100_000
    }

    /// Create a new one.
    pub const fn new(num: u32) -> Self {
        StationNumber { num }
    }
}

/// Description of the station that launched a sounding.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub number: StationNumber,
    pub id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl StationInfo {
    /// Station info with nothing but a number.
    pub fn new(number: StationNumber) -> Self {
        StationInfo {
            number,
            id: None,
            name: None,
            latitude: None,
            longitude: None,
            elevation: None,
        }
    }

    /// Short label for printing, e.g. "72672 RIW".
    pub fn label(&self) -> String {
        match self.id {
            Some(ref id) => format!("{} {}", self.number, id),
            None => format!("{}", self.number),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_station_number_display_pads() {
        assert_eq!(StationNumber::new(1415).to_string(), "01415");
        assert_eq!(StationNumber::new(72672).to_string(), "72672");
    }

    #[test]
    fn test_station_number_from_str() {
        assert_eq!(
            StationNumber::from_str("72672").unwrap(),
            StationNumber::new(72672)
        );
        assert_eq!(
            StationNumber::from_str(" 01415 ").unwrap(),
            StationNumber::new(1415)
        );
        assert!(StationNumber::from_str("kriw").is_err());
        assert!(StationNumber::from_str("0").is_err());
        assert!(StationNumber::from_str("123456").is_err());
        assert!(StationNumber::from_str("").is_err());
    }

    #[test]
    fn test_label() {
        let mut info = StationInfo::new(StationNumber::new(72672));
        assert_eq!(info.label(), "72672");
        info.id = Some("RIW".to_owned());
        assert_eq!(info.label(), "72672 RIW");
    }
}
