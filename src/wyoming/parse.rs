//! Scrape soundings out of the archive's TEXT:LIST html pages.
//!
//! A page looks like this, possibly with several header/table/station blocks in a row:
//!
//! ```text
//! <H2>72672 RIW Riverton Observations at 00Z 01 Jan 2020</H2>
//! <PRE>
//! -----------------------------------------------------------------------------
//!    PRES   HGHT   TEMP   DWPT   RELH   MIXR   DRCT   SKNT   THTA   THTE   THTV
//!     hPa     m      C      C      %    g/kg    deg   knot     K      K      K
//! -----------------------------------------------------------------------------
//!  1000.0     96
//!   836.0   1688   -4.9  -13.9     49   1.64    225      9  271.8  276.6  272.1
//! </PRE><H3>Station information and sounding indices</H3><PRE>
//!                          Station identifier: RIW
//!                              Station number: 72672
//!                            Observation time: 200101/0000
//! </PRE>
//! ```
//!
//! The table is fixed width, 7 characters per column, right aligned under the column name.
//! Missing values are blank, so columns have to be located by position, not by splitting on
//! whitespace.
use crate::{
    errors::RaobErr,
    sounding::{Level, LevelColumn, Sounding},
    station::{StationInfo, StationNumber},
};
use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use tracing::{debug, warn};

const COLUMN_WIDTH: usize = 7;

lazy_static! {
    static ref H2_RE: Regex = Regex::new(r"(?is)<h2>(.*?)</h2>").unwrap();
    static ref PRE_RE: Regex = Regex::new(r"(?is)<pre>(.*?)</pre>").unwrap();
    static ref HEADER_RE: Regex = Regex::new(concat!(
        r"(?i)^\s*(\d{5})\s+(.*?)\s*Observations\s+at\s+",
        r"(\d{1,2})Z\s+(\d{1,2}\s+[a-z]{3}\s+\d{4})\s*$"
    ))
    .unwrap();
}

/// Parse all the soundings on a page.
///
/// Returns `RaobErr::NoData` if the page has no sounding with at least one data row, and
/// `RaobErr::ServerBusy` if the archive asked us to come back later.
pub fn parse_page(html: &str) -> Result<Vec<Sounding>, RaobErr> {
    let lower = html.to_lowercase();
    if lower.contains("too busy") {
        return Err(RaobErr::ServerBusy);
    }

    let starts: Vec<(usize, usize, String)> = H2_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let header = caps.get(1)?.as_str().trim().to_owned();
            Some((whole.start(), whole.end(), header))
        })
        .collect();

    let mut soundings = vec![];
    for (i, (_, body_start, header)) in starts.iter().enumerate() {
        let body_end = starts.get(i + 1).map(|s| s.0).unwrap_or_else(|| html.len());
        let body = &html[*body_start..body_end];

        let mut pres = PRE_RE
            .captures_iter(body)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        let table = match pres.next() {
            Some(table) => table,
            None => {
                debug!("no table after header: {}", header);
                continue;
            }
        };
        let station_block = pres.next().unwrap_or("");

        match parse_section(header, table, station_block) {
            Ok(snd) => soundings.push(snd),
            Err(RaobErr::NoData) => debug!("empty table for: {}", header),
            Err(err) => return Err(err),
        }
    }

    if soundings.is_empty() {
        Err(RaobErr::NoData)
    } else {
        Ok(soundings)
    }
}

fn parse_section(header: &str, table: &str, station_block: &str) -> Result<Sounding, RaobErr> {
    let header_info = parse_header(header)?;
    let block = parse_station_block(station_block);

    let number = match (header_info.as_ref().map(|h| h.number), block.number) {
        (Some(num), _) | (None, Some(num)) => num,
        (None, None) => {
            return Err(RaobErr::Parse(format!("no station number in: {}", header)));
        }
    };

    let valid_time = header_info
        .as_ref()
        .map(|h| h.valid_time)
        .or(block.obs_time)
        .ok_or_else(|| RaobErr::Parse(format!("no observation time in: {}", header)))?;

    // The header name usually leads with the identifier, e.g. "RIW Riverton".
    let name = header_info.and_then(|h| {
        let name = match block.id {
            Some(ref id) => h
                .name
                .strip_prefix(id.as_str())
                .map(str::trim)
                .unwrap_or(&h.name)
                .to_owned(),
            None => h.name,
        };

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    });

    let station = StationInfo {
        number,
        id: block.id,
        name,
        latitude: block.latitude,
        longitude: block.longitude,
        elevation: block.elevation,
    };

    let levels = parse_table(table)?;
    if levels.is_empty() {
        return Err(RaobErr::NoData);
    }

    let mut snd = Sounding::new(station, valid_time);
    snd.levels = levels;
    snd.indices = block.indices;

    Ok(snd)
}

struct Header {
    number: StationNumber,
    name: String,
    valid_time: NaiveDateTime,
}

/// Parse "72672 RIW Riverton Observations at 00Z 01 Jan 2020". Returns `Ok(None)` when the
/// header is not in that form, the station block may still have what we need.
fn parse_header(header: &str) -> Result<Option<Header>, RaobErr> {
    let caps = match HEADER_RE.captures(header) {
        Some(caps) => caps,
        None => {
            debug!("unrecognized header: {}", header);
            return Ok(None);
        }
    };

    let number = StationNumber::from_str(&caps[1])?;
    let name = caps[2].trim().to_owned();
    let hour: u32 = caps[3]
        .parse()
        .map_err(|_| RaobErr::Parse(format!("bad hour in header: {}", header)))?;
    let date = NaiveDate::parse_from_str(&caps[4], "%d %b %Y")?;
    let valid_time = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| RaobErr::Parse(format!("bad hour in header: {}", header)))?;

    Ok(Some(Header {
        number,
        name,
        valid_time,
    }))
}

/// Parse the fixed width table into levels. Rows are kept in archive order.
fn parse_table(table: &str) -> Result<Vec<Level>, RaobErr> {
    let mut lines = table.lines();

    let header_line = lines
        .by_ref()
        .find(|line| line.contains("PRES") && line.contains("HGHT"))
        .ok_or_else(|| RaobErr::Parse("no column header row in table".to_owned()))?;

    let columns = column_spans(header_line);
    if columns.is_empty() {
        return Err(RaobErr::Parse(format!(
            "no known columns in: {}",
            header_line.trim()
        )));
    }

    // Skip the units row and the closing rule.
    let data_lines = lines.skip_while(|line| !is_rule(line)).skip(1);

    let mut levels = vec![];
    for line in data_lines {
        if line.trim().is_empty() || is_rule(line) {
            continue;
        }

        let mut level = Level::default();
        let mut any = false;
        for &(col, start, end) in &columns {
            let cell = slice_cell(line, start, end);
            if cell.is_empty() {
                continue;
            }

            match cell.parse::<f64>() {
                Ok(val) => {
                    level.set(col, Some(val));
                    any = true;
                }
                Err(_) => warn!("skipping unparseable {} value: {}", col.as_ref(), cell),
            }
        }

        if any {
            levels.push(level);
        }
    }

    Ok(levels)
}

/// Locate each known column by the right edge of its name in the header row.
fn column_spans(header_line: &str) -> Vec<(LevelColumn, usize, usize)> {
    let mut spans = vec![];
    let mut offset = 0;

    for token in header_line.split_whitespace() {
        let start = match header_line[offset..].find(token) {
            Some(pos) => offset + pos,
            None => break,
        };
        let end = start + token.len();
        offset = end;

        match LevelColumn::from_str(token) {
            Ok(col) => spans.push((col, end.saturating_sub(COLUMN_WIDTH), end)),
            Err(_) => debug!("ignoring unknown column {}", token),
        }
    }

    spans
}

fn slice_cell(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    if start >= len {
        return "";
    }

    line.get(start..end.min(len)).map(str::trim).unwrap_or("")
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-')
}

#[derive(Default)]
struct StationBlock {
    id: Option<String>,
    number: Option<StationNumber>,
    obs_time: Option<NaiveDateTime>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
    indices: std::collections::BTreeMap<String, f64>,
}

fn parse_station_block(block: &str) -> StationBlock {
    let mut info = StationBlock::default();

    for line in block.lines() {
        let (label, value) = match line.find(':') {
            Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
            None => continue,
        };

        match label {
            "Station identifier" => {
                if !value.is_empty() {
                    info.id = Some(value.to_owned());
                }
            }
            "Station number" => info.number = StationNumber::from_str(value).ok(),
            "Observation time" => {
                info.obs_time = NaiveDateTime::parse_from_str(value, "%y%m%d/%H%M").ok()
            }
            "Station latitude" => info.latitude = value.parse().ok(),
            "Station longitude" => info.longitude = value.parse().ok(),
            "Station elevation" => info.elevation = value.parse().ok(),
            _ => match value.parse::<f64>() {
                Ok(val) => {
                    info.indices.insert(label.to_owned(), val);
                }
                Err(_) => debug!("ignoring non-numeric station entry {}: {}", label, value),
            },
        }
    }

    info
}
