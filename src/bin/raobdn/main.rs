//! Radiosonde Downloader.
//!
//! Downloads soundings from the University of Wyoming upper air archive and saves them as CSV,
//! Parquet or NetCDF files.
use crate::missing_url::MissingUrlDb;
use chrono::{Duration, NaiveDateTime, Utc};
use clap::{crate_version, App, Arg, ArgMatches};
use crossbeam_channel as channel;
use raobkit::{
    archive::{sort_and_dedup, write_soundings, OutputFormat},
    bail, default_root, init_logging, parse_date_string,
    wyoming::{Region, DEFAULT_BASE_URL},
    Sounding, StationNumber, TablePrinter,
};
use reqwest::StatusCode;
use std::{collections::BTreeMap, error::Error, fs, path::PathBuf, str::FromStr};

mod download;
mod generator;
mod missing_url;
mod parser;

const DEFAULT_DAYS_BACK: i64 = 2;

fn main() {
    if let Err(e) = run() {
        println!("error: {}", e);

        let mut err = &*e;

        while let Some(cause) = err.source() {
            println!("caused by: {}", cause);
            err = cause;
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    const CAPACITY: usize = 16;

    init_logging();

    let args = CmdLineArgs::new(&parse_args())?;
    fs::create_dir_all(&args.root)?;

    // Unbounded so the parser can put busy requests back in line without blocking.
    let (generator_tx, dl_rx) = channel::unbounded::<StepResult>();
    let requeue_tx = generator_tx.clone();
    let (dl_tx, parse_rx) = channel::bounded::<StepResult>(CAPACITY);
    let (parse_tx, print_rx) = channel::bounded::<StepResult>(CAPACITY);

    generator::start_generator_thread(&args, generator_tx)?;
    download::start_download_threads(args.threads, dl_rx, dl_tx);
    parser::start_parser_thread(args.retries, parse_rx, requeue_tx, parse_tx);

    let too_old_to_be_missing = Utc::now().naive_utc() - Duration::hours(27);
    let missing_urls = MissingUrlDb::open_or_create(&args.root)?;

    let mut soundings: Vec<Sounding> = vec![];
    let mut tally = Tally::default();

    for step_result in print_rx {
        use crate::StepResult::*;

        match step_result {
            NoData(_) | URLNotFound(_) => {
                tally.missing += 1;
                let msg =
                    handle_missing_data(&step_result, too_old_to_be_missing, &missing_urls)?;
                println!("{}", msg);
            }
            ServerBusy(req) => {
                tally.failed += 1;
                println!(
                    "  Server busy after {} attempts, skipping: {}",
                    req.attempts, req.url
                );
            }
            ParseError(req, msg) => {
                tally.failed += 1;
                println!("  Unexpected page ({}): {}", msg, req.url);
            }
            OtherDownloadError(req, msg) => {
                tally.failed += 1;
                println!("  {}: {}", msg, req.url);
            }
            OtherURLStatus(ReqInfo { url, .. }, code) => {
                tally.failed += 1;
                println!("  HTTP error ({}): {}.", code, url)
            }
            Success(req, snds) => {
                tally.success += 1;
                println!(
                    "Success for {} {} ({} levels).",
                    req.station,
                    req.valid_time,
                    snds.iter().map(|snd| snd.levels.len()).sum::<usize>()
                );
                soundings.extend(snds);
            }
            InitializationError(msg) => println!("Error initializing threads: {}", msg),
            Request(_) | PageText(_, _) | GeneratorDone(_) => {
                unreachable!("intermediate step reached the end of the pipeline")
            }
        }
    }

    if soundings.is_empty() {
        println!("No soundings downloaded, nothing written.");
        return Ok(());
    }

    sort_and_dedup(&mut soundings);

    for &format in &args.formats {
        let path = format.path_in(&args.root, &args.name);
        write_soundings(format, &soundings, &path)?;
        println!("Wrote {} soundings to {}", soundings.len(), path.display());
    }

    print_summary(&soundings, &tally)?;

    Ok(())
}

fn handle_missing_data(
    res: &StepResult,
    too_old_to_be_missing: NaiveDateTime,
    missing_urls: &MissingUrlDb,
) -> Result<String, Box<dyn Error>> {
    use StepResult::*;

    let (req, what) = match res {
        NoData(req) => (req, "No sounding"),
        URLNotFound(req) => (req, "URL not found"),
        _ => unreachable!(),
    };

    let msg = if req.valid_time < too_old_to_be_missing {
        missing_urls.add_url(&req.url)?;
        format!("{}, will not try again: {}", what, req.url)
    } else {
        format!("{}, try again later: {}", what, req.url)
    };

    Ok(msg)
}

#[derive(Debug, Default)]
struct Tally {
    success: usize,
    missing: usize,
    failed: usize,
}

fn print_summary(soundings: &[Sounding], tally: &Tally) -> Result<(), Box<dyn Error>> {
    let mut per_station: BTreeMap<StationNumber, (String, usize, NaiveDateTime, NaiveDateTime)> =
        BTreeMap::new();

    for snd in soundings {
        let entry = per_station.entry(snd.station.number).or_insert_with(|| {
            (
                snd.station.id.clone().unwrap_or_default(),
                0,
                snd.valid_time,
                snd.valid_time,
            )
        });
        entry.1 += 1;
        entry.2 = entry.2.min(snd.valid_time);
        entry.3 = entry.3.max(snd.valid_time);
    }

    let mut table = TablePrinter::new()
        .with_title("Downloaded soundings".to_owned())
        .with_footer(format!(
            "{} downloaded, {} missing, {} failed",
            tally.success, tally.missing, tally.failed
        ))
        .with_column::<_, String>("Station", &[])
        .with_column::<_, String>("ID", &[])
        .with_column::<_, String>("Count", &[])
        .with_column::<_, String>("First", &[])
        .with_column::<_, String>("Last", &[]);

    for (stn, (id, count, first, last)) in per_station {
        table.add_row(vec![
            stn.to_string(),
            id,
            count.to_string(),
            first.format("%Y-%m-%d %HZ").to_string(),
            last.format("%Y-%m-%d %HZ").to_string(),
        ]);
    }

    table.print()?;

    Ok(())
}

/// Validated command line arguments.
#[derive(Debug, Clone)]
pub struct CmdLineArgs {
    pub stations: Vec<StationNumber>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub hours: Vec<u32>,
    pub region: Region,
    pub base_url: String,
    pub formats: Vec<OutputFormat>,
    pub name: String,
    pub root: PathBuf,
    pub threads: usize,
    pub retries: u32,
    pub force: bool,
}

impl CmdLineArgs {
    fn new(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let stations: Vec<StationNumber> = matches
            .values_of("stations")
            .into_iter()
            .flatten()
            .map(StationNumber::from_str)
            .collect::<Result<_, _>>()?;

        if stations.is_empty() {
            bail("At least one station number is required.");
        }

        let now = Utc::now().naive_utc();
        let days_back = match matches.value_of("days-back") {
            Some(val) => val.parse::<i64>()?,
            None => DEFAULT_DAYS_BACK,
        };

        let start = match matches.value_of("start") {
            Some(start) => parse_date_string(start)?,
            None => now - Duration::days(days_back),
        };

        let end = match matches.value_of("end") {
            Some(end) => parse_date_string(end)?,
            None => now,
        };

        if end < start {
            bail("The end time is before the start time.");
        }

        let hours: Vec<u32> = match matches.values_of("hours") {
            Some(vals) => vals
                .map(|h| h.parse::<u32>())
                .collect::<Result<_, _>>()?,
            None => vec![0, 12],
        };

        if let Some(h) = hours.iter().find(|&&h| h > 23) {
            bail(&format!("Invalid hour: {}", h));
        }

        let region = match matches.value_of("region") {
            Some(region) => Region::from_str(&region.to_lowercase())?,
            None => Region::default(),
        };

        let formats: Vec<OutputFormat> = match matches.values_of("formats") {
            Some(vals) => vals
                .map(|f| OutputFormat::from_str(&f.to_lowercase()))
                .collect::<Result<_, _>>()?,
            None => vec![OutputFormat::Csv],
        };

        let root = match matches.value_of("root").map(PathBuf::from).or_else(default_root) {
            Some(root) => root,
            None => bail("Unable to find a home directory, please supply --root."),
        };

        let threads = match matches.value_of("threads") {
            Some(val) => val.parse::<usize>()?.max(1),
            None => 2,
        };

        let retries = match matches.value_of("retries") {
            Some(val) => val.parse::<u32>()?,
            None => 3,
        };

        Ok(CmdLineArgs {
            stations,
            start,
            end,
            hours,
            region,
            base_url: matches
                .value_of("url")
                .unwrap_or(DEFAULT_BASE_URL)
                .to_owned(),
            formats,
            name: matches.value_of("name").unwrap_or("soundings").to_owned(),
            root,
            threads,
            retries,
            force: matches.is_present("force"),
        })
    }
}

fn parse_args() -> ArgMatches<'static> {
    App::new("raobdn")
        .author("Ryan <rnleach@users.noreply.github.com>")
        .version(crate_version!())
        .about("Download soundings from the University of Wyoming upper air archive.")
        .arg(
            Arg::with_name("stations")
                .multiple(true)
                .short("s")
                .long("stations")
                .takes_value(true)
                .required(true)
                .help("WMO station numbers (e.g. 72672 72476).")
                .long_help(concat!(
                    "WMO block and station numbers (e.g. 72672 72476). ",
                    "The archive does not accept identifiers like RIW, only numbers."
                )),
        )
        .arg(
            Arg::with_name("days-back")
                .short("d")
                .long("days-back")
                .takes_value(true)
                .conflicts_with_all(&["start", "end"])
                .help("Number of days back to consider.")
                .long_help(concat!(
                    "The number of days back to consider. Cannot use --start or --end with this."
                )),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .help("The first observation time. YYYY-MM-DD-HH")
                .long_help(concat!(
                    "The first observation time to download.",
                    " Format is YYYY-MM-DD-HH or YYYY-MM-DD. If the --end argument is not",
                    " specified then the end time is assumed to be now."
                )),
        )
        .arg(
            Arg::with_name("end")
                .long("end")
                .takes_value(true)
                .requires("start")
                .help("The last observation time. YYYY-MM-DD-HH")
                .long_help(concat!(
                    "The last observation time to download.",
                    " Format is YYYY-MM-DD-HH or YYYY-MM-DD. This requires the --start option too."
                )),
        )
        .arg(
            Arg::with_name("hours")
                .multiple(true)
                .long("hours")
                .takes_value(true)
                .help("Synoptic hours to download, default 0 and 12.")
                .long_help(concat!(
                    "Synoptic hours (UTC) to download. Most stations launch at 0 and 12, ",
                    "some also at 6 and 18."
                )),
        )
        .arg(
            Arg::with_name("region")
                .long("region")
                .takes_value(true)
                .possible_values(&[
                    "naconf", "samer", "pac", "nz", "ant", "np", "europe", "africa", "seasia",
                    "mideast",
                ])
                .help("Archive region, default naconf."),
        )
        .arg(
            Arg::with_name("url")
                .long("url")
                .takes_value(true)
                .help("Override the archive URL.")
                .long_help(concat!(
                    "Override the base URL of the archive, e.g. for a mirror. Defaults to ",
                    "http://weather.uwyo.edu/cgi-bin/sounding"
                )),
        )
        .arg(
            Arg::with_name("formats")
                .multiple(true)
                .short("f")
                .long("formats")
                .takes_value(true)
                .possible_values(&["csv", "parquet", "netcdf", "nc"])
                .help("Output formats, default csv."),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .help("Stem of the output file names, default soundings."),
        )
        .arg(
            Arg::with_name("root")
                .short("r")
                .long("root")
                .takes_value(true)
                .help("Set the output directory.")
                .long_help(concat!(
                    "Set the directory the output files and the database of missing URLs are ",
                    "kept in. Defaults to ~/raob."
                )),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .takes_value(true)
                .help("Number of download threads, default 2."),
        )
        .arg(
            Arg::with_name("retries")
                .long("retries")
                .takes_value(true)
                .help("Times to retry when the server is busy, default 3."),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .takes_value(false)
                .help("Request URLs previously recorded as missing."),
        )
        .get_matches()
}

// Result from a single step in the processing chain
#[derive(Debug, Clone)]
pub enum StepResult {
    Request(ReqInfo),
    PageText(ReqInfo, String), // Page downloaded as text, not parsed
    Success(ReqInfo, Vec<Sounding>),
    GeneratorDone(usize), // Total number of requests the generator made

    // Errors
    NoData(ReqInfo),
    ServerBusy(ReqInfo),                 // Still busy after all the retries
    URLNotFound(ReqInfo),
    OtherURLStatus(ReqInfo, StatusCode), // status code returned by reqwest
    OtherDownloadError(ReqInfo, String), // Any other error downloading, error converted to string.
    ParseError(ReqInfo, String),         // An error during parsing
    InitializationError(String),         // Error setting up threads.
}

#[derive(Debug, Clone)]
pub struct ReqInfo {
    pub station: StationNumber,
    pub valid_time: NaiveDateTime,
    pub url: String,
    /// Number of times this has been downloaded already.
    pub attempts: u32,
}
