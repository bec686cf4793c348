//! Radiosonde gridder.
//!
//! Puts archived soundings on a fixed altitude grid, flags quality problems, diagnoses cloud and
//! precipitation, and writes text and NetCDF files ready for radiative transfer models.
use chrono::NaiveDateTime;
use clap::{crate_version, App, Arg, ArgMatches};
use pbr::ProgressBar;
use raobkit::{
    archive::{read_csv, sort_and_dedup},
    bail, default_root,
    grid::{grid_all, write_gridded_netcdf, write_rt_ascii_file, AltitudeGrid, GridConfig},
    init_logging, parse_date_string, RaobErr, Sounding, StationNumber, TablePrinter,
};
use std::{error::Error, fs, path::PathBuf, str::FromStr};

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
    init_logging();

    let args = CmdLineArgs::new(&parse_args())?;

    let config = match args.config {
        Some(ref path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };
    let grid = AltitudeGrid::new(&config.grid)?;

    let mut soundings: Vec<Sounding> = vec![];
    for input in &args.inputs {
        let mut snds = read_csv(input)?;
        println!("Read {} soundings from {}", snds.len(), input.display());
        soundings.append(&mut snds);
    }

    soundings.retain(|snd| args.keep(snd));
    sort_and_dedup(&mut soundings);

    if soundings.is_empty() {
        println!("No soundings matched, nothing written.");
        return Ok(());
    }

    let mut pb = ProgressBar::new(soundings.len() as u64);
    pb.message("Gridding ");

    let (profiles, rejected) = grid_all(&soundings, &config, &grid, || {
        pb.inc();
    });
    pb.finish();

    if !rejected.is_empty() {
        let stations: Vec<String> = rejected.iter().map(|r| r.0.station.label()).collect();
        let times: Vec<String> = rejected
            .iter()
            .map(|r| r.0.valid_time.format("%Y-%m-%d %HZ").to_string())
            .collect();
        let reasons: Vec<&RaobErr> = rejected.iter().map(|r| &r.1).collect();

        TablePrinter::new()
            .with_title("Rejected soundings".to_owned())
            .with_column("Station", &stations)
            .with_column("Valid time", &times)
            .with_column("Reason", &reasons)
            .print()?;
    }

    if profiles.is_empty() {
        println!("No soundings passed quality control, nothing written.");
        return Ok(());
    }

    fs::create_dir_all(&args.out_dir)?;

    let txt_path = args.out_dir.join(format!("{}.txt", args.name));
    write_rt_ascii_file(&profiles, grid.altitudes(), &txt_path)?;
    println!("Wrote {} profiles to {}", profiles.len(), txt_path.display());

    let nc_path = args.out_dir.join(format!("{}.nc", args.name));
    write_gridded_netcdf(&profiles, grid.altitudes(), &nc_path)?;
    println!("Wrote {} profiles to {}", profiles.len(), nc_path.display());

    let flagged = profiles.iter().filter(|p| !p.qc.is_clean()).count();
    println!(
        "{} gridded, {} with quality flags, {} rejected.",
        profiles.len(),
        flagged,
        rejected.len()
    );

    Ok(())
}

#[derive(Debug, Clone)]
struct CmdLineArgs {
    inputs: Vec<PathBuf>,
    config: Option<PathBuf>,
    out_dir: PathBuf,
    name: String,
    stations: Vec<StationNumber>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl CmdLineArgs {
    fn new(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let inputs: Vec<PathBuf> = matches
            .values_of("inputs")
            .into_iter()
            .flatten()
            .map(PathBuf::from)
            .collect();

        if inputs.is_empty() {
            bail("At least one input file is required.");
        }

        let stations: Vec<StationNumber> = matches
            .values_of("stations")
            .into_iter()
            .flatten()
            .map(StationNumber::from_str)
            .collect::<Result<_, _>>()?;

        let start = matches.value_of("start").map(parse_date_string).transpose()?;
        let end = matches.value_of("end").map(parse_date_string).transpose()?;

        let out_dir = match matches.value_of("out-dir").map(PathBuf::from).or_else(default_root) {
            Some(dir) => dir,
            None => bail("Unable to find a home directory, please supply --out-dir."),
        };

        Ok(CmdLineArgs {
            inputs,
            config: matches.value_of("config").map(PathBuf::from),
            out_dir,
            name: matches.value_of("name").unwrap_or("gridded").to_owned(),
            stations,
            start,
            end,
        })
    }

    fn keep(&self, snd: &Sounding) -> bool {
        (self.stations.is_empty() || self.stations.contains(&snd.station.number))
            && self.start.map(|s| snd.valid_time >= s).unwrap_or(true)
            && self.end.map(|e| snd.valid_time <= e).unwrap_or(true)
    }
}

fn parse_args() -> ArgMatches<'static> {
    App::new("raobgrid")
        .author("Ryan <rnleach@users.noreply.github.com>")
        .version(crate_version!())
        .about("Grid archived soundings for radiative transfer models.")
        .arg(
            Arg::with_name("inputs")
                .multiple(true)
                .required(true)
                .takes_value(true)
                .help("CSV files written by raobdn."),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("RON file with grid, quality control and cloud settings.")
                .long_help(concat!(
                    "RON file with grid, quality control and cloud model settings. Any value ",
                    "left out uses the default, e.g. (grid: (top_m: 15000.0, step_m: 50.0))"
                )),
        )
        .arg(
            Arg::with_name("out-dir")
                .short("o")
                .long("out-dir")
                .takes_value(true)
                .help("Directory to write to, default ~/raob."),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .help("Stem of the output file names, default gridded."),
        )
        .arg(
            Arg::with_name("stations")
                .multiple(true)
                .short("s")
                .long("stations")
                .takes_value(true)
                .help("Only grid these station numbers."),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .help("Only grid soundings at or after this time. YYYY-MM-DD-HH"),
        )
        .arg(
            Arg::with_name("end")
                .long("end")
                .takes_value(true)
                .help("Only grid soundings at or before this time. YYYY-MM-DD-HH"),
        )
        .get_matches()
}
