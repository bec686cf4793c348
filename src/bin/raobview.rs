//! Radiosonde viewer.
//!
//! Browse archived soundings in the terminal: station details, the level table and text plots.
use clap::{crate_version, App, Arg, ArgMatches};
use raobkit::{
    archive::{read_csv, sort_and_dedup},
    init_logging, parse_date_string,
    view::{height_range, panel_series, Panel, Series},
    LevelColumn, Sounding, StationNumber, TablePrinter,
};
use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
    str::FromStr,
};
use strum::IntoEnumIterator;
use textplots::{Chart, Plot, Shape};

const CHART_WIDTH: u32 = 160;
const CHART_HEIGHT: u32 = 45;

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

    let matches = parse_args();

    let mut soundings: Vec<Sounding> = vec![];
    for input in matches.values_of("inputs").into_iter().flatten() {
        soundings.append(&mut read_csv(&PathBuf::from(input))?);
    }

    let stations: Vec<StationNumber> = matches
        .values_of("stations")
        .into_iter()
        .flatten()
        .map(StationNumber::from_str)
        .collect::<Result<_, _>>()?;
    if !stations.is_empty() {
        soundings.retain(|snd| stations.contains(&snd.station.number));
    }

    sort_and_dedup(&mut soundings);
    soundings.iter_mut().for_each(Sounding::fill_derived);

    if soundings.is_empty() {
        println!("No soundings to show.");
        return Ok(());
    }

    let panels: Vec<Panel> = match matches.values_of("panels") {
        Some(vals) => vals
            .map(|p| Panel::from_str(&p.to_lowercase()))
            .collect::<Result<_, _>>()?,
        None => Panel::iter().collect(),
    };

    let mut current = match matches.value_of("time") {
        Some(time) => {
            let time = parse_date_string(time)?;
            soundings
                .iter()
                .position(|snd| snd.valid_time >= time)
                .unwrap_or(soundings.len() - 1)
        }
        None => 0,
    };

    show(&soundings, current, &panels)?;

    if matches.is_present("no-interactive") {
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("[n]ext, [p]revious, [l]ist, <number> to jump, [q]uit > ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match Command::parse(&line) {
            Some(Command::Next) if current + 1 < soundings.len() => current += 1,
            Some(Command::Previous) if current > 0 => current -= 1,
            Some(Command::Next) | Some(Command::Previous) => {
                println!("No more soundings in that direction.");
                continue;
            }
            Some(Command::Jump(idx)) if idx < soundings.len() => current = idx,
            Some(Command::Jump(idx)) => {
                println!("No sounding number {}, there are {}.", idx, soundings.len());
                continue;
            }
            Some(Command::List) => {
                print_list(&soundings, current)?;
                continue;
            }
            Some(Command::Quit) => break,
            None => {
                println!("Unknown command: {}", line.trim());
                continue;
            }
        }

        show(&soundings, current, &panels)?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Next,
    Previous,
    Jump(usize),
    List,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "n" | "next" | "" => Some(Command::Next),
            "p" | "prev" | "previous" => Some(Command::Previous),
            "l" | "list" => Some(Command::List),
            "q" | "quit" | "exit" => Some(Command::Quit),
            other => other.parse().ok().map(Command::Jump),
        }
    }
}

fn show(soundings: &[Sounding], idx: usize, panels: &[Panel]) -> Result<(), Box<dyn Error>> {
    let snd = &soundings[idx];

    print_station(snd, idx, soundings.len())?;
    print_levels(snd)?;

    for &panel in panels {
        let series = panel_series(snd, panel);
        println!("{}", panel.title());
        plot(&series);
    }

    Ok(())
}

fn print_station(snd: &Sounding, idx: usize, total: usize) -> Result<(), Box<dyn Error>> {
    let stn = &snd.station;
    let opt = |v: Option<f64>, prec: usize| {
        v.map(|v| format!("{:.*}", prec, v))
            .unwrap_or_else(|| "-".to_owned())
    };

    let mut names: Vec<String> = vec![
        "Station".to_owned(),
        "Name".to_owned(),
        "Valid time".to_owned(),
        "Latitude".to_owned(),
        "Longitude".to_owned(),
        "Elevation (m)".to_owned(),
    ];
    let mut values: Vec<String> = vec![
        stn.label(),
        stn.name.clone().unwrap_or_default(),
        snd.valid_time.format("%Y-%m-%d %H:%MZ").to_string(),
        opt(stn.latitude, 2),
        opt(stn.longitude, 2),
        opt(stn.elevation, 0),
    ];

    for (name, val) in &snd.indices {
        names.push(name.clone());
        values.push(format!("{:.2}", val));
    }

    TablePrinter::new()
        .with_title(format!("Sounding {} ({} of {})", idx, idx + 1, total))
        .with_column("", &names)
        .with_column("", &values)
        .print()?;

    Ok(())
}

fn print_levels(snd: &Sounding) -> Result<(), Box<dyn Error>> {
    const COLS: [LevelColumn; 8] = [
        LevelColumn::Pressure,
        LevelColumn::Height,
        LevelColumn::Temperature,
        LevelColumn::DewPoint,
        LevelColumn::RelativeHumidity,
        LevelColumn::WindDirection,
        LevelColumn::WindSpeed,
        LevelColumn::Theta,
    ];

    let mut table = TablePrinter::new().with_fill("-");
    for &col in &COLS {
        let vals: Vec<String> = snd
            .levels
            .iter()
            .map(|lvl| {
                lvl.get(col)
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "-".to_owned())
            })
            .collect();
        table = table.with_column(format!("{} ({})", col.as_ref(), col.units()), &vals);
    }

    table.print()?;

    Ok(())
}

fn print_list(soundings: &[Sounding], current: usize) -> Result<(), Box<dyn Error>> {
    let numbers: Vec<String> = (0..soundings.len())
        .map(|i| {
            if i == current {
                format!("*{}", i)
            } else {
                i.to_string()
            }
        })
        .collect();
    let labels: Vec<String> = soundings.iter().map(|snd| snd.station.label()).collect();
    let times: Vec<String> = soundings
        .iter()
        .map(|snd| snd.valid_time.format("%Y-%m-%d %HZ").to_string())
        .collect();
    let levels: Vec<usize> = soundings.iter().map(|snd| snd.levels.len()).collect();

    TablePrinter::new()
        .with_title("Soundings".to_owned())
        .with_column("#", &numbers)
        .with_column("Station", &labels)
        .with_column("Valid time", &times)
        .with_column("Levels", &levels)
        .print()?;

    Ok(())
}

fn plot(series: &[Series]) {
    let (lo, hi) = match height_range(series) {
        Some(range) => range,
        None => {
            println!("  no data");
            return;
        }
    };

    // Panels have at most two lines.
    match series {
        [a] => {
            Chart::new(CHART_WIDTH, CHART_HEIGHT, lo, hi)
                .lineplot(&Shape::Lines(&a.points))
                .nice();
        }
        [a, b, ..] => {
            Chart::new(CHART_WIDTH, CHART_HEIGHT, lo, hi)
                .lineplot(&Shape::Lines(&a.points))
                .lineplot(&Shape::Lines(&b.points))
                .nice();
        }
        [] => {}
    }
}

fn parse_args() -> ArgMatches<'static> {
    App::new("raobview")
        .author("Ryan <rnleach@users.noreply.github.com>")
        .version(crate_version!())
        .about("View archived soundings in the terminal.")
        .arg(
            Arg::with_name("inputs")
                .multiple(true)
                .required(true)
                .takes_value(true)
                .help("CSV files written by raobdn."),
        )
        .arg(
            Arg::with_name("stations")
                .multiple(true)
                .short("s")
                .long("stations")
                .takes_value(true)
                .help("Only show these station numbers."),
        )
        .arg(
            Arg::with_name("time")
                .short("t")
                .long("time")
                .takes_value(true)
                .help("Start at the first sounding at or after this time. YYYY-MM-DD-HH"),
        )
        .arg(
            Arg::with_name("panels")
                .multiple(true)
                .short("p")
                .long("panels")
                .takes_value(true)
                .possible_values(&["temperature", "humidity", "wind", "theta"])
                .help("Plots to draw, default all."),
        )
        .arg(
            Arg::with_name("no-interactive")
                .long("no-interactive")
                .takes_value(false)
                .help("Show the first sounding and exit."),
        )
        .get_matches()
}
