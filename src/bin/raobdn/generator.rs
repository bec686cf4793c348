use super::{CmdLineArgs, ReqInfo, StepResult};
use crate::missing_url::MissingUrlDb;
use crossbeam_channel as channel;
use itertools::iproduct;
use raobkit::{obs_times, wyoming::build_url};
use std::{error::Error, thread::spawn};

pub fn start_generator_thread(
    args: &CmdLineArgs,
    generator_tx: channel::Sender<StepResult>,
) -> Result<(), Box<dyn Error>> {
    let times = obs_times(args.start, args.end, &args.hours);
    let stations = args.stations.clone();
    let region = args.region;
    let base_url = args.base_url.clone();
    let force = args.force;
    let missing_urls = MissingUrlDb::open_or_create(&args.root)?;

    println!(
        "Requesting {} stations at {} times.",
        stations.len(),
        times.len()
    );

    spawn(move || {
        let mut count = 0;

        // Oldest first, every station for a time before moving on to the next time.
        for (valid_time, &station) in iproduct!(times.iter(), stations.iter()) {
            let url = build_url(&base_url, region, station, valid_time);

            if !force && missing_urls.known_missing(&url) {
                tracing::debug!(%url, "skipping known missing url");
                continue;
            }

            let request = StepResult::Request(ReqInfo {
                station,
                valid_time: *valid_time,
                url,
                attempts: 0,
            });

            if generator_tx.send(request).is_err() {
                return;
            }
            count += 1;
        }

        let _ = generator_tx.send(StepResult::GeneratorDone(count));
    });

    Ok(())
}
