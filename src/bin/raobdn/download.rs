use super::{ReqInfo, StepResult};
use crossbeam_channel as channel;
use raobkit::RaobErr;
use reqwest::{blocking::Client, StatusCode};
use std::{thread::spawn, time::Duration};

/// How long to wait before asking a busy server again.
fn retry_delay(attempts: u32) -> Duration {
    Duration::from_secs(5 * u64::from(attempts.min(12)))
}

pub fn start_download_threads(
    num_threads: usize,
    dl_rx: channel::Receiver<StepResult>,
    dl_tx: channel::Sender<StepResult>,
) {
    let make_download_thread = || {
        let dl_rx = dl_rx.clone();
        let dl_tx = dl_tx.clone();

        spawn(move || {
            let client = match Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .map_err(RaobErr::from)
            {
                Ok(client) => client,
                Err(err) => {
                    let _ = dl_tx.send(StepResult::InitializationError(err.to_string()));
                    // Keep draining so the rest of the pipeline can still finish.
                    for step_result in dl_rx {
                        let next_step = match step_result {
                            StepResult::Request(req_info) => {
                                StepResult::OtherDownloadError(req_info, err.to_string())
                            }
                            _ => step_result,
                        };
                        if dl_tx.send(next_step).is_err() {
                            return;
                        }
                    }
                    return;
                }
            };

            for step_result in dl_rx {
                let next_step = match step_result {
                    StepResult::Request(req_info) => {
                        if req_info.attempts > 0 {
                            std::thread::sleep(retry_delay(req_info.attempts));
                        }

                        tracing::debug!(
                            url = %req_info.url,
                            attempts = req_info.attempts,
                            "requesting"
                        );

                        fetch(&client, req_info)
                    }
                    _ => step_result,
                };

                if dl_tx.send(next_step).is_err() {
                    return;
                }
            }
        });
    };

    for _ in 0..num_threads {
        make_download_thread();
    }
}

fn fetch(client: &Client, req_info: ReqInfo) -> StepResult {
    let response = match client.get(&req_info.url).send().map_err(RaobErr::from) {
        Ok(response) => response,
        Err(err) => return StepResult::OtherDownloadError(req_info, err.to_string()),
    };

    match response.status() {
        StatusCode::OK => match response.text().map_err(RaobErr::from) {
            Ok(text) => StepResult::PageText(req_info, text),
            Err(err) => StepResult::OtherDownloadError(req_info, err.to_string()),
        },
        StatusCode::NOT_FOUND => StepResult::URLNotFound(req_info),
        code => StepResult::OtherURLStatus(req_info, code),
    }
}
