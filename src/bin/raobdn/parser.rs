use super::{ReqInfo, StepResult};
use crossbeam_channel as channel;
use raobkit::{wyoming::parse_page, RaobErr};
use std::thread::spawn;

/// Parse downloaded pages, putting busy requests back in the download queue.
///
/// The thread holds a sender into the download queue, so it drops out of its loop once every
/// request the generator made has a final outcome. That closes the download queue and lets the
/// download threads finish.
pub fn start_parser_thread(
    max_retries: u32,
    parse_rx: channel::Receiver<StepResult>,
    requeue_tx: channel::Sender<StepResult>,
    parse_tx: channel::Sender<StepResult>,
) {
    spawn(move || {
        let mut total: Option<usize> = None;
        let mut finished = 0;

        for step_result in &parse_rx {
            let next_step = match step_result {
                StepResult::PageText(req_info, text) => match parse_page(&text) {
                    Ok(soundings) => StepResult::Success(req_info, soundings),
                    Err(RaobErr::NoData) => StepResult::NoData(req_info),
                    Err(RaobErr::ServerBusy) if req_info.attempts < max_retries => {
                        let retry = ReqInfo {
                            attempts: req_info.attempts + 1,
                            ..req_info
                        };
                        tracing::info!(
                            url = %retry.url,
                            attempts = retry.attempts,
                            "server busy, retrying"
                        );
                        if requeue_tx.send(StepResult::Request(retry)).is_err() {
                            return;
                        }
                        continue;
                    }
                    Err(RaobErr::ServerBusy) => StepResult::ServerBusy(req_info),
                    Err(err) => StepResult::ParseError(req_info, err.to_string()),
                },
                StepResult::GeneratorDone(count) => {
                    total = Some(count);
                    if finished >= count {
                        break;
                    }
                    continue;
                }
                _ => step_result,
            };

            let is_final = !matches!(next_step, StepResult::InitializationError(_));

            if parse_tx.send(next_step).is_err() {
                return;
            }

            if is_final {
                finished += 1;
                if total.map(|n| finished >= n).unwrap_or(false) {
                    break;
                }
            }
        }

        drop(requeue_tx);

        // Anything left, like late initialization errors, still goes to the printer.
        for step_result in parse_rx {
            if parse_tx.send(step_result).is_err() {
                return;
            }
        }
    });
}
