use crate::indexer::Indexer;
use crate::vcs;
use anyhow::Result;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Granularity at which a sleeping loop notices the stop flag.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Polls version control every `interval` and runs an incremental update when
/// the working tree reports changes. Returns once `stop` is set.
///
/// Status-check failures count as "no change this tick"; update failures are
/// logged and the loop carries on.
pub fn run(
    indexer: &Indexer<'_>,
    interval: Duration,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> Result<()> {
    let interval = interval.max(Duration::from_millis(1));
    while !stop.load(Ordering::SeqCst) {
        if !sleep_unless_stopped(interval, stop) {
            break;
        }
        let changed = match vcs::has_changes(
            indexer.runner(),
            indexer.config(),
            indexer.index().root(),
        ) {
            Ok(changed) => changed,
            Err(err) => {
                debug!("status check failed: {err}");
                false
            }
        };
        if !changed {
            continue;
        }
        match indexer.update() {
            Ok(outcome) if outcome.rebuilt => {
                let stamp = chrono::Local::now().format("%H:%M:%S");
                writeln!(out, "[{stamp}] index updated: {} symbols", outcome.symbols)?;
                out.flush()?;
            }
            Ok(outcome) => debug!(symbols = outcome.symbols, "no tracked changes"),
            Err(err) => warn!("update failed: {err:#}"),
        }
    }
    Ok(())
}

/// Sleeps for `total`, waking early when `stop` is set. Returns false if stopped.
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(STOP_CHECK_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_returns_early_when_stopped() {
        let stop = AtomicBool::new(true);
        let start = Instant::now();
        assert!(!sleep_unless_stopped(Duration::from_secs(10), &stop));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_completes_when_running() {
        let stop = AtomicBool::new(false);
        assert!(sleep_unless_stopped(Duration::from_millis(5), &stop));
    }
}
