/*!
    Runs every input through its own [`TranscodeWorker`], one file at a
    time, and reports progress while each one works.
*/

use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::error::{Error, Result};
use crate::filter::FilterChain;
use crate::media::{Progress, ProgressSnapshot};
use crate::settings::Settings;
use crate::transcode::{TranscodeError, TranscodeWorker};

/**
    How often the driver reads the worker's counters.
*/
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/**
    Transcode every input of validated `settings`.

    The filter chain is built before any input is opened and reused for
    every file. Files are processed in order; the first failure stops the
    run. Returns the final counts of each file.
*/
pub fn run(settings: &Settings) -> Result<Vec<ProgressSnapshot>> {
    let mut chain = FilterChain::load(&settings.filter_dir, &settings.filters)?;
    if !chain.is_empty() {
        info!(filters = ?chain.names().collect::<Vec<_>>(), "filter chain ready");
    }

    let mut totals = Vec::with_capacity(settings.inputs.len());
    for (index, input) in settings.inputs.iter().enumerate() {
        let Some(output) = settings.output_for(index) else {
            continue;
        };
        info!(input = %input.display(), output = %output.display(), "processing file");

        let worker = TranscodeWorker::new(input.clone(), output, settings.encoder.clone());
        match run_worker(worker, &mut chain, settings.log_level.shows_progress()) {
            Ok(snapshot) => totals.push(snapshot),
            Err((stream, error)) => {
                return Err(Error::Transcode {
                    path: input.clone(),
                    stream,
                    error,
                });
            }
        }
    }

    Ok(totals)
}

/**
    Run `worker` on a scoped background thread, polling its progress
    until it finishes.

    On failure also returns the stream the worker was on.
*/
fn run_worker(
    mut worker: TranscodeWorker,
    chain: &mut FilterChain,
    show_progress: bool,
) -> std::result::Result<ProgressSnapshot, (Option<usize>, TranscodeError)> {
    let progress = worker.progress();
    let name = thread_name(worker.input());

    let result = thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name(name)
            .spawn_scoped(scope, || worker.run(chain))
            .map_err(TranscodeError::Spawn)?;

        while !handle.is_finished() {
            if show_progress {
                print_progress(&progress, false);
            }
            thread::sleep(POLL_INTERVAL);
        }

        handle.join().map_err(|_| TranscodeError::WorkerPanicked)?
    });

    if show_progress {
        print_progress(&progress, true);
    }

    result.map_err(|e| {
        let stream = e.stream_index().or_else(|| progress.stream());
        (stream, e)
    })
}

fn thread_name(input: &Path) -> String {
    let file = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("transcode {file}")
}

fn print_progress(progress: &Progress, last: bool) {
    let mut stderr = std::io::stderr().lock();
    let end = if last { "\n" } else { "\r" };
    let _ = write!(stderr, "{}{end}", progress.snapshot());
    let _ = stderr.flush();
}
