use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/**
    Counters shared between a transcode worker and the thread watching it.

    The worker is the only writer. Readers see each counter move forward
    monotonically; [`Progress::is_done`] is published with release
    ordering, so once it reads true every counter is final.
*/
#[derive(Debug)]
pub struct Progress {
    decoded: AtomicU64,
    dropped: AtomicU64,
    output: AtomicU64,
    /// Input stream of the packet being processed, -1 between packets.
    stream: AtomicI64,
    done: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            decoded: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            output: AtomicU64::new(0),
            stream: AtomicI64::new(-1),
            done: AtomicBool::new(false),
        }
    }

    pub fn record_decoded(&self) {
        self.decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_output(&self) {
        self.output.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_stream(&self, stream: Option<usize>) {
        let value = stream.map_or(-1, |s| s as i64);
        self.stream.store(value, Ordering::Relaxed);
    }

    /**
        Input stream being worked on, if any.
    */
    pub fn stream(&self) -> Option<usize> {
        usize::try_from(self.stream.load(Ordering::Relaxed)).ok()
    }

    pub fn finish(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            decoded: self.decoded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            output: self.output.load(Ordering::Relaxed),
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/**
    Counter values at one point in time.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub decoded: u64,
    pub dropped: u64,
    /// Frames sent to the encoder.
    pub output: u64,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Decoded {} frames, dropped {} frames, encoded {} frames",
            self.decoded, self.dropped, self.output
        )
    }
}

static_assertions::assert_impl_all!(Progress: Send, Sync);
