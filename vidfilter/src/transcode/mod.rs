/*!
    The per-file transcode pipeline.

    A [`TranscodeWorker`] takes one input file through
    `Idle → StreamInit → Running → Flushing → Done`, or to `Failed` from
    any of them. It is meant to run off the thread that watches its
    [`Progress`].
*/

mod error;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace};

use ffmpeg_decode::DecodedFrame;
use ffmpeg_sink::Sink;
use ffmpeg_types::Packet;

use crate::filter::FilterChain;
use crate::media::{CodingContext, MediaContext, Progress, ProgressSnapshot, StreamRoute};
use crate::settings::NamedOptions;

pub use error::TranscodeError;

/**
    Where a [`TranscodeWorker`] is in its life.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    /// Opening the input, codecs and output.
    StreamInit,
    /// Reading packets.
    Running,
    /// Draining decoders and encoders after the last packet.
    Flushing,
    Done,
    Failed,
}

impl WorkerState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::StreamInit => "stream-init",
            Self::Running => "running",
            Self::Flushing => "flushing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Transcodes one input file into one output file.
*/
#[derive(Debug)]
pub struct TranscodeWorker {
    input: PathBuf,
    output: PathBuf,
    encoder: Option<NamedOptions>,
    progress: Arc<Progress>,
    state: WorkerState,
}

impl TranscodeWorker {
    pub fn new(input: PathBuf, output: PathBuf, encoder: Option<NamedOptions>) -> Self {
        Self {
            input,
            output,
            encoder,
            progress: Arc::new(Progress::new()),
            state: WorkerState::Idle,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /**
        Counters another thread can watch while [`TranscodeWorker::run`]
        is busy.
    */
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /**
        Transcode the whole file.

        The progress is marked done whatever the outcome, and the final
        counts are returned on success. A worker runs once; running it
        again is an error.
    */
    pub fn run(&mut self, chain: &mut FilterChain) -> Result<ProgressSnapshot, TranscodeError> {
        if self.state != WorkerState::Idle {
            return Err(TranscodeError::AlreadyRun);
        }

        let result = self.transcode(chain);
        self.state = match result {
            Ok(()) => WorkerState::Done,
            Err(_) => WorkerState::Failed,
        };
        self.progress.finish();

        let snapshot = self.progress.snapshot();
        match &result {
            Ok(()) => info!(path = %self.input.display(), %snapshot, "transcode finished"),
            Err(e) => debug!(path = %self.input.display(), error = %e, "transcode failed"),
        }
        result.map(|()| snapshot)
    }

    fn transcode(&mut self, chain: &mut FilterChain) -> Result<(), TranscodeError> {
        self.state = WorkerState::StreamInit;
        let mut media = MediaContext::open(
            &self.input,
            &self.output,
            self.encoder.as_ref(),
            Arc::clone(&self.progress),
        )?;

        self.state = WorkerState::Running;
        while let Some(packet) = media.next_packet()? {
            let stream = packet.stream_index;
            self.progress.set_stream(Some(stream));

            if let Some((route, sink)) = media.route_mut(stream) {
                match route {
                    StreamRoute::Transcode {
                        output_index,
                        coding,
                    } => {
                        let frames = coding
                            .decoder
                            .decode(&packet)
                            .map_err(TranscodeError::media(Some(stream)))?;
                        let mut pipeline = FramePipeline {
                            stream,
                            output_index: *output_index,
                            coding: &mut **coding,
                            chain: &mut *chain,
                            sink,
                            progress: &self.progress,
                        };
                        for frame in frames {
                            pipeline.process(frame)?;
                        }
                    }
                    StreamRoute::Passthrough { output_index } => {
                        sink.write(&packet, *output_index)
                            .map_err(TranscodeError::media(Some(stream)))?;
                    }
                    StreamRoute::Skip => {}
                }
            }

            self.progress.set_stream(None);
        }

        self.state = WorkerState::Flushing;
        let (routes, sink) = media.routes_mut();
        for (stream, route) in routes.iter_mut().enumerate() {
            let StreamRoute::Transcode {
                output_index,
                coding,
            } = route
            else {
                continue;
            };
            self.progress.set_stream(Some(stream));

            let mut pipeline = FramePipeline {
                stream,
                output_index: *output_index,
                coding: &mut **coding,
                chain: &mut *chain,
                sink: &mut *sink,
                progress: &self.progress,
            };
            pipeline.flush()?;
        }
        self.progress.set_stream(None);

        media.finish()
    }
}

/**
    Borrowed state needed to take decoded frames of one stream to the
    muxer.
*/
struct FramePipeline<'a> {
    stream: usize,
    output_index: usize,
    coding: &'a mut CodingContext,
    chain: &'a mut FilterChain,
    sink: &'a mut Sink,
    progress: &'a Progress,
}

impl FramePipeline<'_> {
    /**
        Normalize, filter and encode one decoded frame, writing whatever
        packets the encoder returns.
    */
    fn process(&mut self, decoded: DecodedFrame) -> Result<(), TranscodeError> {
        self.progress.record_decoded();

        let Some(pts) = self.coding.admit(decoded.pts(), decoded.time_base()) else {
            trace!(stream = self.stream, pts = ?decoded.pts(), "dropping duplicate frame");
            self.progress.record_dropped();
            return Ok(());
        };

        let mut frame = self
            .coding
            .normalizer
            .normalize(decoded.as_native())
            .map_err(TranscodeError::media(Some(self.stream)))?;
        frame.pts = Some(pts);
        frame.time_base = self.coding.encoder.time_base();
        frame.sequence = self.coding.next_sequence();

        let stream = self.stream;
        let frame = self
            .chain
            .apply(frame)
            .map_err(|error| TranscodeError::Filter { stream, error })?;

        let target = self.coding.encoder.format();
        let projected = self
            .coding
            .projector
            .project(&frame, target)
            .map_err(TranscodeError::media(Some(stream)))?;
        let packets = self
            .coding
            .encoder
            .encode(projected.as_native())
            .map_err(TranscodeError::media(Some(stream)))?;
        self.progress.record_output();

        self.write(packets)
    }

    /**
        Drain the decoder through the pipeline, then drain the encoder.
        Codecs that never hold frames back are left alone.
    */
    fn flush(&mut self) -> Result<(), TranscodeError> {
        if self.coding.decoder.may_buffer() {
            let frames = self
                .coding
                .decoder
                .flush()
                .map_err(TranscodeError::media(Some(self.stream)))?;
            debug!(stream = self.stream, frames = frames.len(), "flushed decoder");
            for frame in frames {
                self.process(frame)?;
            }
        }

        if self.coding.encoder.may_buffer() {
            let packets = self
                .coding
                .encoder
                .flush()
                .map_err(TranscodeError::media(Some(self.stream)))?;
            debug!(stream = self.stream, packets = packets.len(), "flushed encoder");
            self.write(packets)?;
        }

        Ok(())
    }

    fn write(&mut self, packets: Vec<Packet>) -> Result<(), TranscodeError> {
        for packet in packets {
            self.sink
                .write(&packet, self.output_index)
                .map_err(TranscodeError::media(Some(self.stream)))?;
        }
        Ok(())
    }
}
