/*!
    Per-input media state: the demuxer, the muxer and what happens to
    each input stream between them.
*/

mod coding;
mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use ffmpeg_sink::Sink;
use ffmpeg_source::Source;
use ffmpeg_types::{Packet, StreamKind};

use crate::settings::NamedOptions;
use crate::transcode::TranscodeError;

pub use coding::{CodingContext, TimestampGate};
pub use progress::{Progress, ProgressSnapshot};

/**
    What happens to the packets of one input stream.
*/
#[derive(Debug)]
pub enum StreamRoute {
    /// Decoded, filtered and encoded into `output_index`.
    Transcode {
        output_index: usize,
        coding: Box<CodingContext>,
    },
    /// Copied unchanged into `output_index`.
    Passthrough { output_index: usize },
    /// Left out of the output.
    Skip,
}

impl StreamRoute {
    pub fn output_index(&self) -> Option<usize> {
        match self {
            Self::Transcode { output_index, .. } | Self::Passthrough { output_index } => {
                Some(*output_index)
            }
            Self::Skip => None,
        }
    }
}

/**
    Everything opened for one input file.

    Created by [`MediaContext::open`] with the output header already
    written. Dropping it without [`MediaContext::finish`] still closes the
    output with a trailer.
*/
#[derive(Debug)]
pub struct MediaContext {
    input: PathBuf,
    output: PathBuf,
    source: Source,
    sink: Sink,
    routes: Vec<StreamRoute>,
    progress: Arc<Progress>,
}

impl MediaContext {
    /**
        Open `input`, create `output`, set up every stream and write the
        output header.

        Video streams get a decoder and an encoder, streams of every other
        known kind are copied, streams of unknown type are skipped. An input without a
        video stream is rejected before the output is created.
    */
    pub fn open(
        input: &Path,
        output: &Path,
        encoder: Option<&NamedOptions>,
        progress: Arc<Progress>,
    ) -> Result<Self, TranscodeError> {
        let source = Source::open(input).map_err(TranscodeError::media(None))?;
        if !source.has_video() {
            return Err(TranscodeError::NoVideoStream {
                path: input.to_path_buf(),
            });
        }
        debug!(
            path = %input.display(),
            format = source.format_name(),
            streams = source.streams().len(),
            "opened input"
        );

        let mut sink = Sink::create(output).map_err(TranscodeError::media(None))?;
        let global_header = sink.needs_global_header();

        let mut routes = Vec::with_capacity(source.streams().len());
        for info in source.streams() {
            let stream = Some(info.index);
            let Some(config) = source.codec_config(info.index) else {
                routes.push(StreamRoute::Skip);
                continue;
            };

            let route = match info.kind {
                StreamKind::Video => {
                    let coding = CodingContext::open(info, config, encoder, global_header)
                        .map_err(TranscodeError::media(stream))?;
                    let output_index = sink
                        .add_encoded(&coding.encoder.codec_config(), coding.encoder.time_base())
                        .map_err(TranscodeError::media(stream))?;
                    StreamRoute::Transcode {
                        output_index,
                        coding: Box::new(coding),
                    }
                }
                kind if kind.is_passthrough() => {
                    let output_index = sink
                        .add_passthrough(config, info.time_base)
                        .map_err(TranscodeError::media(stream))?;
                    StreamRoute::Passthrough { output_index }
                }
                kind => {
                    info!(stream = info.index, kind = kind.as_str(), "skipping stream");
                    StreamRoute::Skip
                }
            };

            debug!(
                stream = info.index,
                kind = info.kind.as_str(),
                codec = %info.codec_name,
                output = ?route.output_index(),
                "stream routed"
            );
            routes.push(route);
        }

        sink.write_header().map_err(TranscodeError::media(None))?;
        debug!(path = %output.display(), streams = sink.stream_count(), "wrote header");

        Ok(Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            source,
            sink,
            routes,
            progress,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /**
        Read the next packet of any stream, in file order.
    */
    pub fn next_packet(&mut self) -> Result<Option<Packet>, TranscodeError> {
        self.source.next_packet().map_err(TranscodeError::media(None))
    }

    /**
        Split borrow of the route for `stream` and the muxer, so a route
        can write what it produces.
    */
    pub fn route_mut(&mut self, stream: usize) -> Option<(&mut StreamRoute, &mut Sink)> {
        let route = self.routes.get_mut(stream)?;
        Some((route, &mut self.sink))
    }

    pub fn routes_mut(&mut self) -> (&mut [StreamRoute], &mut Sink) {
        (&mut self.routes, &mut self.sink)
    }

    pub fn stream_count(&self) -> usize {
        self.routes.len()
    }

    /**
        Write the trailer and close both files.
    */
    pub fn finish(self) -> Result<(), TranscodeError> {
        let Self { sink, output, .. } = self;
        sink.finish().map_err(TranscodeError::media(None))?;
        debug!(path = %output.display(), "wrote trailer");
        Ok(())
    }
}
