/*!
    Media sink implementation.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{codec, format::context::Output as OutputContext};

use ffmpeg_source::{CodecConfig, rational_from_ffmpeg, rational_to_ffmpeg};
use ffmpeg_types::{Error, Packet, Rational, Result};

/**
    Media sink for writing to container files.

    Streams are added first, then the header is written, then packets,
    then the trailer. If the sink is dropped after the header without
    [`Sink::finish`], the trailer is written on drop so the file stays
    readable.
*/
pub struct Sink {
    output: OutputContext,
    path: PathBuf,
    /// Time base of every output stream, final once the header is written.
    time_bases: Vec<Rational>,
    header_written: bool,
    finished: bool,
}

impl Sink {
    /**
        Create a new sink that writes to a file.

        The container format is guessed from the file extension.
    */
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::native("failed to initialize ffmpeg", e))?;

        let path = path.as_ref();
        let output = ffmpeg_next::format::output(&path)
            .map_err(|e| Error::native(&format!("cannot create output {}", path.display()), e))?;

        Ok(Self {
            output,
            path: path.to_path_buf(),
            time_bases: Vec::new(),
            header_written: false,
            finished: false,
        })
    }

    /**
        Path being written.
    */
    pub fn path(&self) -> &Path {
        &self.path
    }

    /**
        Check whether the container wants codec headers out of band.

        Encoders feeding this sink should then be opened with global
        headers.
    */
    pub fn needs_global_header(&self) -> bool {
        self.output
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER)
    }

    /**
        Add a stream whose packets are copied from the input unchanged.

        Returns the output stream index.
    */
    pub fn add_passthrough(&mut self, config: &CodecConfig, time_base: Rational) -> Result<usize> {
        let index = self.add_stream(config, time_base)?;
        // The input container's codec tag may be invalid in the output one
        if let Some(stream) = self.output.stream_mut(index) {
            unsafe {
                (*stream.parameters().as_mut_ptr()).codec_tag = 0;
            }
        }
        Ok(index)
    }

    /**
        Add a stream fed by an encoder, described by the encoder's codec
        parameters and time base.

        Returns the output stream index.
    */
    pub fn add_encoded(&mut self, config: &CodecConfig, time_base: Rational) -> Result<usize> {
        self.add_stream(config, time_base)
    }

    fn add_stream(&mut self, config: &CodecConfig, time_base: Rational) -> Result<usize> {
        if self.header_written {
            return Err(Error::invalid_data("cannot add streams after the header"));
        }

        let mut stream = self
            .output
            .add_stream(ffmpeg_next::encoder::find(codec::Id::None))
            .map_err(|e| Error::native("failed to add output stream", e))?;
        stream.set_parameters(config.parameters().clone());
        stream.set_time_base(rational_to_ffmpeg(time_base));

        let index = stream.index();
        self.time_bases.push(time_base);
        Ok(index)
    }

    /**
        Write the container header.

        The muxer may change the stream time bases; packets written later
        are rescaled into the final ones.
    */
    pub fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Err(Error::invalid_data("header already written"));
        }

        self.output
            .write_header()
            .map_err(|e| Error::native("failed to write header", e))?;
        self.header_written = true;

        for (index, time_base) in self.time_bases.iter_mut().enumerate() {
            if let Some(stream) = self.output.stream(index) {
                *time_base = rational_from_ffmpeg(stream.time_base());
            }
        }

        Ok(())
    }

    /**
        Time base of an output stream.
    */
    pub fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.time_bases.get(index).copied()
    }

    pub fn stream_count(&self) -> usize {
        self.time_bases.len()
    }

    /**
        Write a packet to output stream `index`.

        Timestamps are rescaled from the packet's time base to the stream's.
    */
    pub fn write(&mut self, packet: &Packet, index: usize) -> Result<()> {
        if !self.header_written {
            return Err(Error::invalid_data("header not written"));
        }

        let stream_time_base = self
            .stream_time_base(index)
            .ok_or_else(|| Error::invalid_data(format!("no output stream {index}")))?;

        let mut ffmpeg_pkt = if packet.data.is_empty() {
            ffmpeg_next::Packet::empty()
        } else {
            ffmpeg_next::Packet::copy(&packet.data)
        };

        let (pts, dts, duration) = packet.rescaled_timing(stream_time_base);
        ffmpeg_pkt.set_stream(index);
        ffmpeg_pkt.set_pts(pts.map(|p| p.0));
        ffmpeg_pkt.set_dts(dts.map(|d| d.0));
        ffmpeg_pkt.set_duration(duration.0);
        ffmpeg_pkt.set_position(-1);
        if packet.is_keyframe {
            ffmpeg_pkt.set_flags(codec::packet::Flags::KEY);
        }

        ffmpeg_pkt
            .write_interleaved(&mut self.output)
            .map_err(|e| Error::native("failed to write packet", e))
    }

    /**
        Finish writing and close the sink.

        This writes any trailing metadata (duration, seeking index) and
        finalizes the container.
    */
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        if !self.header_written {
            return Err(Error::invalid_data("header not written"));
        }

        self.output
            .write_trailer()
            .map_err(|e| Error::native("failed to write trailer", e))
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        if self.header_written && !self.finished {
            // Best effort: the error that caused the early drop matters more
            let _ = self.output.write_trailer();
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("path", &self.path)
            .field("time_bases", &self.time_bases)
            .field("header_written", &self.header_written)
            .finish_non_exhaustive()
    }
}
