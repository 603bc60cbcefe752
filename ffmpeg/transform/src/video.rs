/*!
    Conversion between native decoded frames and canonical frames.
*/

use std::marker::PhantomData;

use ffmpeg_next::{
    ffi,
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::{Error, Frame, MAX_PLANES, NativeFormat, Result};

use crate::planar::{
    PlanarEquivalent, native_from_tag, planar_equivalent, planar_pixel, plane_order,
};

/**
    Cached scaler context and the conversion it was created for.
*/
struct ScalerState {
    context: ScalerContext,
    src_format: Pixel,
    dst_format: Pixel,
    width: u32,
    height: u32,
}

impl ScalerState {
    fn matches(&self, src_format: Pixel, dst_format: Pixel, width: u32, height: u32) -> bool {
        self.src_format == src_format
            && self.dst_format == dst_format
            && self.width == width
            && self.height == height
    }
}

/**
    Return a scaler for the conversion, reusing the cached one when the
    formats and dimensions have not changed.
*/
fn scaler_for(
    state: &mut Option<ScalerState>,
    src_format: Pixel,
    dst_format: Pixel,
    width: u32,
    height: u32,
) -> Result<&mut ScalerContext> {
    let needs_init = state
        .as_ref()
        .is_none_or(|s| !s.matches(src_format, dst_format, width, height));

    if needs_init {
        let context = ScalerContext::get(
            src_format,
            width,
            height,
            dst_format,
            width,
            height,
            ScalerFlags::BILINEAR,
        )
        .map_err(|e| {
            Error::native(
                &format!("failed to create scaler {src_format:?} -> {dst_format:?}"),
                e,
            )
        })?;
        *state = Some(ScalerState {
            context,
            src_format,
            dst_format,
            width,
            height,
        });
    }

    match state {
        Some(s) => Ok(&mut s.context),
        None => Err(Error::codec("scaler not initialized")),
    }
}

/**
    Build a native frame whose planes point into `planes`.

    `planes[i]` is canonical plane `i`; it is stored at native plane
    `order[i]`. The returned frame does not own the memory: it holds no
    buffer references, so dropping it leaves the planes untouched.

    # Safety

    The pointers must stay valid, and unaliased by anything that writes
    through them, for as long as the returned frame is used.
*/
unsafe fn wrap_planes(
    format: Pixel,
    width: u32,
    height: u32,
    planes: &[(*mut u8, usize)],
    order: [usize; MAX_PLANES],
) -> Result<VideoFrameFFmpeg> {
    let mut video = VideoFrameFFmpeg::empty();
    video.set_format(format);
    video.set_width(width);
    video.set_height(height);

    for (index, &(data, stride)) in planes.iter().enumerate() {
        let linesize = i32::try_from(stride)
            .map_err(|_| Error::invalid_data(format!("plane stride {stride} too large")))?;
        unsafe {
            let ptr = video.as_mut_ptr();
            (*ptr).data[order[index]] = data;
            (*ptr).linesize[order[index]] = linesize;
        }
    }

    Ok(video)
}

/**
    Converts native decoded frames into canonical planar frames.

    Frames whose native format already is its planar equivalent are copied
    row by row. Everything else goes through the scaler once, straight
    into the canonical frame's planes.
*/
#[derive(Default)]
pub struct Normalizer {
    scaler_state: Option<ScalerState>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Normalize one native frame.

        The result carries the native format tag but no timing: callers
        stamp `pts`, `time_base` and `sequence` themselves.
    */
    pub fn normalize(&mut self, native: &VideoFrameFFmpeg) -> Result<Frame> {
        let width = native.width();
        let height = native.height();
        if width == 0 || height == 0 {
            return Err(Error::invalid_data(format!(
                "native frame has invalid dimensions {width}x{height}"
            )));
        }

        let native_format = native.format();
        let planar = planar_equivalent(native_format).ok_or_else(|| {
            Error::unsupported_format(format!(
                "pixel format {native_format:?} has no planar equivalent"
            ))
        })?;

        for plane in 0..native.planes() {
            if unsafe { (*native.as_ptr()).linesize[plane] } < 0 {
                return Err(Error::unsupported_format(
                    "native frames with negative line sizes are not supported",
                ));
            }
        }

        let mut frame = Frame::new(width, height, planar.format)?;
        frame.native_format = NativeFormat(ffi::AVPixelFormat::from(native_format) as i32);

        if planar.pixel == native_format {
            copy_planes(native, &mut frame, &planar);
        } else {
            self.scale_into(native, &mut frame, &planar)?;
        }

        Ok(frame)
    }

    fn scale_into(
        &mut self,
        native: &VideoFrameFFmpeg,
        frame: &mut Frame,
        planar: &PlanarEquivalent,
    ) -> Result<()> {
        let (width, height) = (frame.width(), frame.height());
        let scaler = scaler_for(
            &mut self.scaler_state,
            native.format(),
            planar.pixel,
            width,
            height,
        )?;

        let planes: Vec<(*mut u8, usize)> = frame
            .planes_mut()
            .into_iter()
            .map(|p| (p.data.as_mut_ptr(), p.layout.stride))
            .collect();

        // SAFETY: the planes belong to `frame`, which outlives `view` and is
        // not touched while the scaler writes.
        let mut view =
            unsafe { wrap_planes(planar.pixel, width, height, &planes, planar.plane_order())? };
        scaler
            .run(native, &mut view)
            .map_err(|e| Error::native("failed to convert frame to planar", e))
    }
}

/**
    Copy a native planar frame whose layout already matches the canonical
    one, respecting both sides' strides.
*/
fn copy_planes(native: &VideoFrameFFmpeg, frame: &mut Frame, planar: &PlanarEquivalent) {
    let order = planar.plane_order();
    let bytes_per_comp = frame.bytes_per_comp();

    for (index, mut plane) in frame.planes_mut().into_iter().enumerate() {
        let source_index = order[index];
        let source_stride = native.stride(source_index);
        let source = native.data(source_index);
        let row_bytes = plane.layout.width * bytes_per_comp;

        for y in 0..plane.layout.height {
            let start = y * source_stride;
            plane.row_mut(y)[..row_bytes].copy_from_slice(&source[start..start + row_bytes]);
        }
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("initialized", &self.scaler_state.is_some())
            .finish()
    }
}

/**
    A native frame ready for the encoder.

    Either a zero-copy view of a canonical frame's planes or a converted
    copy; in the first case it borrows the frame it was projected from.
*/
pub struct Projected<'a> {
    video: VideoFrameFFmpeg,
    zero_copy: bool,
    _frame: PhantomData<&'a Frame>,
}

impl Projected<'_> {
    pub fn as_native(&self) -> &VideoFrameFFmpeg {
        &self.video
    }

    /**
        True when no pixel data was copied.
    */
    pub fn is_zero_copy(&self) -> bool {
        self.zero_copy
    }
}

impl std::fmt::Debug for Projected<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projected")
            .field("format", &self.video.format())
            .field("zero_copy", &self.zero_copy)
            .finish_non_exhaustive()
    }
}

/**
    Projects canonical frames back into native frames for encoding.
*/
#[derive(Default)]
pub struct Projector {
    scaler_state: Option<ScalerState>,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        The native planar format matching a canonical frame's layout.

        Prefers the planar equivalent of the recorded native format, so
        full-range YUV stays full range.
    */
    pub fn planar_format_of(frame: &Frame) -> Result<Pixel> {
        let recorded = native_from_tag(frame.native_format)
            .and_then(planar_equivalent)
            .filter(|eq| eq.format == frame.format())
            .map(|eq| eq.pixel);

        recorded
            .or_else(|| planar_pixel(frame.format()))
            .ok_or_else(|| {
                Error::unsupported_format(format!(
                    "canonical format {} has no native planar layout",
                    frame.format()
                ))
            })
    }

    /**
        Project `frame` into `target`, the encoder's pixel format.

        Zero-copy when `target` is the frame's planar layout, otherwise a
        single scaler pass. The frame's pts is carried over unchanged.
    */
    pub fn project<'a>(&mut self, frame: &'a Frame, target: Pixel) -> Result<Projected<'a>> {
        let planar = Self::planar_format_of(frame)?;
        let order = plane_order(frame.format());
        let planes: Vec<(*mut u8, usize)> = (0..frame.n_planes())
            .map(|i| (frame.plane(i).as_ptr() as *mut u8, frame.layout(i).stride))
            .collect();

        // SAFETY: the view only borrows `frame` for 'a and is never written
        // through; the encoder copies frames that own no buffers.
        let mut view =
            unsafe { wrap_planes(planar, frame.width(), frame.height(), &planes, order)? };

        if planar == target {
            view.set_pts(frame.pts.map(|p| p.0));
            return Ok(Projected {
                video: view,
                zero_copy: true,
                _frame: PhantomData,
            });
        }

        let scaler = scaler_for(
            &mut self.scaler_state,
            planar,
            target,
            frame.width(),
            frame.height(),
        )?;
        let mut converted = VideoFrameFFmpeg::new(target, frame.width(), frame.height());
        scaler
            .run(&view, &mut converted)
            .map_err(|e| Error::native("failed to convert frame for encoder", e))?;
        converted.set_pts(frame.pts.map(|p| p.0));

        Ok(Projected {
            video: converted,
            zero_copy: false,
            _frame: PhantomData,
        })
    }
}

impl std::fmt::Debug for Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("initialized", &self.scaler_state.is_some())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn native_frame(format: Pixel, width: u32, height: u32) -> VideoFrameFFmpeg {
        let mut video = VideoFrameFFmpeg::new(format, width, height);
        for plane in 0..video.planes() {
            let data = video.data_mut(plane);
            for (i, byte) in data.iter_mut().enumerate() {
                *byte = (i * 7 + plane * 31) as u8;
            }
        }
        video
    }

    fn visible_rows_equal(a: &VideoFrameFFmpeg, b: &VideoFrameFFmpeg, row_bytes: &[usize]) {
        assert_eq!(a.planes(), b.planes());
        for (plane, &bytes) in row_bytes.iter().enumerate() {
            for y in 0..a.plane_height(plane) as usize {
                let ra = &a.data(plane)[y * a.stride(plane)..][..bytes];
                let rb = &b.data(plane)[y * b.stride(plane)..][..bytes];
                assert_eq!(ra, rb, "plane {plane} row {y}");
            }
        }
    }

    #[test]
    fn planar_native_copies_rows() {
        let native = native_frame(Pixel::YUV420P, 33, 17);
        let frame = Normalizer::new().normalize(&native).unwrap();

        assert_eq!(frame.format(), ffmpeg_types::PixelFormat::YUV420P8);
        assert_eq!(frame.layout(1).width, 17);
        assert_eq!(frame.layout(1).height, 9);
        for plane in 0..3 {
            let layout = frame.layout(plane);
            for y in 0..layout.height {
                let start = y * native.stride(plane);
                assert_eq!(
                    &frame.row(plane, y)[..layout.width],
                    &native.data(plane)[start..start + layout.width]
                );
            }
        }
    }

    #[test]
    fn zero_copy_round_trip_is_identical() {
        let native = native_frame(Pixel::YUV422P10LE, 40, 20);
        let frame = Normalizer::new().normalize(&native).unwrap();
        let mut projector = Projector::new();
        let projected = projector.project(&frame, Pixel::YUV422P10LE).unwrap();

        assert!(projected.is_zero_copy());
        visible_rows_equal(&native, projected.as_native(), &[80, 40, 40]);
    }

    #[test]
    fn packed_rgb_lands_in_canonical_order() {
        let mut native = VideoFrameFFmpeg::new(Pixel::RGB24, 4, 2);
        let stride = native.stride(0);
        let data = native.data_mut(0);
        for y in 0..2 {
            for x in 0..4 {
                data[y * stride + x * 3..][..3].copy_from_slice(&[10, 20, 30]);
            }
        }

        let frame = Normalizer::new().normalize(&native).unwrap();
        assert_eq!(frame.format(), ffmpeg_types::PixelFormat::RGBP8);
        assert_eq!(&frame.row(0, 0)[..4], &[10; 4]);
        assert_eq!(&frame.row(1, 1)[..4], &[20; 4]);
        assert_eq!(&frame.row(2, 0)[..4], &[30; 4]);
    }

    #[test]
    fn semi_planar_round_trip_through_scaler() {
        let native = native_frame(Pixel::NV12, 32, 16);
        let frame = Normalizer::new().normalize(&native).unwrap();
        assert_eq!(frame.format(), ffmpeg_types::PixelFormat::YUV420P8);
        assert_eq!(Projector::planar_format_of(&frame).unwrap(), Pixel::YUV420P);

        let mut projector = Projector::new();
        let projected = projector.project(&frame, Pixel::NV12).unwrap();
        assert!(!projected.is_zero_copy());
        visible_rows_equal(&native, projected.as_native(), &[32, 32]);
    }

    #[test]
    fn unsupported_native_format_is_rejected() {
        let native = VideoFrameFFmpeg::new(Pixel::PAL8, 8, 8);
        let err = Normalizer::new().normalize(&native).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }), "{err}");
    }

    #[test]
    fn projection_keeps_pts() {
        let native = native_frame(Pixel::YUV420P, 16, 16);
        let mut frame = Normalizer::new().normalize(&native).unwrap();
        frame.pts = Some(ffmpeg_types::Pts(42));

        let mut projector = Projector::new();
        assert_eq!(
            projector.project(&frame, Pixel::YUV420P).unwrap().as_native().pts(),
            Some(42)
        );
        assert_eq!(
            projector.project(&frame, Pixel::NV12).unwrap().as_native().pts(),
            Some(42)
        );
    }

    #[test]
    fn scratch_frames_project_through_canonical_table() {
        let frame = Frame::new(8, 8, ffmpeg_types::PixelFormat::RGBP8).unwrap();
        assert_eq!(Projector::planar_format_of(&frame).unwrap(), Pixel::GBRP);
    }

    /// Conversions that dither or pass through a narrower intermediate,
    /// so a round trip may change samples.
    const LOSSY: &[Pixel] = &[
        Pixel::RGB565LE,
        Pixel::RGB565BE,
        Pixel::BGR565LE,
        Pixel::BGR565BE,
        Pixel::RGB555LE,
        Pixel::RGB555BE,
        Pixel::BGR555LE,
        Pixel::BGR555BE,
        Pixel::MONOWHITE,
        Pixel::MONOBLACK,
        Pixel::GRAYF32BE,
        Pixel::GBRPF32BE,
        Pixel::GBRAPF32BE,
    ];

    /// Canonical frame of valid samples for `native`, tagged with it.
    fn canonical_for(native: Pixel, width: u32, height: u32) -> Frame {
        let planar = crate::planar_equivalent(native).unwrap();
        let mut frame = Frame::new(width, height, planar.format).unwrap();
        frame.native_format = NativeFormat(ffi::AVPixelFormat::from(native) as i32);

        let desc = frame.descriptor();
        let bytes = desc.bytes_per_comp;
        for index in 0..frame.n_planes() {
            let layout = frame.layout(index);
            for y in 0..layout.height {
                let row = frame.row_mut(index, y);
                for x in 0..layout.width {
                    let seed = (x * 7 + y * 13 + index * 31) as u32;
                    let sample = &mut row[x * bytes..][..bytes];
                    match desc.component_type {
                        ffmpeg_types::ComponentType::Float => {
                            let value = (seed % 256) as f32 / 255.0;
                            sample.copy_from_slice(&value.to_le_bytes());
                        }
                        ffmpeg_types::ComponentType::Int => {
                            let value = seed % (1u32 << desc.bits_per_comp.min(16));
                            sample.copy_from_slice(&value.to_le_bytes()[..bytes]);
                        }
                    }
                }
            }
        }
        frame
    }

    fn row_bytes(video: &VideoFrameFFmpeg) -> Vec<usize> {
        (0..video.planes())
            .map(|plane| {
                let bytes = unsafe {
                    ffi::av_image_get_linesize(
                        video.format().into(),
                        video.width() as i32,
                        plane as i32,
                    )
                };
                usize::try_from(bytes).unwrap()
            })
            .collect()
    }

    #[test]
    fn every_native_format_survives_normalize_then_project() {
        let (width, height) = (32, 16);
        let mut exact = 0;

        for native in crate::planar::native_formats() {
            let canonical = canonical_for(native, width, height);
            let original = Projector::new()
                .project(&canonical, native)
                .unwrap_or_else(|e| panic!("{native:?}: {e}"))
                .as_native()
                .clone();

            let frame = Normalizer::new()
                .normalize(&original)
                .unwrap_or_else(|e| panic!("{native:?}: {e}"));
            assert_eq!(frame.format(), canonical.format(), "{native:?}");
            let mut projector = Projector::new();
            let projected = projector
                .project(&frame, native)
                .unwrap_or_else(|e| panic!("{native:?}: {e}"));
            let back = projected.as_native();
            assert_eq!(back.format(), native);
            assert_eq!((back.width(), back.height()), (width, height));

            if LOSSY.contains(&native) {
                continue;
            }
            let bytes = row_bytes(&original);
            for (plane, &count) in bytes.iter().enumerate() {
                for y in 0..original.plane_height(plane) as usize {
                    let a = &original.data(plane)[y * original.stride(plane)..][..count];
                    let b = &back.data(plane)[y * back.stride(plane)..][..count];
                    assert_eq!(a, b, "{native:?} plane {plane} row {y}");
                }
            }
            exact += 1;
        }

        assert!(exact > 100, "only {exact} formats compared");
    }
}
