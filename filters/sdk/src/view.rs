/*!
    Safe access to frames handed across the plugin boundary.
*/

use ffmpeg_types::{PixelFormat, PixelFormatDescriptor};

use crate::abi::{FrameView, PTS_NONE, PlaneView};

/**
    Validate the header of a raw view against its pixel format tag.
*/
fn check_view(view: &FrameView) -> Result<PixelFormat, String> {
    let format = PixelFormat::from_raw(view.format).map_err(|e| e.to_string())?;
    let expected = format.descriptor().n_planes;
    if view.n_planes as usize != expected {
        return Err(format!(
            "frame has {} planes but {format} needs {expected}",
            view.n_planes
        ));
    }
    if view.planes[..expected].iter().any(|p| p.data.is_null()) {
        return Err("frame plane pointer is null".to_string());
    }
    Ok(format)
}

/**
    Read-only frame passed to [`FilterPlugin::apply`](crate::FilterPlugin::apply).
*/
#[derive(Debug)]
pub struct FrameRef<'a> {
    view: &'a FrameView,
    format: PixelFormat,
}

impl<'a> FrameRef<'a> {
    /**
        Wrap a raw view, validating its pixel format and planes.

        # Safety

        Every plane pointer must be valid for reads of `stride * height`
        bytes for `'a`, and not written to during `'a`.
    */
    pub unsafe fn from_view(view: &'a FrameView) -> Result<Self, String> {
        let format = check_view(view)?;
        Ok(Self { view, format })
    }

    pub fn width(&self) -> u32 {
        self.view.width
    }

    pub fn height(&self) -> u32 {
        self.view.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn descriptor(&self) -> PixelFormatDescriptor {
        self.format.descriptor()
    }

    pub fn n_planes(&self) -> usize {
        self.view.n_planes as usize
    }

    /**
        Frame number within the stream.
    */
    pub fn sequence(&self) -> u64 {
        self.view.sequence
    }

    pub fn pts(&self) -> Option<i64> {
        (self.view.pts != PTS_NONE).then_some(self.view.pts)
    }

    /**
        Width and height of plane `index`, in samples.
    */
    pub fn plane_size(&self, index: usize) -> (usize, usize) {
        let plane = self.view.planes[index];
        (plane.width as usize, plane.height as usize)
    }

    pub fn stride(&self, index: usize) -> usize {
        self.view.planes[index].stride
    }

    /**
        Bytes of plane `index`, `stride * height` long.
    */
    pub fn plane(&self, index: usize) -> &'a [u8] {
        assert!(index < self.n_planes(), "plane {index} out of range");
        let plane = self.view.planes[index];
        // SAFETY: guaranteed by `from_view`
        unsafe { std::slice::from_raw_parts(plane.data, plane_len(&plane)) }
    }
}

/**
    Writable frame passed to [`FilterPlugin::apply`](crate::FilterPlugin::apply).

    On entry it holds a copy of the input frame, so filters that only
    touch some planes leave the others as they were.
*/
#[derive(Debug)]
pub struct FrameMut<'a> {
    view: &'a mut FrameView,
    format: PixelFormat,
}

impl<'a> FrameMut<'a> {
    /**
        Wrap a raw view, validating its pixel format and planes.

        # Safety

        Every plane pointer must be valid for reads and writes of
        `stride * height` bytes for `'a`, with no other access during
        `'a`, and planes must not overlap.
    */
    pub unsafe fn from_view(view: &'a mut FrameView) -> Result<Self, String> {
        let format = check_view(view)?;
        Ok(Self { view, format })
    }

    pub fn width(&self) -> u32 {
        self.view.width
    }

    pub fn height(&self) -> u32 {
        self.view.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn descriptor(&self) -> PixelFormatDescriptor {
        self.format.descriptor()
    }

    pub fn n_planes(&self) -> usize {
        self.view.n_planes as usize
    }

    pub fn sequence(&self) -> u64 {
        self.view.sequence
    }

    pub fn plane_size(&self, index: usize) -> (usize, usize) {
        let plane = self.view.planes[index];
        (plane.width as usize, plane.height as usize)
    }

    pub fn stride(&self, index: usize) -> usize {
        self.view.planes[index].stride
    }

    pub fn plane(&self, index: usize) -> &[u8] {
        assert!(index < self.n_planes(), "plane {index} out of range");
        let plane = self.view.planes[index];
        // SAFETY: guaranteed by `from_view`
        unsafe { std::slice::from_raw_parts(plane.data, plane_len(&plane)) }
    }

    pub fn plane_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < self.n_planes(), "plane {index} out of range");
        let plane = self.view.planes[index];
        // SAFETY: guaranteed by `from_view`, and `&mut self` keeps it unique
        unsafe { std::slice::from_raw_parts_mut(plane.data, plane_len(&plane)) }
    }

    /**
        Replace every integer sample of plane `index` with `f(sample)`,
        skipping row padding.

        Samples are little endian, `bytes_per_comp` wide. Results are
        masked to the format's bit depth.
    */
    pub fn map_int_samples(&mut self, index: usize, mut f: impl FnMut(u32) -> u32) {
        let desc = self.descriptor();
        let bytes = desc.bytes_per_comp;
        let mask = if desc.bits_per_comp >= 32 {
            u32::MAX
        } else {
            (1u32 << desc.bits_per_comp) - 1
        };
        let (width, height) = self.plane_size(index);
        let stride = self.stride(index);

        let data = self.plane_mut(index);
        for row in data.chunks_exact_mut(stride).take(height) {
            for sample in row[..width * bytes].chunks_exact_mut(bytes) {
                let mut raw = [0u8; 4];
                raw[..bytes].copy_from_slice(sample);
                let value = f(u32::from_le_bytes(raw)) & mask;
                sample.copy_from_slice(&value.to_le_bytes()[..bytes]);
            }
        }
    }

    /**
        Replace every 32-bit float sample of plane `index` with `f(sample)`,
        skipping row padding.
    */
    pub fn map_float_samples(&mut self, index: usize, mut f: impl FnMut(f32) -> f32) {
        let (width, height) = self.plane_size(index);
        let stride = self.stride(index);

        let data = self.plane_mut(index);
        for row in data.chunks_exact_mut(stride).take(height) {
            for sample in row[..width * 4].chunks_exact_mut(4) {
                let value = f(f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]));
                sample.copy_from_slice(&value.to_le_bytes());
            }
        }
    }
}

#[inline]
fn plane_len(plane: &PlaneView) -> usize {
    plane.stride * plane.height as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    use ffmpeg_types::{Frame, Pts};

    #[test]
    fn reads_and_writes_through_views() {
        let mut input = Frame::new(8, 4, PixelFormat::Y8).unwrap();
        input.plane_mut(0).fill(10);
        input.pts = Some(Pts(3));
        input.sequence = 5;
        let mut output = input.clone();

        let in_view = FrameView::of(&input);
        let mut out_view = FrameView::of_mut(&mut output);
        {
            let frame_in = unsafe { FrameRef::from_view(&in_view) }.unwrap();
            let mut frame_out = unsafe { FrameMut::from_view(&mut out_view) }.unwrap();
            assert_eq!(frame_in.format(), PixelFormat::Y8);
            assert_eq!(frame_in.pts(), Some(3));
            assert_eq!(frame_out.sequence(), 5);
            assert_eq!(frame_in.plane_size(0), (8, 4));

            let source = frame_in.plane(0);
            for (dst, src) in frame_out.plane_mut(0).iter_mut().zip(source) {
                *dst = src + 1;
            }
        }

        assert_eq!(output.row(0, 0), &[11; 8]);
        assert_eq!(input.row(0, 0), &[10; 8]);
    }

    #[test]
    fn maps_high_bit_depth_samples() {
        let mut frame = Frame::new(3, 2, PixelFormat::Y10).unwrap();
        let mut view = FrameView::of_mut(&mut frame);
        {
            let mut out = unsafe { FrameMut::from_view(&mut view) }.unwrap();
            out.map_int_samples(0, |v| v + 1023 + 2);
        }
        // (0 + 1025) masked to 10 bits, stored little endian
        assert_eq!(frame.row(0, 1), &[1, 0, 1, 0, 1, 0]);
        // padding is untouched
        assert!(frame.plane(0)[6..frame.layout(0).stride].iter().all(|&b| b == 0));
    }

    #[test]
    fn maps_float_samples() {
        let mut frame = Frame::new(2, 1, PixelFormat::YF32).unwrap();
        let mut view = FrameView::of_mut(&mut frame);
        {
            let mut out = unsafe { FrameMut::from_view(&mut view) }.unwrap();
            out.map_float_samples(0, |v| 1.0 - v);
        }
        assert_eq!(&frame.row(0, 0)[..4], &1.0f32.to_le_bytes());
    }

    #[test]
    fn rejects_inconsistent_views() {
        let frame = Frame::new(8, 4, PixelFormat::YUV420P8).unwrap();

        let mut view = FrameView::of(&frame);
        view.n_planes = 2;
        assert!(unsafe { FrameRef::from_view(&view) }.is_err());

        let mut view = FrameView::of(&frame);
        view.format = 0xFFFF_FFFF;
        assert!(unsafe { FrameRef::from_view(&view) }.is_err());

        let mut view = FrameView::of(&frame);
        view.planes[2].data = std::ptr::null_mut();
        assert!(unsafe { FrameRef::from_view(&view) }.is_err());
    }
}
