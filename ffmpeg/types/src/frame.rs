/*!
    The canonical planar frame.

    A [`Frame`] owns one zero-initialized, [`FRAME_ALIGN`]-aligned
    allocation. Planes are laid out back to back inside it, each described
    by a [`PlaneLayout`] of offset, dimensions and stride. Nothing outside
    this module ever does pointer arithmetic on the buffer; callers get
    slices (or, for native interop, the base pointer of a plane slice).
*/

use crate::{Error, PixelFormat, PixelFormatDescriptor, Pts, Rational, Result};

/// Upper bound on planes in any canonical layout.
pub const MAX_PLANES: usize = 4;

/// Alignment of the frame allocation and of every plane stride, in bytes.
pub const FRAME_ALIGN: usize = 64;

/**
    Opaque tag recording which native pixel format a frame was normalized
    from. Only the transform layer interprets it.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeFormat(pub i32);

/**
    Where one plane lives inside the frame allocation.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Width in samples.
    pub width: usize,
    /// Height in rows.
    pub height: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    /// Byte offset of row 0 from the start of the allocation.
    pub offset: usize,
}

impl PlaneLayout {
    /**
        Total bytes covered by the plane, `stride * height`.
    */
    #[inline]
    pub const fn len(&self) -> usize {
        self.stride * self.height
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/**
    Mutable view of one plane, handed out by [`Frame::planes_mut`].
*/
#[derive(Debug)]
pub struct PlaneMut<'a> {
    pub data: &'a mut [u8],
    pub layout: PlaneLayout,
}

impl PlaneMut<'_> {
    /**
        Mutable slice of row `y`, `stride` bytes long.
    */
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.layout.stride;
        &mut self.data[start..start + self.layout.stride]
    }
}

/**
    Owned byte buffer whose usable region starts on a [`FRAME_ALIGN`]
    boundary.
*/
struct AlignedBuffer {
    storage: Vec<u8>,
    start: usize,
    len: usize,
}

impl AlignedBuffer {
    fn zeroed(len: usize) -> Self {
        let storage = vec![0u8; len + FRAME_ALIGN];
        let start = storage.as_ptr().align_offset(FRAME_ALIGN).min(FRAME_ALIGN);
        Self {
            storage,
            start,
            len,
        }
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        // A fresh Vec may land at a different alignment offset.
        let mut copy = Self::zeroed(self.len);
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        copy
    }
}

/**
    One decoded image in a canonical planar layout.

    Plane 0 is always the full-resolution luma, gray or red plane. Chroma
    planes of YUV layouts are `ceil(dim / 2^log2)` in each direction. Every
    stride is at least `width * bytes_per_comp`, rounded up to
    [`FRAME_ALIGN`].
*/
#[derive(Clone)]
pub struct Frame {
    buffer: AlignedBuffer,
    planes: [PlaneLayout; MAX_PLANES],
    width: u32,
    height: u32,
    format: PixelFormat,
    /// Presentation timestamp.
    pub pts: Option<Pts>,
    /// Time base of `pts`.
    pub time_base: Rational,
    /// Native format this frame was normalized from.
    pub native_format: NativeFormat,
    /// Frame number as seen by filters.
    pub sequence: u64,
}

impl Frame {
    /**
        Allocate a zeroed frame.

        Fails for zero dimensions or dimensions that do not fit the native
        library's signed 32-bit sizes.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_data(format!(
                "frame dimensions {width}x{height} must be positive"
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::invalid_data(format!(
                "frame dimensions {width}x{height} are too large"
            )));
        }

        let too_large =
            || Error::invalid_data(format!("frame dimensions {width}x{height} are too large"));

        let desc = format.descriptor();
        let mut planes = [PlaneLayout::default(); MAX_PLANES];
        let mut offset = 0usize;

        for (index, plane) in planes.iter_mut().enumerate().take(desc.n_planes) {
            let (w, h) = plane_dimensions(&desc, index, width as usize, height as usize);
            let stride = w
                .checked_mul(desc.bytes_per_comp)
                .and_then(|bytes| checked_align_up(bytes, FRAME_ALIGN))
                .ok_or_else(too_large)?;
            let len = stride.checked_mul(h).ok_or_else(too_large)?;
            *plane = PlaneLayout {
                width: w,
                height: h,
                stride,
                offset,
            };
            offset = offset.checked_add(len).ok_or_else(too_large)?;
        }
        // The allocation adds alignment slack and may not exceed isize::MAX
        if offset > isize::MAX as usize - FRAME_ALIGN {
            return Err(too_large());
        }

        Ok(Self {
            buffer: AlignedBuffer::zeroed(offset),
            planes,
            width,
            height,
            format,
            pts: None,
            time_base: Rational::new(1, 1),
            native_format: NativeFormat(-1),
            sequence: 0,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn descriptor(&self) -> PixelFormatDescriptor {
        self.format.descriptor()
    }

    #[inline]
    pub fn n_planes(&self) -> usize {
        self.format.descriptor().n_planes
    }

    #[inline]
    pub fn bytes_per_comp(&self) -> usize {
        self.format.descriptor().bytes_per_comp
    }

    /**
        Total size of all planes in bytes.
    */
    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.len
    }

    /**
        Layout of plane `index`.

        # Panics

        Panics if `index` is not below [`Frame::n_planes`].
    */
    pub fn layout(&self, index: usize) -> PlaneLayout {
        assert!(index < self.n_planes(), "plane {index} out of range");
        self.planes[index]
    }

    /**
        All plane layouts in order.
    */
    pub fn layouts(&self) -> &[PlaneLayout] {
        &self.planes[..self.n_planes()]
    }

    /**
        The bytes of plane `index`, `stride * height` long.
    */
    pub fn plane(&self, index: usize) -> &[u8] {
        let layout = self.layout(index);
        &self.buffer.as_slice()[layout.offset..layout.offset + layout.len()]
    }

    /**
        The mutable bytes of plane `index`.
    */
    pub fn plane_mut(&mut self, index: usize) -> &mut [u8] {
        let layout = self.layout(index);
        &mut self.buffer.as_mut_slice()[layout.offset..layout.offset + layout.len()]
    }

    /**
        Disjoint mutable views of every plane at once.
    */
    pub fn planes_mut(&mut self) -> Vec<PlaneMut<'_>> {
        let n_planes = self.n_planes();
        let mut rest = self.buffer.as_mut_slice();
        let mut views = Vec::with_capacity(n_planes);

        for layout in &self.planes[..n_planes] {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(layout.len());
            views.push(PlaneMut { data: head, layout: *layout });
            rest = tail;
        }

        views
    }

    /**
        The meaningful bytes of row `y` of plane `index`, without padding.
    */
    pub fn row(&self, index: usize, y: usize) -> &[u8] {
        let layout = self.layout(index);
        let row_bytes = layout.width * self.bytes_per_comp();
        let start = y * layout.stride;
        &self.plane(index)[start..start + row_bytes]
    }

    /**
        Mutable counterpart of [`Frame::row`].
    */
    pub fn row_mut(&mut self, index: usize, y: usize) -> &mut [u8] {
        let layout = self.layout(index);
        let row_bytes = layout.width * self.bytes_per_comp();
        let start = y * layout.stride;
        &mut self.plane_mut(index)[start..start + row_bytes]
    }

    /**
        Returns true if both frames have the same dimensions and layout.
    */
    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /**
        Copy the pixel contents of `other` into this frame.

        Timing and sequence fields are left untouched.
    */
    pub fn copy_pixels_from(&mut self, other: &Frame) -> Result<()> {
        if !self.same_shape(other) {
            return Err(Error::invalid_data(format!(
                "cannot copy {}x{} {} into {}x{} {}",
                other.width, other.height, other.format, self.width, self.height, self.format
            )));
        }
        self.buffer.as_mut_slice().copy_from_slice(other.buffer.as_slice());
        Ok(())
    }
}

/**
    Dimensions of plane `index` for a `width` x `height` image.
*/
fn plane_dimensions(
    desc: &PixelFormatDescriptor,
    index: usize,
    width: usize,
    height: usize,
) -> (usize, usize) {
    if desc.is_chroma_plane(index) {
        (
            ceil_rshift(width, desc.log2_chroma_w),
            ceil_rshift(height, desc.log2_chroma_h),
        )
    } else {
        (width, height)
    }
}

#[inline]
fn ceil_rshift(value: usize, shift: u32) -> usize {
    (value + (1 << shift) - 1) >> shift
}

#[inline]
fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    value.div_ceil(align).checked_mul(align)
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("pts", &self.pts)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Frame: Send, Sync);
