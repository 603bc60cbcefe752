/*!
    The raw plugin ABI.

    Everything here is `#[repr(C)]` and shared verbatim between the host
    and every filter library, so any layout change must bump
    [`ABI_VERSION`].
*/

use std::ffi::{CString, c_char, c_int};

use ffmpeg_types::{Frame, MAX_PLANES};

use crate::OptionError;

/// Layout version of every type in this module.
pub const ABI_VERSION: u32 = 1;

/// Name of the symbol every filter library exports, NUL terminated.
pub const EXPORT_SYMBOL: &[u8] = b"vidfilter_export_filter\0";

/// `pts` value of a frame without a timestamp.
pub const PTS_NONE: i64 = i64::MIN;

pub const STATUS_OK: c_int = 0;
pub const STATUS_ERROR: c_int = -1;

/// Size of the error message buffer the host hands to `init` and `apply`.
pub const ERROR_CAPACITY: usize = 512;

pub type ExportFn = unsafe extern "C" fn() -> *const FilterDescriptor;
pub type InitFn = unsafe extern "C" fn(options: *const OptionsView, error: *mut ErrorBuf) -> c_int;
pub type ApplyFn = unsafe extern "C" fn(
    input: *const FrameView,
    output: *mut FrameView,
    error: *mut ErrorBuf,
) -> c_int;
pub type FreeFn = unsafe extern "C" fn();

/**
    What a filter library exports.

    `name` and `apply` are mandatory; a missing `init` means the filter
    takes no options and a missing `free` means it holds no state.
*/
#[repr(C)]
#[derive(Debug)]
pub struct FilterDescriptor {
    pub abi_version: u32,
    /// NUL terminated, static for the lifetime of the library.
    pub name: *const c_char,
    pub init: Option<InitFn>,
    pub apply: Option<ApplyFn>,
    pub free: Option<FreeFn>,
}

// SAFETY: the descriptor is immutable and only points at static data
unsafe impl Sync for FilterDescriptor {}

/**
    One plane of a [`FrameView`].
*/
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PlaneView {
    pub data: *mut u8,
    /// Width in samples.
    pub width: u32,
    pub height: u32,
    /// Bytes between rows, at least `width * bytes_per_comp`.
    pub stride: usize,
}

impl PlaneView {
    const EMPTY: Self = Self {
        data: std::ptr::null_mut(),
        width: 0,
        height: 0,
        stride: 0,
    };
}

/**
    A canonical frame as seen across the plugin boundary.

    The host builds views over frames it owns; a view is only valid for
    the duration of the call it is passed to.
*/
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct FrameView {
    pub width: u32,
    pub height: u32,
    /// Raw [`PixelFormat`](ffmpeg_types::PixelFormat) tag.
    pub format: u32,
    pub n_planes: u32,
    pub planes: [PlaneView; MAX_PLANES],
    /// Frame number, starting at 0 for the first frame of a stream.
    pub sequence: u64,
    /// Presentation timestamp, or [`PTS_NONE`].
    pub pts: i64,
}

impl FrameView {
    /**
        Read-only view of `frame`.

        The data pointers are typed `*mut` to share [`PlaneView`] with
        output views, but nothing may write through them.
    */
    pub fn of(frame: &Frame) -> Self {
        let mut planes = [PlaneView::EMPTY; MAX_PLANES];
        for (index, plane) in planes.iter_mut().enumerate().take(frame.n_planes()) {
            let layout = frame.layout(index);
            *plane = PlaneView {
                data: frame.plane(index).as_ptr().cast_mut(),
                width: layout.width as u32,
                height: layout.height as u32,
                stride: layout.stride,
            };
        }
        Self::with_planes(frame, planes)
    }

    /**
        Writable view of `frame`.
    */
    pub fn of_mut(frame: &mut Frame) -> Self {
        let mut planes = [PlaneView::EMPTY; MAX_PLANES];
        for (plane, view) in frame.planes_mut().into_iter().zip(planes.iter_mut()) {
            *view = PlaneView {
                data: plane.data.as_mut_ptr(),
                width: plane.layout.width as u32,
                height: plane.layout.height as u32,
                stride: plane.layout.stride,
            };
        }
        Self::with_planes(frame, planes)
    }

    fn with_planes(frame: &Frame, planes: [PlaneView; MAX_PLANES]) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            format: frame.format().raw(),
            n_planes: frame.n_planes() as u32,
            planes,
            sequence: frame.sequence,
            pts: frame.pts.map_or(PTS_NONE, |p| p.0),
        }
    }
}

/**
    One option passed to `init`.
*/
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct OptionEntry {
    pub key: *const c_char,
    pub value: *const c_char,
}

/**
    The options passed to `init`, as an array of NUL terminated pairs.
*/
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct OptionsView {
    pub entries: *const OptionEntry,
    pub len: usize,
}

/**
    Owned C strings backing an [`OptionsView`].
*/
#[derive(Debug)]
pub struct OptionsBuffer {
    _strings: Vec<(CString, CString)>,
    entries: Vec<OptionEntry>,
}

impl OptionsBuffer {
    /**
        Convert key/value pairs to C strings.

        Fails if a key or value contains a NUL byte.
    */
    pub fn new(pairs: &[(String, String)]) -> Result<Self, OptionError> {
        let strings = pairs
            .iter()
            .map(|(key, value)| {
                let c_key = CString::new(key.as_str())
                    .map_err(|_| OptionError::InteriorNul(key.clone()))?;
                let c_value = CString::new(value.as_str())
                    .map_err(|_| OptionError::InteriorNul(key.clone()))?;
                Ok((c_key, c_value))
            })
            .collect::<Result<Vec<_>, OptionError>>()?;

        // CString contents live on the heap, so the pointers survive moving `strings`
        let entries = strings
            .iter()
            .map(|(key, value)| OptionEntry {
                key: key.as_ptr(),
                value: value.as_ptr(),
            })
            .collect();

        Ok(Self {
            _strings: strings,
            entries,
        })
    }

    /**
        View valid for as long as this buffer lives.
    */
    pub fn view(&self) -> OptionsView {
        OptionsView {
            entries: self.entries.as_ptr(),
            len: self.entries.len(),
        }
    }
}

/**
    Caller-owned buffer a filter writes its error message into.
*/
#[repr(C)]
#[derive(Debug)]
pub struct ErrorBuf {
    pub data: *mut c_char,
    pub capacity: usize,
}

impl ErrorBuf {
    /**
        Write `message`, truncated to fit and NUL terminated.

        # Safety

        `buf` must be null or point at an `ErrorBuf` whose `data` is
        valid for `capacity` bytes.
    */
    pub unsafe fn write(buf: *mut ErrorBuf, message: &str) {
        let Some(buf) = (unsafe { buf.as_mut() }) else {
            return;
        };
        if buf.data.is_null() || buf.capacity == 0 {
            return;
        }

        let len = message.len().min(buf.capacity - 1);
        unsafe {
            std::ptr::copy_nonoverlapping(message.as_ptr(), buf.data.cast::<u8>(), len);
            *buf.data.add(len) = 0;
        }
    }
}

/**
    Host-side storage for an [`ErrorBuf`].
*/
pub struct ErrorStorage {
    bytes: [c_char; ERROR_CAPACITY],
}

impl ErrorStorage {
    pub fn new() -> Self {
        Self {
            bytes: [0; ERROR_CAPACITY],
        }
    }

    /**
        Buffer pointing into this storage, valid while it is not moved.
    */
    pub fn buf(&mut self) -> ErrorBuf {
        ErrorBuf {
            data: self.bytes.as_mut_ptr(),
            capacity: ERROR_CAPACITY,
        }
    }

    /**
        The message written so far, or `None` if the filter wrote nothing.
    */
    pub fn message(&self) -> Option<String> {
        let bytes: Vec<u8> = self
            .bytes
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        (!bytes.is_empty()).then(|| String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for ErrorStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorStorage")
            .field("message", &self.message())
            .finish()
    }
}
