/*!
    Safe plugin trait and the glue [`export_filter!`](crate::export_filter)
    expands to.
*/

use std::ffi::{CStr, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::abi::{ErrorBuf, FrameView, OptionsView, STATUS_ERROR, STATUS_OK};
use crate::{FilterOptions, FrameMut, FrameRef};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/**
    A filter written against the safe API.

    The host creates one instance per loaded library through
    [`FilterPlugin::init`] and calls [`FilterPlugin::apply`] for every
    frame, in order. The instance is dropped when the host frees the
    filter.
*/
pub trait FilterPlugin: Send + Sized + 'static {
    /// Display name, reported to the host.
    const NAME: &'static CStr;

    fn init(options: &FilterOptions) -> Result<Self, BoxError>;

    /**
        Transform one frame.

        `output` starts out as a copy of `input`, with the same layout.
    */
    fn apply(&mut self, input: &FrameRef<'_>, output: &mut FrameMut<'_>) -> Result<(), BoxError>;
}

/**
    Holds the plugin instance of one library between ABI calls.
*/
#[doc(hidden)]
pub struct PluginSlot<P> {
    plugin: Mutex<Option<P>>,
}

impl<P: FilterPlugin> PluginSlot<P> {
    pub const fn new() -> Self {
        Self {
            plugin: Mutex::new(None),
        }
    }

    /**
        # Safety

        Arguments must satisfy the `init` contract of the ABI.
    */
    pub unsafe fn init(&self, options: *const OptionsView, error: *mut ErrorBuf) -> c_int {
        let options = match unsafe { FilterOptions::from_view(options) } {
            Ok(options) => options,
            Err(e) => return unsafe { fail(error, &e.to_string()) },
        };

        match catch_unwind(AssertUnwindSafe(|| P::init(&options))) {
            Ok(Ok(plugin)) => {
                *self.lock() = Some(plugin);
                STATUS_OK
            }
            Ok(Err(e)) => unsafe { fail(error, &e.to_string()) },
            Err(_) => unsafe { fail(error, "filter panicked during init") },
        }
    }

    /**
        # Safety

        Arguments must satisfy the `apply` contract of the ABI.
    */
    pub unsafe fn apply(
        &self,
        input: *const FrameView,
        output: *mut FrameView,
        error: *mut ErrorBuf,
    ) -> c_int {
        let (Some(input), Some(output)) = (unsafe { input.as_ref() }, unsafe { output.as_mut() })
        else {
            return unsafe { fail(error, "null frame") };
        };
        let input = match unsafe { FrameRef::from_view(input) } {
            Ok(frame) => frame,
            Err(e) => return unsafe { fail(error, &e) },
        };
        let mut output = match unsafe { FrameMut::from_view(output) } {
            Ok(frame) => frame,
            Err(e) => return unsafe { fail(error, &e) },
        };

        let mut guard = self.lock();
        let Some(plugin) = guard.as_mut() else {
            return unsafe { fail(error, "filter used before init") };
        };

        match catch_unwind(AssertUnwindSafe(|| plugin.apply(&input, &mut output))) {
            Ok(Ok(())) => STATUS_OK,
            Ok(Err(e)) => unsafe { fail(error, &e.to_string()) },
            Err(_) => {
                // The instance may be half updated
                guard.take();
                unsafe { fail(error, "filter panicked") }
            }
        }
    }

    pub fn free(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<P>> {
        self.plugin.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: FilterPlugin> Default for PluginSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe fn fail(error: *mut ErrorBuf, message: &str) -> c_int {
    unsafe { ErrorBuf::write(error, message) };
    STATUS_ERROR
}
