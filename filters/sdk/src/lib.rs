/*!
    Plugin ABI and authoring helpers for vidfilter filters.

    A filter is a shared library exporting one C-linkage symbol,
    [`abi::EXPORT_SYMBOL`], that returns a pointer to a static
    [`abi::FilterDescriptor`]. The host loads the library, calls `init`
    once with the filter's options, `apply` once per frame, and `free`
    once before unloading it.

    Filters written in Rust never have to touch the raw ABI: implement
    [`FilterPlugin`] and invoke [`export_filter!`].

    ```ignore
    use std::ffi::CStr;
    use vidfilter_sdk::{BoxError, FilterOptions, FilterPlugin, FrameMut, FrameRef, export_filter};

    struct Brighten {
        amount: u8,
    }

    impl FilterPlugin for Brighten {
        const NAME: &'static CStr = c"brighten";

        fn init(options: &FilterOptions) -> Result<Self, BoxError> {
            let amount = options.int("amount")?.unwrap_or(16);
            Ok(Self { amount: amount.clamp(0, 255) as u8 })
        }

        fn apply(&mut self, _input: &FrameRef<'_>, output: &mut FrameMut<'_>) -> Result<(), BoxError> {
            for byte in output.plane_mut(0) {
                *byte = byte.saturating_add(self.amount);
            }
            Ok(())
        }
    }

    export_filter!(Brighten);
    ```
*/

pub mod abi;
mod options;
mod plugin;
mod view;

pub use options::{FilterOptions, OptionError};
pub use plugin::{BoxError, FilterPlugin, PluginSlot};
pub use view::{FrameMut, FrameRef};

pub use ffmpeg_types::{ColorModel, ComponentType, PixelFormat, PixelFormatDescriptor};

/**
    Export a [`FilterPlugin`] implementation from a `cdylib`.

    Expands to the static descriptor, the `extern "C"` trampolines and
    the exported `vidfilter_export_filter` symbol. Use it exactly once
    per library.
*/
#[macro_export]
macro_rules! export_filter {
    ($plugin:ty) => {
        static __VIDFILTER_SLOT: $crate::PluginSlot<$plugin> = $crate::PluginSlot::new();

        static __VIDFILTER_DESCRIPTOR: $crate::abi::FilterDescriptor =
            $crate::abi::FilterDescriptor {
                abi_version: $crate::abi::ABI_VERSION,
                name: <$plugin as $crate::FilterPlugin>::NAME.as_ptr(),
                init: Some(__vidfilter_init),
                apply: Some(__vidfilter_apply),
                free: Some(__vidfilter_free),
            };

        unsafe extern "C" fn __vidfilter_init(
            options: *const $crate::abi::OptionsView,
            error: *mut $crate::abi::ErrorBuf,
        ) -> ::std::ffi::c_int {
            unsafe { __VIDFILTER_SLOT.init(options, error) }
        }

        unsafe extern "C" fn __vidfilter_apply(
            input: *const $crate::abi::FrameView,
            output: *mut $crate::abi::FrameView,
            error: *mut $crate::abi::ErrorBuf,
        ) -> ::std::ffi::c_int {
            unsafe { __VIDFILTER_SLOT.apply(input, output, error) }
        }

        unsafe extern "C" fn __vidfilter_free() {
            __VIDFILTER_SLOT.free();
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn vidfilter_export_filter() -> *const $crate::abi::FilterDescriptor {
            &__VIDFILTER_DESCRIPTOR
        }
    };
}
