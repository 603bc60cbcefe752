/*!
    Filters loaded from shared libraries.
*/

use std::ffi::CStr;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, warn};

use ffmpeg_types::Frame;
use vidfilter_sdk::abi::{
    ABI_VERSION, ApplyFn, EXPORT_SYMBOL, ErrorStorage, ExportFn, FrameView, FreeFn, InitFn,
    OptionsBuffer, STATUS_OK,
};

use super::{Filter, FilterError, FilterSpec};

/**
    Paths tried for filter `name`, in order: `dir/name.ext`, then the
    platform's library prefix form (`dir/libname.so`) that cargo builds.
*/
pub fn library_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let suffix = std::env::consts::DLL_SUFFIX;
    let prefix = std::env::consts::DLL_PREFIX;

    let mut candidates = vec![dir.join(format!("{name}{suffix}"))];
    if !prefix.is_empty() {
        candidates.push(dir.join(format!("{prefix}{name}{suffix}")));
    }
    candidates
}

/**
    A filter living in a shared library.

    The library stays loaded for as long as the filter exists. Dropping
    the filter calls its `free` function, then unloads the library.
*/
pub struct DynamicFilter {
    name: String,
    path: PathBuf,
    apply: ApplyFn,
    free: Option<FreeFn>,
    // Declared last: dropped after `Drop::drop` has called `free`
    _library: Library,
}

impl DynamicFilter {
    /**
        Load the library for `spec` from `dir` and initialize it with the
        spec's options.
    */
    pub fn load(dir: &Path, spec: &FilterSpec) -> Result<Self, FilterError> {
        let candidates = library_candidates(dir, &spec.name);
        let Some(path) = candidates.iter().find(|p| p.is_file()).cloned() else {
            return Err(FilterError::LibraryNotFound {
                path: candidates[0].clone(),
            });
        };

        debug!(path = %path.display(), "loading filter library");

        // SAFETY: loading a library runs its initializers; filter libraries
        // are trusted the same way the executable is
        let library = unsafe { Library::new(&path) }.map_err(|error| FilterError::LoadFailed {
            path: path.clone(),
            error,
        })?;

        let export: ExportFn = unsafe { library.get::<ExportFn>(EXPORT_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|error| FilterError::MissingSymbol {
                path: path.clone(),
                error,
            })?;

        // SAFETY: the descriptor is static data of `library`, read before
        // the library can be unloaded
        let descriptor = unsafe { export().as_ref() }
            .ok_or_else(|| FilterError::NoDescriptor { path: path.clone() })?;

        if descriptor.abi_version != ABI_VERSION {
            return Err(FilterError::AbiMismatch {
                path,
                found: descriptor.abi_version,
                expected: ABI_VERSION,
            });
        }

        if descriptor.name.is_null() {
            return Err(FilterError::MissingName { path });
        }
        let name = unsafe { CStr::from_ptr(descriptor.name) }
            .to_string_lossy()
            .into_owned();
        if name.is_empty() {
            return Err(FilterError::MissingName { path });
        }

        let apply = descriptor
            .apply
            .ok_or_else(|| FilterError::MissingApply {
                filter: name.clone(),
            })?;
        let init = descriptor.init;

        let filter = Self {
            name,
            path,
            apply,
            free: descriptor.free,
            _library: library,
        };

        // On failure `filter` is dropped here, which still calls `free`
        filter.init(init, &spec.options)?;

        debug!(filter = %filter.name, path = %filter.path.display(), "filter ready");
        Ok(filter)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init(&self, init: Option<InitFn>, options: &[(String, String)]) -> Result<(), FilterError> {
        let Some(init) = init else {
            if !options.is_empty() {
                warn!(filter = %self.name, "filter takes no options, ignoring them");
            }
            return Ok(());
        };

        let buffer = OptionsBuffer::new(options).map_err(|error| FilterError::InvalidOption {
            filter: self.name.clone(),
            error,
        })?;
        let view = buffer.view();
        let mut storage = ErrorStorage::new();
        let mut error = storage.buf();

        // SAFETY: `view` and `error` point into buffers that outlive the call
        let status = unsafe { init(&view, &mut error) };
        if status != STATUS_OK {
            return Err(FilterError::InitFailed {
                filter: self.name.clone(),
                message: storage
                    .message()
                    .unwrap_or_else(|| format!("init returned {status}")),
            });
        }

        Ok(())
    }
}

impl Filter for DynamicFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, input: &Frame, output: &mut Frame) -> Result<(), FilterError> {
        let in_view = FrameView::of(input);
        let mut out_view = FrameView::of_mut(output);
        let mut storage = ErrorStorage::new();
        let mut error = storage.buf();

        // SAFETY: both views cover frames borrowed for the whole call, and
        // `output` is borrowed mutably so nothing else touches its planes
        let status = unsafe { (self.apply)(&in_view, &mut out_view, &mut error) };
        if status != STATUS_OK {
            return Err(FilterError::ApplyFailed {
                filter: self.name.clone(),
                sequence: input.sequence,
                message: storage
                    .message()
                    .unwrap_or_else(|| format!("apply returned {status}")),
            });
        }

        Ok(())
    }
}

impl Drop for DynamicFilter {
    fn drop(&mut self) {
        debug!(filter = %self.name, "unloading filter");
        if let Some(free) = self.free {
            // SAFETY: the library is still loaded; `_library` drops after this
            unsafe { free() };
        }
    }
}

impl std::fmt::Debug for DynamicFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFilter")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_use_platform_naming() {
        let dir = Path::new("filters");
        let candidates = library_candidates(dir, "invert");
        let suffix = std::env::consts::DLL_SUFFIX;
        assert_eq!(candidates[0], dir.join(format!("invert{suffix}")));
        if cfg!(unix) {
            assert_eq!(candidates[1], dir.join(format!("libinvert{suffix}")));
        }
    }

    #[test]
    fn missing_library_is_reported_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let spec = FilterSpec::parse("nosuchfilter").unwrap();
        match DynamicFilter::load(dir.path(), &spec) {
            Err(FilterError::LibraryNotFound { path }) => {
                assert_eq!(path, library_candidates(dir.path(), "nosuchfilter")[0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_library_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_candidates(dir.path(), "broken").remove(0);
        std::fs::write(&path, b"not a shared library").unwrap();

        let spec = FilterSpec::parse("broken").unwrap();
        assert!(matches!(
            DynamicFilter::load(dir.path(), &spec),
            Err(FilterError::LoadFailed { .. })
        ));
    }
}
