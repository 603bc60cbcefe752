use std::path::Path;

use tracing::info;

use ffmpeg_types::Frame;

use super::{DynamicFilter, Filter, FilterError, FilterSpec};

/**
    Filters applied one after the other, in the order they were given.

    Each filter reads the previous filter's output (or the normalized
    frame, for the first) and writes into a fresh copy of it. The chain is
    built once and reused for every file; dropping it frees every filter.
*/
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
    /// Frame handed back by the previous step, reused as the next output.
    spare: Option<Frame>,
}

impl FilterChain {
    /**
        Chain with no filters, which passes frames through untouched.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Load and initialize one shared-library filter per spec.

        Specs look like `name:key=value:...`; libraries are looked up in
        `dir`. A library holds a single filter instance, so each filter
        may be named once. If any filter fails, the ones loaded before it
        are freed and nothing is returned.
    */
    pub fn load<S: AsRef<str>>(dir: &Path, specs: &[S]) -> Result<Self, FilterError> {
        let mut chain = Self::new();

        for spec in specs {
            let spec = FilterSpec::parse(spec.as_ref())?;
            if chain.names().any(|name| name == spec.name) {
                // Both would share the library's single plugin instance
                return Err(FilterError::Duplicate { filter: spec.name });
            }

            let filter = DynamicFilter::load(dir, &spec)?;
            info!(filter = filter.name(), path = %filter.path().display(), "loaded filter");
            chain.push(Box::new(filter));
        }

        Ok(chain)
    }

    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.name())
    }

    /**
        Run `frame` through every filter.

        The returned frame keeps the input's timestamp, time base, native
        format and sequence number. The first failing filter aborts the
        chain.
    */
    pub fn apply(&mut self, frame: Frame) -> Result<Frame, FilterError> {
        let mut current = frame;

        for filter in &mut self.filters {
            let mut output = match self.spare.take() {
                Some(mut spare) if spare.same_shape(&current) => {
                    spare
                        .copy_pixels_from(&current)
                        .map_err(|e| FilterError::ApplyFailed {
                            filter: filter.name().to_string(),
                            sequence: current.sequence,
                            message: e.to_string(),
                        })?;
                    spare
                }
                _ => current.clone(),
            };
            output.pts = current.pts;
            output.time_base = current.time_base;
            output.native_format = current.native_format;
            output.sequence = current.sequence;

            filter.apply(&current, &mut output)?;
            self.spare = Some(std::mem::replace(&mut current, output));
        }

        Ok(current)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
