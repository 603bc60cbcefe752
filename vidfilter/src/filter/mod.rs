/*!
    Frame filters and the chain that runs them.

    Filters are usually shared libraries loaded at startup
    ([`DynamicFilter`]), but anything implementing [`Filter`] can sit in a
    [`FilterChain`].
*/

mod chain;
mod dynamic;
mod error;

use std::str::FromStr;

use ffmpeg_types::Frame;

use crate::settings::NamedOptions;

pub use chain::FilterChain;
pub use dynamic::{DynamicFilter, library_candidates};
pub use error::FilterError;

/**
    One step of a [`FilterChain`].
*/
pub trait Filter: Send {
    /// Display name, used in logs and errors.
    fn name(&self) -> &str;

    /**
        Transform `input` into `output`.

        `output` holds a copy of `input` when this is called, including
        timestamp and sequence number. Neither frame may be retained past
        the call.
    */
    fn apply(&mut self, input: &Frame, output: &mut Frame) -> Result<(), FilterError>;
}

/**
    A filter as named on the command line, e.g. `offset:value=10`.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: String,
    pub options: Vec<(String, String)>,
}

impl FilterSpec {
    pub fn parse(spec: &str) -> Result<Self, FilterError> {
        spec.parse()
    }
}

impl FromStr for FilterSpec {
    type Err = FilterError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let NamedOptions { name, options } =
            spec.parse().map_err(|error| FilterError::InvalidSpec {
                spec: spec.to_string(),
                error,
            })?;
        Ok(Self { name, options })
    }
}
