use std::ffi::CStr;
use std::str::FromStr;

use thiserror::Error;

use crate::abi::OptionsView;

/**
    Errors from reading filter options.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("missing required option '{0}'")]
    Missing(String),

    #[error("option '{key}' expects {expected}, got '{value}'")]
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("option '{0}' contains a NUL byte")]
    InteriorNul(String),

    #[error("option '{0}' is not valid UTF-8")]
    NotUtf8(String),
}

/**
    The options a filter was configured with, e.g. `value=10` from
    `offset:value=10`.

    Keys are unique. Values are strings; the typed getters convert them
    and report which key was malformed.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    entries: Vec<(String, String)>,
}

impl FilterOptions {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /**
        Copy the options out of a raw view.

        # Safety

        `view` must be null or point at a valid [`OptionsView`] whose
        entries are NUL terminated strings.
    */
    pub unsafe fn from_view(view: *const OptionsView) -> Result<Self, OptionError> {
        let Some(view) = (unsafe { view.as_ref() }) else {
            return Ok(Self::default());
        };
        if view.entries.is_null() || view.len == 0 {
            return Ok(Self::default());
        }

        let raw = unsafe { std::slice::from_raw_parts(view.entries, view.len) };
        let mut entries = Vec::with_capacity(raw.len());
        for entry in raw {
            let key = unsafe { CStr::from_ptr(entry.key) }.to_string_lossy().into_owned();
            let value = unsafe { CStr::from_ptr(entry.value) }
                .to_str()
                .map_err(|_| OptionError::NotUtf8(key.clone()))?
                .to_string();
            entries.push((key, value));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /**
        Raw value of `key`, if set.
    */
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /**
        Raw value of `key`, failing if it is not set.
    */
    pub fn require(&self, key: &str) -> Result<&str, OptionError> {
        self.get(key)
            .ok_or_else(|| OptionError::Missing(key.to_string()))
    }

    /**
        Integer value of `key`, accepting an optional sign.
    */
    pub fn int(&self, key: &str) -> Result<Option<i64>, OptionError> {
        self.parse(key, "an integer")
    }

    pub fn require_int(&self, key: &str) -> Result<i64, OptionError> {
        self.int(key)?
            .ok_or_else(|| OptionError::Missing(key.to_string()))
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>, OptionError> {
        self.parse(key, "a number")
    }

    pub fn require_float(&self, key: &str) -> Result<f64, OptionError> {
        self.float(key)?
            .ok_or_else(|| OptionError::Missing(key.to_string()))
    }

    /**
        Boolean value of `key`: `true`/`false`, `yes`/`no`, `on`/`off` or
        `1`/`0`, case insensitive.
    */
    pub fn bool(&self, key: &str) -> Result<Option<bool>, OptionError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(OptionError::Invalid {
                key: key.to_string(),
                value: value.to_string(),
                expected: "a boolean",
            }),
        }
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, OptionError> {
        self.bool(key)?
            .ok_or_else(|| OptionError::Missing(key.to_string()))
    }

    fn parse<T: FromStr>(&self, key: &str, expected: &'static str) -> Result<Option<T>, OptionError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value.trim().parse().map(Some).map_err(|_| OptionError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        })
    }
}
