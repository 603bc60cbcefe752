/*!
    Validated run configuration.

    [`Settings`] is built from the command line (see [`crate::cli`]) or
    directly by library users, then checked once with
    [`Settings::validate`] before any file is opened.
*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::log::LogLevel;

/**
    Errors in a `name:key=value:...` spec.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("missing name")]
    MissingName,

    #[error("expected options after ':'")]
    MissingOptions,

    #[error("option '{0}' is missing '='")]
    MissingEquals(String),

    #[error("option has an empty key")]
    EmptyKey,

    #[error("option '{0}' has an empty value")]
    EmptyValue(String),

    #[error("option '{0}' is given more than once")]
    DuplicateKey(String),
}

/**
    Errors found while validating [`Settings`].
*/
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no input file given")]
    NoInput,

    #[error("no output file given")]
    NoOutput,

    #[error("input file \"{}\" does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("input \"{}\" has no file name", .0.display())]
    InputWithoutName(PathBuf),

    #[error("output \"{}\" is also an input", .0.display())]
    OutputIsInput(PathBuf),

    #[error("output \"{}\" would be written by more than one input", .0.display())]
    DuplicateOutput(PathBuf),

    #[error("output \"{}\" exists and is not a directory", .0.display())]
    OutputNotDirectory(PathBuf),

    #[error("failed to create output directory \"{}\": {error}", path.display())]
    CreateOutputDirectory { path: PathBuf, error: io::Error },

    #[error("invalid {what} \"{spec}\": {error}")]
    InvalidSpec {
        what: &'static str,
        spec: String,
        error: SpecError,
    },

    #[error("invalid log level \"{0}\"")]
    InvalidLogLevel(String),
}

/**
    A component name with its options, e.g. `libx264:crf=23:preset=fast`.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedOptions {
    pub name: String,
    /// Options in the order given. Keys are unique.
    pub options: Vec<(String, String)>,
}

impl NamedOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}

impl FromStr for NamedOptions {
    type Err = SpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (name, options) = match spec.split_once(':') {
            Some((name, options)) => (name, Some(options)),
            None => (spec, None),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(SpecError::MissingName);
        }

        let options = match options {
            Some(options) => parse_options(options)?,
            None => Vec::new(),
        };

        Ok(Self {
            name: name.to_string(),
            options,
        })
    }
}

/**
    Parse `key=value:key2=value2`.
*/
pub fn parse_options(spec: &str) -> Result<Vec<(String, String)>, SpecError> {
    let mut options: Vec<(String, String)> = Vec::new();

    for item in spec.split(':') {
        if item.is_empty() {
            return Err(SpecError::MissingOptions);
        }
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| SpecError::MissingEquals(item.to_string()))?;
        if key.is_empty() {
            return Err(SpecError::EmptyKey);
        }
        if value.is_empty() {
            return Err(SpecError::EmptyValue(key.to_string()));
        }
        if options.iter().any(|(k, _)| k == key) {
            return Err(SpecError::DuplicateKey(key.to_string()));
        }
        options.push((key.to_string(), value.to_string()));
    }

    Ok(options)
}

/**
    Everything a run needs to know.
*/
#[derive(Debug, Clone)]
pub struct Settings {
    pub inputs: Vec<PathBuf>,
    /// Output file, or output directory when there is more than one input.
    pub output: PathBuf,
    /// Set by [`Settings::validate`] when `output` is used as a directory.
    pub output_folder: Option<PathBuf>,
    /// Encoder and its private options; `None` picks the default encoder.
    pub encoder: Option<NamedOptions>,
    /// Filter specs in application order, parsed when the chain is built.
    pub filters: Vec<String>,
    pub filter_dir: PathBuf,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::new(),
            output_folder: None,
            encoder: None,
            filters: Vec::new(),
            filter_dir: PathBuf::from("."),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /**
        Check the settings against the filesystem.

        Every input must exist, checked for all of them before anything
        else happens. No output may be an input, and no two inputs may
        share an output. With more than one input the output is a
        directory, created (non-recursively) if it is missing.
    */
    pub fn validate(&mut self) -> Result<(), SettingsError> {
        if self.inputs.is_empty() {
            return Err(SettingsError::NoInput);
        }
        if self.output.as_os_str().is_empty() {
            return Err(SettingsError::NoOutput);
        }

        for input in &self.inputs {
            if !input.is_file() {
                return Err(SettingsError::InputNotFound(input.clone()));
            }
        }

        self.output_folder = None;
        let folder = if self.inputs.len() > 1 {
            if let Some(input) = self.inputs.iter().find(|i| i.file_name().is_none()) {
                return Err(SettingsError::InputWithoutName(input.clone()));
            }
            Some(self.output.clone())
        } else {
            None
        };

        self.check_outputs(folder.as_deref())?;
        if let Some(folder) = &folder {
            ensure_directory(folder)?;
        }
        self.output_folder = folder;

        Ok(())
    }

    /**
        Output file for input `index`.

        In multi-input mode this is the input's file name inside the
        output folder.
    */
    pub fn output_for(&self, index: usize) -> Option<PathBuf> {
        self.planned_output(index, self.output_folder.as_deref())
    }

    fn planned_output(&self, index: usize, folder: Option<&Path>) -> Option<PathBuf> {
        let input = self.inputs.get(index)?;
        match folder {
            Some(folder) => input.file_name().map(|name| folder.join(name)),
            None => Some(self.output.clone()),
        }
    }

    fn check_outputs(&self, folder: Option<&Path>) -> Result<(), SettingsError> {
        let inputs: Vec<PathBuf> = self.inputs.iter().map(|i| resolve(i)).collect();
        let mut outputs = Vec::with_capacity(self.inputs.len());

        for index in 0..self.inputs.len() {
            let Some(output) = self.planned_output(index, folder) else {
                continue;
            };
            let resolved = resolve(&output);
            if inputs.contains(&resolved) {
                return Err(SettingsError::OutputIsInput(output));
            }
            if outputs.contains(&resolved) {
                return Err(SettingsError::DuplicateOutput(output));
            }
            outputs.push(resolved);
        }

        Ok(())
    }
}

/**
    Absolute form of `path` with every existing ancestor canonicalized,
    so two spellings of one file compare equal before it exists.
*/
fn resolve(path: &Path) -> PathBuf {
    if let Ok(path) = fs::canonicalize(path) {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => resolve(parent).join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

fn ensure_directory(path: &Path) -> Result<(), SettingsError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(SettingsError::OutputNotDirectory(path.to_path_buf()));
    }
    fs::create_dir(path).map_err(|error| SettingsError::CreateOutputDirectory {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_name_only() {
        let spec: NamedOptions = "invert".parse().unwrap();
        assert_eq!(spec, NamedOptions::new("invert"));
    }

    #[test]
    fn parses_options() {
        let spec: NamedOptions = "libx264:crf=23:preset=fast".parse().unwrap();
        assert_eq!(spec.name, "libx264");
        assert_eq!(spec.options, pairs(&[("crf", "23"), ("preset", "fast")]));
    }

    #[test]
    fn values_may_contain_equals() {
        let options = parse_options("x264-params=keyint=60").unwrap();
        assert_eq!(options, pairs(&[("x264-params", "keyint=60")]));
    }

    #[test]
    fn rejects_malformed_specs() {
        let parse = |s: &str| s.parse::<NamedOptions>().unwrap_err();
        assert_eq!(parse(""), SpecError::MissingName);
        assert_eq!(parse(":a=1"), SpecError::MissingName);
        assert_eq!(parse("offset:"), SpecError::MissingOptions);
        assert_eq!(parse("offset:value=1:"), SpecError::MissingOptions);
        assert_eq!(parse("offset:value"), SpecError::MissingEquals("value".into()));
        assert_eq!(parse("offset:=1"), SpecError::EmptyKey);
        assert_eq!(parse("offset:value="), SpecError::EmptyValue("value".into()));
        assert_eq!(
            parse("offset:value=1:value=2"),
            SpecError::DuplicateKey("value".into())
        );
        assert_eq!(parse("offset:").to_string(), "expected options after ':'");
    }

    #[test]
    fn validate_requires_input_and_output() {
        let mut settings = Settings::default();
        assert!(matches!(settings.validate(), Err(SettingsError::NoInput)));

        let file = tempfile::NamedTempFile::new().unwrap();
        settings.inputs.push(file.path().to_path_buf());
        assert!(matches!(settings.validate(), Err(SettingsError::NoOutput)));
    }

    #[test]
    fn validate_checks_every_input() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.mkv");
        fs::write(&present, b"").unwrap();
        let missing = dir.path().join("b.mkv");

        let mut settings = Settings {
            inputs: vec![present, missing.clone()],
            output: dir.path().join("out"),
            ..Settings::default()
        };
        match settings.validate() {
            Err(SettingsError::InputNotFound(path)) => assert_eq!(path, missing),
            other => panic!("unexpected {other:?}"),
        }
        // Nothing is created when validation fails
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn single_input_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mkv");
        fs::write(&input, b"").unwrap();

        let mut settings = Settings {
            inputs: vec![input],
            output: dir.path().join("result.mkv"),
            ..Settings::default()
        };
        settings.validate().unwrap();
        assert_eq!(settings.output_folder, None);
        assert_eq!(settings.output_for(0), Some(dir.path().join("result.mkv")));
        assert_eq!(settings.output_for(1), None);
    }

    #[test]
    fn multiple_inputs_use_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mp4");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();
        let out = dir.path().join("out");

        let mut settings = Settings {
            inputs: vec![a, b],
            output: out.clone(),
            ..Settings::default()
        };
        settings.validate().unwrap();
        assert!(out.is_dir());
        assert_eq!(settings.output_for(0), Some(out.join("a.mkv")));
        assert_eq!(settings.output_for(1), Some(out.join("b.mp4")));

        // An existing folder is reused
        settings.validate().unwrap();
    }

    #[test]
    fn output_folder_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mkv");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        let mut settings = Settings {
            inputs: vec![a.clone(), b],
            output: a,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::OutputNotDirectory(_))
        ));
    }

    #[test]
    fn output_folder_is_not_created_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mkv");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        let mut settings = Settings {
            inputs: vec![a, b],
            output: dir.path().join("missing").join("out"),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::CreateOutputDirectory { .. })
        ));
    }

    #[test]
    fn output_may_not_be_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mkv");
        fs::write(&input, b"video").unwrap();

        let mut settings = Settings {
            inputs: vec![input],
            output: dir.path().join(".").join("in.mkv"),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::OutputIsInput(_))
        ));
        assert_eq!(fs::read(dir.path().join("in.mkv")).unwrap(), b"video");
    }

    #[test]
    fn output_folder_may_not_hold_the_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mkv");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        let mut settings = Settings {
            inputs: vec![a, b],
            output: dir.path().to_path_buf(),
            ..Settings::default()
        };
        match settings.validate() {
            Err(SettingsError::OutputIsInput(path)) => {
                assert_eq!(path, dir.path().join("a.mkv"))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(settings.output_folder, None);
    }

    #[test]
    fn inputs_may_not_share_an_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir(&first).unwrap();
        fs::create_dir(&second).unwrap();
        fs::write(first.join("clip.mkv"), b"").unwrap();
        fs::write(second.join("clip.mkv"), b"").unwrap();
        let out = dir.path().join("out");

        let mut settings = Settings {
            inputs: vec![first.join("clip.mkv"), second.join("clip.mkv")],
            output: out.clone(),
            ..Settings::default()
        };
        match settings.validate() {
            Err(SettingsError::DuplicateOutput(path)) => assert_eq!(path, out.join("clip.mkv")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!out.exists());
    }
}
