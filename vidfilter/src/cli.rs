/*!
    Command line front end.
*/

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;

use crate::driver;
use crate::log::{self, LogLevel};
use crate::settings::{NamedOptions, Settings, SettingsError};

static VERSION: LazyLock<String> = LazyLock::new(|| {
    let codec = ffmpeg_next::codec::version();
    format!(
        "{} (libavcodec {}.{}.{})",
        env!("CARGO_PKG_VERSION"),
        codec >> 16,
        (codec >> 8) & 0xff,
        codec & 0xff
    )
});

/**
    Transcode videos through a chain of filters loaded from shared
    libraries.
*/
#[derive(Debug, Parser)]
#[command(name = "vidfilter", version = VERSION.as_str(), arg_required_else_help = true)]
pub struct Args {
    /// Input file(s). With more than one, the output is a directory.
    #[arg(short, long, num_args = 1.., value_name = "FILE")]
    pub input: Vec<PathBuf>,

    /// Output file, or output directory for several inputs.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Video encoder and its options, e.g. libx264:crf=23.
    #[arg(short = 'e', long = "video-enc", value_name = "ENCODER[:OPT=VAL...]")]
    pub video_encoder: Option<String>,

    /// Filters in application order, e.g. invert offset:value=10. Each
    /// filter may be listed at most once.
    #[arg(short = 'f', long = "video-filters", num_args = 1.., value_name = "FILTER[:OPT=VAL...]")]
    pub video_filters: Vec<String>,

    /// Directory the filter libraries are loaded from.
    #[arg(short = 'd', long, default_value = ".", value_name = "DIR")]
    pub filter_dir: PathBuf,

    /// quiet, error, progress, warn, info or verbose (or 0 to 5).
    #[arg(short, long, default_value = "progress", value_name = "LEVEL")]
    pub log_level: String,
}

/**
    What the command line asked for.
*/
#[derive(Debug)]
pub enum Invocation {
    Run(Args),
    /// Help or version text was printed; nothing else to do.
    HelpPrinted,
}

impl Args {
    /**
        Turn the arguments into unvalidated [`Settings`].
    */
    pub fn into_settings(self) -> Result<Settings, SettingsError> {
        let log_level: LogLevel = self.log_level.parse()?;
        let encoder = self
            .video_encoder
            .map(|spec| {
                spec.parse::<NamedOptions>()
                    .map_err(|error| SettingsError::InvalidSpec {
                        what: "encoder",
                        spec,
                        error,
                    })
            })
            .transpose()?;

        Ok(Settings {
            inputs: self.input,
            output: self.output.unwrap_or_default(),
            output_folder: None,
            encoder,
            filters: self.video_filters,
            filter_dir: self.filter_dir,
            log_level,
        })
    }
}

pub fn parse_from_env() -> Result<Invocation, clap::Error> {
    parse_from_iter(std::env::args_os())
}

/**
    Parse `args`, the first being the program name.

    Help and version requests, and a bare invocation without arguments,
    print their text and yield [`Invocation::HelpPrinted`].
*/
pub fn parse_from_iter<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(Invocation::Run(args)),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            let _ = e.print();
            Ok(Invocation::HelpPrinted)
        }
        Err(e) => Err(e),
    }
}

/**
    Set up logging, validate and transcode.
*/
pub fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = match args.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            // Still report through the logger
            log::init(LogLevel::default());
            return Err(e.into());
        }
    };
    log::init(settings.log_level);

    settings.validate().context("invalid settings")?;
    driver::run(&settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn help_says_filters_are_listed_once() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("at most once"), "{help}");
    }

    #[test]
    fn version_names_libavcodec() {
        assert!(VERSION.contains("libavcodec"));
    }
}
