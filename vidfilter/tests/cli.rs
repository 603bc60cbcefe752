use std::path::PathBuf;

use vidfilter::cli::{Invocation, parse_from_iter};
use vidfilter::log::LogLevel;
use vidfilter::settings::{NamedOptions, SettingsError, SpecError};

fn parse(args: &[&str]) -> vidfilter::cli::Args {
    match parse_from_iter(args.iter().copied()) {
        Ok(Invocation::Run(args)) => args,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn bare_invocation_prints_help() {
    assert!(matches!(
        parse_from_iter(["vidfilter"]),
        Ok(Invocation::HelpPrinted)
    ));
}

#[test]
fn help_and_version_are_not_errors() {
    assert!(matches!(
        parse_from_iter(["vidfilter", "--help"]),
        Ok(Invocation::HelpPrinted)
    ));
    assert!(matches!(
        parse_from_iter(["vidfilter", "-V"]),
        Ok(Invocation::HelpPrinted)
    ));
}

#[test]
fn unknown_flags_are_errors() {
    assert!(parse_from_iter(["vidfilter", "--frobnicate"]).is_err());
}

#[test]
fn full_command_line() {
    let args = parse(&[
        "vidfilter",
        "-i",
        "a.mkv",
        "b.mkv",
        "-o",
        "out",
        "-e",
        "libx264:crf=23:preset=fast",
        "-f",
        "invert",
        "offset:value=10",
        "-d",
        "target/debug",
        "-l",
        "info",
    ]);

    let settings = args.into_settings().unwrap();
    assert_eq!(
        settings.inputs,
        vec![PathBuf::from("a.mkv"), PathBuf::from("b.mkv")]
    );
    assert_eq!(settings.output, PathBuf::from("out"));
    assert_eq!(
        settings.encoder,
        Some(
            NamedOptions::new("libx264")
                .with_option("crf", "23")
                .with_option("preset", "fast")
        )
    );
    assert_eq!(settings.filters, vec!["invert", "offset:value=10"]);
    assert_eq!(settings.filter_dir, PathBuf::from("target/debug"));
    assert_eq!(settings.log_level, LogLevel::Info);
}

#[test]
fn defaults() {
    let settings = parse(&["vidfilter", "-i", "a.mkv", "-o", "b.mkv"])
        .into_settings()
        .unwrap();
    assert_eq!(settings.encoder, None);
    assert!(settings.filters.is_empty());
    assert_eq!(settings.filter_dir, PathBuf::from("."));
    assert_eq!(settings.log_level, LogLevel::Progress);
}

#[test]
fn long_flags() {
    let settings = parse(&[
        "vidfilter",
        "--input",
        "a.mkv",
        "--output",
        "b.mkv",
        "--video-enc",
        "mpeg4",
        "--video-filters",
        "invert",
        "--filter-dir",
        "plugins",
        "--log-level",
        "0",
    ])
    .into_settings()
    .unwrap();
    assert_eq!(settings.encoder, Some(NamedOptions::new("mpeg4")));
    assert_eq!(settings.filters, vec!["invert"]);
    assert_eq!(settings.log_level, LogLevel::Quiet);
}

#[test]
fn invalid_log_level() {
    let result = parse(&["vidfilter", "-i", "a", "-o", "b", "-l", "loud"]).into_settings();
    assert!(matches!(result, Err(SettingsError::InvalidLogLevel(level)) if level == "loud"));

    let result = parse(&["vidfilter", "-i", "a", "-o", "b", "-l", "6"]).into_settings();
    assert!(matches!(result, Err(SettingsError::InvalidLogLevel(_))));
}

#[test]
fn invalid_encoder_spec() {
    let result = parse(&["vidfilter", "-i", "a", "-o", "b", "-e", "libx264:crf"]).into_settings();
    match result {
        Err(SettingsError::InvalidSpec { what, spec, error }) => {
            assert_eq!(what, "encoder");
            assert_eq!(spec, "libx264:crf");
            assert_eq!(error, SpecError::MissingEquals("crf".into()));
        }
        other => panic!("unexpected {other:?}"),
    }
}
