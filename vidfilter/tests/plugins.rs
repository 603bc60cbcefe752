use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ffmpeg_types::{Frame, PixelFormat, Pts};
use tempfile::TempDir;
use vidfilter::filter::{DynamicFilter, Filter, FilterChain, FilterError, FilterSpec};

/**
    Find the newest shared library cargo built for plugin `name`, next to
    the test executable.
*/
fn built_library(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let deps = exe.parent()?;
    let prefix = format!("{}{name}", std::env::consts::DLL_PREFIX);
    let suffix = std::env::consts::DLL_SUFFIX;

    let mut found: Option<(SystemTime, PathBuf)> = None;
    for dir in [Some(deps), deps.parent()].into_iter().flatten() {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(rest) = file_name.strip_prefix(&prefix) else {
                continue;
            };
            if !rest.ends_with(suffix) || !(rest.starts_with('-') || rest == suffix) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if found.as_ref().is_none_or(|(newest, _)| modified > *newest) {
                found = Some((modified, entry.path()));
            }
        }
    }
    found.map(|(_, path)| path)
}

/**
    A filter directory holding copies of the built plugins under their
    plain names, or `None` when they were not built.
*/
fn filter_dir() -> Option<TempDir> {
    let dir = tempfile::tempdir().unwrap();
    for name in ["invert", "offset"] {
        let Some(built) = built_library(name) else {
            eprintln!("{name} plugin not built, skipping");
            return None;
        };
        let target = dir
            .path()
            .join(format!("{name}{}", std::env::consts::DLL_SUFFIX));
        fs::copy(built, target).unwrap();
    }
    Some(dir)
}

fn ramp() -> Frame {
    let mut frame = Frame::new(16, 8, PixelFormat::YUV420P8).unwrap();
    for index in 0..frame.n_planes() {
        for (i, sample) in frame.plane_mut(index).iter_mut().enumerate() {
            *sample = (i * 5) as u8;
        }
    }
    frame
}

fn load(dir: &Path, spec: &str) -> Result<DynamicFilter, FilterError> {
    DynamicFilter::load(dir, &FilterSpec::parse(spec).unwrap())
}

#[test]
fn plugins_report_their_names() {
    let Some(dir) = filter_dir() else {
        return;
    };
    let chain = FilterChain::load(dir.path(), &["invert", "offset:value=10"]).unwrap();
    assert_eq!(chain.names().collect::<Vec<_>>(), ["invert", "offset"]);
}

#[test]
fn invert_then_offset_across_the_library_boundary() {
    let Some(dir) = filter_dir() else {
        return;
    };
    let mut chain = FilterChain::load(dir.path(), &["invert", "offset:value=10"]).unwrap();

    let mut input = ramp();
    input.sequence = 4;
    input.pts = Some(Pts(8));
    let output = chain.apply(input.clone()).unwrap();

    assert_eq!(output.sequence, 4);
    assert_eq!(output.pts, Some(Pts(8)));
    for index in 0..input.n_planes() {
        let layout = input.layout(index);
        for y in 0..layout.height {
            let expected: Vec<u8> = input.row(index, y)[..layout.width]
                .iter()
                .map(|v| (255 - v).wrapping_add(10))
                .collect();
            assert_eq!(&output.row(index, y)[..layout.width], &expected[..]);
        }
    }
}

#[test]
fn offset_without_value_fails_to_load() {
    let Some(dir) = filter_dir() else {
        return;
    };
    match FilterChain::load(dir.path(), &["invert", "offset"]) {
        Err(FilterError::InitFailed { filter, message }) => {
            assert_eq!(filter, "offset");
            assert!(message.contains("value"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn repeated_filter_is_rejected() {
    let Some(dir) = filter_dir() else {
        return;
    };
    match FilterChain::load(dir.path(), &["offset:value=1", "offset:value=2"]) {
        Err(FilterError::Duplicate { filter }) => assert_eq!(filter, "offset"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failed_init_frees_the_plugin_instance() {
    let Some(dir) = filter_dir() else {
        return;
    };
    let mut first = load(dir.path(), "invert").unwrap();
    let frame = ramp();
    let mut output = frame.clone();
    first.apply(&frame, &mut output).unwrap();

    // Same library, so the same instance slot; the failed load frees it
    assert!(matches!(
        load(dir.path(), "invert:value=1"),
        Err(FilterError::InitFailed { .. })
    ));
    match first.apply(&frame, &mut output) {
        Err(FilterError::ApplyFailed { filter, message, .. }) => {
            assert_eq!(filter, "invert");
            assert_eq!(message, "filter used before init");
        }
        other => panic!("unexpected {other:?}"),
    }
}
