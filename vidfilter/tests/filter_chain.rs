use std::sync::{Arc, Mutex};

use ffmpeg_types::{Frame, PixelFormat, Pts};
use vidfilter::filter::{Filter, FilterChain, FilterError};

/// Bitwise not of every sample of every plane.
struct Invert;

impl Filter for Invert {
    fn name(&self) -> &str {
        "invert"
    }

    fn apply(&mut self, input: &Frame, output: &mut Frame) -> Result<(), FilterError> {
        for index in 0..input.n_planes() {
            for (out, sample) in output.plane_mut(index).iter_mut().zip(input.plane(index)) {
                *out = !sample;
            }
        }
        Ok(())
    }
}

/// Wrapping add of a constant to every sample.
struct AddConstant(u8);

impl Filter for AddConstant {
    fn name(&self) -> &str {
        "offset"
    }

    fn apply(&mut self, input: &Frame, output: &mut Frame) -> Result<(), FilterError> {
        for index in 0..input.n_planes() {
            for (out, sample) in output.plane_mut(index).iter_mut().zip(input.plane(index)) {
                *out = sample.wrapping_add(self.0);
            }
        }
        Ok(())
    }
}

/// Records the sequence numbers it sees and passes frames through.
struct Recorder(Arc<Mutex<Vec<u64>>>);

impl Filter for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn apply(&mut self, input: &Frame, _output: &mut Frame) -> Result<(), FilterError> {
        self.0.lock().unwrap().push(input.sequence);
        Ok(())
    }
}

struct Fail;

impl Filter for Fail {
    fn name(&self) -> &str {
        "fail"
    }

    fn apply(&mut self, input: &Frame, _output: &mut Frame) -> Result<(), FilterError> {
        Err(FilterError::ApplyFailed {
            filter: "fail".into(),
            sequence: input.sequence,
            message: "refused".into(),
        })
    }
}

fn ramp() -> Frame {
    let mut frame = Frame::new(16, 8, PixelFormat::YUV420P8).unwrap();
    for index in 0..frame.n_planes() {
        for (i, sample) in frame.plane_mut(index).iter_mut().enumerate() {
            *sample = (i * 7) as u8;
        }
    }
    frame
}

#[test]
fn filters_apply_in_declared_order() {
    let input = ramp();

    let mut chain = FilterChain::new();
    chain.push(Box::new(Invert));
    chain.push(Box::new(AddConstant(10)));
    let output = chain.apply(input.clone()).unwrap();

    for index in 0..input.n_planes() {
        let layout = input.layout(index);
        for y in 0..layout.height {
            let expected: Vec<u8> = input.row(index, y)[..layout.width]
                .iter()
                .map(|v| (!v).wrapping_add(10))
                .collect();
            assert_eq!(&output.row(index, y)[..layout.width], &expected[..]);
        }
    }

    // The other order gives ~(x + c)
    let mut reversed = FilterChain::new();
    reversed.push(Box::new(AddConstant(10)));
    reversed.push(Box::new(Invert));
    let other = reversed.apply(input.clone()).unwrap();
    assert_ne!(output.plane(0), other.plane(0));
}

#[test]
fn empty_chain_keeps_content() {
    let input = ramp();
    let output = FilterChain::new().apply(input.clone()).unwrap();
    for index in 0..input.n_planes() {
        assert_eq!(output.plane(index), input.plane(index));
    }
}

#[test]
fn timing_and_sequence_survive_the_chain() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut chain = FilterChain::new();
    chain.push(Box::new(Invert));
    chain.push(Box::new(Recorder(Arc::clone(&seen))));

    for sequence in 0..4 {
        let mut frame = ramp();
        frame.sequence = sequence;
        frame.pts = Some(Pts(sequence as i64 * 3));
        let output = chain.apply(frame).unwrap();
        assert_eq!(output.sequence, sequence);
        assert_eq!(output.pts, Some(Pts(sequence as i64 * 3)));
    }
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
}

#[test]
fn failing_filter_stops_the_chain() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut chain = FilterChain::new();
    chain.push(Box::new(Fail));
    chain.push(Box::new(Recorder(Arc::clone(&seen))));

    let mut frame = ramp();
    frame.sequence = 7;
    match chain.apply(frame) {
        Err(FilterError::ApplyFailed { filter, sequence, .. }) => {
            assert_eq!(filter, "fail");
            assert_eq!(sequence, 7);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(seen.lock().unwrap().is_empty());
}
