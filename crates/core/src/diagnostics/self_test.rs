use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::info;

use crate::output::{OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestOptions {
    /// Pause after each frame.
    pub delay: Duration,
    /// Stop after this many frames. `None` runs until `stop` is set.
    pub max_frames: Option<u64>,
}

impl Default for SelfTestOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(200),
            max_frames: None,
        }
    }
}

/// The first self-test frame: red, green and blue on pixels 0, 1 and 2.
///
/// Strips shorter than three pixels get as many of the three as fit.
pub fn scroll_frame(n_pixels: usize) -> PixelFrame {
    let mut frame = PixelFrame::new(n_pixels);
    frame.set(0, [255.0, 0.0, 0.0]);
    frame.set(1, [0.0, 255.0, 0.0]);
    frame.set(2, [0.0, 0.0, 255.0]);
    frame
}

/// Scroll a red, a green and a blue pixel along the strip.
///
/// Each iteration shows the frame, then shifts it one pixel toward the end of
/// the strip. Runs until `stop` is set or `max_frames` frames were shown, and
/// returns the number of frames shown. The first `show` error ends the test.
pub fn run_self_test<B>(
    backend: &mut B,
    options: SelfTestOptions,
    stop: &AtomicBool,
) -> Result<u64, OutputError>
where
    B: OutputBackend + ?Sized,
{
    let n_pixels = backend.pixel_count();
    let mut frame = scroll_frame(n_pixels);
    let mut frames = 0u64;

    info!(
        "Starting LED strip test on {} backend ({} pixels)",
        backend.name(),
        n_pixels
    );
    info!("You should see a scrolling red, green, and blue pixel.");

    while !stop.load(Ordering::Relaxed) {
        if options.max_frames.is_some_and(|max| frames >= max) {
            break;
        }

        backend.show(&frame)?;
        frames += 1;
        frame.roll(1);

        if !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }
    }

    info!("LED strip test finished after {} frames", frames);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        n_pixels: usize,
        shown: Vec<PixelFrame>,
    }

    impl OutputBackend for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn pixel_count(&self) -> usize {
            self.n_pixels
        }

        fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
            self.shown.push(frame.clone());
            Ok(())
        }
    }

    fn quick(max_frames: u64) -> SelfTestOptions {
        SelfTestOptions {
            delay: Duration::ZERO,
            max_frames: Some(max_frames),
        }
    }

    #[test]
    fn test_scroll_frame_layout() {
        let frame = scroll_frame(4);
        assert_eq!(
            frame.pixels(),
            &[
                [255.0, 0.0, 0.0],
                [0.0, 255.0, 0.0],
                [0.0, 0.0, 255.0],
                [0.0, 0.0, 0.0]
            ]
        );
    }

    #[test]
    fn test_short_strip_gets_what_fits() {
        let frame = scroll_frame(1);
        assert_eq!(frame.pixels(), &[[255.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_pixels_scroll_forward() {
        let mut backend = Recorder {
            n_pixels: 4,
            shown: Vec::new(),
        };
        let frames = run_self_test(&mut backend, quick(5), &AtomicBool::new(false)).unwrap();

        assert_eq!(frames, 5);
        assert_eq!(backend.shown[1].get(1), Some([255.0, 0.0, 0.0]));
        assert_eq!(backend.shown[1].get(3), Some([0.0, 0.0, 255.0]));
        // blue wraps from the last pixel back to the first
        assert_eq!(backend.shown[2].get(0), Some([0.0, 0.0, 255.0]));
        // one full lap later the first frame repeats
        assert_eq!(backend.shown[4], backend.shown[0]);
    }

    #[test]
    fn test_stop_flag_prevents_show() {
        let mut backend = Recorder {
            n_pixels: 3,
            shown: Vec::new(),
        };
        let frames = run_self_test(&mut backend, quick(10), &AtomicBool::new(true)).unwrap();
        assert_eq!(frames, 0);
        assert!(backend.shown.is_empty());
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut backend: Box<dyn OutputBackend> = Box::new(Recorder {
            n_pixels: 3,
            shown: Vec::new(),
        });
        let frames = run_self_test(backend.as_mut(), quick(2), &AtomicBool::new(false)).unwrap();
        assert_eq!(frames, 2);
    }
}
