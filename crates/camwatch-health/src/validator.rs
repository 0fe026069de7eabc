//! Frame validity heuristic.
//!
//! A frozen, solid-colour or garbage-decoded feed produces an image with
//! almost no spread in intensity. Requiring a minimum luma variance tells
//! those apart from live video without any image understanding.

use crate::frame::Frame;

/// Default minimum luma variance.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 10.0;

/// Accepts frames whose intensity variance reaches a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameValidator {
    threshold: f64,
}

impl Default for FrameValidator {
    fn default() -> Self {
        Self::new(DEFAULT_VARIANCE_THRESHOLD)
    }
}

impl FrameValidator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `frame` is evidence of a live feed.
    pub fn validate(&self, frame: Option<&Frame>) -> bool {
        let Some(frame) = frame else {
            return false;
        };
        if frame.is_empty() {
            return false;
        }
        match frame.to_luma() {
            Some(luma) => variance(&luma) >= self.threshold,
            None => false,
        }
    }
}

/// Population variance of 8-bit samples.
pub fn variance(samples: &[u8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    samples
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;

    fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Frame {
        Frame::new(width, height, PixelFormat::Gray8, pixels)
    }

    #[test]
    fn rejects_missing_frame() {
        assert!(!FrameValidator::default().validate(None));
    }

    #[test]
    fn rejects_empty_frame() {
        let frame = gray(0, 0, Vec::new());
        assert!(!FrameValidator::default().validate(Some(&frame)));
    }

    #[test]
    fn rejects_solid_colour() {
        let frame = gray(4, 4, vec![128; 16]);
        assert!(!FrameValidator::default().validate(Some(&frame)));
    }

    #[test]
    fn rejects_malformed_buffer() {
        // Declares 4x4 RGB but carries 5 bytes.
        let frame = Frame::new(4, 4, PixelFormat::Rgb8, vec![0u8, 255, 0, 255, 0]);
        assert!(!FrameValidator::new(0.0).validate(Some(&frame)));
    }

    #[test]
    fn rejects_just_below_threshold() {
        // Deviations ±1, 0, 0 → variance 0.5.
        let frame = gray(2, 2, vec![101, 99, 100, 100]);
        assert_eq!(variance(&[101, 99, 100, 100]), 0.5);
        assert!(!FrameValidator::new(0.5001).validate(Some(&frame)));
    }

    #[test]
    fn accepts_exactly_at_threshold() {
        // Deviations ±4, ±2 → (16 + 16 + 4 + 4) / 4 = 10.
        let pixels = vec![104, 96, 102, 98];
        assert_eq!(variance(&pixels), 10.0);
        let frame = gray(2, 2, pixels);
        assert!(FrameValidator::default().validate(Some(&frame)));
    }

    #[test]
    fn accepts_noisy_colour_frame() {
        let data: Vec<u8> = (0..8 * 8 * 3).map(|i| (i * 37 % 256) as u8).collect();
        let frame = Frame::new(8, 8, PixelFormat::Bgr8, data);
        assert!(FrameValidator::default().validate(Some(&frame)));
    }

    #[test]
    fn variance_of_nothing_is_zero() {
        assert_eq!(variance(&[]), 0.0);
    }
}
