/// One channel triple in natural `[red, green, blue]` order.
///
/// Values are unclamped: effects may overshoot either end of the 0..=255
/// range and every backend clips on its own.
pub type Rgb = [f32; 3];

/// One complete set of per-pixel colors for a strip.
///
/// Pixels are stored in physical order along the strip, index 0 first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelFrame {
    pixels: Vec<Rgb>,
}

impl PixelFrame {
    /// An all-black frame of `n_pixels`.
    pub fn new(n_pixels: usize) -> Self {
        Self {
            pixels: vec![[0.0; 3]; n_pixels],
        }
    }

    pub fn from_pixels(pixels: Vec<Rgb>) -> Self {
        Self { pixels }
    }

    /// Build a frame from channel-major rows `[r0..rN]`, `[g0..gN]`, `[b0..bN]`.
    ///
    /// Returns `None` when the three rows differ in length.
    pub fn from_channels(red: &[f32], green: &[f32], blue: &[f32]) -> Option<Self> {
        if red.len() != green.len() || red.len() != blue.len() {
            return None;
        }

        let pixels = red
            .iter()
            .zip(green)
            .zip(blue)
            .map(|((&r, &g), &b)| [r, g, b])
            .collect();

        Some(Self { pixels })
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    /// Set a pixel; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, rgb: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = rgb;
        }
    }

    /// Rotate pixels `shift` positions toward the end of the strip. The last
    /// pixels wrap around to the start.
    pub fn roll(&mut self, shift: usize) {
        if self.pixels.is_empty() {
            return;
        }
        let shift = shift % self.pixels.len();
        self.pixels.rotate_right(shift);
    }

    /// Pixels clipped to `[0, ceiling]` and truncated to integers.
    pub fn clipped(&self, ceiling: u8) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels
            .iter()
            .map(move |&[r, g, b]| [clip(r, ceiling), clip(g, ceiling), clip(b, ceiling)])
    }
}

/// Clamp a channel value to `[0, ceiling]` and truncate toward zero. NaN maps to 0.
#[inline]
pub fn clip(value: f32, ceiling: u8) -> u8 {
    // `as` saturates and sends NaN to 0
    value.clamp(0.0, f32::from(ceiling)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_bounds() {
        assert_eq!(clip(-5.0, 255), 0);
        assert_eq!(clip(300.0, 255), 255);
        assert_eq!(clip(10.9, 255), 10);
        assert_eq!(clip(200.0, 128), 128);
        assert_eq!(clip(f32::NAN, 255), 0);
        assert_eq!(clip(f32::INFINITY, 255), 255);
        assert_eq!(clip(f32::NEG_INFINITY, 255), 0);
    }

    #[test]
    fn test_from_channels_transposes() {
        let frame =
            PixelFrame::from_channels(&[300.0, -5.0, 10.0], &[0.0; 3], &[0.0, 1.0, 2.0]).unwrap();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.get(0), Some([300.0, 0.0, 0.0]));
        assert_eq!(frame.get(1), Some([-5.0, 0.0, 1.0]));
        assert_eq!(frame.get(2), Some([10.0, 0.0, 2.0]));
    }

    #[test]
    fn test_from_channels_rejects_ragged_rows() {
        assert!(PixelFrame::from_channels(&[0.0; 3], &[0.0; 2], &[0.0; 3]).is_none());
    }

    #[test]
    fn test_roll_wraps_last_pixel() {
        let mut frame = PixelFrame::from_pixels(vec![[1.0; 3], [2.0; 3], [3.0; 3]]);
        frame.roll(1);
        assert_eq!(frame.pixels(), &[[3.0; 3], [1.0; 3], [2.0; 3]]);

        frame.roll(5);
        assert_eq!(frame.pixels(), &[[1.0; 3], [2.0; 3], [3.0; 3]]);
    }

    #[test]
    fn test_roll_empty_frame() {
        let mut frame = PixelFrame::new(0);
        frame.roll(1);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_set_ignores_out_of_range() {
        let mut frame = PixelFrame::new(2);
        frame.set(5, [1.0, 2.0, 3.0]);
        frame.set(1, [1.0, 2.0, 3.0]);
        assert_eq!(frame.pixels(), &[[0.0; 3], [1.0, 2.0, 3.0]]);
    }
}
