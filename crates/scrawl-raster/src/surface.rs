//! RGBA8 pixel surface with segment stroking.

use kurbo::Point;
use scrawl_core::{Rgba, Segment};

/// An owned RGBA8 pixel buffer.
///
/// Stroking paints every pixel whose center lies within half the stroke
/// width of the segment's centerline, which gives round caps and makes the
/// output a pure function of the draw calls. Stroking is not idempotent
/// (semi-transparent colors accumulate); a full redraw is made idempotent by
/// clearing first.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Rgba,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a surface filled with white.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Rgba::white())
    }

    /// Create a surface filled with the given background color.
    pub fn with_background(width: u32, height: u32, background: Rgba) -> Self {
        let mut surface = Self {
            width,
            height,
            background,
            pixels: vec![0; width as usize * height as usize * 4],
        };
        surface.clear();
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Read one pixel. Out-of-bounds reads return the background color.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return self.background;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Reset every pixel to the background color.
    pub fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = self.background.r;
            px[1] = self.background.g;
            px[2] = self.background.b;
            px[3] = self.background.a;
        }
    }

    /// True when no stroke has touched the surface since the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| {
            px[0] == self.background.r
                && px[1] == self.background.g
                && px[2] == self.background.b
                && px[3] == self.background.a
        })
    }

    /// Reallocate the buffer blank at a new size. Callers replay the board
    /// afterwards to restore content.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        self.clear();
    }

    /// Stroke one segment. Malformed colors paint black; a zero-length
    /// segment paints a dot.
    pub fn stroke_segment(&mut self, segment: &Segment) {
        let color = Rgba::from_hex_or_black(&segment.color);
        let radius = (segment.size / 2.0).max(0.0);

        // Only the inflated bounding box needs scanning.
        let bounds = segment.bounds();
        let x_min = bounds.x0.floor().max(0.0) as u32;
        let y_min = bounds.y0.floor().max(0.0) as u32;
        let x_max = (bounds.x1.ceil().min(f64::from(self.width)) as u32).min(self.width);
        let y_max = (bounds.y1.ceil().min(f64::from(self.height)) as u32).min(self.height);

        for y in y_min..y_max {
            for x in x_min..x_max {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if segment.distance_to(center) <= radius {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Replay an ordered board: clear, then stroke each segment in order.
    /// An empty board yields a blank surface.
    pub fn replay(&mut self, segments: &[Segment]) {
        self.clear();
        for segment in segments {
            self.stroke_segment(segment);
        }
    }

    /// Source-over blend of `color` onto the pixel at (x, y).
    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        if color.a == 255 {
            self.pixels[i] = color.r;
            self.pixels[i + 1] = color.g;
            self.pixels[i + 2] = color.b;
            self.pixels[i + 3] = 255;
            return;
        }
        let src_a = u32::from(color.a);
        let inv_a = 255 - src_a;
        for (offset, src) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = u32::from(self.pixels[i + offset]);
            self.pixels[i + offset] = ((u32::from(src) * src_a + dst * inv_a) / 255) as u8;
        }
        let dst_a = u32::from(self.pixels[i + 3]);
        self.pixels[i + 3] = (src_a + dst_a * inv_a / 255).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64, color: &str, size: f64) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1), color, size)
    }

    #[test]
    fn test_new_surface_is_blank() {
        let surface = Surface::new(16, 16);
        assert!(surface.is_blank());
        assert_eq!(surface.pixel(0, 0), Rgba::white());
    }

    #[test]
    fn test_stroke_paints_centerline() {
        let mut surface = Surface::new(32, 32);
        surface.stroke_segment(&seg(4.0, 16.0, 28.0, 16.0, "#000", 4.0));

        assert!(!surface.is_blank());
        assert_eq!(surface.pixel(16, 16), Rgba::black());
        // Far from the stroke remains background.
        assert_eq!(surface.pixel(16, 2), Rgba::white());
    }

    #[test]
    fn test_zero_length_segment_paints_dot() {
        let mut surface = Surface::new(16, 16);
        surface.stroke_segment(&seg(8.0, 8.0, 8.0, 8.0, "#f00", 6.0));
        assert_eq!(surface.pixel(8, 8), Rgba::new(255, 0, 0, 255));
        assert!(!surface.is_blank());
    }

    #[test]
    fn test_stroke_clips_to_surface() {
        let mut surface = Surface::new(8, 8);
        // Endpoints well outside the buffer must not panic.
        surface.stroke_segment(&seg(-50.0, 4.0, 50.0, 4.0, "#000", 2.0));
        assert_eq!(surface.pixel(4, 4), Rgba::black());
    }

    #[test]
    fn test_render_clear_replay_matches_single_render() {
        let s = seg(0.0, 0.0, 10.0, 10.0, "#000", 2.0);

        let mut once = Surface::new(24, 24);
        once.stroke_segment(&s);

        let mut replayed = Surface::new(24, 24);
        replayed.stroke_segment(&s);
        replayed.clear();
        replayed.replay(std::slice::from_ref(&s));

        assert_eq!(once.pixels(), replayed.pixels());
    }

    #[test]
    fn test_replay_empty_is_blank() {
        let mut surface = Surface::new(24, 24);
        surface.stroke_segment(&seg(0.0, 0.0, 20.0, 20.0, "#00f", 3.0));
        assert!(!surface.is_blank());

        surface.replay(&[]);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_replay_preserves_draw_order() {
        // Overlapping opaque strokes: the later segment wins on the overlap,
        // so replay order is observable.
        let red = seg(2.0, 8.0, 14.0, 8.0, "#f00", 4.0);
        let blue = seg(8.0, 2.0, 8.0, 14.0, "#00f", 4.0);

        let mut surface = Surface::new(16, 16);
        surface.replay(&[red.clone(), blue.clone()]);
        assert_eq!(surface.pixel(8, 8), Rgba::new(0, 0, 255, 255));

        surface.replay(&[blue, red]);
        assert_eq!(surface.pixel(8, 8), Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn test_resize_blanks_surface() {
        let mut surface = Surface::new(16, 16);
        surface.stroke_segment(&seg(0.0, 0.0, 15.0, 15.0, "#000", 2.0));
        surface.resize(32, 8);
        assert_eq!(surface.width(), 32);
        assert_eq!(surface.height(), 8);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_malformed_color_paints_black() {
        let mut surface = Surface::new(8, 8);
        surface.stroke_segment(&seg(0.0, 4.0, 8.0, 4.0, "chartreuse", 2.0));
        assert_eq!(surface.pixel(4, 4), Rgba::black());
    }
}
