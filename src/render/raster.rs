use image::{Rgba, RgbaImage};

use crate::render::canvas::{Align, Canvas, Color, Rect, TextStyle};
use crate::render::font::{self, GLYPH_COLS, GLYPH_ROWS};

pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 1400;

/// Canvas backed by an RGBA pixel buffer. Shapes are drawn without
/// anti-aliasing, so output depends only on the drawing calls.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Color::rgba(r, g, b, a)
    }

    /// Source-over blend of one pixel; out-of-bounds writes are dropped.
    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let alpha = color.a as u32;
        if alpha == 255 {
            *pixel = Rgba([color.r, color.g, color.b, 255]);
            return;
        }
        let inverse = 255 - alpha;
        let mix = |src: u8, dst: u8| ((src as u32 * alpha + dst as u32 * inverse + 127) / 255) as u8;
        pixel[0] = mix(color.r, pixel[0]);
        pixel[1] = mix(color.g, pixel[1]);
        pixel[2] = mix(color.b, pixel[2]);
        pixel[3] = (alpha + (pixel[3] as u32 * inverse + 127) / 255).min(255) as u8;
    }

    /// Pixel rows/columns whose centers fall in `start..end`.
    fn span(start: f32, end: f32) -> std::ops::Range<i64> {
        (start.round() as i64)..(end.round() as i64)
    }

    fn fill_where(&mut self, rect: Rect, color: Color, inside: impl Fn(f32, f32) -> bool) {
        for y in Self::span(rect.y, rect.y + rect.h) {
            for x in Self::span(rect.x, rect.x + rect.w) {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

fn in_rounded_rect(rect: Rect, radius: f32, px: f32, py: f32) -> bool {
    if px < rect.x || py < rect.y || px > rect.x + rect.w || py > rect.y + rect.h {
        return false;
    }
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    let cx = px.clamp(rect.x + r, rect.x + rect.w - r);
    let cy = py.clamp(rect.y + r, rect.y + rect.h - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

impl Canvas for RasterCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_linear_gradient(&mut self, from: Color, to: Color) {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let length = (w * w + h * h).max(1.0);
        for (x, y, pixel) in self.image.enumerate_pixels_mut() {
            let t = (x as f32 * w + y as f32 * h) / length;
            let c = from.lerp(to, t);
            *pixel = Rgba([c.r, c.g, c.b, c.a]);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_where(rect, color, |_, _| true);
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.fill_where(rect, color, |px, py| in_rounded_rect(rect, radius, px, py));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, line_width: f32, color: Color) {
        let half = line_width / 2.0;
        let outer = Rect::new(rect.x - half, rect.y - half, rect.w + line_width, rect.h + line_width);
        let inner = Rect::new(rect.x + half, rect.y + half, rect.w - line_width, rect.h - line_width);
        self.fill_where(outer, color, |px, py| {
            in_rounded_rect(outer, radius + half, px, py)
                && !in_rounded_rect(inner, (radius - half).max(0.0), px, py)
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let unit = font::pixel_size(style.size);
        let left = match style.align {
            Align::Left => x,
            Align::Right => x - self.measure_text(text, style.size),
        };
        let advance = font::advance(style.size);

        for (i, ch) in text.chars().enumerate() {
            let origin_x = left + i as f32 * advance;
            for (row, bits) in font::glyph(ch).iter().enumerate().take(GLYPH_ROWS as usize) {
                for col in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                        continue;
                    }
                    let cell = Rect::new(
                        origin_x + col as f32 * unit,
                        y + row as f32 * unit,
                        unit,
                        unit,
                    );
                    self.fill_rect(cell, style.color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::rgb(255, 255, 255);

    #[test]
    fn fill_rect_covers_exact_pixels() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.fill_rect(Rect::new(2.0, 3.0, 4.0, 2.0), WHITE);
        assert_eq!(canvas.pixel(2, 3), WHITE);
        assert_eq!(canvas.pixel(5, 4), WHITE);
        assert_eq!(canvas.pixel(6, 4).a, 0);
        assert_eq!(canvas.pixel(2, 5).a, 0);
    }

    #[test]
    fn half_alpha_blends_over_opaque() {
        let mut canvas = RasterCanvas::new(2, 2);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::rgb(0, 0, 0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgba(255, 255, 255, 128));
        assert_eq!(canvas.pixel(0, 0), Color::rgb(128, 128, 128));
        assert_eq!(canvas.pixel(1, 1), Color::rgb(0, 0, 0));
    }

    #[test]
    fn rounded_corners_are_cut() {
        let mut canvas = RasterCanvas::new(40, 40);
        canvas.fill_rounded_rect(Rect::new(0.0, 0.0, 40.0, 40.0), 12.0, WHITE);
        assert_eq!(canvas.pixel(0, 0).a, 0);
        assert_eq!(canvas.pixel(20, 0), WHITE);
        assert_eq!(canvas.pixel(20, 20), WHITE);
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut canvas = RasterCanvas::new(40, 40);
        canvas.stroke_rounded_rect(Rect::new(5.0, 5.0, 30.0, 30.0), 6.0, 2.0, WHITE);
        assert_eq!(canvas.pixel(20, 5), WHITE);
        assert_eq!(canvas.pixel(20, 20).a, 0);
    }

    #[test]
    fn text_stays_inside_measured_box() {
        let mut canvas = RasterCanvas::new(100, 30);
        let style = TextStyle::new(16.0, WHITE).right();
        canvas.draw_text("7%", 90.0, 4.0, style);
        let width = canvas.measure_text("7%", 16.0) as u32;
        for y in 0..30 {
            for x in 0..100 {
                if canvas.pixel(x, y).a > 0 {
                    assert!(x >= 90 - width && x < 90, "pixel at {x},{y}");
                    assert!((4..4 + 16).contains(&y), "pixel at {x},{y}");
                }
            }
        }
        assert!(canvas.image().pixels().any(|p| p.0[3] > 0));
    }

    #[test]
    fn into_image_keeps_drawn_pixels() {
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), WHITE);
        let expected = canvas.image().clone();
        let image = canvas.into_image();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image, expected);
        assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn gradient_runs_corner_to_corner() {
        let mut canvas = RasterCanvas::new(20, 20);
        let (from, to) = (Color::rgb(0, 0, 0), Color::rgb(200, 200, 200));
        canvas.fill_linear_gradient(from, to);
        assert_eq!(canvas.pixel(0, 0), from);
        assert!(canvas.pixel(19, 19).r > 180);
    }
}
