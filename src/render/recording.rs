use crate::render::canvas::{Canvas, Color, Rect, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Gradient { from: Color, to: Color },
    FillRect { rect: Rect, color: Color },
    FillRoundedRect { rect: Rect, radius: f32, color: Color },
    StrokeRoundedRect { rect: Rect, radius: f32, line_width: f32, color: Color },
    Text { text: String, x: f32, y: f32, style: TextStyle },
}

/// Canvas that keeps the drawing calls instead of pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text runs in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.text_ops().map(|(text, _)| text).collect()
    }

    pub fn text_ops(&self) -> impl Iterator<Item = (&str, &TextStyle)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, style, .. } => Some((text.as_str(), style)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_linear_gradient(&mut self, from: Color, to: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Gradient { from, to });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.ops.push(DrawOp::FillRoundedRect { rect, radius, color });
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, line_width: f32, color: Color) {
        self.ops.push(DrawOp::StrokeRoundedRect {
            rect,
            radius,
            line_width,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }
}
