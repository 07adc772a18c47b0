//! Drawing-surface contract for particle rendering.
//!
//! The engine never owns a renderer. It paints through [`Surface`], a small
//! subset of a 2D canvas context, so the same code drives a browser canvas
//! (see `spark-web`) or the headless [`RecordingSurface`].

use serde::{Deserialize, Serialize};

/// RGBA color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGB u8 values (0-255) with full opacity.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// CSS `rgba(...)` string for canvas fill styles.
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({},{},{},{})", c(self.r), c(self.g), c(self.b), self.a.clamp(0.0, 1.0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Minimal 2D drawing context. Coordinates are in surface units, angles in radians.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_fill_color(&mut self, color: Color);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    GlobalAlpha(f32),
    FillColor(Color),
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
    BeginPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Arc { x: f32, y: f32, radius: f32, start: f32, end: f32 },
    ClosePath,
    Fill,
    FillRect { x: f32, y: f32, width: f32, height: f32 },
    ClearRect { x: f32, y: f32, width: f32, height: f32 },
}

/// Headless surface that records every call, for tests and offline capture.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `fill`/`fill_rect` calls recorded.
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill | DrawCommand::FillRect { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Scale(x, y));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        self.commands.push(DrawCommand::Arc { x, y, radius, start, end });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::FillRect { x, y, width, height });
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect { x, y, width, height });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_color_string() {
        assert_eq!(Color::rgb8(255, 128, 0).to_css(), "rgba(255,128,0,1)");
        assert_eq!(Color::new(0.0, 0.0, 1.0, 0.5).to_css(), "rgba(0,0,255,0.5)");
    }

    #[test]
    fn recording_counts_fills() {
        let mut surface = RecordingSurface::new();
        surface.begin_path();
        surface.arc(0.0, 0.0, 1.0, 0.0, 1.0);
        surface.fill();
        surface.fill_rect(0.0, 0.0, 2.0, 2.0);
        assert_eq!(surface.fill_count(), 2);
        surface.clear();
        assert!(surface.commands.is_empty());
    }
}
