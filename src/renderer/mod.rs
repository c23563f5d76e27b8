//! Rendering module
//!
//! Engines never touch the canvas. Each frame a scene builder turns game
//! state into a `DrawList` in logical canvas space, and the backend replays
//! it onto a Canvas 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::build_scene;

use glam::Vec2;

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// One drawing primitive. Colors are CSS color strings.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear {
        color: String,
    },
    FillRect {
        pos: Vec2,
        size: Vec2,
        color: String,
        alpha: f32,
    },
    StrokeRect {
        pos: Vec2,
        size: Vec2,
        color: String,
        line_width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: String,
        alpha: f32,
    },
    /// Open or closed path; closed paths are filled
    Path {
        points: Vec<Vec2>,
        color: String,
        line_width: f32,
        closed: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: String,
        line_width: f32,
        /// Dash pattern; empty for a solid line
        dash: Vec<f32>,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        align: TextAlign,
        color: String,
    },
}

/// Ordered drawing commands for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn clear(&mut self, color: &str) {
        self.push(DrawCmd::Clear {
            color: color.to_string(),
        });
    }

    pub fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: &str, alpha: f32) {
        self.push(DrawCmd::FillRect {
            pos,
            size,
            color: color.to_string(),
            alpha,
        });
    }

    pub fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: &str, line_width: f32) {
        self.push(DrawCmd::StrokeRect {
            pos,
            size,
            color: color.to_string(),
            line_width,
        });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str, alpha: f32) {
        self.push(DrawCmd::FillCircle {
            center,
            radius,
            color: color.to_string(),
            alpha,
        });
    }

    pub fn path(&mut self, points: Vec<Vec2>, color: &str, line_width: f32, closed: bool) {
        self.push(DrawCmd::Path {
            points,
            color: color.to_string(),
            line_width,
            closed,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: &str, line_width: f32) {
        self.push(DrawCmd::Line {
            from,
            to,
            color: color.to_string(),
            line_width,
            dash: Vec::new(),
        });
    }

    pub fn dashed_line(&mut self, from: Vec2, to: Vec2, color: &str, dash: &[f32]) {
        self.push(DrawCmd::Line {
            from,
            to,
            color: color.to_string(),
            line_width: 2.0,
            dash: dash.to_vec(),
        });
    }

    pub fn text(&mut self, text: impl Into<String>, pos: Vec2, size: f32, align: TextAlign, color: &str) {
        self.push(DrawCmd::Text {
            text: text.into(),
            pos,
            size,
            align,
            color: color.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.cmds.iter()
    }

    /// All text drawn this frame, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every color used this frame, in order
    pub fn colors(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().map(|cmd| match cmd {
            DrawCmd::Clear { color }
            | DrawCmd::FillRect { color, .. }
            | DrawCmd::StrokeRect { color, .. }
            | DrawCmd::FillCircle { color, .. }
            | DrawCmd::Path { color, .. }
            | DrawCmd::Line { color, .. }
            | DrawCmd::Text { color, .. } => color.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_list_collects_in_order() {
        let mut list = DrawList::new();
        assert!(list.is_empty());
        list.clear("#000");
        list.text("SCORE", Vec2::ZERO, 12.0, TextAlign::Left, "#0f0");
        list.fill_rect(Vec2::ZERO, Vec2::ONE, "#f00", 1.0);
        assert_eq!(list.len(), 3);
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["SCORE"]);
        assert_eq!(list.colors().collect::<Vec<_>>(), vec!["#000", "#0f0", "#f00"]);
    }
}
