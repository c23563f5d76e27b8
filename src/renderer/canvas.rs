//! Canvas 2D backend
//!
//! Replays a `DrawList` onto a fixed 800x300 bitmap. CSS scales the element
//! to its container; all drawing stays in logical pixels.

use std::f64::consts::TAU;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCmd, DrawList};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

const FONT_FAMILY: &str = "monospace";

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Fails if the element has no 2d context, so no loop ever runs
    /// against a missing surface
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        context.set_image_smoothing_enabled(false);

        log::info!("Canvas surface ready ({}x{})", CANVAS_WIDTH, CANVAS_HEIGHT);
        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Map client coordinates to logical canvas space
    pub fn to_logical(&self, client_x: f64, client_y: f64) -> glam::Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 {
            CANVAS_WIDTH as f64 / rect.width()
        } else {
            1.0
        };
        let sy = if rect.height() > 0.0 {
            CANVAS_HEIGHT as f64 / rect.height()
        } else {
            1.0
        };
        glam::Vec2::new(
            ((client_x - rect.left()) * sx) as f32,
            ((client_y - rect.top()) * sy) as f32,
        )
    }

    pub fn present(&self, list: &DrawList) -> Result<(), JsValue> {
        let ctx = &self.context;
        for cmd in list.iter() {
            ctx.set_global_alpha(1.0);
            match cmd {
                DrawCmd::Clear { color } => {
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
                }
                DrawCmd::FillRect {
                    pos,
                    size,
                    color,
                    alpha,
                } => {
                    ctx.set_global_alpha(*alpha as f64);
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
                DrawCmd::StrokeRect {
                    pos,
                    size,
                    color,
                    line_width,
                } => {
                    ctx.set_stroke_style_str(color);
                    ctx.set_line_width(*line_width as f64);
                    ctx.stroke_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
                DrawCmd::FillCircle {
                    center,
                    radius,
                    color,
                    alpha,
                } => {
                    ctx.set_global_alpha(*alpha as f64);
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)?;
                    ctx.fill();
                }
                DrawCmd::Path {
                    points,
                    color,
                    line_width,
                    closed,
                } => {
                    let Some((first, rest)) = points.split_first() else {
                        continue;
                    };
                    ctx.begin_path();
                    ctx.move_to(first.x as f64, first.y as f64);
                    for p in rest {
                        ctx.line_to(p.x as f64, p.y as f64);
                    }
                    ctx.set_stroke_style_str(color);
                    ctx.set_line_width(*line_width as f64);
                    if *closed {
                        ctx.close_path();
                        ctx.set_fill_style_str(color);
                        ctx.fill();
                    }
                    ctx.stroke();
                }
                DrawCmd::Line {
                    from,
                    to,
                    color,
                    line_width,
                    dash,
                } => {
                    let pattern = js_sys::Array::new();
                    for d in dash {
                        pattern.push(&JsValue::from_f64(*d as f64));
                    }
                    ctx.set_line_dash(&pattern)?;
                    ctx.set_stroke_style_str(color);
                    ctx.set_line_width(*line_width as f64);
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.stroke();
                    ctx.set_line_dash(&js_sys::Array::new())?;
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    align,
                    color,
                } => {
                    ctx.set_fill_style_str(color);
                    ctx.set_font(&format!("{}px {}", size, FONT_FAMILY));
                    ctx.set_text_align(align.as_str());
                    ctx.set_text_baseline("middle");
                    ctx.fill_text(text, pos.x as f64, pos.y as f64)?;
                }
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}
