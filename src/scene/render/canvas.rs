use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCommand, DrawList};
use crate::core::error::{FxError, FxResult};
use crate::systems::effects::Viewport;

/// Replays a `DrawList` onto a 2d canvas context.
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn from_element_id(id: &str) -> FxResult<Self> {
        let document = window()
            .and_then(|w| w.document())
            .ok_or_else(|| FxError::Host("no document".into()))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| FxError::Host(format!("no element #{}", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| FxError::Host(format!("#{} is not a canvas", id)))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> FxResult<Self> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(FxError::MissingRenderContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FxError::UnsupportedCanvasMode("2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the displayed size times the device
    /// pixel ratio; drawing stays in CSS pixels.
    pub fn fit_to_display(&self) -> FxResult<Viewport> {
        let dpr = window().map_or(1.0, |w| w.device_pixel_ratio()).max(1.0);
        let css_w = self.canvas.client_width().max(0) as f64;
        let css_h = self.canvas.client_height().max(0) as f64;
        self.canvas.set_width((css_w * dpr).round() as u32);
        self.canvas.set_height((css_h * dpr).round() as u32);
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
        Ok(Viewport::new(css_w as f32, css_h as f32))
    }

    pub fn draw(&self, list: &DrawList) -> FxResult<()> {
        let ctx = &self.ctx;
        for cmd in list.commands() {
            match *cmd {
                DrawCommand::Clear { color, alpha } => {
                    ctx.set_global_alpha(1.0);
                    ctx.set_fill_style_str(&color.css(alpha));
                    ctx.fill_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
                }
                DrawCommand::Circle { x, y, radius, color, alpha } => {
                    ctx.set_global_alpha(alpha as f64);
                    ctx.set_fill_style_str(&color.css(1.0));
                    ctx.begin_path();
                    ctx.arc(x as f64, y as f64, radius as f64, 0.0, TAU)?;
                    ctx.fill();
                }
                DrawCommand::Glow { x, y, radius, color, alpha } => {
                    if radius <= 0.0 {
                        continue;
                    }
                    let (x, y, r) = (x as f64, y as f64, radius as f64);
                    let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, r)?;
                    gradient.add_color_stop(0.0, &color.css(1.0))?;
                    gradient.add_color_stop(1.0, &color.css(0.0))?;
                    ctx.set_global_alpha(alpha as f64);
                    ctx.set_fill_style_canvas_gradient(&gradient);
                    ctx.begin_path();
                    ctx.arc(x, y, r, 0.0, TAU)?;
                    ctx.fill();
                }
                DrawCommand::Line { x0, y0, x1, y1, width, color, alpha } => {
                    ctx.set_global_alpha(alpha as f64);
                    ctx.set_stroke_style_str(&color.css(1.0));
                    ctx.set_line_width(width as f64);
                    ctx.begin_path();
                    ctx.move_to(x0 as f64, y0 as f64);
                    ctx.line_to(x1 as f64, y1 as f64);
                    ctx.stroke();
                }
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}
