use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::GraphError;
use crate::graph::label::{LabelLayout, TextMeasure};

fn create_canvas() -> Result<HtmlCanvasElement, GraphError> {
	web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.create_element("canvas").ok())
		.and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
		.ok_or(GraphError::UnsupportedRenderingSurface)
}

/// The 2D context of `canvas`, or [`GraphError::UnsupportedRenderingSurface`].
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		.ok_or(GraphError::UnsupportedRenderingSurface)
}

/// Text metrics from an offscreen canvas.
pub struct CanvasTextMeasure {
	ctx: CanvasRenderingContext2d,
}

impl CanvasTextMeasure {
	pub fn new() -> Result<Self, GraphError> {
		let canvas = create_canvas()?;
		Ok(Self {
			ctx: context_2d(&canvas)?,
		})
	}
}

impl TextMeasure for CanvasTextMeasure {
	fn width(&self, text: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		self.ctx.measure_text(text).map_or(0.0, |m| m.width())
	}
}

/// Rasterize a label layout: white text on a transparent bitmap.
pub fn render_label(layout: &LabelLayout) -> Result<HtmlCanvasElement, GraphError> {
	let canvas = create_canvas()?;
	let (w, h) = layout.canvas_size();
	canvas.set_width(w.max(1));
	canvas.set_height(h.max(1));
	let ctx = context_2d(&canvas)?;
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str("white");
	for line in &layout.lines {
		ctx.set_font(&line.font);
		let _ = ctx.fill_text(&line.text, line.x, line.y);
	}
	Ok(canvas)
}
