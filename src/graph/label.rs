//! Layout of multi-line text bitmaps. Rasterizing happens on the browser side;
//! everything here is pure and deterministic given the font metrics.

/// Font family for every label line.
pub const FONT_FACE: &str = "Arial";
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Measures rendered text width for a CSS font shorthand.
pub trait TextMeasure {
	/// Width of `text` in pixels.
	fn width(&self, text: &str, font: &str) -> f64;
}

/// Fixed advance per character; bold text is slightly wider. Used where no
/// canvas is available.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasure {
	/// Advance per character as a fraction of the font size.
	pub advance: f64,
}

impl Default for MonospaceMeasure {
	fn default() -> Self {
		Self { advance: 0.6 }
	}
}

impl TextMeasure for MonospaceMeasure {
	fn width(&self, text: &str, font: &str) -> f64 {
		let size = font_size_of(font).unwrap_or(10.0);
		let bold = if font.starts_with("bold") { 1.1 } else { 1.0 };
		text.chars().count() as f64 * size * self.advance * bold
	}
}

fn font_size_of(font: &str) -> Option<f64> {
	font.split_whitespace()
		.find_map(|part| part.strip_suffix("px"))
		.and_then(|px| px.parse().ok())
}

/// One line of text placed on the bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLine {
	/// Line content.
	pub text: String,
	/// CSS font shorthand.
	pub font: String,
	/// Left edge in bitmap pixels.
	pub x: f64,
	/// Top edge in bitmap pixels.
	pub y: f64,
}

/// Size and line placement of a text bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout {
	/// Bitmap width in pixels, borders included.
	pub width: f64,
	/// Bitmap height in pixels, borders included.
	pub height: f64,
	/// Distance between line tops.
	pub line_height: f64,
	/// Lines in draw order.
	pub lines: Vec<LabelLine>,
}

impl LabelLayout {
	/// Pixel dimensions of the backing canvas.
	pub fn canvas_size(&self) -> (u32, u32) {
		(self.width.ceil() as u32, self.height.ceil() as u32)
	}
}

/// CSS font shorthand for a label line.
pub fn font(size_px: f64, bold: bool) -> String {
	if bold {
		format!("bold {size_px}px {FONT_FACE}")
	} else {
		format!("{size_px}px {FONT_FACE}")
	}
}

/// Lay out `lines` with the first line bold. The bitmap is as wide as the
/// widest line plus a border on each side, and `line_count * line_height`
/// tall plus the borders.
pub fn layout_label<S: AsRef<str>>(
	lines: &[S],
	font_size_px: f64,
	border_px: f64,
	measure: &dyn TextMeasure,
) -> LabelLayout {
	let line_height = font_size_px * LINE_HEIGHT_FACTOR;
	let placed: Vec<LabelLine> = lines
		.iter()
		.enumerate()
		.map(|(i, text)| LabelLine {
			text: text.as_ref().to_owned(),
			font: font(font_size_px, i == 0),
			x: border_px,
			y: border_px + line_height * i as f64,
		})
		.collect();
	let widest = placed
		.iter()
		.map(|l| measure.width(&l.text, &l.font))
		.fold(0.0, f64::max);

	LabelLayout {
		width: widest + 2.0 * border_px,
		height: line_height * placed.len() as f64 + 2.0 * border_px,
		line_height,
		lines: placed,
	}
}
