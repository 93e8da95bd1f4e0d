use std::collections::HashMap;
use std::f64::consts::PI;

use glam::Vec3;
use log::debug;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::label_canvas::render_label;
use super::scene::{CanvasScene, Projected};
use crate::graph::label::LabelLayout;
use crate::graph::surface::{ImageSprite, LabelSprite, NodeVisual};

const TOOLTIP_FONT: &str = "12px Arial";
const MIN_LINK_WIDTH: f64 = 0.3;

/// Rasterized labels and decoded images, reused across frames.
#[derive(Default)]
pub struct SpriteCache {
	labels: HashMap<usize, (LabelLayout, HtmlCanvasElement)>,
	images: HashMap<String, HtmlImageElement>,
}

impl SpriteCache {
	fn label(&mut self, index: usize, layout: &LabelLayout) -> Option<&HtmlCanvasElement> {
		let stale = self.labels.get(&index).is_none_or(|(cached, _)| cached != layout);
		if stale {
			match render_label(layout) {
				Ok(canvas) => {
					self.labels.insert(index, (layout.clone(), canvas));
				}
				Err(e) => {
					debug!("Label bitmap unavailable: {e}");
					return None;
				}
			}
		}
		self.labels.get(&index).map(|(_, canvas)| canvas)
	}

	fn image(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			let image = HtmlImageElement::new().ok()?;
			image.set_cross_origin(Some("anonymous"));
			image.set_src(url);
			self.images.insert(url.to_owned(), image);
		}
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

pub fn render(scene: &CanvasScene, ctx: &CanvasRenderingContext2d, sprites: &mut SpriteCache) {
	ctx.set_fill_style_str(&scene.background);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);

	let projected: Vec<Option<Projected>> = scene
		.simulation
		.bodies()
		.iter()
		.map(|b| scene.project(b.position))
		.collect();

	draw_links(scene, ctx, &projected);
	draw_nodes(scene, ctx, sprites, &projected);
	draw_tooltip(scene, ctx, &projected);
}

fn draw_links(scene: &CanvasScene, ctx: &CanvasRenderingContext2d, projected: &[Option<Projected>]) {
	ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", scene.link_opacity));
	for link in scene.links() {
		let (Some(Some(a)), Some(Some(b))) = (projected.get(link.source), projected.get(link.target))
		else {
			continue;
		};
		let scale = (a.scale + b.scale) * 0.5;
		ctx.set_line_width((scene.link_width as f64 * scale).max(MIN_LINK_WIDTH));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(
	scene: &CanvasScene,
	ctx: &CanvasRenderingContext2d,
	sprites: &mut SpriteCache,
	projected: &[Option<Projected>],
) {
	let mut order: Vec<(usize, Projected)> = projected
		.iter()
		.enumerate()
		.filter_map(|(i, p)| p.map(|p| (i, p)))
		.collect();
	// Far to near so closer nodes paint over farther ones.
	order.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

	let bodies = scene.simulation.bodies();
	for (index, p) in order {
		let Some(visual) = scene.visuals().get(index) else {
			continue;
		};
		let radius = visual.radius as f64 * p.scale;
		draw_halo(ctx, visual, p, radius);

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&visual.color);
		ctx.fill();
		if scene.hover == Some(index) {
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		let position = bodies[index].position;
		if let Some(image) = &visual.image {
			draw_image(scene, ctx, sprites, position, image);
		}
		if let Some(label) = &visual.label {
			draw_label(scene, ctx, sprites, index, position, label);
		}
	}
}

fn draw_halo(ctx: &CanvasRenderingContext2d, visual: &NodeVisual, p: Projected, radius: f64) {
	let Some(halo) = visual.halo else {
		return;
	};
	let glow_radius = radius * halo.scale as f64;
	let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, radius * 0.3, p.x, p.y, glow_radius)
	else {
		return;
	};
	let alpha = halo.opacity;
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_image(
	scene: &CanvasScene,
	ctx: &CanvasRenderingContext2d,
	sprites: &mut SpriteCache,
	position: Vec3,
	sprite: &ImageSprite,
) {
	let Some(p) = scene.project(position + sprite.offset) else {
		return;
	};
	let Some(image) = sprites.image(&sprite.url) else {
		return;
	};
	let size = sprite.size as f64 * p.scale;
	let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
		image,
		p.x - size * 0.5,
		p.y - size * 0.5,
		size,
		size,
	);
}

fn draw_label(
	scene: &CanvasScene,
	ctx: &CanvasRenderingContext2d,
	sprites: &mut SpriteCache,
	index: usize,
	position: Vec3,
	sprite: &LabelSprite,
) {
	let Some(p) = scene.project(position + sprite.offset) else {
		return;
	};
	let Some(bitmap) = sprites.label(index, &sprite.layout) else {
		return;
	};
	let k = sprite.scale as f64 * p.scale;
	let (w, h) = (sprite.layout.width * k, sprite.layout.height * k);
	let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
		bitmap,
		p.x - w * 0.5,
		p.y - h * 0.5,
		w,
		h,
	);
}

fn draw_tooltip(scene: &CanvasScene, ctx: &CanvasRenderingContext2d, projected: &[Option<Projected>]) {
	let Some(index) = scene.hover else {
		return;
	};
	let (Some(Some(p)), Some(visual)) = (projected.get(index), scene.visuals().get(index)) else {
		return;
	};
	let Some(text) = &visual.tooltip else {
		return;
	};
	ctx.set_font(TOOLTIP_FONT);
	let width = ctx.measure_text(text).map_or(0.0, |m| m.width());
	let (x, y) = (p.x + visual.radius as f64 * p.scale + 6.0, p.y - 10.0);
	ctx.set_fill_style_str("rgba(0, 0, 0, 0.75)");
	ctx.fill_rect(x, y, width + 10.0, 20.0);
	ctx.set_fill_style_str("white");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(text, x + 5.0, y + 10.0);
}
