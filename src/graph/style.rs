//! The node visual factory: spheres colored by group, with image and label
//! sprites once a node's group is expanded.

use glam::Vec3;

use super::label::layout_label;
use super::store::{GraphDataStore, GraphMode};
use super::surface::{
	Halo, ImageSprite, LabelSprite, NodeVisual, NodeVisualFactory, VisualContext,
};
use super::types::{Node, NodeKind};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];
const UNGROUPED_COLOR: &str = "lightblue";

/// Sphere radius of a private-network node.
pub const NODE_RADIUS: f32 = 5.0;
const HIGHLIGHT_GROWTH: f32 = 1.4;
const IMAGE_SIZE: f32 = 20.0;
const IMAGE_OFFSET: Vec3 = Vec3::new(-15.0, 10.0, 0.0);
const LABEL_OFFSET: Vec3 = Vec3::new(-15.0, 10.0, 0.0);
/// Bitmap pixels per world unit for label sprites.
const LABEL_PIXELS_PER_UNIT: f32 = 15.0;

/// Simple pseudo-random number in [0, 1), stable per seed.
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// [`NodeVisualFactory`] for both network modes.
#[derive(Clone, Debug)]
pub struct NodeStyler {
	mode: GraphMode,
	slots: Vec<Option<usize>>,
	group_names: Vec<Option<String>>,
	/// Label font size in pixels.
	pub font_size: f64,
	/// Label border in pixels.
	pub border: f64,
}

impl NodeStyler {
	/// Styler for the nodes of `store`, in store order.
	pub fn from_store(store: &GraphDataStore, font_size: f64, border: f64) -> Self {
		let group_names = store
			.nodes()
			.iter()
			.map(|n| {
				n.group
					.as_ref()
					.and_then(|g| store.group(g))
					.map(|g| g.name.clone())
			})
			.collect();
		Self {
			mode: store.mode(),
			slots: store.group_slots(),
			group_names,
			font_size,
			border,
		}
	}

	fn group_color(&self, index: usize) -> String {
		match self.slots.get(index).copied().flatten() {
			Some(slot) => COLORS[slot % COLORS.len()].to_owned(),
			None => UNGROUPED_COLOR.to_owned(),
		}
	}

	fn person_visual(&self, node: &Node, ctx: &VisualContext<'_>) -> NodeVisual {
		let mut visual = NodeVisual {
			color: self.group_color(ctx.index),
			radius: NODE_RADIUS,
			image: None,
			label: None,
			halo: None,
			tooltip: Some(node.name.clone()),
		};
		if !node.expanded {
			return visual;
		}

		visual.image = node.image.as_ref().map(|url| ImageSprite {
			url: url.clone(),
			size: IMAGE_SIZE,
			offset: IMAGE_OFFSET,
		});
		let group_name = self.group_names.get(ctx.index).cloned().flatten();
		let lines: Vec<String> = [Some(node.name.clone()), group_name, node.header.clone()]
			.into_iter()
			.flatten()
			.filter(|l| !l.trim().is_empty())
			.collect();
		visual.label = Some(LabelSprite {
			layout: layout_label(&lines, self.font_size, self.border, ctx.measure),
			scale: 1.0 / LABEL_PIXELS_PER_UNIT,
			offset: LABEL_OFFSET,
		});
		visual.tooltip = None;
		visual
	}

	fn public_visual(&self, node: &Node, ctx: &VisualContext<'_>) -> NodeVisual {
		let users = node.user_count().unwrap_or(0);
		let radius = if users > 0 {
			(users as f32).ln() + NODE_RADIUS
		} else {
			NODE_RADIUS
		};
		NodeVisual {
			color: public_color(&node.kind, users, ctx.index),
			radius,
			image: None,
			label: None,
			halo: None,
			tooltip: Some(node.name.clone()),
		}
	}
}

impl NodeVisualFactory for NodeStyler {
	fn build(&self, node: &Node, ctx: &VisualContext<'_>) -> NodeVisual {
		let mut visual = match self.mode {
			GraphMode::Private => self.person_visual(node, ctx),
			GraphMode::Public => self.public_visual(node, ctx),
		};
		if ctx.highlighted {
			visual.radius *= HIGHLIGHT_GROWTH;
			visual.halo = Some(Halo {
				opacity: 0.45,
				scale: 1.8,
			});
		}
		visual
	}
}

/// Hue by node type, saturation by membership size, lightness jittered per
/// node within [0.3, 0.6].
pub fn public_color(kind: &NodeKind, user_count: u64, index: usize) -> String {
	let hue = match kind {
		NodeKind::Repository { .. } => 0.6,
		_ => 0.8,
	};
	let saturation = (0.5 + ((user_count + 1) as f64).ln() * 0.1).min(1.0);
	let lightness = 0.3 + rand_simple(index) * 0.3;
	format!(
		"hsl({:.0}, {:.0}%, {:.0}%)",
		hue * 360.0,
		saturation * 100.0,
		lightness * 100.0
	)
}
