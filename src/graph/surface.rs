//! The capability surface the core drives on the rendering collaborator.
//!
//! The collaborator owns a body table (position, velocity, pinned target)
//! indexed by store position, plus one [`NodeVisual`] per node. The core writes
//! domain state and visual parameters; the collaborator's simulation writes
//! positions and velocities.

use std::rc::Rc;

use glam::Vec3;

use super::label::{LabelLayout, TextMeasure};
use super::types::{LinkEnds, Node};

/// Physics state of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// World position.
	pub position: Vec3,
	/// Per-tick displacement before damping.
	pub velocity: Vec3,
	/// When set, the simulation snaps the body here each tick.
	pub pin: Option<Vec3>,
}

/// A per-tick force. `alpha` is the simulation's current cooling factor.
pub trait Force {
	/// Adjust velocities for one tick.
	fn apply(&mut self, bodies: &mut [Body], alpha: f32);
}

impl<F: FnMut(&mut [Body], f32)> Force for F {
	fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
		self(bodies, alpha)
	}
}

/// Image sprite drawn next to an expanded node.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSprite {
	/// Source of the picture.
	pub url: String,
	/// Edge length in world units.
	pub size: f32,
	/// Displacement from the node center.
	pub offset: Vec3,
}

/// Multi-line text bitmap attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSprite {
	/// Lines, fonts and bitmap size.
	pub layout: LabelLayout,
	/// World units per bitmap pixel.
	pub scale: f32,
	/// Displacement from the node center.
	pub offset: Vec3,
}

/// Pulsing glow drawn behind a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Halo {
	/// Peak alpha at the center of the glow.
	pub opacity: f32,
	/// Multiple of the node radius.
	pub scale: f32,
}

/// Everything the collaborator needs to draw one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	/// CSS fill color.
	pub color: String,
	/// Sphere radius in world units.
	pub radius: f32,
	/// Profile picture, expanded nodes only.
	pub image: Option<ImageSprite>,
	/// Text bitmap, expanded nodes only.
	pub label: Option<LabelSprite>,
	/// Focus or animation glow.
	pub halo: Option<Halo>,
	/// Text shown on hover.
	pub tooltip: Option<String>,
}

/// Per-call inputs for the node visual factory besides the node itself.
pub struct VisualContext<'a> {
	/// Store index of the node.
	pub index: usize,
	/// Whether the node is the focused one.
	pub highlighted: bool,
	/// Text metrics for label layout.
	pub measure: &'a dyn TextMeasure,
}

/// Builds the visual for a node; invoked by the collaborator on every refresh.
pub trait NodeVisualFactory {
	/// Visual for `node` under `ctx`.
	fn build(&self, node: &Node, ctx: &VisualContext<'_>) -> NodeVisual;
}

/// Called with the store index of a clicked node.
pub type NodeClickHandler = Rc<dyn Fn(usize)>;
/// Called when a click hits no node.
pub type BackgroundClickHandler = Rc<dyn Fn()>;
/// Rest length of a link.
pub type LinkDistanceFn = Box<dyn Fn(LinkEnds) -> f32>;

/// What the core may ask of the rendering collaborator, and nothing more.
pub trait RenderSurface {
	/// Replace the body table and link set. Bodies keep their positions when
	/// the node count is unchanged.
	fn set_graph_data(&mut self, nodes: &[Node], links: &[LinkEnds]);
	/// CSS color behind the scene.
	fn set_background_color(&mut self, color: &str);
	/// Install the factory used by [`RenderSurface::refresh`].
	fn set_node_visual_factory(&mut self, factory: Box<dyn NodeVisualFactory>);
	/// Link stroke width in pixels.
	fn set_link_width(&mut self, width: f32);
	/// Link stroke alpha.
	fn set_link_opacity(&mut self, opacity: f32);
	/// Replace the node click handler.
	fn on_node_click(&mut self, handler: NodeClickHandler);
	/// Replace the background click handler.
	fn on_background_click(&mut self, handler: BackgroundClickHandler);
	/// Register a per-tick force; a force registered under an existing name
	/// replaces it.
	fn register_custom_force(&mut self, name: &str, force: Box<dyn Force>);
	/// Rest length for each link, evaluated when the link set changes.
	fn set_link_distance(&mut self, distance: LinkDistanceFn);
	/// Many-body strength; negative repels.
	fn set_charge_strength(&mut self, strength: f32);
	/// `None` disables the centering force.
	fn set_center_strength(&mut self, strength: Option<f32>);
	/// Animate the viewpoint; supersedes any transition in flight.
	fn animate_camera(&mut self, position: Vec3, look_at: Vec3, duration_ms: f64);
	/// Rebuild every node visual from the current domain state.
	fn refresh(&mut self, nodes: &[Node], highlighted: Option<usize>);
	/// Body table in store order.
	fn bodies(&self) -> &[Body];
	/// Mutable body table; used to pin and release nodes.
	fn bodies_mut(&mut self) -> &mut [Body];
	/// Current visual of the node at `index`.
	fn visual_mut(&mut self, index: usize) -> Option<&mut NodeVisual>;
}
