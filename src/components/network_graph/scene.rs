use glam::{Mat4, Vec3};

use super::simulation::{Simulation, SimulationParameters};
use crate::graph::label::TextMeasure;
use crate::graph::surface::{
	BackgroundClickHandler, Body, Force, LinkDistanceFn, NodeClickHandler, NodeVisual,
	NodeVisualFactory, RenderSurface, VisualContext,
};
use crate::graph::types::{LinkEnds, Node};

/// Extra pick tolerance around a node's projected radius, in pixels.
pub const HIT_SLOP: f64 = 4.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 20_000.0;
const MIN_CAMERA_DISTANCE: f32 = 10.0;
const MAX_CAMERA_DISTANCE: f32 = 5_000.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug, PartialEq)]
struct CameraTween {
	from_position: Vec3,
	from_target: Vec3,
	to_position: Vec3,
	to_target: Vec3,
	started_ms: f64,
	duration_ms: f64,
}

/// Perspective camera orbiting a target point.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	pub position: Vec3,
	pub target: Vec3,
	pub fov_deg: f32,
	tween: Option<CameraTween>,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			position: Vec3::new(0.0, 0.0, 400.0),
			target: Vec3::ZERO,
			fov_deg: 40.0,
			tween: None,
		}
	}
}

impl Camera {
	/// Start a transition from the current pose. Replaces any transition in
	/// flight; a zero duration jumps immediately.
	pub fn animate(&mut self, position: Vec3, target: Vec3, duration_ms: f64, now_ms: f64) {
		if duration_ms <= 0.0 {
			self.position = position;
			self.target = target;
			self.tween = None;
			return;
		}
		self.tween = Some(CameraTween {
			from_position: self.position,
			from_target: self.target,
			to_position: position,
			to_target: target,
			started_ms: now_ms,
			duration_ms,
		});
	}

	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	pub fn advance(&mut self, now_ms: f64) {
		let Some(tween) = &self.tween else {
			return;
		};
		let t = ((now_ms - tween.started_ms) / tween.duration_ms).clamp(0.0, 1.0);
		if t >= 1.0 {
			self.position = tween.to_position;
			self.target = tween.to_target;
			self.tween = None;
			return;
		}
		let k = ease_out_cubic(t) as f32;
		self.position = tween.from_position.lerp(tween.to_position, k);
		self.target = tween.from_target.lerp(tween.to_target, k);
	}

	/// Rotate around the target by screen-space drag deltas (radians).
	pub fn orbit(&mut self, yaw: f32, pitch: f32) {
		self.tween = None;
		let offset = self.position - self.target;
		let radius = offset.length().max(f32::EPSILON);
		let mut theta = offset.x.atan2(offset.z) - yaw;
		let mut phi = (offset.y / radius).clamp(-1.0, 1.0).asin() + pitch;
		phi = phi.clamp(-1.5, 1.5);
		theta %= std::f32::consts::TAU;
		self.position = self.target
			+ Vec3::new(
				radius * phi.cos() * theta.sin(),
				radius * phi.sin(),
				radius * phi.cos() * theta.cos(),
			);
	}

	/// Move toward (factor < 1) or away from the target.
	pub fn dolly(&mut self, factor: f32) {
		self.tween = None;
		let offset = self.position - self.target;
		let distance = (offset.length() * factor).clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
		self.position = self.target + offset.try_normalize().unwrap_or(Vec3::Z) * distance;
	}

	fn view_projection(&self, aspect: f32) -> Mat4 {
		let proj = Mat4::perspective_rh_gl(self.fov_deg.to_radians(), aspect.max(1e-3), NEAR, FAR);
		let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
		proj * view
	}
}

/// A world point mapped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Screen pixels per world unit at this depth.
	pub scale: f64,
	/// Distance along the view direction; larger is farther.
	pub depth: f64,
}

/// What a click at a screen position resolved to. Handlers are cloned out so
/// they can run after the scene borrow is released.
pub enum ClickTarget {
	Node(NodeClickHandler, usize),
	Background(BackgroundClickHandler),
	Unhandled,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

/// The rendering collaborator: simulation, camera, and one visual per node.
pub struct CanvasScene {
	pub simulation: Simulation,
	pub camera: Camera,
	pub background: String,
	pub link_width: f32,
	pub link_opacity: f32,
	pub width: f64,
	pub height: f64,
	pub drag: DragState,
	pub hover: Option<usize>,
	visuals: Vec<NodeVisual>,
	links: Vec<LinkEnds>,
	factory: Option<Box<dyn NodeVisualFactory>>,
	measure: Box<dyn TextMeasure>,
	node_click: Option<NodeClickHandler>,
	background_click: Option<BackgroundClickHandler>,
	clock_ms: f64,
}

impl CanvasScene {
	pub fn new(width: f64, height: f64, measure: Box<dyn TextMeasure>) -> Self {
		Self {
			simulation: Simulation::new(SimulationParameters::default()),
			camera: Camera::default(),
			background: "#000000".into(),
			link_width: 1.0,
			link_opacity: 0.6,
			width,
			height,
			drag: DragState::default(),
			hover: None,
			visuals: Vec::new(),
			links: Vec::new(),
			factory: None,
			measure,
			node_click: None,
			background_click: None,
			clock_ms: 0.0,
		}
	}

	pub fn visuals(&self) -> &[NodeVisual] {
		&self.visuals
	}

	pub fn links(&self) -> &[LinkEnds] {
		&self.links
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Advance physics and camera to `now_ms`.
	pub fn step(&mut self, now_ms: f64) {
		self.clock_ms = now_ms;
		self.simulation.tick();
		self.camera.advance(now_ms);
	}

	/// Project a world point; `None` when behind the camera.
	pub fn project(&self, point: Vec3) -> Option<Projected> {
		let aspect = (self.width / self.height.max(1.0)) as f32;
		let clip = self.camera.view_projection(aspect) * point.extend(1.0);
		if clip.w <= NEAR {
			return None;
		}
		let ndc = clip.truncate() / clip.w;
		let half_fov = (self.camera.fov_deg.to_radians() * 0.5).tan() as f64;
		Some(Projected {
			x: (ndc.x as f64 + 1.0) * 0.5 * self.width,
			y: (1.0 - ndc.y as f64) * 0.5 * self.height,
			scale: self.height / (2.0 * half_fov * clip.w as f64),
			depth: clip.w as f64,
		})
	}

	/// Front-most node whose projected disc contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let mut found: Option<(usize, f64)> = None;
		for (index, body) in self.simulation.bodies().iter().enumerate() {
			let Some(p) = self.project(body.position) else {
				continue;
			};
			let radius = self.visuals.get(index).map_or(5.0, |v| v.radius as f64) * p.scale;
			let (dx, dy) = (p.x - sx, p.y - sy);
			if (dx * dx + dy * dy).sqrt() <= radius + HIT_SLOP
				&& found.is_none_or(|(_, depth)| p.depth < depth)
			{
				found = Some((index, p.depth));
			}
		}
		found.map(|(index, _)| index)
	}

	pub fn click_target(&self, sx: f64, sy: f64) -> ClickTarget {
		match self.node_at_position(sx, sy) {
			Some(index) => match &self.node_click {
				Some(handler) => ClickTarget::Node(handler.clone(), index),
				None => ClickTarget::Unhandled,
			},
			None => match &self.background_click {
				Some(handler) => ClickTarget::Background(handler.clone()),
				None => ClickTarget::Unhandled,
			},
		}
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node;
	}
}

impl RenderSurface for CanvasScene {
	fn set_graph_data(&mut self, nodes: &[Node], links: &[LinkEnds]) {
		self.simulation.set_graph(nodes.len(), links);
		self.links = links.to_vec();
		self.visuals.truncate(nodes.len());
		self.hover = None;
	}

	fn set_background_color(&mut self, color: &str) {
		self.background = color.to_owned();
	}

	fn set_node_visual_factory(&mut self, factory: Box<dyn NodeVisualFactory>) {
		self.factory = Some(factory);
	}

	fn set_link_width(&mut self, width: f32) {
		self.link_width = width;
	}

	fn set_link_opacity(&mut self, opacity: f32) {
		self.link_opacity = opacity;
	}

	fn on_node_click(&mut self, handler: NodeClickHandler) {
		self.node_click = Some(handler);
	}

	fn on_background_click(&mut self, handler: BackgroundClickHandler) {
		self.background_click = Some(handler);
	}

	fn register_custom_force(&mut self, name: &str, force: Box<dyn Force>) {
		self.simulation.register_force(name, force);
	}

	fn set_link_distance(&mut self, distance: LinkDistanceFn) {
		self.simulation.set_link_distance(distance);
	}

	fn set_charge_strength(&mut self, strength: f32) {
		self.simulation.params.force_charge = strength;
	}

	fn set_center_strength(&mut self, strength: Option<f32>) {
		self.simulation.params.force_center = strength;
	}

	fn animate_camera(&mut self, position: Vec3, look_at: Vec3, duration_ms: f64) {
		self.camera
			.animate(position, look_at, duration_ms, self.clock_ms);
	}

	fn refresh(&mut self, nodes: &[Node], highlighted: Option<usize>) {
		let Some(factory) = &self.factory else {
			return;
		};
		let measure = self.measure.as_ref();
		self.visuals = nodes
			.iter()
			.enumerate()
			.map(|(index, node)| {
				factory.build(
					node,
					&VisualContext {
						index,
						highlighted: highlighted == Some(index),
						measure,
					},
				)
			})
			.collect();
	}

	fn bodies(&self) -> &[Body] {
		self.simulation.bodies()
	}

	fn bodies_mut(&mut self) -> &mut [Body] {
		self.simulation.bodies_mut()
	}

	fn visual_mut(&mut self, index: usize) -> Option<&mut NodeVisual> {
		self.visuals.get_mut(index)
	}
}
