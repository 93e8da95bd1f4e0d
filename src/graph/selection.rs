//! Click-driven activation, focus and detail-panel state.
//!
//! Two behaviors share one state machine:
//!
//! - activation-gated (default): the first click on a node activates its
//!   group and frames it; a second click on a member of the active group
//!   focuses that node and opens its detail panel.
//! - direct select: any node click activates the node's group, focuses and
//!   highlights the node, and flies the camera to it.

use log::{debug, info};

use super::camera::CameraChoreographer;
use super::store::GraphDataStore;
use super::surface::RenderSurface;
use super::types::{GroupId, NodeId};
use crate::config::GraphConfig;

/// Exactly one of these holds at any time. The detail panel is open iff the
/// state is `NodeFocused`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
	/// Nothing expanded.
	#[default]
	Idle,
	/// One group expanded and framed.
	GroupActivated(GroupId),
	/// A node's detail panel is open.
	NodeFocused(NodeId),
}

/// Turns clicks into selection changes, expansion and camera moves.
#[derive(Clone, Debug)]
pub struct SelectionController {
	state: SelectionState,
	camera: CameraChoreographer,
	direct_select_mode: bool,
	reopen_panel_after_jump: bool,
	focus_duration_ms: f64,
	frame_duration_ms: f64,
	jump_duration_ms: f64,
	frame_padding: f32,
}

impl SelectionController {
	/// Idle controller with timings from `config`.
	pub fn new(config: &GraphConfig) -> Self {
		Self {
			state: SelectionState::Idle,
			camera: CameraChoreographer::new(config.camera_distance),
			direct_select_mode: config.direct_select_mode,
			reopen_panel_after_jump: config.reopen_panel_after_jump,
			focus_duration_ms: config.focus_duration_ms,
			frame_duration_ms: config.frame_duration_ms,
			jump_duration_ms: config.jump_duration_ms,
			frame_padding: config.frame_padding,
		}
	}

	/// Current state.
	pub fn state(&self) -> &SelectionState {
		&self.state
	}

	/// The node whose detail panel is open.
	pub fn focused(&self) -> Option<&NodeId> {
		match &self.state {
			SelectionState::NodeFocused(id) => Some(id),
			_ => None,
		}
	}

	/// Store index of the emphasized node, in direct-select mode only.
	pub fn highlighted(&self, store: &GraphDataStore) -> Option<usize> {
		if !self.direct_select_mode {
			return None;
		}
		self.focused().and_then(|id| store.index_of(id))
	}

	/// Forget the current selection, e.g. after the model was replaced.
	pub fn reset(&mut self) {
		self.state = SelectionState::Idle;
	}

	/// Activate the node's group or focus the node, depending on the mode
	/// and what is already active.
	pub fn click_node(
		&mut self,
		id: &NodeId,
		store: &mut GraphDataStore,
		surface: &mut dyn RenderSurface,
	) {
		let Some(index) = store.index_of(id) else {
			debug!("Ignoring click on unknown node {id}");
			return;
		};
		let group = store.nodes()[index].group.clone();

		if self.direct_select_mode {
			if store.activated_group() != group.as_ref() {
				store.set_activated_group(group.as_ref());
			}
			self.state = SelectionState::NodeFocused(id.clone());
			self.refresh(store, surface);
			self.camera
				.move_to_node(surface, index, self.focus_duration_ms);
			return;
		}

		match group {
			Some(g) if store.activated_group() != Some(&g) => self.activate(g, store, surface),
			Some(_) => {
				debug!("Focusing node {id}");
				self.state = SelectionState::NodeFocused(id.clone());
				self.refresh(store, surface);
			}
			None => {
				store.set_activated_group(None);
				self.state = SelectionState::NodeFocused(id.clone());
				self.refresh(store, surface);
			}
		}
	}

	/// Collapse everything and return to Idle.
	pub fn click_background(&mut self, store: &mut GraphDataStore, surface: &mut dyn RenderSurface) {
		store.set_activated_group(None);
		self.state = SelectionState::Idle;
		self.refresh(store, surface);
	}

	/// Close the detail panel, keeping the group activated.
	pub fn close_panel(&mut self, store: &GraphDataStore, surface: &mut dyn RenderSurface) {
		if self.focused().is_none() {
			return;
		}
		self.state = match store.activated_group() {
			Some(g) => SelectionState::GroupActivated(g.clone()),
			None => SelectionState::Idle,
		};
		self.refresh(store, surface);
	}

	/// Jump from the focused node to one of its corresponding nodes. A target
	/// missing from the model leaves everything unchanged.
	pub fn goto_corresponding(
		&mut self,
		target: &NodeId,
		store: &mut GraphDataStore,
		surface: &mut dyn RenderSurface,
	) {
		if self.focused().is_none() {
			return;
		}
		let Some(index) = store.index_of(target) else {
			debug!("Corresponding node {target} is not in the model");
			return;
		};
		let group = store.nodes()[index].group.clone();

		info!("Jumping to corresponding node {target}");
		store.set_activated_group(group.as_ref());
		self.state = match group {
			Some(g) => SelectionState::GroupActivated(g),
			None => SelectionState::Idle,
		};
		self.camera.move_to_node(surface, index, self.jump_duration_ms);
		if self.reopen_panel_after_jump {
			self.state = SelectionState::NodeFocused(target.clone());
		}
		self.refresh(store, surface);
	}

	fn activate(&mut self, group: GroupId, store: &mut GraphDataStore, surface: &mut dyn RenderSurface) {
		info!("Activating group {group}");
		store.set_activated_group(Some(&group));
		let members = store.nodes_in_group(&group);
		self.state = SelectionState::GroupActivated(group);
		self.refresh(store, surface);
		self.camera
			.frame_nodes(surface, &members, self.frame_duration_ms, self.frame_padding);
	}

	fn refresh(&self, store: &GraphDataStore, surface: &mut dyn RenderSurface) {
		surface.refresh(store.nodes(), self.highlighted(store));
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;
	use serde_json::json;

	use super::*;
	use crate::graph::store::GraphMode;
	use crate::graph::surface::testing::RecordingSurface;

	fn store() -> GraphDataStore {
		GraphDataStore::load(
			GraphMode::Private,
			json!({
				"nodes": [
					{ "id": 1, "group_id": "A", "corresponding_user_nodes": [3] },
					{ "id": 2, "group_id": "A", "corresponding_user_nodes": [99] },
					{ "id": 3, "group_id": "B" },
					{ "id": 4 }
				],
				"groups": [{ "id": "A" }, { "id": "B" }]
			}),
		)
		.unwrap()
	}

	fn setup(config: GraphConfig) -> (SelectionController, GraphDataStore, RecordingSurface) {
		let store = store();
		let mut surface = RecordingSurface::default();
		surface.set_graph_data(store.nodes(), &store.link_ends());
		(SelectionController::new(&config), store, surface)
	}

	fn expanded(store: &GraphDataStore) -> Vec<bool> {
		store.nodes().iter().map(|n| n.expanded).collect()
	}

	#[test]
	fn first_click_activates_the_group_and_frames_it() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);

		assert_eq!(sel.state(), &SelectionState::GroupActivated(GroupId::from("A")));
		assert_eq!(expanded(&store), vec![true, true, false, false]);
		assert!(sel.focused().is_none());
		let request = surface.last_camera().unwrap();
		assert_eq!(request.duration_ms, 1000.0);
		// bodies 0 and 1 sit at x = 0 and x = 10
		assert_eq!(request.look_at, Vec3::new(5.0, 0.0, 0.0));
		assert_eq!(surface.refreshes, 1);
	}

	#[test]
	fn second_click_in_active_group_focuses_node() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(2), &mut store, &mut surface);

		assert_eq!(sel.state(), &SelectionState::NodeFocused(NodeId::from(2)));
		assert_eq!(sel.focused(), Some(&NodeId::from(2)));
		assert_eq!(expanded(&store), vec![true, true, false, false]);
		assert_eq!(sel.highlighted(&store), None);
	}

	#[test]
	fn click_in_another_group_switches_activation() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(3), &mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::GroupActivated(GroupId::from("B")));
		assert_eq!(expanded(&store), vec![false, false, true, false]);

		// From a focused node as well.
		sel.click_node(&NodeId::from(3), &mut store, &mut surface);
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::GroupActivated(GroupId::from("A")));
	}

	#[test]
	fn background_click_returns_to_idle_from_any_state() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_background(&mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::Idle);

		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_background(&mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::Idle);
		assert!(expanded(&store).iter().all(|e| !e));

		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		assert!(sel.focused().is_some());
		sel.click_background(&mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::Idle);
		assert!(sel.focused().is_none());
		assert!(expanded(&store).iter().all(|e| !e));
	}

	#[test]
	fn unknown_node_click_is_ignored() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		let before = sel.state().clone();
		sel.click_node(&NodeId::from(404), &mut store, &mut surface);
		assert_eq!(sel.state(), &before);
		assert_eq!(surface.refreshes, 1);
	}

	#[test]
	fn ungrouped_node_opens_panel_directly() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(4), &mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::NodeFocused(NodeId::from(4)));
		assert!(expanded(&store).iter().all(|e| !e));
	}

	#[test]
	fn jump_to_corresponding_node_activates_its_group() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		surface.place(2, Vec3::new(40.0, 5.0, -3.0));
		sel.goto_corresponding(&NodeId::from(3), &mut store, &mut surface);

		assert_eq!(sel.state(), &SelectionState::GroupActivated(GroupId::from("B")));
		assert!(sel.focused().is_none());
		assert_eq!(expanded(&store), vec![false, false, true, false]);
		let request = surface.last_camera().unwrap();
		assert_eq!(request.look_at, Vec3::new(40.0, 5.0, -3.0));
		assert_eq!(request.position, Vec3::new(40.0, 5.0, 97.0));
		assert_eq!(request.duration_ms, 3000.0);
	}

	#[test]
	fn jump_can_reopen_the_panel_on_the_target() {
		let config = GraphConfig {
			reopen_panel_after_jump: true,
			..GraphConfig::default()
		};
		let (mut sel, mut store, mut surface) = setup(config);
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.goto_corresponding(&NodeId::from(3), &mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::NodeFocused(NodeId::from(3)));
		assert_eq!(store.activated_group(), Some(&GroupId::from("B")));
	}

	#[test]
	fn jump_to_missing_node_is_a_no_op() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(2), &mut store, &mut surface);
		sel.click_node(&NodeId::from(2), &mut store, &mut surface);
		let before = sel.state().clone();
		let cameras = surface.camera.len();

		sel.goto_corresponding(&NodeId::from(99), &mut store, &mut surface);
		assert_eq!(sel.state(), &before);
		assert_eq!(surface.camera.len(), cameras);
		assert_eq!(expanded(&store), vec![true, true, false, false]);
	}

	#[test]
	fn closing_the_panel_keeps_the_group() {
		let (mut sel, mut store, mut surface) = setup(GraphConfig::default());
		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		sel.click_node(&NodeId::from(2), &mut store, &mut surface);
		sel.close_panel(&store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::GroupActivated(GroupId::from("A")));
		assert_eq!(expanded(&store), vec![true, true, false, false]);
	}

	#[test]
	fn direct_mode_focuses_and_highlights_on_first_click() {
		let config = GraphConfig {
			direct_select_mode: true,
			..GraphConfig::default()
		};
		let (mut sel, mut store, mut surface) = setup(config);
		sel.click_node(&NodeId::from(3), &mut store, &mut surface);

		assert_eq!(sel.state(), &SelectionState::NodeFocused(NodeId::from(3)));
		assert_eq!(expanded(&store), vec![false, false, true, false]);
		assert_eq!(sel.highlighted(&store), Some(2));
		assert_eq!(surface.highlighted, Some(2));
		assert_eq!(surface.last_camera().unwrap().duration_ms, 1000.0);

		sel.click_node(&NodeId::from(1), &mut store, &mut surface);
		assert_eq!(sel.state(), &SelectionState::NodeFocused(NodeId::from(1)));
		assert_eq!(surface.highlighted, Some(0));
	}
}
