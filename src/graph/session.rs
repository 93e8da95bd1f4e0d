//! One loaded network bound to a rendering surface: the store, selection and
//! micro-animation state, and the routing of user actions between them.

use glam::Vec3;
use rand::Rng;

use super::animation::MicroAnimator;
use super::cluster::{CLUSTER_FORCE, ClusterForce, LinkDistancePolicy};
use super::detail::DetailPanel;
use super::selection::{SelectionController, SelectionState};
use super::store::{GraphDataStore, GraphMode};
use super::style::NodeStyler;
use super::surface::RenderSurface;
use super::types::{LinkEnds, NodeId};
use crate::config::GraphConfig;

/// A loaded network and everything that reacts to clicks on it.
pub struct GraphSession {
	store: GraphDataStore,
	selection: SelectionController,
	animator: MicroAnimator,
	config: GraphConfig,
}

impl GraphSession {
	/// Session in the Idle state with the animator at phase zero.
	pub fn new(store: GraphDataStore, config: GraphConfig) -> Self {
		Self {
			selection: SelectionController::new(&config),
			animator: MicroAnimator::new(
				config.animation_phase_step,
				config.drift_strength,
				config.animation_gated,
			),
			store,
			config,
		}
	}

	/// The network being shown.
	pub fn store(&self) -> &GraphDataStore {
		&self.store
	}

	/// Current selection state.
	pub fn state(&self) -> &SelectionState {
		self.selection.state()
	}

	/// Settings the session was created with.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Configure `surface` for this network: data, styling, forces and the
	/// visual factory. Public networks also get random initial positions in
	/// a 200-unit cube.
	pub fn install(&self, surface: &mut dyn RenderSurface, rng: &mut impl Rng) {
		let slots = self.store.group_slots();
		let style = &self.config.style;

		surface.set_graph_data(self.store.nodes(), &self.store.link_ends());
		surface.set_background_color(style.background);
		surface.set_link_width(style.link_width);
		surface.set_link_opacity(style.link_opacity);
		surface.set_charge_strength(self.config.charge_strength);
		surface.set_center_strength(self.config.center_strength);

		if self.store.mode() == GraphMode::Private {
			let policy = LinkDistancePolicy::new(
				slots.clone(),
				self.config.intra_group_link_distance,
				self.config.cross_group_link_distance,
			);
			surface.set_link_distance(Box::new(move |link: LinkEnds| policy.distance(link)));
			surface.register_custom_force(
				CLUSTER_FORCE,
				Box::new(ClusterForce::new(slots, self.config.cluster_strength)),
			);
		} else {
			for body in surface.bodies_mut() {
				body.position = Vec3::new(
					rng.gen_range(-100.0..100.0),
					rng.gen_range(-100.0..100.0),
					rng.gen_range(-100.0..100.0),
				);
			}
		}

		surface.set_node_visual_factory(Box::new(NodeStyler::from_store(
			&self.store,
			self.config.label_font_size,
			self.config.label_border,
		)));
		surface.refresh(self.store.nodes(), None);
	}

	/// Route a click on the body at `index`. Indices that no longer resolve
	/// to a node are ignored.
	pub fn node_clicked(&mut self, index: usize, surface: &mut dyn RenderSurface) {
		let Some(id) = self.store.node(index).map(|n| n.id.clone()) else {
			return;
		};
		self.selection.click_node(&id, &mut self.store, surface);
	}

	/// Route a click that hit no node.
	pub fn background_clicked(&mut self, surface: &mut dyn RenderSurface) {
		self.selection.click_background(&mut self.store, surface);
	}

	/// The detail panel's Close button.
	pub fn close_panel(&mut self, surface: &mut dyn RenderSurface) {
		self.selection.close_panel(&self.store, surface);
	}

	/// Jump to a node listed in the detail panel.
	pub fn goto_corresponding(&mut self, id: &NodeId, surface: &mut dyn RenderSurface) {
		self.selection.goto_corresponding(id, &mut self.store, surface);
	}

	/// Advance the micro-animation by one step.
	pub fn animation_tick(&mut self, surface: &mut dyn RenderSurface) {
		self.animator.tick(&self.store, surface);
	}

	/// Panel contents for the focused node, if any.
	pub fn detail_panel(&self) -> Option<DetailPanel> {
		self.selection
			.focused()
			.and_then(|id| DetailPanel::derive(&self.store, id))
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use serde_json::json;

	use super::*;
	use crate::graph::surface::testing::RecordingSurface;
	use crate::graph::types::GroupId;

	fn private_session(config: GraphConfig) -> (GraphSession, RecordingSurface) {
		let store = GraphDataStore::load(
			GraphMode::Private,
			json!({
				"nodes": [
					{ "id": 1, "individual_name": "Ada", "group_id": "A" },
					{ "id": 2, "individual_name": "Grace", "group_id": "A", "corresponding_user_nodes": [3] },
					{ "id": 3, "individual_name": "grace-gh", "is_linkedin": false, "group_id": "B" }
				],
				"groups": [{ "id": "A", "name": "Acme" }, { "id": "B", "name": "acme/rocket" }]
			}),
		)
		.unwrap();
		let session = GraphSession::new(store, config);
		let mut surface = RecordingSurface::default();
		session.install(&mut surface, &mut StdRng::seed_from_u64(1));
		(session, surface)
	}

	#[test]
	fn install_configures_private_surface() {
		let (_, surface) = private_session(GraphConfig::private_network());
		assert_eq!(surface.background.as_deref(), Some("#000022"));
		assert_eq!(surface.link_width, Some(2.0));
		assert_eq!(surface.center, Some(None));
		assert_eq!(surface.forces.len(), 1);
		assert_eq!(surface.forces[0].0, CLUSTER_FORCE);
		assert_eq!(surface.links, vec![LinkEnds { source: 1, target: 2 }]);
		assert_eq!(surface.visuals.len(), 3);

		let distance = surface.link_distance.as_ref().unwrap();
		let intra = distance(LinkEnds { source: 0, target: 1 });
		let cross = distance(LinkEnds { source: 1, target: 2 });
		assert!(intra > cross);
	}

	#[test]
	fn install_scatters_public_nodes_without_cluster_force() {
		let store = GraphDataStore::load(
			GraphMode::Public,
			json!({
				"nodes": [
					{ "id": "a", "type": "linkedin_organization", "name": "Acme" },
					{ "id": "b", "type": "github_repository", "name": "acme/rocket" }
				],
				"links": [{ "source": "a", "target": "b", "type": "contributors" }]
			}),
		)
		.unwrap();
		let session = GraphSession::new(store, GraphConfig::public_network());
		let mut surface = RecordingSurface::default();
		session.install(&mut surface, &mut StdRng::seed_from_u64(3));

		assert!(surface.forces.is_empty());
		assert_eq!(surface.center, Some(Some(0.05)));
		assert_eq!(surface.charge, Some(-100.0));
		for body in &surface.bodies {
			assert!(body.position.abs().max_element() <= 100.0);
		}
		assert_ne!(surface.bodies[0].position, surface.bodies[1].position);
	}

	#[test]
	fn clicks_drive_expansion_and_visuals() {
		let (mut session, mut surface) = private_session(GraphConfig::private_network());
		session.node_clicked(0, &mut surface);
		assert_eq!(session.state(), &SelectionState::GroupActivated(GroupId::from("A")));
		assert!(surface.visuals[0].label.is_some());
		assert!(surface.visuals[2].label.is_none());

		session.background_clicked(&mut surface);
		assert!(surface.visuals.iter().all(|v| v.label.is_none()));
	}

	#[test]
	fn stale_index_is_ignored() {
		let (mut session, mut surface) = private_session(GraphConfig::private_network());
		session.node_clicked(17, &mut surface);
		assert_eq!(session.state(), &SelectionState::Idle);
	}

	#[test]
	fn panel_follows_focus_and_jumps() {
		let (mut session, mut surface) = private_session(GraphConfig::private_network());
		assert!(session.detail_panel().is_none());

		session.node_clicked(1, &mut surface);
		session.node_clicked(1, &mut surface);
		let panel = session.detail_panel().unwrap();
		assert_eq!(panel.name, "Grace");
		assert_eq!(panel.group_name.as_deref(), Some("Acme"));
		assert_eq!(panel.corresponding.len(), 1);

		let target = panel.corresponding[0].id.clone();
		session.goto_corresponding(&target, &mut surface);
		assert!(session.detail_panel().is_none());
		assert!(session.store().find_node(&target).unwrap().expanded);
		assert_eq!(surface.last_camera().unwrap().duration_ms, 3000.0);
	}

	#[test]
	fn animation_only_runs_on_the_expanded_group() {
		let (mut session, mut surface) = private_session(GraphConfig::private_network());
		session.node_clicked(2, &mut surface);
		session.animation_tick(&mut surface);
		assert!(surface.bodies[2].pin.is_some());
		assert!(surface.bodies[0].pin.is_none());
		assert!(surface.visuals[2].halo.is_some());
	}

	#[test]
	fn animation_keeps_the_focus_halo_on_an_ungrouped_node() {
		let store = GraphDataStore::load(
			GraphMode::Private,
			json!({
				"nodes": [{ "id": 1, "group_id": "A" }, { "id": 2 }],
				"groups": [{ "id": "A" }]
			}),
		)
		.unwrap();
		let config = GraphConfig {
			direct_select_mode: true,
			..GraphConfig::private_network()
		};
		let mut session = GraphSession::new(store, config);
		let mut surface = RecordingSurface::default();
		session.install(&mut surface, &mut StdRng::seed_from_u64(1));

		session.node_clicked(1, &mut surface);
		assert!(matches!(session.state(), SelectionState::NodeFocused(_)));
		let focus_halo = surface.visuals[1].halo;
		assert!(focus_halo.is_some());

		for _ in 0..3 {
			session.animation_tick(&mut surface);
		}
		assert_eq!(surface.visuals[1].halo, focus_halo);
		assert!(surface.bodies[1].pin.is_none());
	}
}
