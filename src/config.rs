//! View configuration for the two network modes.

/// Base URL of the network API, fixed at build time.
pub const API_BASE: &str = match option_env!("NETWORK_API_BASE") {
	Some(base) => base,
	None => "http://127.0.0.1:8000/api",
};

/// Colors and link styling handed to the rendering surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneStyle {
	/// CSS color painted behind the scene.
	pub background: &'static str,
	/// Link width in world units.
	pub link_width: f32,
	/// Link alpha in [0, 1].
	pub link_opacity: f32,
}

/// Tuning for one network view: selection behavior, camera choreography,
/// micro-animation, forces and styling.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Open the detail panel on any node click instead of requiring the
	/// node's group to be activated first.
	pub direct_select_mode: bool,
	/// Re-open the detail panel on the target after a corresponding-node jump.
	pub reopen_panel_after_jump: bool,
	/// Camera offset along +Z from the point it looks at.
	pub camera_distance: f32,
	/// Camera move onto a node inside the active group.
	pub focus_duration_ms: f64,
	/// Camera move framing a newly activated group.
	pub frame_duration_ms: f64,
	/// Camera move for a corresponding-node jump.
	pub jump_duration_ms: f64,
	/// World units added around a framed group's bounding sphere.
	pub frame_padding: f32,
	/// Micro-animation timer period.
	pub animation_period_ms: u32,
	/// Phase advance per micro-animation tick, in radians.
	pub animation_phase_step: f32,
	/// Amplitude of the positional drift, in world units.
	pub drift_strength: f32,
	/// Animate only expanded nodes.
	pub animation_gated: bool,
	/// Scale of the pull toward group centroids.
	pub cluster_strength: f32,
	/// Spring rest length between two members of the same group.
	pub intra_group_link_distance: f32,
	/// Spring rest length between nodes of different groups.
	pub cross_group_link_distance: f32,
	/// Many-body strength; negative repels.
	pub charge_strength: f32,
	/// Centering force strength, or `None` to disable it.
	pub center_strength: Option<f32>,
	/// Label font size in bitmap pixels.
	pub label_font_size: f64,
	/// Padding around label text in bitmap pixels.
	pub label_border: f64,
	/// Colors and link styling.
	pub style: SceneStyle,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self::private_network()
	}
}

impl GraphConfig {
	/// Authenticated view: grouped, activation-gated, no centering force.
	pub fn private_network() -> Self {
		Self {
			direct_select_mode: false,
			reopen_panel_after_jump: false,
			camera_distance: 100.0,
			focus_duration_ms: 1000.0,
			frame_duration_ms: 1000.0,
			jump_duration_ms: 3000.0,
			frame_padding: 50.0,
			animation_period_ms: 50,
			animation_phase_step: 0.02,
			drift_strength: 0.1,
			animation_gated: true,
			cluster_strength: 0.3,
			intra_group_link_distance: 80.0,
			cross_group_link_distance: 30.0,
			charge_strength: -60.0,
			center_strength: None,
			label_font_size: 24.0,
			label_border: 4.0,
			style: SceneStyle {
				background: "#000022",
				link_width: 2.0,
				link_opacity: 0.6,
			},
		}
	}

	/// Unauthenticated view: no groups, every node drifts, weak centering.
	pub fn public_network() -> Self {
		Self {
			charge_strength: -100.0,
			center_strength: Some(0.05),
			animation_gated: false,
			style: SceneStyle {
				background: "#02020f",
				link_width: 0.2,
				link_opacity: 0.1,
			},
			..Self::private_network()
		}
	}
}
