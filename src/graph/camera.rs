//! Camera moves toward nodes and groups.

use glam::Vec3;
use log::debug;

use super::surface::RenderSurface;

/// Computes camera requests. Positions are always read from the surface at
/// request time; nodes keep moving under the simulation.
#[derive(Clone, Debug)]
pub struct CameraChoreographer {
	/// Distance from the target along +z.
	pub distance: f32,
	/// Vertical field of view in degrees, used when framing a group.
	pub fov_deg: f32,
}

impl Default for CameraChoreographer {
	fn default() -> Self {
		Self {
			distance: 100.0,
			fov_deg: 40.0,
		}
	}
}

impl CameraChoreographer {
	/// Choreographer at `distance` with the default field of view.
	pub fn new(distance: f32) -> Self {
		Self {
			distance,
			..Self::default()
		}
	}

	/// Look at `target` from `distance` units along +z.
	pub fn move_to(&self, surface: &mut dyn RenderSurface, target: Vec3, duration_ms: f64) {
		let position = target + Vec3::Z * self.distance;
		debug!("Camera to {target} over {duration_ms}ms");
		surface.animate_camera(position, target, duration_ms);
	}

	/// Look at the body at `index`. Returns false when the index is unknown.
	pub fn move_to_node(
		&self,
		surface: &mut dyn RenderSurface,
		index: usize,
		duration_ms: f64,
	) -> bool {
		let Some(target) = surface.bodies().get(index).map(|b| b.position) else {
			return false;
		};
		self.move_to(surface, target, duration_ms);
		true
	}

	/// Fit the bounding sphere of `indices` into view with `padding` world
	/// units of margin.
	pub fn frame_nodes(
		&self,
		surface: &mut dyn RenderSurface,
		indices: &[usize],
		duration_ms: f64,
		padding: f32,
	) -> bool {
		let points: Vec<Vec3> = indices
			.iter()
			.filter_map(|&i| surface.bodies().get(i).map(|b| b.position))
			.collect();
		if points.is_empty() {
			return false;
		}
		let (min, max) = points
			.iter()
			.fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), &p| {
				(lo.min(p), hi.max(p))
			});
		let center = (min + max) * 0.5;
		let radius = points
			.iter()
			.map(|p| p.distance(center))
			.fold(0.0, f32::max)
			+ padding;
		let half_fov = (self.fov_deg.to_radians() * 0.5).max(f32::EPSILON);
		let distance = (radius / half_fov.sin()).max(self.distance);

		debug!("Framing {} nodes around {center}", points.len());
		surface.animate_camera(center + Vec3::Z * distance, center, duration_ms);
		true
	}
}
