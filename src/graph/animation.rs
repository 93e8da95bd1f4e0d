//! Idle "living network" motion: slow positional drift and pulsing halos.

use glam::Vec3;
use log::info;

use super::store::GraphDataStore;
use super::surface::{Halo, RenderSurface};
use crate::error::GraphError;

/// Halo alpha range over one pulse.
pub const HALO_OPACITY: (f32, f32) = (0.15, 0.55);
/// Halo size range over one pulse, as a multiple of the node radius.
pub const HALO_SCALE: (f32, f32) = (1.3, 1.9);

/// One tick of micro-animation per call. The phase advances by a fixed step
/// regardless of how late the tick fires.
#[derive(Clone, Debug)]
pub struct MicroAnimator {
	phase: f32,
	/// Phase advance per tick, in radians.
	pub step: f32,
	/// Drift amplitude in world units.
	pub drift: f32,
	/// Only animate expanded nodes; otherwise every node moves.
	pub gated: bool,
	pinned: Vec<bool>,
	/// Last halo written per node; a different halo belongs to someone else.
	pulsed: Vec<Option<Halo>>,
}

impl MicroAnimator {
	/// Animator at phase zero.
	pub fn new(step: f32, drift: f32, gated: bool) -> Self {
		Self {
			phase: 0.0,
			step,
			drift,
			gated,
			pinned: Vec::new(),
			pulsed: Vec::new(),
		}
	}

	/// Current phase in radians.
	pub fn phase(&self) -> f32 {
		self.phase
	}

	/// Drift offset of node `index` at the current phase.
	pub fn offset(&self, index: usize) -> Vec3 {
		let i = index as f32;
		Vec3::new(
			(self.phase + i * 0.05).sin(),
			(self.phase + i * 0.05).cos(),
			(self.phase + i * 0.08).sin(),
		) * self.drift
	}

	/// Halo parameters of node `index` at the current phase, within
	/// [`HALO_OPACITY`] and [`HALO_SCALE`].
	pub fn halo(&self, index: usize) -> Halo {
		let wave = (self.phase * 4.0 + index as f32 * 0.7).sin() * 0.5 + 0.5;
		Halo {
			opacity: HALO_OPACITY.0 + (HALO_OPACITY.1 - HALO_OPACITY.0) * wave,
			scale: HALO_SCALE.0 + (HALO_SCALE.1 - HALO_SCALE.0) * wave,
		}
	}

	/// Pin every animated body to its drifted position and pulse its halo.
	/// Bodies and halos this animator set on nodes that are no longer
	/// animated are released; pins and halos set elsewhere are left alone.
	pub fn tick(&mut self, store: &GraphDataStore, surface: &mut dyn RenderSurface) {
		let count = store.nodes().len().min(surface.bodies().len());
		self.pinned.resize(count, false);
		self.pulsed.resize(count, None);

		for (index, node) in store.nodes().iter().take(count).enumerate() {
			let animate = !self.gated || node.expanded;
			let offset = self.offset(index);
			let body = &mut surface.bodies_mut()[index];
			if animate {
				body.pin = Some(body.position + offset);
				self.pinned[index] = true;
			} else if self.pinned[index] {
				body.pin = None;
				self.pinned[index] = false;
			}

			let Some(visual) = surface.visual_mut(index) else {
				continue;
			};
			if animate {
				let halo = self.halo(index);
				visual.halo = Some(halo);
				self.pulsed[index] = Some(halo);
			} else if let Some(last) = self.pulsed[index].take() {
				if visual.halo == Some(last) {
					visual.halo = None;
				}
			}
		}
		self.phase += self.step;
	}
}

/// Handle to a running repeating task.
pub trait RepeatingTask {
	/// Stop the task; it never fires again.
	fn cancel(self: Box<Self>);
}

/// Holds at most one running instance of a repeating task.
#[derive(Default)]
pub struct TaskSlot {
	task: Option<Box<dyn RepeatingTask>>,
}

impl TaskSlot {
	/// Whether a task is held.
	pub fn is_running(&self) -> bool {
		self.task.is_some()
	}

	/// Start the task unless one is already running. Returns whether `spawn`
	/// was invoked.
	pub fn start(
		&mut self,
		spawn: impl FnOnce() -> Result<Box<dyn RepeatingTask>, GraphError>,
	) -> Result<bool, GraphError> {
		if self.task.is_some() {
			return Ok(false);
		}
		self.task = Some(spawn()?);
		info!("Micro-animation started");
		Ok(true)
	}

	/// Stop the running task, if any. Returns whether one was stopped.
	pub fn cancel(&mut self) -> bool {
		match self.task.take() {
			Some(task) => {
				task.cancel();
				info!("Micro-animation stopped");
				true
			}
			None => false,
		}
	}
}

impl Drop for TaskSlot {
	fn drop(&mut self) {
		self.cancel();
	}
}
