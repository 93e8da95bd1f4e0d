//! Group clustering on top of the free-form physics layout.

use glam::Vec3;

use super::surface::{Body, Force};
use super::types::LinkEnds;

/// Name the cluster force is registered under.
pub const CLUSTER_FORCE: &str = "cluster";

/// Nudges every grouped body toward its group's centroid, scaled by the
/// simulation's cooling factor. Runs in O(nodes + groups) per tick.
#[derive(Clone, Debug)]
pub struct ClusterForce {
	slots: Vec<Option<usize>>,
	strength: f32,
	sums: Vec<Vec3>,
	counts: Vec<u32>,
}

impl ClusterForce {
	/// `slots[i]` is the dense group ordinal of body `i`.
	pub fn new(slots: Vec<Option<usize>>, strength: f32) -> Self {
		let groups = slots.iter().flatten().map(|&s| s + 1).max().unwrap_or(0);
		Self {
			slots,
			strength,
			sums: vec![Vec3::ZERO; groups],
			counts: vec![0; groups],
		}
	}

	/// Centroid of every group with at least one member.
	pub fn centroids(&mut self, bodies: &[Body]) -> Vec<Option<Vec3>> {
		self.sums.fill(Vec3::ZERO);
		self.counts.fill(0);
		for (body, slot) in bodies.iter().zip(&self.slots) {
			if let Some(g) = *slot {
				self.sums[g] += body.position;
				self.counts[g] += 1;
			}
		}
		self.sums
			.iter()
			.zip(&self.counts)
			.map(|(&sum, &n)| (n > 0).then(|| sum / n as f32))
			.collect()
	}
}

impl Force for ClusterForce {
	fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
		let centroids = self.centroids(bodies);
		let k = self.strength * alpha;
		for (body, slot) in bodies.iter_mut().zip(&self.slots) {
			if let Some(centroid) = slot.and_then(|g| centroids[g]) {
				body.velocity += (centroid - body.position) * k;
			}
		}
	}
}

/// Rest length of a spring link: loose inside a group, tight across groups.
#[derive(Clone, Debug)]
pub struct LinkDistancePolicy {
	slots: Vec<Option<usize>>,
	/// Rest length when both ends share a group.
	pub intra_group: f32,
	/// Rest length otherwise.
	pub cross_group: f32,
}

impl LinkDistancePolicy {
	/// `slots` as for [`ClusterForce::new`].
	pub fn new(slots: Vec<Option<usize>>, intra_group: f32, cross_group: f32) -> Self {
		Self {
			slots,
			intra_group,
			cross_group,
		}
	}

	/// Rest length for `link`.
	pub fn distance(&self, link: LinkEnds) -> f32 {
		let group_of = |i: usize| self.slots.get(i).copied().flatten();
		match (group_of(link.source), group_of(link.target)) {
			(Some(a), Some(b)) if a == b => self.intra_group,
			_ => self.cross_group,
		}
	}
}
