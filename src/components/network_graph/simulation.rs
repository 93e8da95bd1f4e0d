use std::f32::consts::PI;

use glam::Vec3;

use crate::graph::surface::{Body, Force, LinkDistanceFn};
use crate::graph::types::LinkEnds;

const INITIAL_RADIUS: f32 = 10.0;
const DEFAULT_LINK_DISTANCE: f32 = 30.0;
const DISTANCE_MIN2: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct SimulationParameters {
	/// Many-body strength; negative repels.
	pub force_charge: f32,
	/// Pull of the mass center toward the origin, if enabled.
	pub force_center: Option<f32>,
	pub velocity_decay: f32,
	pub alpha_decay: f32,
	pub alpha_min: f32,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min = 0.001_f32;
		Self {
			force_charge: -30.0,
			force_center: None,
			velocity_decay: 0.4,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_min,
		}
	}
}

struct Spring {
	ends: LinkEnds,
	distance: f32,
	strength: f32,
	bias: f32,
}

/// 3D velocity-Verlet layout: many-body repulsion, link springs, optional
/// centering, and any registered custom forces, cooled by `alpha`.
pub struct Simulation {
	pub params: SimulationParameters,
	bodies: Vec<Body>,
	links: Vec<LinkEnds>,
	springs: Vec<Spring>,
	link_distance: Option<LinkDistanceFn>,
	forces: Vec<(String, Box<dyn Force>)>,
	alpha: f32,
}

impl Simulation {
	pub fn new(params: SimulationParameters) -> Self {
		Self {
			params,
			bodies: Vec::new(),
			links: Vec::new(),
			springs: Vec::new(),
			link_distance: None,
			forces: Vec::new(),
			alpha: 1.0,
		}
	}

	/// Resize the body table to `count` bodies placed on a spherical spiral,
	/// keeping existing bodies when the count is unchanged.
	pub fn set_graph(&mut self, count: usize, links: &[LinkEnds]) {
		if self.bodies.len() != count {
			self.bodies = (0..count).map(initial_body).collect();
		}
		self.links = links
			.iter()
			.copied()
			.filter(|l| l.source < count && l.target < count)
			.collect();
		self.rebuild_springs();
		self.reheat();
	}

	pub fn set_link_distance(&mut self, distance: LinkDistanceFn) {
		self.link_distance = Some(distance);
		self.rebuild_springs();
	}

	pub fn register_force(&mut self, name: &str, force: Box<dyn Force>) {
		self.forces.retain(|(n, _)| n != name);
		self.forces.push((name.to_owned(), force));
	}

	pub fn reheat(&mut self) {
		self.alpha = 1.0;
	}

	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn bodies_mut(&mut self) -> &mut [Body] {
		&mut self.bodies
	}

	fn rebuild_springs(&mut self) {
		let mut degree = vec![0u32; self.bodies.len()];
		for l in &self.links {
			degree[l.source] += 1;
			degree[l.target] += 1;
		}
		self.springs = self
			.links
			.iter()
			.map(|&ends| {
				let (s, t) = (degree[ends.source] as f32, degree[ends.target] as f32);
				Spring {
					ends,
					distance: self
						.link_distance
						.as_ref()
						.map_or(DEFAULT_LINK_DISTANCE, |f| f(ends)),
					strength: 1.0 / s.min(t).max(1.0),
					bias: s / (s + t),
				}
			})
			.collect();
	}

	/// Advance one tick. Forces stop once cooled below `alpha_min`; pinned
	/// bodies follow their pins regardless.
	pub fn tick(&mut self) {
		if self.alpha >= self.params.alpha_min {
			self.alpha += (0.0 - self.alpha) * self.params.alpha_decay;
			let alpha = self.alpha;
			self.apply_charge(alpha);
			self.apply_springs(alpha);
			for (_, force) in &mut self.forces {
				force.apply(&mut self.bodies, alpha);
			}
			for body in &mut self.bodies {
				body.velocity *= 1.0 - self.params.velocity_decay;
				body.position += body.velocity;
			}
			self.apply_center();
		}
		for body in &mut self.bodies {
			if let Some(pin) = body.pin {
				body.position = pin;
				body.velocity = Vec3::ZERO;
			}
		}
	}

	fn apply_charge(&mut self, alpha: f32) {
		let strength = self.params.force_charge;
		if strength == 0.0 {
			return;
		}
		let n = self.bodies.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let mut d = self.bodies[j].position - self.bodies[i].position;
				if d == Vec3::ZERO {
					d = jiggle(i, j);
				}
				let mut l = d.length_squared();
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				let push = d * (strength * alpha / l);
				self.bodies[i].velocity += push;
				self.bodies[j].velocity -= push;
			}
		}
	}

	fn apply_springs(&mut self, alpha: f32) {
		for spring in &self.springs {
			let (s, t) = (spring.ends.source, spring.ends.target);
			if s == t {
				continue;
			}
			let source = self.bodies[s];
			let target = self.bodies[t];
			let mut d = (target.position + target.velocity) - (source.position + source.velocity);
			if d == Vec3::ZERO {
				d = jiggle(s, t);
			}
			let l = d.length();
			let k = (l - spring.distance) / l * alpha * spring.strength;
			let pull = d * k;
			self.bodies[t].velocity -= pull * spring.bias;
			self.bodies[s].velocity += pull * (1.0 - spring.bias);
		}
	}

	fn apply_center(&mut self) {
		let (Some(strength), false) = (self.params.force_center, self.bodies.is_empty()) else {
			return;
		};
		let mean = self.bodies.iter().map(|b| b.position).sum::<Vec3>() / self.bodies.len() as f32;
		let shift = mean * strength;
		for body in &mut self.bodies {
			body.position -= shift;
		}
	}
}

/// Deterministic tiny offset separating coincident bodies.
fn jiggle(i: usize, j: usize) -> Vec3 {
	let seed = (i * 31 + j * 17 + 1) as f32;
	Vec3::new(seed.sin(), seed.cos(), (seed * 0.5).sin()) * 1e-6
}

fn initial_body(i: usize) -> Body {
	let roll = PI * (3.0 - 5f32.sqrt());
	let yaw = PI * 20.0 / (9.0 + 221f32.sqrt());
	let r = INITIAL_RADIUS * (0.5 + i as f32).cbrt();
	let (a, b) = (i as f32 * roll, i as f32 * yaw);
	Body {
		position: Vec3::new(r * a.sin() * b.cos(), r * a.cos(), r * a.sin() * b.sin()),
		..Body::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn link(source: usize, target: usize) -> LinkEnds {
		LinkEnds { source, target }
	}

	#[test]
	fn initial_bodies_are_distinct() {
		let mut sim = Simulation::new(SimulationParameters::default());
		sim.set_graph(20, &[]);
		let bodies = sim.bodies();
		for i in 0..bodies.len() {
			for j in i + 1..bodies.len() {
				assert!(bodies[i].position.distance(bodies[j].position) > 0.1);
			}
		}
	}

	#[test]
	fn keeps_positions_when_count_is_unchanged() {
		let mut sim = Simulation::new(SimulationParameters::default());
		sim.set_graph(3, &[]);
		sim.bodies_mut()[1].position = Vec3::new(7.0, 7.0, 7.0);
		sim.set_graph(3, &[link(0, 1)]);
		assert_eq!(sim.bodies()[1].position, Vec3::new(7.0, 7.0, 7.0));
	}

	#[test]
	fn repulsion_separates_bodies() {
		let mut sim = Simulation::new(SimulationParameters::default());
		sim.set_graph(2, &[]);
		sim.bodies_mut()[0].position = Vec3::new(-1.0, 0.0, 0.0);
		sim.bodies_mut()[1].position = Vec3::new(1.0, 0.0, 0.0);
		for _ in 0..10 {
			sim.tick();
		}
		assert!(sim.bodies()[0].position.distance(sim.bodies()[1].position) > 2.0);
	}

	#[test]
	fn springs_settle_near_rest_length() {
		let params = SimulationParameters {
			force_charge: 0.0,
			..SimulationParameters::default()
		};
		let mut sim = Simulation::new(params);
		sim.set_graph(2, &[link(0, 1)]);
		sim.set_link_distance(Box::new(|_| 50.0));
		sim.bodies_mut()[0].position = Vec3::ZERO;
		sim.bodies_mut()[1].position = Vec3::new(5.0, 0.0, 0.0);
		for _ in 0..300 {
			sim.tick();
		}
		let d = sim.bodies()[0].position.distance(sim.bodies()[1].position);
		assert!((d - 50.0).abs() < 5.0, "distance {d}");
	}

	#[test]
	fn pinned_bodies_follow_their_pin_after_cooling() {
		let mut sim = Simulation::new(SimulationParameters::default());
		sim.set_graph(1, &[]);
		for _ in 0..1000 {
			sim.tick();
		}
		assert!(sim.alpha() < sim.params.alpha_min);
		sim.bodies_mut()[0].pin = Some(Vec3::new(3.0, 2.0, 1.0));
		sim.tick();
		assert_eq!(sim.bodies()[0].position, Vec3::new(3.0, 2.0, 1.0));
		assert_eq!(sim.bodies()[0].velocity, Vec3::ZERO);
	}

	#[test]
	fn custom_forces_receive_alpha() {
		let mut sim = Simulation::new(SimulationParameters {
			force_charge: 0.0,
			..SimulationParameters::default()
		});
		sim.set_graph(1, &[]);
		sim.register_force(
			"push",
			Box::new(|bodies: &mut [Body], alpha: f32| bodies[0].velocity += Vec3::X * alpha),
		);
		let before = sim.bodies()[0].position;
		sim.tick();
		assert!(sim.bodies()[0].position.x > before.x);
	}

	#[test]
	fn center_force_pulls_mass_center_to_origin() {
		let mut sim = Simulation::new(SimulationParameters {
			force_charge: 0.0,
			force_center: Some(0.5),
			..SimulationParameters::default()
		});
		sim.set_graph(2, &[]);
		sim.bodies_mut()[0].position = Vec3::new(100.0, 0.0, 0.0);
		sim.bodies_mut()[1].position = Vec3::new(120.0, 0.0, 0.0);
		for _ in 0..50 {
			sim.tick();
		}
		let mean = (sim.bodies()[0].position + sim.bodies()[1].position) / 2.0;
		assert!(mean.length() < 1.0);
	}
}
