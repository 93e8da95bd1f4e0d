//! The normalized graph model and its expansion flags.

use std::collections::{HashMap, HashSet};

use log::{info, warn};
use serde_json::Value;

use super::types::{
	Group, GroupId, Link, LinkEnds, Network, Node, NodeId, NodeKind, PrivatePayload, PublicKind,
	PublicPayload,
};
use crate::error::GraphError;

/// Which endpoint a payload came from; decides the required top-level keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphMode {
	/// Authenticated `{ nodes, groups }` payload with derived links.
	Private,
	/// Unauthenticated `{ nodes, links }` payload without groups.
	Public,
}

impl GraphMode {
	fn required_keys(self) -> [&'static str; 2] {
		match self {
			GraphMode::Private => ["nodes", "groups"],
			GraphMode::Public => ["nodes", "links"],
		}
	}
}

/// Sole owner of nodes, links, groups and expansion flags.
#[derive(Clone, Debug)]
pub struct GraphDataStore {
	mode: GraphMode,
	nodes: Vec<Node>,
	links: Vec<Link>,
	groups: Vec<Group>,
	index: HashMap<NodeId, usize>,
	group_index: HashMap<GroupId, usize>,
	activated: Option<GroupId>,
}

impl GraphDataStore {
	/// Validate a raw payload and normalize it into the graph model.
	pub fn load(mode: GraphMode, payload: Value) -> Result<Self, GraphError> {
		let Some(object) = payload.as_object() else {
			return Err(GraphError::InvalidPayload(
				"expected a JSON object at the top level".into(),
			));
		};
		for key in mode.required_keys() {
			if !object.contains_key(key) {
				return Err(GraphError::InvalidPayload(format!("missing `{key}`")));
			}
		}

		let store = match mode {
			GraphMode::Private => Self::from_private(serde_json::from_value(payload)?)?,
			GraphMode::Public => Self::from_public(serde_json::from_value(payload)?)?,
		};
		info!(
			"Loaded {:?} network: {} nodes, {} links, {} groups",
			mode,
			store.nodes.len(),
			store.links.len(),
			store.groups.len()
		);
		Ok(store)
	}

	fn empty(mode: GraphMode) -> Self {
		Self {
			mode,
			nodes: Vec::new(),
			links: Vec::new(),
			groups: Vec::new(),
			index: HashMap::new(),
			group_index: HashMap::new(),
			activated: None,
		}
	}

	fn push_node(&mut self, node: Node) -> Result<(), GraphError> {
		if self.index.contains_key(&node.id) {
			return Err(GraphError::InvalidPayload(format!(
				"duplicate node id {}",
				node.id
			)));
		}
		self.index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		Ok(())
	}

	fn push_link(&mut self, source: &NodeId, target: &NodeId) -> bool {
		match (self.index.get(source), self.index.get(target)) {
			(Some(&s), Some(&t)) => {
				self.links.push(Link {
					source: source.clone(),
					target: target.clone(),
					ends: LinkEnds {
						source: s,
						target: t,
					},
				});
				true
			}
			_ => {
				let missing = if self.index.contains_key(source) {
					target
				} else {
					source
				};
				warn!(
					"{}",
					GraphError::DanglingReference {
						from: source.to_string(),
						to: missing.to_string(),
					}
				);
				false
			}
		}
	}

	fn from_private(payload: PrivatePayload) -> Result<Self, GraphError> {
		let mut store = Self::empty(GraphMode::Private);

		for raw in payload.groups {
			if store.group_index.contains_key(&raw.id) {
				continue;
			}
			store.group_index.insert(raw.id.clone(), store.groups.len());
			store.groups.push(Group {
				name: raw.name.unwrap_or_else(|| raw.id.to_string()),
				id: raw.id,
				description: raw.description,
				logo: raw.logo,
				link: raw.link,
				industry: raw.industry,
				company_size: raw.company_size,
				headquarters: raw.headquarters,
				specialties: raw.specialties,
				stars: raw.stars,
			});
		}

		for raw in payload.nodes {
			let mut group = raw.group_id;
			if let Some(g) = &group {
				if !store.groups.is_empty() && !store.group_index.contains_key(g) {
					warn!(
						"{}",
						GraphError::DanglingReference {
							from: raw.id.to_string(),
							to: format!("group {g}"),
						}
					);
					group = None;
				}
			}
			let mut seen = HashSet::new();
			let corresponding = raw
				.corresponding_user_nodes
				.into_iter()
				.filter(|id| seen.insert(id.clone()))
				.collect();
			let name = raw
				.individual_name
				.or_else(|| raw.username.clone())
				.unwrap_or_else(|| raw.id.to_string());

			store.push_node(Node {
				id: raw.id,
				group,
				expanded: false,
				name,
				header: raw.header,
				description: None,
				image: raw.profile_picture,
				email: raw.email,
				link: raw.link,
				kind: NodeKind::Person {
					network: if raw.is_linkedin {
						Network::Linkedin
					} else {
						Network::Github
					},
					username: raw.username,
					connection_order: raw.connection_order,
				},
				corresponding,
			})?;
		}

		// Links are materialized only after every node is indexed, so forward
		// references resolve.
		let pairs: Vec<(NodeId, NodeId)> = store
			.nodes
			.iter()
			.flat_map(|n| n.corresponding.iter().map(|c| (n.id.clone(), c.clone())))
			.collect();
		for (source, target) in &pairs {
			store.push_link(source, target);
		}
		Ok(store)
	}

	fn from_public(payload: PublicPayload) -> Result<Self, GraphError> {
		let mut store = Self::empty(GraphMode::Public);

		for raw in payload.nodes {
			let kind = match raw.kind {
				PublicKind::LinkedinOrganization => NodeKind::Organization {
					industry: raw.industry,
					company_size: raw.company_size,
					user_count: raw.user_count,
				},
				PublicKind::GithubRepository => NodeKind::Repository {
					stars: raw.stars,
					contributor_count: raw.contributor_count,
					user_count: raw.user_count,
				},
			};
			store.push_node(Node {
				name: raw.name.unwrap_or_else(|| raw.id.to_string()),
				id: raw.id,
				group: None,
				expanded: false,
				header: None,
				description: raw.description,
				image: None,
				email: None,
				link: None,
				kind,
				corresponding: Vec::new(),
			})?;
		}

		for link in &payload.links {
			store.push_link(&link.source, &link.target);
		}
		Ok(store)
	}

	/// Expand every member of `group` and collapse everything else; `None`
	/// collapses all nodes.
	pub fn set_activated_group(&mut self, group: Option<&GroupId>) {
		for node in &mut self.nodes {
			node.expanded = match group {
				Some(g) => node.group.as_ref() == Some(g),
				None => false,
			};
		}
		self.activated = group.cloned();
	}

	/// Group whose members are currently expanded.
	pub fn activated_group(&self) -> Option<&GroupId> {
		self.activated.as_ref()
	}

	/// Node by id.
	pub fn find_node(&self, id: &NodeId) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Store index of `id`.
	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Node at a store index.
	pub fn node(&self, index: usize) -> Option<&Node> {
		self.nodes.get(index)
	}

	/// Store indices of every member of `group`, in node order.
	pub fn nodes_in_group(&self, group: &GroupId) -> Vec<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.group.as_ref() == Some(group))
			.map(|(i, _)| i)
			.collect()
	}

	/// Group by id.
	pub fn group(&self, id: &GroupId) -> Option<&Group> {
		self.group_index.get(id).map(|&i| &self.groups[i])
	}

	/// Per-node dense group ordinal, assigned in order of first appearance.
	/// Used by the cluster force and the color palette.
	pub fn group_slots(&self) -> Vec<Option<usize>> {
		let mut slots: HashMap<&GroupId, usize> = HashMap::new();
		self.nodes
			.iter()
			.map(|n| {
				n.group.as_ref().map(|g| {
					let next = slots.len();
					*slots.entry(g).or_insert(next)
				})
			})
			.collect()
	}

	/// Endpoint the payload came from.
	pub fn mode(&self) -> GraphMode {
		self.mode
	}

	/// All nodes in payload order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Resolved links.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Index pairs for every link, in link order.
	pub fn link_ends(&self) -> Vec<LinkEnds> {
		self.links.iter().map(|l| l.ends).collect()
	}

	/// All groups in payload order.
	pub fn groups(&self) -> &[Group] {
		&self.groups
	}

	/// Whether the network has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> Value {
		json!({
			"nodes": [
				{ "id": 1, "individual_name": "Ada", "group_id": "A" },
				{ "id": 2, "individual_name": "Grace", "group_id": "A", "corresponding_user_nodes": [1] },
				{ "id": 3, "individual_name": "Linus", "group_id": "B" }
			],
			"groups": [
				{ "id": "A", "name": "Analytical Engines" },
				{ "id": "B", "name": "Kernel Hackers" }
			]
		})
	}

	#[test]
	fn materializes_links_from_corresponding_ids() {
		let store = GraphDataStore::load(GraphMode::Private, sample()).unwrap();
		assert_eq!(store.links().len(), 1);
		let link = &store.links()[0];
		assert_eq!(link.source, NodeId::from(2));
		assert_eq!(link.target, NodeId::from(1));
		assert_eq!(link.ends, LinkEnds { source: 1, target: 0 });
	}

	#[test]
	fn link_count_matches_fan_out_and_links_resolve() {
		let payload = json!({
			"nodes": [
				{ "id": 0, "group_id": "x", "corresponding_user_nodes": [1, 2, 3] },
				{ "id": 1, "group_id": "x", "correspondingUserNodeIds": [0] },
				{ "id": 2, "group_id": "y", "corresponding_user_nodes": [3, 0] },
				{ "id": 3, "group_id": "y", "corresponding_user_nodes": [] }
			],
			"groups": [{ "id": "x" }, { "id": "y" }]
		});
		let store = GraphDataStore::load(GraphMode::Private, payload).unwrap();
		let fan_out: usize = store.nodes().iter().map(|n| n.corresponding.len()).sum();
		assert_eq!(store.links().len(), fan_out);
		assert_eq!(fan_out, 6);
		for link in store.links() {
			assert!(store.find_node(&link.source).is_some());
			assert!(store.find_node(&link.target).is_some());
		}
	}

	#[test]
	fn forward_references_resolve() {
		let payload = json!({
			"nodes": [
				{ "id": "li-1", "corresponding_user_nodes": ["gh-1"] },
				{ "id": "gh-1", "is_linkedin": false, "corresponding_user_nodes": ["li-1"] }
			],
			"groups": []
		});
		let store = GraphDataStore::load(GraphMode::Private, payload).unwrap();
		assert_eq!(store.links().len(), 2);
	}

	#[test]
	fn activation_expands_exactly_one_group() {
		let mut store = GraphDataStore::load(GraphMode::Private, sample()).unwrap();
		let a = GroupId::from("A");

		store.set_activated_group(Some(&a));
		let flags: Vec<bool> = store.nodes().iter().map(|n| n.expanded).collect();
		assert_eq!(flags, vec![true, true, false]);
		for node in store.nodes() {
			assert_eq!(node.expanded, node.group.as_ref() == Some(&a));
		}
		assert_eq!(store.activated_group(), Some(&a));

		store.set_activated_group(None);
		assert!(store.nodes().iter().all(|n| !n.expanded));
		assert_eq!(store.activated_group(), None);
	}

	#[test]
	fn switching_groups_collapses_the_previous_one() {
		let mut store = GraphDataStore::load(GraphMode::Private, sample()).unwrap();
		store.set_activated_group(Some(&GroupId::from("A")));
		store.set_activated_group(Some(&GroupId::from("B")));
		let flags: Vec<bool> = store.nodes().iter().map(|n| n.expanded).collect();
		assert_eq!(flags, vec![false, false, true]);
	}

	#[test]
	fn missing_top_level_keys_are_invalid() {
		let no_groups = json!({ "nodes": [] });
		assert!(matches!(
			GraphDataStore::load(GraphMode::Private, no_groups),
			Err(GraphError::InvalidPayload(_))
		));

		let no_nodes = json!({ "groups": [] });
		assert!(matches!(
			GraphDataStore::load(GraphMode::Private, no_nodes),
			Err(GraphError::InvalidPayload(_))
		));

		let public_without_links = json!({ "nodes": [] });
		assert!(matches!(
			GraphDataStore::load(GraphMode::Public, public_without_links),
			Err(GraphError::InvalidPayload(_))
		));

		assert!(matches!(
			GraphDataStore::load(GraphMode::Private, json!([1, 2, 3])),
			Err(GraphError::InvalidPayload(_))
		));
	}

	#[test]
	fn wrongly_typed_fields_are_invalid() {
		let payload = json!({ "nodes": "everyone", "groups": [] });
		assert!(matches!(
			GraphDataStore::load(GraphMode::Private, payload),
			Err(GraphError::InvalidPayload(_))
		));
	}

	#[test]
	fn duplicate_node_ids_are_invalid() {
		let payload = json!({
			"nodes": [{ "id": 7 }, { "id": 7 }],
			"groups": []
		});
		assert!(matches!(
			GraphDataStore::load(GraphMode::Private, payload),
			Err(GraphError::InvalidPayload(_))
		));
	}

	#[test]
	fn dangling_references_are_dropped() {
		let payload = json!({
			"nodes": [
				{ "id": 1, "group_id": "A", "corresponding_user_nodes": [99] },
				{ "id": 2, "group_id": "ghost" }
			],
			"groups": [{ "id": "A" }]
		});
		let store = GraphDataStore::load(GraphMode::Private, payload).unwrap();
		assert!(store.links().is_empty());
		assert_eq!(store.find_node(&NodeId::from(2)).unwrap().group, None);
	}

	#[test]
	fn numeric_and_text_ids_are_distinct() {
		let payload = json!({
			"nodes": [{ "id": 1 }, { "id": "1" }],
			"groups": []
		});
		let store = GraphDataStore::load(GraphMode::Private, payload).unwrap();
		assert_eq!(store.index_of(&NodeId::from(1)), Some(0));
		assert_eq!(store.index_of(&NodeId::from("1")), Some(1));
	}

	#[test]
	fn public_payload_keeps_provided_links() {
		let payload = json!({
			"nodes": [
				{ "id": "org:1", "type": "linkedin_organization", "name": "Acme", "user_count": 12 },
				{ "id": "repo:1", "type": "github_repository", "name": "acme/rocket", "stars": 40 },
				{ "id": "repo:2", "type": "repository", "name": "acme/anvil" }
			],
			"links": [
				{ "source": "org:1", "target": "repo:1", "type": "shared_users" },
				{ "source": "org:1", "target": "repo:404", "type": "shared_users" }
			]
		});
		let store = GraphDataStore::load(GraphMode::Public, payload).unwrap();
		assert_eq!(store.mode(), GraphMode::Public);
		assert_eq!(store.links().len(), 1);
		assert!(store.groups().is_empty());
		assert!(store.nodes().iter().all(|n| n.group.is_none()));
		assert_eq!(store.nodes()[0].user_count(), Some(12));
		assert!(matches!(store.nodes()[2].kind, NodeKind::Repository { .. }));
	}

	#[test]
	fn group_lookups() {
		let store = GraphDataStore::load(GraphMode::Private, sample()).unwrap();
		assert_eq!(store.nodes_in_group(&GroupId::from("A")), vec![0, 1]);
		assert_eq!(store.nodes_in_group(&GroupId::from("B")), vec![2]);
		assert!(store.nodes_in_group(&GroupId::from("Z")).is_empty());
		assert_eq!(store.group(&GroupId::from("B")).unwrap().name, "Kernel Hackers");
		assert_eq!(store.group_slots(), vec![Some(0), Some(0), Some(1)]);
		assert_eq!(store.find_node(&NodeId::from(3)).unwrap().name, "Linus");
	}
}
