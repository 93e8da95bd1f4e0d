//! What the detail panel shows for a focused node.

use super::store::GraphDataStore;
use super::types::{NodeId, NodeKind};

/// A resolvable "go to corresponding node" action.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrespondingEntry {
	/// Jump target.
	pub id: NodeId,
	/// Display name of the target.
	pub name: String,
	/// Network name for person nodes, e.g. "GitHub".
	pub network: Option<&'static str>,
}

/// A labelled optional fact ("Industry", "Stars", ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Fact {
	/// Caption, e.g. "Industry".
	pub label: &'static str,
	/// Formatted value.
	pub value: String,
}

/// Everything the panel shows for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailPanel {
	/// The focused node.
	pub id: NodeId,
	/// Display name.
	pub name: String,
	/// Profile picture URL.
	pub image: Option<String>,
	/// Shown as a `mailto:` link.
	pub email: Option<String>,
	/// External profile URL.
	pub link: Option<String>,
	/// Profile headline.
	pub header: Option<String>,
	/// Degree of separation, people only.
	pub connection_order: Option<u32>,
	/// Name of the node's group.
	pub group_name: Option<String>,
	/// Description of the node's group.
	pub group_description: Option<String>,
	/// Type-specific facts that are present, in display order.
	pub facts: Vec<Fact>,
	/// Corresponding nodes that resolve in the model.
	pub corresponding: Vec<CorrespondingEntry>,
}

impl DetailPanel {
	/// Derive the panel for `id`, or `None` if the node is not in the model.
	/// Corresponding ids that do not resolve are skipped.
	pub fn derive(store: &GraphDataStore, id: &NodeId) -> Option<Self> {
		let node = store.find_node(id)?;
		let group = node.group.as_ref().and_then(|g| store.group(g));

		let corresponding = node
			.corresponding
			.iter()
			.filter_map(|cid| store.find_node(cid))
			.map(|target| CorrespondingEntry {
				id: target.id.clone(),
				name: target.name.clone(),
				network: match target.kind {
					NodeKind::Person { network, .. } => Some(network.label()),
					_ => None,
				},
			})
			.collect();

		let mut facts = Vec::new();
		let mut fact = |label: &'static str, value: Option<String>| {
			if let Some(value) = value {
				facts.push(Fact { label, value });
			}
		};
		fact("Description", node.description.clone());
		let connection_order = match &node.kind {
			NodeKind::Person {
				connection_order, ..
			} => Some(*connection_order),
			NodeKind::Organization {
				industry,
				company_size,
				user_count,
			} => {
				fact("Industry", industry.clone());
				fact("Company Size", company_size.clone());
				fact("User Count", user_count.map(|n| n.to_string()));
				None
			}
			NodeKind::Repository {
				stars,
				contributor_count,
				user_count,
			} => {
				fact("User Count", user_count.map(|n| n.to_string()));
				fact("Stars", stars.map(|n| n.to_string()));
				fact("Contributors", contributor_count.map(|n| n.to_string()));
				None
			}
		};

		Some(Self {
			id: node.id.clone(),
			name: node.name.clone(),
			image: node.image.clone(),
			email: node.email.clone(),
			link: node.link.clone(),
			header: node.header.clone(),
			connection_order,
			group_name: group.map(|g| g.name.clone()),
			group_description: group.and_then(|g| g.description.clone()),
			facts,
			corresponding,
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::store::GraphMode;

	#[test]
	fn person_panel_resolves_group_and_corresponding_nodes() {
		let store = GraphDataStore::load(
			GraphMode::Private,
			json!({
				"nodes": [
					{
						"id": 0, "individual_name": "Ada", "group_id": "acme",
						"email": "ada@acme.io", "link": "https://www.linkedin.com/in/ada/",
						"connection_order": 1, "corresponding_user_nodes": [1, 42]
					},
					{ "id": 1, "individual_name": "ada-gh", "is_linkedin": false, "group_id": "acme/rocket" }
				],
				"groups": [
					{ "id": "acme", "name": "Acme", "description": "Rockets and anvils" },
					{ "id": "acme/rocket", "name": "rocket" }
				]
			}),
		)
		.unwrap();

		let panel = DetailPanel::derive(&store, &NodeId::from(0)).unwrap();
		assert_eq!(panel.name, "Ada");
		assert_eq!(panel.email.as_deref(), Some("ada@acme.io"));
		assert_eq!(panel.connection_order, Some(1));
		assert_eq!(panel.group_name.as_deref(), Some("Acme"));
		assert_eq!(panel.group_description.as_deref(), Some("Rockets and anvils"));
		assert_eq!(
			panel.corresponding,
			vec![CorrespondingEntry {
				id: NodeId::from(1),
				name: "ada-gh".into(),
				network: Some("GitHub"),
			}]
		);
	}

	#[test]
	fn unknown_node_has_no_panel() {
		let store =
			GraphDataStore::load(GraphMode::Private, json!({ "nodes": [], "groups": [] })).unwrap();
		assert!(DetailPanel::derive(&store, &NodeId::from(5)).is_none());
	}

	#[test]
	fn public_panel_lists_present_facts_only() {
		let store = GraphDataStore::load(
			GraphMode::Public,
			json!({
				"nodes": [
					{ "id": "r", "type": "github_repository", "name": "acme/rocket", "stars": 12, "description": "Goes up" }
				],
				"links": []
			}),
		)
		.unwrap();
		let panel = DetailPanel::derive(&store, &NodeId::from("r")).unwrap();
		let labels: Vec<&str> = panel.facts.iter().map(|f| f.label).collect();
		assert_eq!(labels, vec!["Description", "Stars"]);
		assert_eq!(panel.connection_order, None);
		assert!(panel.group_name.is_none());
		assert!(panel.corresponding.is_empty());
	}
}
