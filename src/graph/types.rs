//! Identifiers, the normalized node/link/group model, and the raw payload
//! records accepted at the ingestion boundary.

use std::fmt;

use serde::Deserialize;

/// A payload identifier. Backends hand out either integers or strings, and the
/// two are never equal to each other (`1` and `"1"` are distinct keys).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Key {
	/// Numeric identifier.
	Int(i64),
	/// Textual identifier.
	Text(String),
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Int(n) => write!(f, "{n}"),
			Key::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for Key {
	fn from(n: i64) -> Self {
		Key::Int(n)
	}
}

impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Text(s.to_owned())
	}
}

/// Stable identifier of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Key);

/// Identifier of a group (organization or repository).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Key);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl fmt::Display for GroupId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

macro_rules! key_conversions {
	($($id:ident),*) => {$(
		impl From<i64> for $id {
			fn from(n: i64) -> Self {
				$id(Key::Int(n))
			}
		}

		impl From<&str> for $id {
			fn from(s: &str) -> Self {
				$id(Key::Text(s.to_owned()))
			}
		}
	)*};
}

key_conversions!(NodeId, GroupId);

/// Which identity network a person node was scraped from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
	/// A LinkedIn profile.
	Linkedin,
	/// A GitHub account.
	Github,
}

impl Network {
	/// Human readable network name.
	pub fn label(self) -> &'static str {
		match self {
			Network::Linkedin => "LinkedIn",
			Network::Github => "GitHub",
		}
	}
}

/// Type-specific node attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// A person in the private network.
	Person {
		/// Network the profile belongs to.
		network: Network,
		/// Handle on that network, when known.
		username: Option<String>,
		/// Degree of separation from the signed-in user.
		connection_order: u32,
	},
	/// A public-graph organization.
	Organization {
		/// Industry the organization lists.
		industry: Option<String>,
		/// Headcount bracket as reported, e.g. "51-200".
		company_size: Option<String>,
		/// Users of the service affiliated with it.
		user_count: Option<u64>,
	},
	/// A public-graph repository.
	Repository {
		/// Stargazer count.
		stars: Option<u64>,
		/// Number of contributors.
		contributor_count: Option<u64>,
		/// Users of the service who contributed.
		user_count: Option<u64>,
	},
}

/// A normalized graph node. Position and velocity live in the rendering
/// surface's body table, indexed by the node's position in the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Identity, unique within the store.
	pub id: NodeId,
	/// Owning group; `None` for ungrouped and public nodes.
	pub group: Option<GroupId>,
	/// Set while the node's group is the activated one.
	pub expanded: bool,
	/// Display name.
	pub name: String,
	/// Profile headline.
	pub header: Option<String>,
	/// Free-form description (public nodes).
	pub description: Option<String>,
	/// Profile picture URL.
	pub image: Option<String>,
	/// Contact address.
	pub email: Option<String>,
	/// External profile URL.
	pub link: Option<String>,
	/// Type-specific attributes.
	pub kind: NodeKind,
	/// Nodes representing the same identity elsewhere, deduplicated.
	pub corresponding: Vec<NodeId>,
}

impl Node {
	/// `connectionOrder` for person nodes, zero otherwise.
	pub fn connection_order(&self) -> u32 {
		match self.kind {
			NodeKind::Person {
				connection_order, ..
			} => connection_order,
			_ => 0,
		}
	}

	/// Member count used for public-graph sizing.
	pub fn user_count(&self) -> Option<u64> {
		match self.kind {
			NodeKind::Organization { user_count, .. } | NodeKind::Repository { user_count, .. } => {
				user_count
			}
			NodeKind::Person { .. } => None,
		}
	}
}

/// A link between two nodes of the store, by identity and by index.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Node the link was derived from.
	pub source: NodeId,
	/// Node it points at.
	pub target: NodeId,
	/// Store indices of both ends.
	pub ends: LinkEnds,
}

/// Store indices of a link's endpoints; the only link shape the rendering
/// surface ever sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkEnds {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
}

/// A named cluster of nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
	/// Identity, unique within the store.
	pub id: GroupId,
	/// Display name; falls back to the id.
	pub name: String,
	/// Shown under the group name in the detail panel.
	pub description: Option<String>,
	/// Logo URL.
	pub logo: Option<String>,
	/// Company page or repository URL.
	pub link: Option<String>,
	/// Industry (organizations).
	pub industry: Option<String>,
	/// Headcount bracket (organizations).
	pub company_size: Option<String>,
	/// Headquarters location (organizations).
	pub headquarters: Option<String>,
	/// Listed specialties (organizations).
	pub specialties: Option<String>,
	/// Stargazer count (repositories).
	pub stars: Option<u64>,
}

// Raw payload records.

/// Body of the authenticated network endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct PrivatePayload {
	pub nodes: Vec<RawPerson>,
	pub groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPerson {
	pub id: NodeId,
	#[serde(default = "default_linkedin")]
	pub is_linkedin: bool,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default, alias = "name", alias = "displayName")]
	pub individual_name: Option<String>,
	#[serde(default)]
	pub header: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default, alias = "profilePicture")]
	pub profile_picture: Option<String>,
	#[serde(default)]
	pub link: Option<String>,
	#[serde(default, alias = "connectionOrder")]
	pub connection_order: u32,
	#[serde(
		default,
		alias = "correspondingUserNodeIds",
		alias = "corresponding_user_node_ids"
	)]
	pub corresponding_user_nodes: Vec<NodeId>,
	#[serde(default, alias = "groupId", alias = "group")]
	pub group_id: Option<GroupId>,
}

fn default_linkedin() -> bool {
	true
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGroup {
	pub id: GroupId,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub logo: Option<String>,
	#[serde(default)]
	pub link: Option<String>,
	#[serde(default)]
	pub industry: Option<String>,
	#[serde(default)]
	pub company_size: Option<String>,
	#[serde(default)]
	pub headquarters: Option<String>,
	#[serde(default)]
	pub specialties: Option<String>,
	#[serde(default)]
	pub stars: Option<u64>,
}

/// Body of the unauthenticated public network endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct PublicPayload {
	pub nodes: Vec<RawPublicNode>,
	pub links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPublicNode {
	pub id: NodeId,
	#[serde(rename = "type")]
	pub kind: PublicKind,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub industry: Option<String>,
	#[serde(default)]
	pub company_size: Option<String>,
	#[serde(default)]
	pub user_count: Option<u64>,
	#[serde(default)]
	pub stars: Option<u64>,
	#[serde(default)]
	pub contributor_count: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PublicKind {
	#[serde(alias = "organization")]
	LinkedinOrganization,
	#[serde(alias = "repository")]
	GithubRepository,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLink {
	pub source: NodeId,
	pub target: NodeId,
}
