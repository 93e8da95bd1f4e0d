//! The graph-visualization core: data model, clustering, selection, camera
//! choreography and idle animation. Nothing here touches the DOM; the browser
//! side implements [`surface::RenderSurface`].

pub mod animation;
pub mod camera;
pub mod cluster;
pub mod detail;
pub mod label;
pub mod selection;
pub mod session;
pub mod store;
pub mod style;
pub mod surface;
pub mod types;

pub use detail::DetailPanel;
pub use selection::SelectionState;
pub use session::GraphSession;
pub use store::{GraphDataStore, GraphMode};
pub use types::{GroupId, NodeId};
