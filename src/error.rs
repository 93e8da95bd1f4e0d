//! Errors confined to the graph view.

use thiserror::Error;

/// Everything that can go wrong between fetching a network and drawing it.
/// None of these are fatal to the application; the view degrades to a message.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	/// The payload is missing required top-level fields or has the wrong shape.
	#[error("invalid network payload: {0}")]
	InvalidPayload(String),
	/// Network or authentication failure while fetching.
	#[error("failed to fetch network: {0}")]
	FetchFailure(String),
	/// The host cannot provide a drawing context for the graph canvas.
	#[error("this browser cannot render the 3D network view")]
	UnsupportedRenderingSurface,
	/// A corresponding-node or group id not present in the model. Logged and
	/// skipped, never returned from ingestion.
	#[error("dangling reference from {from} to {to}")]
	DanglingReference {
		/// Id holding the reference.
		from: String,
		/// Id that did not resolve.
		to: String,
	},
}

impl GraphError {
	/// Text shown in place of the graph.
	pub fn user_message(&self) -> &'static str {
		match self {
			GraphError::UnsupportedRenderingSurface => {
				"Your browser does not support the canvas needed to display the network."
			}
			_ => "No network data available.",
		}
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(e: serde_json::Error) -> Self {
		GraphError::InvalidPayload(e.to_string())
	}
}

impl From<reqwest::Error> for GraphError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_decode() {
			GraphError::InvalidPayload(e.to_string())
		} else {
			GraphError::FetchFailure(e.to_string())
		}
	}
}
