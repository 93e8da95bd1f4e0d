use leptos::prelude::*;

use crate::api::NetworkSource;
use crate::components::network_graph::NetworkGraphCanvas;

/// The network view: the signed-in user's network when a session token is
/// stored, the public network otherwise.
#[component]
pub fn Home() -> impl IntoView {
	let source = NetworkSource::from_local_storage();
	let title = match source {
		NetworkSource::Private { .. } => "Your Network",
		NetworkSource::Public => "Public Network",
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<NetworkGraphCanvas source=source fullscreen=true />
				<div class="graph-overlay">
					<h1>{title}</h1>
					<p class="subtitle">
						"Click a group to expand it, click a member for details. Drag to orbit. Scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
