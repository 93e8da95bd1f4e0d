use leptos::prelude::*;

use crate::graph::{DetailPanel, NodeId};

/// Side panel for the focused node.
#[component]
pub fn DetailPanelView(
	panel: DetailPanel,
	on_close: Callback<()>,
	on_goto: Callback<NodeId>,
) -> impl IntoView {
	let DetailPanel {
		name,
		image,
		email,
		link,
		header,
		connection_order,
		group_name,
		group_description,
		facts,
		corresponding,
		..
	} = panel;

	view! {
		<aside class="detail-panel">
			<button class="detail-panel-close" on:click=move |_| on_close.run(())>
				"Close"
			</button>
			{image.map(|src| view! { <img class="detail-panel-image" src=src alt="" /> })}
			<h2>{name}</h2>
			{header.map(|h| view! { <p class="detail-panel-header">{h}</p> })}
			{group_name.map(|g| view! { <p class="detail-panel-group">{g}</p> })}
			{group_description.map(|d| view! { <p class="detail-panel-group-description">{d}</p> })}
			{connection_order
				.map(|order| view! { <p>{format!("Connection order: {order}")}</p> })}
			{email
				.map(|email| {
					let href = format!("mailto:{email}");
					view! { <p>"Email: "<a href=href>{email}</a></p> }
				})}
			{link
				.map(|href| {
					view! {
						<p>
							<a href=href target="_blank" rel="noopener noreferrer">"Visit Profile"</a>
						</p>
					}
				})}
			<dl>
				{facts
					.into_iter()
					.map(|fact| view! {
						<dt>{fact.label}</dt>
						<dd>{fact.value}</dd>
					})
					.collect_view()}
			</dl>
			<div class="detail-panel-corresponding">
				{corresponding
					.into_iter()
					.map(|entry| {
						let caption = match entry.network {
							Some(network) => format!("Go to Corresponding Node: {} ({network})", entry.name),
							None => format!("Go to Corresponding Node: {}", entry.name),
						};
						let id = entry.id;
						view! {
							<button on:click=move |_| on_goto.run(id.clone())>{caption}</button>
						}
					})
					.collect_view()}
			</div>
		</aside>
	}
}
