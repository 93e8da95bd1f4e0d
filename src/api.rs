//! Network endpoints.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use log::warn;
use serde_json::Value;

use crate::config::API_BASE;
use crate::error::GraphError;
use crate::graph::GraphMode;

/// Where a network view gets its data from.
#[derive(Clone, Debug, PartialEq)]
pub enum NetworkSource {
	/// The signed-in user's network, authorized by a bearer token.
	Private {
		/// Session token from local storage.
		token: String,
	},
	/// The anonymous public network.
	Public,
}

impl NetworkSource {
	/// Private when a session token is stored in the browser, public otherwise.
	pub fn from_local_storage() -> Self {
		let token = web_sys::window()
			.and_then(|w| w.local_storage().ok().flatten())
			.and_then(|s| s.get_item("token").ok().flatten())
			.filter(|t| !t.is_empty());
		match token {
			Some(token) => NetworkSource::Private { token },
			None => NetworkSource::Public,
		}
	}

	/// Payload shape this source returns.
	pub fn mode(&self) -> GraphMode {
		match self {
			NetworkSource::Private { .. } => GraphMode::Private,
			NetworkSource::Public => GraphMode::Public,
		}
	}

	/// Endpoint URL.
	pub fn url(&self) -> String {
		match self {
			NetworkSource::Private { .. } => format!("{API_BASE}/network"),
			NetworkSource::Public => format!("{API_BASE}/network/public"),
		}
	}
}

/// Fetch the raw payload. Shape validation is left to the store.
pub async fn fetch_network(source: &NetworkSource) -> Result<Value, GraphError> {
	let client = reqwest::Client::new();
	let mut request = client.get(source.url());
	if let NetworkSource::Private { token } = source {
		request = request.bearer_auth(token);
	}

	let response = request.send().await?;
	let status = response.status();
	if !status.is_success() {
		warn!("Network request to {} failed with {status}", source.url());
		return Err(GraphError::FetchFailure(format!("server responded {status}")));
	}
	Ok(response.json::<Value>().await?)
}

/// Stops a request from outside the task awaiting it. Cancelling wakes the
/// task, which then drops the request instead of waiting for the response.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
	cancelled: AtomicBool,
	waker: Mutex<Option<Waker>>,
}

impl CancelToken {
	/// Cancel every future guarded by this token. Idempotent.
	pub fn cancel(&self) {
		if self.0.cancelled.swap(true, Ordering::AcqRel) {
			return;
		}
		let waker = self.0.waker.lock().ok().and_then(|mut w| w.take());
		if let Some(waker) = waker {
			waker.wake();
		}
	}

	/// Whether [`CancelToken::cancel`] has been called.
	pub fn is_cancelled(&self) -> bool {
		self.0.cancelled.load(Ordering::Acquire)
	}

	/// Wrap `future` so it resolves to `None` as soon as the token is
	/// cancelled. The inner future is dropped unfinished.
	pub fn guard<F: Future>(&self, future: F) -> Cancellable<F> {
		Cancellable {
			future: Box::pin(future),
			token: self.clone(),
		}
	}
}

/// Future returned by [`CancelToken::guard`].
pub struct Cancellable<F> {
	future: Pin<Box<F>>,
	token: CancelToken,
}

impl<F: Future> Future for Cancellable<F> {
	type Output = Option<F::Output>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		if self.token.is_cancelled() {
			return Poll::Ready(None);
		}
		if let Poll::Ready(output) = self.future.as_mut().poll(cx) {
			return Poll::Ready(Some(output));
		}
		if let Ok(mut waker) = self.token.0.waker.lock() {
			*waker = Some(cx.waker().clone());
		}
		// A cancel between the first check and storing the waker found no one to wake.
		if self.token.is_cancelled() {
			return Poll::Ready(None);
		}
		Poll::Pending
	}
}

#[cfg(test)]
mod tests {
	use std::future::{pending, ready};
	use std::sync::atomic::AtomicUsize;
	use std::task::Wake;

	use super::*;

	#[derive(Default)]
	struct CountingWaker(AtomicUsize);

	impl Wake for CountingWaker {
		fn wake(self: Arc<Self>) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[test]
	fn cancelling_wakes_and_resolves_a_pending_request() {
		let counter = Arc::new(CountingWaker::default());
		let waker = Waker::from(counter.clone());
		let mut cx = Context::from_waker(&waker);
		let token = CancelToken::default();
		let mut request = token.guard(pending::<Result<Value, GraphError>>());

		assert!(Pin::new(&mut request).poll(&mut cx).is_pending());
		token.cancel();
		token.cancel();
		assert_eq!(counter.0.load(Ordering::SeqCst), 1);
		assert!(matches!(Pin::new(&mut request).poll(&mut cx), Poll::Ready(None)));
	}

	#[test]
	fn cancelled_token_never_polls_the_request() {
		let token = CancelToken::default();
		token.cancel();
		let mut request = token.guard(ready(7));
		let mut cx = Context::from_waker(Waker::noop());
		assert!(matches!(Pin::new(&mut request).poll(&mut cx), Poll::Ready(None)));
	}

	#[test]
	fn uncancelled_request_passes_its_output_through() {
		let token = CancelToken::default();
		let mut request = token.guard(ready(7));
		let mut cx = Context::from_waker(Waker::noop());
		assert!(matches!(Pin::new(&mut request).poll(&mut cx), Poll::Ready(Some(7))));
		assert!(!token.is_cancelled());
	}

	#[test]
	fn source_picks_endpoint_and_mode() {
		let private = NetworkSource::Private { token: "t".into() };
		assert_eq!(private.mode(), GraphMode::Private);
		assert!(private.url().ends_with("/network"));
		assert_eq!(NetworkSource::Public.mode(), GraphMode::Public);
		assert!(NetworkSource::Public.url().ends_with("/network/public"));
	}
}
