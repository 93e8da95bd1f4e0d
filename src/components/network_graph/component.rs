use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::detail_panel::DetailPanelView;
use super::label_canvas::{CanvasTextMeasure, context_2d};
use super::render::{self, SpriteCache};
use super::scene::{CanvasScene, ClickTarget, DragState};
use crate::api::{CancelToken, NetworkSource, fetch_network};
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::graph::animation::{RepeatingTask, TaskSlot};
use crate::graph::surface::RenderSurface;
use crate::graph::{DetailPanel, GraphDataStore, GraphMode, GraphSession, NodeId};

/// Pointer travel (px) below which a press-release counts as a click.
const CLICK_SLOP: f64 = 4.0;
const ORBIT_RADIANS_PER_PX: f32 = 0.005;

#[derive(Clone, Debug, PartialEq)]
enum ViewStatus {
	Loading,
	Ready,
	Empty,
	Failed(GraphError),
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

fn canvas_size(canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	match web_sys::window() {
		Some(window) if fullscreen => window_size(&window),
		_ => canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.filter(|&(w, h)| w > 0.0 && h > 0.0)
			.unwrap_or((800.0, 600.0)),
	}
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or(0.0, |p| p.now())
}

/// A `requestAnimationFrame` loop that reschedules itself until dropped.
struct FrameLoop {
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	handle: Rc<Cell<i32>>,
}

impl FrameLoop {
	fn start(window: &Window, mut frame: impl FnMut() + 'static) -> Result<Self, GraphError> {
		let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let handle = Rc::new(Cell::new(0));
		let (callback_inner, handle_inner) = (callback.clone(), handle.clone());
		*callback.borrow_mut() = Some(Closure::new(move || {
			frame();
			if let (Some(window), Some(cb)) = (web_sys::window(), callback_inner.borrow().as_ref()) {
				if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					handle_inner.set(id);
				}
			}
		}));
		let id = match callback.borrow().as_ref() {
			Some(cb) => window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.map_err(|_| GraphError::UnsupportedRenderingSurface)?,
			None => return Err(GraphError::UnsupportedRenderingSurface),
		};
		handle.set(id);
		Ok(Self { callback, handle })
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(self.handle.get());
		}
		self.callback.borrow_mut().take();
	}
}

/// A `setInterval` timer, cleared on cancel.
struct IntervalTask {
	handle: i32,
	_callback: Closure<dyn FnMut()>,
}

impl IntervalTask {
	fn start(period_ms: u32, tick: impl FnMut() + 'static) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::UnsupportedRenderingSurface)?;
		let callback = Closure::<dyn FnMut()>::new(tick);
		let handle = window
			.set_interval_with_callback_and_timeout_and_arguments_0(
				callback.as_ref().unchecked_ref(),
				period_ms as i32,
			)
			.map_err(|_| GraphError::UnsupportedRenderingSurface)?;
		Ok(Self {
			handle,
			_callback: callback,
		})
	}
}

impl RepeatingTask for IntervalTask {
	fn cancel(self: Box<Self>) {
		if let Some(window) = web_sys::window() {
			window.clear_interval_with_handle(self.handle);
		}
	}
}

/// A mounted network: session, scene, and the tasks that drive them. Dropping
/// it stops the frame loop, the micro-animation timer, and the resize listener.
struct GraphView {
	session: Rc<RefCell<GraphSession>>,
	scene: Rc<RefCell<CanvasScene>>,
	panel: RwSignal<Option<DetailPanel>>,
	animation: TaskSlot,
	_frame: FrameLoop,
	resize: Option<Closure<dyn FnMut()>>,
}

impl GraphView {
	fn mount(
		canvas: HtmlCanvasElement,
		ctx: CanvasRenderingContext2d,
		store: GraphDataStore,
		config: GraphConfig,
		panel: RwSignal<Option<DetailPanel>>,
		fullscreen: bool,
	) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::UnsupportedRenderingSurface)?;
		let (w, h) = canvas_size(&canvas, fullscreen);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let period = config.animation_period_ms;
		let mut scene = CanvasScene::new(w, h, Box::new(CanvasTextMeasure::new()?));
		let session = GraphSession::new(store, config);
		session.install(&mut scene, &mut rand::thread_rng());

		let scene = Rc::new(RefCell::new(scene));
		let session = Rc::new(RefCell::new(session));

		{
			let (session, scene_weak) = (session.clone(), Rc::downgrade(&scene));
			scene.borrow_mut().on_node_click(Rc::new(move |index| {
				let Some(scene) = scene_weak.upgrade() else {
					return;
				};
				let mut session = session.borrow_mut();
				session.node_clicked(index, &mut *scene.borrow_mut());
				panel.set(session.detail_panel());
			}));
		}
		{
			let (session, scene_weak) = (session.clone(), Rc::downgrade(&scene));
			scene.borrow_mut().on_background_click(Rc::new(move || {
				let Some(scene) = scene_weak.upgrade() else {
					return;
				};
				session
					.borrow_mut()
					.background_clicked(&mut *scene.borrow_mut());
				panel.set(None);
			}));
		}

		let frame = {
			let scene = scene.clone();
			let mut sprites = SpriteCache::default();
			FrameLoop::start(&window, move || {
				if let Ok(mut s) = scene.try_borrow_mut() {
					s.step(now_ms());
					render::render(&s, &ctx, &mut sprites);
				}
			})?
		};

		let mut animation = TaskSlot::default();
		{
			let (session, scene) = (session.clone(), scene.clone());
			animation.start(|| {
				let task = IntervalTask::start(period, move || {
					if let (Ok(mut session), Ok(mut scene)) =
						(session.try_borrow_mut(), scene.try_borrow_mut())
					{
						session.animation_tick(&mut *scene);
					}
				})?;
				Ok(Box::new(task) as Box<dyn RepeatingTask>)
			})?;
		}

		let resize = if fullscreen {
			let scene = scene.clone();
			let cb = Closure::<dyn FnMut()>::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas.set_width(nw as u32);
				canvas.set_height(nh as u32);
				scene.borrow_mut().resize(nw, nh);
			});
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			Some(cb)
		} else {
			None
		};

		Ok(Self {
			session,
			scene,
			panel,
			animation,
			_frame: frame,
			resize,
		})
	}

	fn pointer_down(&self, x: f64, y: f64) {
		self.scene.borrow_mut().drag = DragState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	fn pointer_move(&self, x: f64, y: f64) {
		let mut s = self.scene.borrow_mut();
		if !s.drag.active {
			let hovered = s.node_at_position(x, y);
			s.set_hover(hovered);
			return;
		}
		let (dx, dy) = (x - s.drag.last_x, y - s.drag.last_y);
		s.drag.last_x = x;
		s.drag.last_y = y;
		if !s.drag.moved && (x - s.drag.start_x).hypot(y - s.drag.start_y) > CLICK_SLOP {
			s.drag.moved = true;
		}
		if s.drag.moved {
			s.camera.orbit(
				dx as f32 * ORBIT_RADIANS_PER_PX,
				dy as f32 * ORBIT_RADIANS_PER_PX,
			);
		}
	}

	fn pointer_up(&self, x: f64, y: f64) {
		let target = {
			let mut s = self.scene.borrow_mut();
			let clicked = s.drag.active && !s.drag.moved;
			s.drag.active = false;
			if !clicked {
				return;
			}
			s.click_target(x, y)
		};
		match target {
			ClickTarget::Node(handler, index) => {
				debug!("Click on node {index}");
				handler(index);
			}
			ClickTarget::Background(handler) => {
				debug!("Click on background");
				handler();
			}
			ClickTarget::Unhandled => {}
		}
	}

	fn pointer_leave(&self) {
		let mut s = self.scene.borrow_mut();
		s.drag.active = false;
		s.set_hover(None);
	}

	fn wheel(&self, delta_y: f64) {
		let factor = if delta_y > 0.0 { 1.1 } else { 0.9 };
		self.scene.borrow_mut().camera.dolly(factor);
	}

	fn close_panel(&self) {
		let mut session = self.session.borrow_mut();
		session.close_panel(&mut *self.scene.borrow_mut());
		self.panel.set(session.detail_panel());
	}

	fn goto_corresponding(&self, id: &NodeId) {
		let mut session = self.session.borrow_mut();
		session.goto_corresponding(id, &mut *self.scene.borrow_mut());
		self.panel.set(session.detail_panel());
	}
}

impl Drop for GraphView {
	fn drop(&mut self) {
		self.animation.cancel();
		if let (Some(window), Some(cb)) = (web_sys::window(), self.resize.take()) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		info!("Network view disposed");
	}
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Fetches a network and renders it as an interactive 3D graph with a detail
/// panel for the focused node.
#[component]
pub fn NetworkGraphCanvas(
	source: NetworkSource,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let config = config.unwrap_or_else(|| match source.mode() {
		GraphMode::Private => GraphConfig::private_network(),
		GraphMode::Public => GraphConfig::public_network(),
	});
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let status = RwSignal::new(ViewStatus::Loading);
	let panel = RwSignal::new(None::<DetailPanel>);
	let mounted = StoredValue::new_local(None::<GraphView>);
	let started = Rc::new(Cell::new(false));
	let fetch = CancelToken::default();
	let cancel_fetch = fetch.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				warn!("{e}");
				status.set(ViewStatus::Failed(e));
				return;
			}
		};

		let (source, config, fetch) = (source.clone(), config.clone(), fetch.clone());
		spawn_local(async move {
			let Some(fetched) = fetch.guard(fetch_network(&source)).await else {
				debug!("View disposed while fetching the network; request dropped");
				return;
			};
			let loaded = fetched.and_then(|payload| GraphDataStore::load(source.mode(), payload));
			let store = match loaded {
				Ok(store) if store.is_empty() => {
					status.set(ViewStatus::Empty);
					return;
				}
				Ok(store) => store,
				Err(e) => {
					warn!("Network view unavailable: {e}");
					status.set(ViewStatus::Failed(e));
					return;
				}
			};
			match GraphView::mount(canvas, ctx, store, config, panel, fullscreen) {
				Ok(view) => {
					mounted.try_update_value(|m| *m = Some(view));
					status.set(ViewStatus::Ready);
				}
				Err(e) => {
					warn!("Network view unavailable: {e}");
					status.set(ViewStatus::Failed(e));
				}
			}
		});
	});

	on_cleanup(move || {
		cancel_fetch.cancel();
		mounted.try_update_value(|m| m.take());
	});

	let with_view = move |f: &dyn Fn(&GraphView)| {
		mounted.with_value(|m| {
			if let Some(view) = m {
				f(view);
			}
		});
	};

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_view(&|v| v.pointer_down(x, y));
		}
	};
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_view(&|v| v.pointer_move(x, y));
		}
	};
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_view(&|v| v.pointer_up(x, y));
		}
	};
	let on_mouseleave = move |_: MouseEvent| with_view(&|v| v.pointer_leave());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let delta = ev.delta_y();
		with_view(&|v| v.wheel(delta));
	};

	let on_close = Callback::new(move |_: ()| with_view(&|v| v.close_panel()));
	let on_goto = Callback::new(move |id: NodeId| with_view(&|v| v.goto_corresponding(&id)));

	view! {
		<div class="network-graph">
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || match status.get() {
				ViewStatus::Loading => Some(view! { <p class="graph-message">"Loading network..."</p> }.into_any()),
				ViewStatus::Ready => None,
				ViewStatus::Empty => {
					Some(view! { <p class="graph-message">"No network data available."</p> }.into_any())
				}
				ViewStatus::Failed(e) => {
					Some(view! { <p class="graph-message">{e.user_message()}</p> }.into_any())
				}
			}}
			{move || {
				panel
					.get()
					.map(|panel| view! { <DetailPanelView panel=panel on_close=on_close on_goto=on_goto /> })
			}}
		</div>
	}
}
