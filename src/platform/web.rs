//! Browser glue
//!
//! `ArcadeHandle` is what the host page holds. It owns the canvas surface,
//! the animation-frame loop and the DOM listeners. Listeners are added on
//! mount and removed on close; the closures live as long as the handle so
//! one can safely close the game from inside its own callback.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

use super::{LocalStore, PerfMonitor};
use crate::arcade::{Arcade, GameKind};
use crate::renderer::CanvasSurface;
use crate::settings::{KeyLayout, PongPreset, Settings};

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: EventClosure,
}

struct Inner {
    arcade: RefCell<Arcade>,
    surface: CanvasSurface,
    window: Window,
    document: Document,
    perf: RefCell<PerfMonitor>,
    last_frame: Cell<Option<f64>>,
    raf_id: Cell<Option<i32>>,
    raf_closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: Vec<Listener>,
    attached: Cell<bool>,
    /// Active-state changes queued by the arcade, delivered once it is no
    /// longer borrowed
    pending_active: Rc<RefCell<Vec<bool>>>,
    on_active_change: Option<js_sys::Function>,
}

/// Handle exported to the host page
#[wasm_bindgen]
pub struct ArcadeHandle {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl ArcadeHandle {
    /// Bind to the canvas with id `canvas_id`. `on_active_change` is called
    /// with a boolean whenever a game gains or loses keyboard focus.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        on_active_change: Option<js_sys::Function>,
    ) -> Result<ArcadeHandle, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;
        let surface = CanvasSurface::new(canvas)?;

        let seed = js_sys::Date::now() as u64;
        let mut arcade = Arcade::new(Settings::load(), Box::new(LocalStore), seed);
        let pending_active = Rc::new(RefCell::new(Vec::new()));
        let sink = pending_active.clone();
        arcade.set_active_callback(move |active| sink.borrow_mut().push(active));
        log::info!("Arcade ready (seed {})", seed);

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let listeners = build_listeners(weak, &window, &document, surface.canvas());
            let raf = {
                let weak = weak.clone();
                Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_frame(now);
                    }
                })
            };
            Inner {
                arcade: RefCell::new(arcade),
                surface,
                window,
                document,
                perf: RefCell::new(PerfMonitor::new()),
                last_frame: Cell::new(None),
                raf_id: Cell::new(None),
                raf_closure: RefCell::new(Some(raf)),
                listeners,
                attached: Cell::new(false),
                pending_active,
                on_active_change,
            }
        });
        Ok(ArcadeHandle { inner })
    }

    /// Mount "pong", "snake" or "lander" and start its loop
    pub fn mount(&self, game: &str) -> Result<(), JsValue> {
        let kind = GameKind::from_str(game).ok_or_else(|| JsValue::from_str("unknown game"))?;
        let inner = &self.inner;
        inner.stop_loop();
        inner.arcade.borrow_mut().mount(kind);
        inner.flush_active();
        inner.attach();
        inner.start_loop();
        Ok(())
    }

    /// Unmount the current game, cancel its loop and release input
    pub fn close(&self) {
        self.inner.shutdown();
    }

    pub fn set_accent(&self, accent: &str) {
        self.inner.arcade.borrow_mut().set_accent(accent);
    }

    pub fn set_low_quality(&self, low_quality: bool) {
        self.inner.arcade.borrow_mut().set_low_quality(low_quality);
    }

    pub fn set_layout(&self, layout: &str) -> Result<(), JsValue> {
        let layout = KeyLayout::from_str(layout).ok_or_else(|| JsValue::from_str("unknown layout"))?;
        self.inner.update_settings(|arcade| arcade.set_layout(layout));
        Ok(())
    }

    /// Swap between the two layouts; returns the new one
    pub fn toggle_layout(&self) -> String {
        let layout = self.inner.arcade.borrow().layout().toggled();
        self.inner.update_settings(|arcade| arcade.set_layout(layout));
        layout.as_str().to_string()
    }

    pub fn set_pong_preset(&self, preset: &str) -> Result<(), JsValue> {
        let preset = PongPreset::from_str(preset).ok_or_else(|| JsValue::from_str("unknown preset"))?;
        self.inner.update_settings(|arcade| arcade.set_pong_preset(preset));
        Ok(())
    }

    pub fn set_show_fps(&self, show: bool) {
        self.inner.update_settings(|arcade| arcade.set_show_fps(show));
    }

    /// HUD snapshot as JSON, or `undefined` when nothing is mounted
    pub fn hud_json(&self) -> Option<String> {
        let hud = self.inner.arcade.borrow().hud()?;
        match serde_json::to_string(&hud) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("HUD could not be serialized: {}", e);
                None
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.arcade.borrow().is_mounted()
    }
}

impl Inner {
    fn on_frame(&self, now: f64) {
        self.raf_id.set(None);
        if !self.arcade.borrow().wants_frames() {
            return;
        }
        // Next frame is booked before any work so nothing below can stall
        // the loop
        self.schedule();

        if let Some(last) = self.last_frame.replace(Some(now)) {
            let flipped = self.perf.borrow_mut().sample(now - last);
            if let Some(low_quality) = flipped {
                self.arcade.borrow_mut().set_low_quality(low_quality);
            }
        }

        {
            let mut arcade = self.arcade.borrow_mut();
            arcade.frame(now);
            if let Some(list) = arcade.render() {
                if let Err(e) = self.surface.present(&list) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }
        self.flush_active();
    }

    fn schedule(&self) {
        let raf = self.raf_closure.borrow();
        let Some(callback) = raf.as_ref() else {
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn start_loop(&self) {
        if self.raf_id.get().is_none() && self.arcade.borrow().wants_frames() {
            self.last_frame.set(None);
            self.schedule();
        }
    }

    fn stop_loop(&self) {
        if let Some(id) = self.raf_id.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }
        self.last_frame.set(None);
    }

    fn attach(&self) {
        if self.attached.replace(true) {
            return;
        }
        for listener in &self.listeners {
            if let Err(e) = listener.target.add_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::error!("Could not listen for {}: {:?}", listener.event, e);
            }
        }
        log::debug!("Attached {} listeners", self.listeners.len());
    }

    fn detach(&self) {
        if !self.attached.replace(false) {
            return;
        }
        for listener in &self.listeners {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("Could not stop listening for {}: {:?}", listener.event, e);
            }
        }
        log::debug!("Detached listeners");
    }

    fn shutdown(&self) {
        self.stop_loop();
        self.arcade.borrow_mut().unmount();
        self.detach();
        if self.document.pointer_lock_element().is_some() {
            self.document.exit_pointer_lock();
        }
        self.flush_active();
    }

    fn flush_active(&self) {
        let changes: Vec<bool> = self.pending_active.borrow_mut().drain(..).collect();
        let Some(callback) = self.on_active_change.as_ref() else {
            return;
        };
        for active in changes {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(active)) {
                log::warn!("Active-change callback threw: {:?}", e);
            }
        }
    }

    fn update_settings(&self, apply: impl FnOnce(&mut Arcade)) {
        let mut arcade = self.arcade.borrow_mut();
        apply(&mut arcade);
        arcade.settings().save();
    }

    fn request_pointer_lock(&self) {
        self.surface.canvas().request_pointer_lock();
    }

    fn on_key_down(&self, event: &KeyboardEvent) {
        let outcome = self.arcade.borrow_mut().key_down(&event.key());
        if outcome.consumed {
            event.prevent_default();
        }
        if outcome.request_pointer_lock {
            self.request_pointer_lock();
        }
        if outcome.closed {
            self.shutdown();
        }
        self.flush_active();
    }

    fn on_visibility_change(&self) {
        if self.document.visibility_state() == web_sys::VisibilityState::Hidden {
            self.stop_loop();
            self.arcade.borrow_mut().suspend();
        } else {
            self.arcade.borrow_mut().resume();
            self.start_loop();
        }
    }

    fn on_pointer_lock_change(&self) {
        let canvas: &web_sys::Element = self.surface.canvas();
        let locked = self
            .document
            .pointer_lock_element()
            .is_some_and(|el| &el == canvas);
        self.arcade.borrow_mut().pointer_lock_changed(locked);
        self.flush_active();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop_loop();
        self.detach();
    }
}

fn listener(
    weak: &Weak<Inner>,
    target: &EventTarget,
    event: &'static str,
    handler: fn(&Inner, web_sys::Event),
) -> Listener {
    let weak = weak.clone();
    let closure = EventClosure::new(move |e: web_sys::Event| {
        if let Some(inner) = weak.upgrade() {
            handler(&inner, e);
        }
    });
    Listener {
        target: target.clone(),
        event,
        closure,
    }
}

fn build_listeners(
    weak: &Weak<Inner>,
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Vec<Listener> {
    vec![
        listener(weak, window, "keydown", |inner, e| {
            if let Some(event) = e.dyn_ref::<KeyboardEvent>() {
                inner.on_key_down(event);
            }
        }),
        listener(weak, window, "keyup", |inner, e| {
            if let Some(event) = e.dyn_ref::<KeyboardEvent>() {
                inner.arcade.borrow_mut().key_up(&event.key());
            }
        }),
        listener(weak, window, "blur", |inner, _| {
            inner.arcade.borrow_mut().blur();
        }),
        listener(weak, canvas, "mousemove", |inner, e| {
            if let Some(event) = e.dyn_ref::<MouseEvent>() {
                let position = inner
                    .surface
                    .to_logical(event.client_x() as f64, event.client_y() as f64);
                let movement = Vec2::new(event.movement_x() as f32, event.movement_y() as f32);
                inner.arcade.borrow_mut().pointer_moved(position, movement);
            }
        }),
        listener(weak, canvas, "click", |inner, _| {
            let start = inner.arcade.borrow_mut().click();
            if start {
                inner.request_pointer_lock();
            }
            inner.flush_active();
        }),
        listener(weak, document, "pointerlockchange", |inner, _| {
            inner.on_pointer_lock_change();
        }),
        listener(weak, document, "pointerlockerror", |_, _| {
            log::warn!("Pointer lock was refused");
        }),
        listener(weak, document, "visibilitychange", |inner, _| {
            inner.on_visibility_change();
        }),
    ]
}
