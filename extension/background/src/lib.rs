//! Background service worker: feeds browser events and extension-page
//! requests into the spaces engine.

mod chrome;
mod host;
mod log;

use std::rc::Rc;

use js_sys::{Date, Function, Object, Reflect};
use serde::de::DeserializeOwned;
use serde_json::Value;
use spaces::{event_queue, BrowserEvent, Engine, EventSender};
use spaces_protocol::{Reply, Tab, TabId, Window, WindowId};
use tokio::sync::OnceCell;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

use crate::host::{
    field, ChromeBrowser, ChromeScratch, RuntimeNotifier, StorageSessionStore,
};
use crate::log::{init_tracing, push_log};

const ADD_LINK_MENU: &str = "spaces-add-link";

/// The engine, built on first use; every listener waits on the same cell.
type Ready = Rc<OnceCell<Engine>>;

fn now() -> i64 {
    Date::now() as i64
}

async fn boot() -> spaces::Result<Engine> {
    let store = StorageSessionStore::open().await?;
    let engine = Engine::new(
        Rc::new(ChromeBrowser),
        Rc::new(store),
        Rc::new(ChromeScratch),
        Rc::new(RuntimeNotifier),
    )
    .with_clock(now);
    if let Err(err) = engine.initialize().await {
        warn!(target = "spaces.host", error = %err, "utility window rediscovery failed");
    }
    Ok(engine)
}

async fn engine(ready: &Ready) -> Option<&Engine> {
    match ready.get_or_try_init(boot).await {
        Ok(engine) => Some(engine),
        Err(err) => {
            push_log(&format!("engine start failed: {err}"));
            None
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    init_tracing();

    // Listeners must be registered before the worker's first turn ends.
    let ready: Ready = Rc::new(OnceCell::new());
    let (events, queue) = event_queue();
    listen_tabs(&events);
    listen_windows(&events);
    listen_runtime(&ready, &events);
    listen_shortcuts(&ready);

    wasm_bindgen_futures::spawn_local(async move {
        if let Some(engine) = engine(&ready).await {
            info!(target = "spaces.host", "engine ready");
            engine.run_events(queue).await;
        }
    });
}

fn decode<T: DeserializeOwned>(value: JsValue, what: &str) -> Option<T> {
    match serde_wasm_bindgen::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(target = "spaces.host", what, error = %err, "undecodable event payload");
            None
        }
    }
}

fn send(events: &EventSender, event: BrowserEvent) {
    if events.send(event).is_err() {
        push_log("event queue closed");
    }
}

fn window_of(info: &JsValue) -> Option<WindowId> {
    field(info, "windowId")?.as_f64().map(|id| WindowId(id as i64))
}

fn listen_tabs(events: &EventSender) {
    {
        let events = events.clone();
        let on_created = Closure::<dyn FnMut(JsValue)>::new(move |tab: JsValue| {
            if let Some(tab) = decode::<Tab>(tab, "tab") {
                send(&events, BrowserEvent::TabCreated { tab });
            }
        });
        chrome::tabs_on_created(&on_created);
        on_created.forget();
    }

    {
        let events = events.clone();
        let on_removed =
            Closure::<dyn FnMut(f64, JsValue)>::new(move |tab_id: f64, info: JsValue| {
                let Some(window_id) = window_of(&info) else {
                    return;
                };
                let window_closing = field(&info, "isWindowClosing")
                    .and_then(|value| value.as_bool())
                    .unwrap_or(false);
                send(
                    &events,
                    BrowserEvent::TabRemoved {
                        tab_id: TabId(tab_id as i64),
                        window_id,
                        window_closing,
                    },
                );
            });
        chrome::tabs_on_removed(&on_removed);
        on_removed.forget();
    }

    {
        let events = events.clone();
        let on_moved = Closure::<dyn FnMut(f64, JsValue)>::new(move |tab_id: f64, info: JsValue| {
            if let Some(window_id) = window_of(&info) {
                send(
                    &events,
                    BrowserEvent::TabMoved {
                        tab_id: TabId(tab_id as i64),
                        window_id,
                    },
                );
            }
        });
        chrome::tabs_on_moved(&on_moved);
        on_moved.forget();
    }

    {
        let events = events.clone();
        let on_updated = Closure::<dyn FnMut(f64, JsValue, JsValue)>::new(
            move |_tab_id: f64, _change: JsValue, tab: JsValue| {
                if let Some(tab) = decode::<Tab>(tab, "tab") {
                    send(&events, BrowserEvent::TabUpdated { tab });
                }
            },
        );
        chrome::tabs_on_updated(&on_updated);
        on_updated.forget();
    }
}

fn listen_windows(events: &EventSender) {
    {
        let events = events.clone();
        let on_created = Closure::<dyn FnMut(JsValue)>::new(move |window: JsValue| {
            if let Some(window) = decode::<Window>(window, "window") {
                send(&events, BrowserEvent::WindowCreated { window });
            }
        });
        chrome::windows_on_created(&on_created);
        on_created.forget();
    }

    {
        let events = events.clone();
        let on_removed = Closure::<dyn FnMut(f64)>::new(move |window_id: f64| {
            send(
                &events,
                BrowserEvent::WindowRemoved {
                    window_id: WindowId(window_id as i64),
                },
            );
        });
        chrome::windows_on_removed(&on_removed);
        on_removed.forget();
    }

    {
        let events = events.clone();
        let on_focus = Closure::<dyn FnMut(f64)>::new(move |window_id: f64| {
            send(
                &events,
                BrowserEvent::WindowFocusChanged {
                    window_id: WindowId(window_id as i64),
                },
            );
        });
        chrome::windows_on_focus_changed(&on_focus);
        on_focus.forget();
    }

    {
        let events = events.clone();
        let on_bounds = Closure::<dyn FnMut(JsValue)>::new(move |window: JsValue| {
            if let Some(window) = decode::<Window>(window, "window") {
                send(&events, BrowserEvent::WindowBoundsChanged { window });
            }
        });
        chrome::windows_on_bounds_changed(&on_bounds);
        on_bounds.forget();
    }
}

fn listen_runtime(ready: &Ready, events: &EventSender) {
    {
        let events = events.clone();
        let on_startup = Closure::<dyn FnMut()>::new(move || {
            send(&events, BrowserEvent::Startup);
        });
        chrome::runtime_on_startup(&on_startup);
        on_startup.forget();
    }

    {
        let ready = ready.clone();
        let on_installed = Closure::<dyn FnMut(JsValue)>::new(move |details: JsValue| {
            let reason = field(&details, "reason").and_then(|value| value.as_string());
            push_log(&format!("installed: {}", reason.as_deref().unwrap_or("unknown")));
            create_context_menu();

            if reason.as_deref() == Some("install") {
                let ready = ready.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let Some(engine) = engine(&ready).await else {
                        return;
                    };
                    if let Err(err) = engine.show_dashboard(None, false).await {
                        warn!(target = "spaces.host", error = %err, "could not open dashboard");
                    }
                });
            }
        });
        chrome::runtime_on_installed(&on_installed);
        on_installed.forget();
    }

    {
        let ready = ready.clone();
        let on_message = Closure::<dyn FnMut(JsValue, JsValue, Function) -> bool>::new(
            move |request: JsValue, sender: JsValue, respond: Function| {
                let ready = ready.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let message: Value = serde_wasm_bindgen::from_value(request).unwrap_or_default();
                    let sender = host::message_sender(&sender);
                    let reply = match engine(&ready).await {
                        Some(engine) => engine.dispatch(&message, &sender).await,
                        None => Reply::bool(false),
                    };
                    let Reply::Value(value) = reply else {
                        return;
                    };
                    match host::to_js(&value) {
                        Ok(response) => {
                            let _ = respond.call1(&JsValue::NULL, &response);
                        }
                        Err(err) => {
                            warn!(target = "spaces.host", error = %err, "unserialisable reply");
                        }
                    }
                });
                // Keeps the response channel open for the async reply.
                true
            },
        );
        chrome::runtime_on_message(&on_message);
        on_message.forget();
    }
}

fn create_context_menu() {
    let properties = Object::new();
    let _ = Reflect::set(&properties, &"id".into(), &ADD_LINK_MENU.into());
    let _ = Reflect::set(&properties, &"title".into(), &"Add link to space...".into());
    let contexts = js_sys::Array::of1(&"link".into());
    let _ = Reflect::set(&properties, &"contexts".into(), &contexts);
    chrome::context_menus_create(&properties);
}

fn show_popup(ready: &Ready, action: &'static str, tab_url: Option<String>) {
    let ready = ready.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let Some(engine) = engine(&ready).await else {
            return;
        };
        if let Err(err) = engine.show_popup(action, tab_url.as_deref()).await {
            warn!(target = "spaces.host", action, error = %err, "could not open popup");
        }
    });
}

fn listen_shortcuts(ready: &Ready) {
    {
        let ready = ready.clone();
        let on_command = Closure::<dyn FnMut(String)>::new(move |command: String| {
            match command.as_str() {
                "spaces-move" => show_popup(&ready, "move", None),
                "spaces-switch" => show_popup(&ready, "switch", None),
                other => push_log(&format!("unknown command: {other}")),
            }
        });
        chrome::commands_on_command(&on_command);
        on_command.forget();
    }

    {
        let ready = ready.clone();
        let on_clicked = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |info: JsValue, _tab: JsValue| {
            let menu = field(&info, "menuItemId").and_then(|value| value.as_string());
            if menu.as_deref() == Some(ADD_LINK_MENU) {
                let link = field(&info, "linkUrl").and_then(|value| value.as_string());
                show_popup(&ready, "move", link);
            }
        });
        chrome::context_menus_on_clicked(&on_clicked);
        on_clicked.forget();
    }
}
