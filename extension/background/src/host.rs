//! Engine collaborators backed by the extension APIs.

use async_trait::async_trait;
use js_sys::{Object, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use spaces::{
    Browser, CreateTab, CreateWindow, MemorySessionStore, Notifier, OptionalExt, Result,
    ScratchStore, SessionStore, SpacesError, TabUpdate, WindowUpdate,
};
use spaces_protocol::{
    DisplayInfo, MessageSender, PushMessage, Session, SessionId, Tab, TabId, Window, WindowId,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::chrome;

const SESSIONS_KEY: &str = "spacesSessions";

pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    // Plain objects, not `Map`s, so the extension APIs accept them.
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| SpacesError::Browser(err.to_string()))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|err| SpacesError::Browser(err.to_string()))
}

pub fn field(obj: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(obj, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

pub fn error_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| field(err, "message")?.as_string())
        .or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Rejections such as `No window with id: 12.` become `NotFound`.
fn classify(err: JsValue) -> SpacesError {
    let message = error_message(&err);
    let id = || {
        message
            .split(|c: char| !c.is_ascii_digit())
            .filter(|digits| !digits.is_empty())
            .last()
            .and_then(|digits| digits.parse::<i64>().ok())
            .unwrap_or(-1)
    };
    if message.starts_with("No window with id") || message.starts_with("No last-focused window")
    {
        SpacesError::window_not_found(id())
    } else if message.starts_with("No tab with id") {
        SpacesError::tab_not_found(id())
    } else {
        SpacesError::Browser(message)
    }
}

async fn settle(promise: std::result::Result<Promise, JsValue>) -> Result<JsValue> {
    JsFuture::from(promise.map_err(classify)?)
        .await
        .map_err(classify)
}

async fn call<T: DeserializeOwned>(promise: std::result::Result<Promise, JsValue>) -> Result<T> {
    from_js(settle(promise).await?)
}

async fn settle_storage(promise: std::result::Result<Promise, JsValue>) -> Result<JsValue> {
    let promise = promise.map_err(|err| SpacesError::Store(error_message(&err)))?;
    JsFuture::from(promise)
        .await
        .map_err(|err| SpacesError::Store(error_message(&err)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBrowser;

#[async_trait(?Send)]
impl Browser for ChromeBrowser {
    async fn window(&self, id: WindowId, populate: bool) -> Result<Window> {
        let query = to_js(&json!({ "populate": populate }))?;
        call(chrome::windows_get(id.get() as f64, &query)).await
    }

    async fn windows(&self, populate: bool) -> Result<Vec<Window>> {
        let query = to_js(&json!({ "populate": populate }))?;
        call(chrome::windows_get_all(&query)).await
    }

    async fn current_window(&self) -> Result<Option<Window>> {
        // A service worker has no window of its own; the last focused one stands in.
        let query = to_js(&json!({ "populate": true }))?;
        call(chrome::windows_get_last_focused(&query))
            .await
            .optional()
    }

    async fn create_window(&self, options: CreateWindow) -> Result<Window> {
        call(chrome::windows_create(&to_js(&options)?)).await
    }

    async fn update_window(&self, id: WindowId, update: WindowUpdate) -> Result<Window> {
        call(chrome::windows_update(id.get() as f64, &to_js(&update)?)).await
    }

    async fn remove_window(&self, id: WindowId) -> Result<()> {
        settle(chrome::windows_remove(id.get() as f64)).await?;
        Ok(())
    }

    async fn tab(&self, id: TabId) -> Result<Tab> {
        call(chrome::tabs_get(id.get() as f64)).await
    }

    async fn active_tab(&self) -> Result<Option<Tab>> {
        let query = to_js(&json!({ "active": true, "lastFocusedWindow": true }))?;
        let tabs: Vec<Tab> = call(chrome::tabs_query(&query)).await?;
        Ok(tabs.into_iter().next())
    }

    async fn create_tab(&self, options: CreateTab) -> Result<Tab> {
        call(chrome::tabs_create(&to_js(&options)?)).await
    }

    async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<Tab> {
        call(chrome::tabs_update(id.get() as f64, &to_js(&update)?)).await
    }

    async fn remove_tab(&self, id: TabId) -> Result<()> {
        settle(chrome::tabs_remove(id.get() as f64)).await?;
        Ok(())
    }

    async fn move_tab(&self, id: TabId, window_id: WindowId) -> Result<Tab> {
        let properties = to_js(&json!({ "windowId": window_id, "index": -1 }))?;
        call(chrome::tabs_move(id.get() as f64, &properties)).await
    }

    async fn displays(&self) -> Result<Vec<DisplayInfo>> {
        call(chrome::display_get_info()).await
    }

    async fn delete_history_url(&self, url: &str) -> Result<()> {
        settle(chrome::history_delete_url(&to_js(&json!({ "url": url }))?)).await?;
        Ok(())
    }

    fn resource_url(&self, path: &str) -> String {
        chrome::runtime_get_url(path)
    }
}

/// Scratch values in `chrome.storage.local`, one key per value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeScratch;

#[async_trait(?Send)]
impl ScratchStore for ChromeScratch {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let items = settle_storage(chrome::storage_local_get(key)).await?;
        field(&items, key).map(from_js).transpose()
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &to_js(&value)?)
            .map_err(|err| SpacesError::Store(error_message(&err)))?;
        settle_storage(chrome::storage_local_set(&items)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        settle_storage(chrome::storage_local_remove(key)).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSessions {
    #[serde(default = "first_id")]
    next_id: i64,
    #[serde(default)]
    sessions: Vec<Session>,
}

fn first_id() -> i64 {
    1
}

/// Sessions kept under one `chrome.storage.local` key.
///
/// The working set lives in memory; every mutation rewrites the key before
/// returning.
#[derive(Debug)]
pub struct StorageSessionStore {
    inner: MemorySessionStore,
}

impl StorageSessionStore {
    pub async fn open() -> Result<Self> {
        let stored = match ChromeScratch.get(SESSIONS_KEY).await? {
            Some(value) => serde_json::from_value(value)?,
            None => StoredSessions {
                next_id: first_id(),
                sessions: Vec::new(),
            },
        };
        tracing::info!(
            target = "spaces.host",
            sessions = stored.sessions.len(),
            "session store loaded"
        );
        Ok(Self {
            inner: MemorySessionStore::restore(stored.sessions, stored.next_id),
        })
    }

    async fn persist(&self) -> Result<()> {
        let stored = StoredSessions {
            next_id: self.inner.next_id(),
            sessions: self.inner.snapshot(),
        };
        ChromeScratch
            .set(SESSIONS_KEY, serde_json::to_value(&stored)?)
            .await
    }
}

#[async_trait(?Send)]
impl SessionStore for StorageSessionStore {
    async fn sessions(&self) -> Result<Vec<Session>> {
        self.inner.sessions().await
    }

    async fn session(&self, id: SessionId) -> Result<Option<Session>> {
        self.inner.session(id).await
    }

    async fn create(&self, session: Session) -> Result<Session> {
        let created = self.inner.create(session).await?;
        self.persist().await?;
        Ok(created)
    }

    async fn update(&self, session: Session) -> Result<Session> {
        let updated = self.inner.update(session).await?;
        self.persist().await?;
        Ok(updated)
    }

    async fn delete(&self, id: SessionId) -> Result<bool> {
        let removed = self.inner.delete(id).await?;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }
}

/// Push messages go out through `chrome.runtime.sendMessage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeNotifier;

impl Notifier for RuntimeNotifier {
    fn broadcast(&self, message: &PushMessage) -> Result<()> {
        let promise = chrome::runtime_send_message(&to_js(message)?).map_err(classify)?;
        wasm_bindgen_futures::spawn_local(async move {
            // Rejects when no extension page is listening.
            let _ = JsFuture::from(promise).await;
        });
        Ok(())
    }
}

/// Reads the fields of a `runtime.MessageSender` the engine cares about.
pub fn message_sender(sender: &JsValue) -> MessageSender {
    let tab = field(sender, "tab");
    let tab_number = |name: &str| {
        tab.as_ref()
            .and_then(|tab| field(tab, name))
            .and_then(|value| value.as_f64())
            .map(|number| number as i64)
    };
    MessageSender {
        id: field(sender, "id").and_then(|value| value.as_string()),
        url: field(sender, "url").and_then(|value| value.as_string()),
        tab_id: tab_number("id").map(TabId),
        window_id: tab_number("windowId").map(WindowId),
    }
}
