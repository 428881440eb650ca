//! Window-session reconciliation for browser spaces.
//!
//! The [`Engine`] keeps persisted [`Session`](spaces_protocol::Session)
//! records in step with live browser windows, owns the two singleton utility
//! windows (the dashboard and the quick-action popup), and answers the
//! tagged requests those pages send.
//!
//! # Collaborators
//!
//! - [`Browser`] - window and tab manager
//! - [`SessionStore`] - durable session records
//! - [`ScratchStore`] - small cached scalars, such as utility window ids
//! - [`Notifier`] - broadcast to open dashboards
//!
//! Hosts feed [`BrowserEvent`]s through [`event_queue`] into
//! [`Engine::run_events`], and route incoming messages to [`Engine::dispatch`].
//!
//! Everything runs on one logical thread; collaborators are not `Send`.

pub mod bounds;
pub mod browser;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod import;
pub mod matcher;
pub mod memory;
pub mod naming;
mod rediscovery;
pub mod refresh;
mod sessions;
pub mod store;
pub mod testing;
mod transfer;
pub mod utility;

pub use browser::{Browser, CreateTab, CreateWindow, TabUpdate, WindowUpdate};
pub use config::EngineConfig;
pub use dispatch::{ActionId, Sentinel, lookup_action};
pub use engine::{Clock, Engine, EngineState};
pub use error::{OptionalExt, Result, SpacesError};
pub use events::{BrowserEvent, EventReceiver, EventSender, event_queue};
pub use memory::{MemoryScratchStore, MemorySessionStore};
pub use store::{Notifier, ScratchStore, SessionStore};
pub use utility::UtilityKind;
