//! Wire types shared by the spaces engine, its hosts, and UI surfaces.
//!
//! # Main Types
//!
//! - [`Session`] - durable record of a named tab grouping
//! - [`Space`] - read model merging a session and/or a live window
//! - [`Window`], [`Tab`], [`DisplayInfo`] - window manager shapes
//! - [`PushMessage`] - unsolicited messages broadcast to open dashboards
//! - [`Reply`] - dispatcher answer: a value, or nothing at all

pub mod ids;
pub mod message;
pub mod model;
pub mod or_false;
pub mod param;
pub mod popup;

pub use ids::{SessionId, TabId, WindowId};
pub use message::{MessageSender, PushMessage, Reply};
pub use model::{DisplayInfo, Session, SessionPresence, Space, StoredBounds, Tab, Window, WindowBounds, WindowType, names_equal};
pub use param::{CleanParam, clean_parameter, parse_int};
pub use popup::{hash_variable, window_id_from_context};
