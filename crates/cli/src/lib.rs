//! Offline management of the session store shared with the browser extension.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod store;
pub mod styles;
