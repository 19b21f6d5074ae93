//! Terminal UI for LOOKOUT.
//!
//! This crate provides the Ratatui-based terminal interface for the
//! detection dashboard. It is a pure function of the state published by
//! `lookout-feed`: no business logic lives here, only rendering and
//! key-to-event translation.
//!
//! ## Hotkeys
//!
//! - `Up`/`k`, `Down`/`j` - move the list cursor
//! - `Enter` - inspect the alert under the cursor
//! - `Esc` - close help / clear the inspected alert
//! - `r` - fetch a snapshot immediately
//! - `?` or `h` - help overlay
//! - `q` - quit, `Ctrl+C` - force quit

pub mod app;
pub mod event;
pub mod widget;

pub use app::{App, AppResult};
pub use event::{AppEvent, InputHandler};
