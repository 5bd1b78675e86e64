//! # Labtime
//!
//! A lab timetable server: weekly slot templates, one-off bookings and
//! weekend rules resolved into the effective timetable of the coming week.
//! Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! labtime = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use labtime::server::{AppState, create_router};
//! use labtime::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/labtime.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(mockable::DefaultClock),
//!     Some(12),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod timetable;
pub mod types;
