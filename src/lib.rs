//! Createathon - terminal client for the Createathon coding-challenge platform
//!
//! The library wraps the platform's REST API behind typed facades and keeps
//! the client-side state the web frontend keeps in the browser: the JWT pair,
//! bookmarks and per-challenge start times.
//!
//! ## Layers
//!
//! - [`api`]: HTTP transport and the [`api::ApiClient`], which attaches the
//!   bearer token and refreshes it once when the backend answers 401.
//! - [`services`]: one method per endpoint.
//! - [`session`]: who is logged in, driven by login/logout and by refresh
//!   failures reported from the client.
//! - [`views`]: filtering, pagination and stats computed over fetched data.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod views;

pub use error::ApiError;
