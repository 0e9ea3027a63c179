//! Memorial hall: publish and curate memorial records over a small JSON API.
//!
//! Reads are public; writes require `Authorization: Basic <jwt>` carrying an allowed role.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod memorials;
pub mod oauth;
pub mod session;
pub mod state;
