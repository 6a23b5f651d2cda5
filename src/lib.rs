//! Chef Menu reference server.
//!
//! An in-memory implementation of the marketplace menu API, used for local
//! runs of the `chef` CLI and for end-to-end tests of the client library.

pub mod server;

pub use server::{app, AppState, ConfigFile, MenuStore, ServerConfig};
