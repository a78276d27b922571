//! precache - cache-first offline proxy
//!
//! Pre-caches a fixed manifest of resources into a named cache store when
//! the host delivers the install signal, then answers fetch signals from
//! that store, falling back to the network on a miss.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod network;
pub mod ui;
pub mod worker;

pub use error::{PrecacheError, PrecacheResult};
