//! Platform services consumed by the shell.
//!
//! The command handlers only see traits: [`TimeService`] for the clock,
//! [`NetworkClient`] for external lookups, and the [`Persistence`] handle
//! for the key/value store. [`DesktopPlatform`] is the std-backed default.

pub mod services;
pub mod store;

pub use services::{
    DesktopPlatform, IpDetails, NetworkClient, Query, Reply, SystemTime, TimeService,
    WeatherReport, WhoisRecord,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, Persistence, keys};
