// vigil-api: Async Rust client for the vigil guard service HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GuardClient;
pub use error::Error;
