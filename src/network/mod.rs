pub mod client;

pub use client::RelayConnection;
