//! Side-effecting adapters: configuration, remote client, notifications.

pub mod client;
pub mod config;
pub mod fixture_client;
pub mod notifier;
pub mod smtp;
