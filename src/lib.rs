pub mod config;
pub mod error;
pub mod event_log;
pub mod events;
pub mod interfaces;
pub mod observability;
