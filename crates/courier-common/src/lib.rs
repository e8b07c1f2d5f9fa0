//! # courier-common
//!
//! Shared types, configuration, error handling, and the hybrid encryption
//! envelope used by every Courier crate. The server and the client both
//! build on this layer; it holds no transport or storage logic.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod time;
pub mod validation;
