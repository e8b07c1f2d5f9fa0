//! Domain models shared by the server and the client.
//!
//! These are the wire types: what the database stores and the API serializes.
//! Field names follow the JSON contract (camelCase), not Rust convention.

pub mod envelope;
pub mod identity;

pub use envelope::*;
pub use identity::*;
